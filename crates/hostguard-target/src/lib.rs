//! Reaching real machines.
//!
//! [`ShellTarget`] implements `hostguard_domain::target::Target` by running POSIX
//! shell snippets over a [`Connection`] and parsing their output with the pure
//! functions in [`parse`].

#![forbid(unsafe_code)]

mod connection;
pub mod parse;
mod quote;
mod shell;

pub use connection::{Connection, ContainerEngine, DEFAULT_CONNECT_TIMEOUT_SECS, SshOptions};
pub use quote::shell_quote;
pub use shell::ShellTarget;
