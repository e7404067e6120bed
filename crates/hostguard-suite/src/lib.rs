//! Check suites: TOML files of named predicates aimed at an inventory group.
//!
//! ```toml
//! name = "docker-swarm-manager"
//! hosts = "swarm_manager_instance"
//!
//! [[check]]
//! name = "docker_installed"
//! kind = "package_installed"
//! package = "docker-ce"
//! ```

#![forbid(unsafe_code)]

mod discover;
mod parse;

pub use discover::{discover_suites, load_suite_file};
pub use parse::parse_suite_toml;
