//! Inventory resolution: which hosts make up a group, and with which variables.
//!
//! The input is the YAML inventory format Ansible uses. This crate is
//! IO-free: it parses inventories provided as strings.

#![forbid(unsafe_code)]

mod limit;
mod model;
mod parse;

pub use limit::HostLimit;
pub use model::{HostEntry, Inventory, LOCALHOST, Vars};
pub use parse::parse_inventory_yaml;
