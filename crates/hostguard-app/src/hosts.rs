//! The `hosts` use case: show which machines a run would reach, and how.

use crate::plan;
use hostguard_target::Connection;

#[derive(Clone, Debug)]
pub struct HostsInput<'a> {
    pub inventory_text: Option<&'a str>,
    /// Defaults to `all`.
    pub group: Option<String>,
    pub limit: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostListing {
    pub name: String,
    pub connection: String,
}

pub fn run_hosts(input: HostsInput<'_>) -> anyhow::Result<Vec<HostListing>> {
    let inventory = plan::load_inventory(input.inventory_text)?;
    let limit = plan::parse_limit(input.limit.as_deref())?;
    let group = input.group.as_deref().unwrap_or("all");

    plan::resolve_hosts(&inventory, group, limit.as_ref())?
        .into_iter()
        .map(|host| {
            let connection = Connection::from_host(&host)?;
            Ok(HostListing {
                name: host.name,
                connection: connection.to_string(),
            })
        })
        .collect()
}

/// One `name<TAB>connection` line per host.
pub fn format_hosts(hosts: &[HostListing]) -> String {
    let width = hosts.iter().map(|h| h.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for h in hosts {
        out.push_str(&format!("{:<width$}  {}\n", h.name, h.connection));
    }
    out
}
