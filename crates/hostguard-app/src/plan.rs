//! Which suites run on which hosts.

use anyhow::Context;
use hostguard_domain::model::Suite;
use hostguard_inventory::{HostEntry, HostLimit, Inventory, parse_inventory_yaml};

/// Parse the inventory, or fall back to the implicit `localhost` one.
pub fn load_inventory(text: Option<&str>) -> anyhow::Result<Inventory> {
    match text {
        Some(text) => parse_inventory_yaml(text).context("parse inventory"),
        None => Ok(Inventory::implicit_localhost()),
    }
}

pub fn parse_limit(limit: Option<&str>) -> anyhow::Result<Option<HostLimit>> {
    limit.map(HostLimit::parse).transpose()
}

/// Hosts of `group` after the `--limit` filter.
pub fn resolve_hosts(
    inventory: &Inventory,
    group: &str,
    limit: Option<&HostLimit>,
) -> anyhow::Result<Vec<HostEntry>> {
    let hosts = inventory.resolve_group(group)?;
    Ok(match limit {
        Some(limit) => limit.apply(hosts),
        None => hosts,
    })
}

/// One host and the indices of the suites that target it, in suite order.
#[derive(Clone, Debug)]
pub struct HostPlan {
    pub host: HostEntry,
    pub suites: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct RunPlan {
    /// Inventory order.
    pub hosts: Vec<HostPlan>,
    /// Groups targeted, in first-seen suite order.
    pub groups: Vec<String>,
}

pub fn build_plan(
    inventory: &Inventory,
    suites: &[Suite],
    group_override: Option<&str>,
    limit: Option<&HostLimit>,
) -> anyhow::Result<RunPlan> {
    let mut plan = RunPlan::default();

    // Inventory order is the order of `all`.
    let order: Vec<String> = inventory
        .resolve_group("all")?
        .into_iter()
        .map(|h| h.name)
        .collect();

    let mut targeted: Vec<(HostEntry, Vec<usize>)> = Vec::new();
    for (idx, suite) in suites.iter().enumerate() {
        let group = group_override.unwrap_or(suite.group.as_str());
        if !plan.groups.iter().any(|g| g == group) {
            plan.groups.push(group.to_string());
        }
        let hosts = resolve_hosts(inventory, group, limit)
            .with_context(|| format!("suite `{}`", suite.name))?;
        for host in hosts {
            match targeted.iter_mut().find(|(h, _)| h.name == host.name) {
                Some((_, suite_idx)) => suite_idx.push(idx),
                None => targeted.push((host, vec![idx])),
            }
        }
    }

    targeted.sort_by_key(|(h, _)| order.iter().position(|n| *n == h.name));
    plan.hosts = targeted
        .into_iter()
        .map(|(host, suites)| HostPlan { host, suites })
        .collect();
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = r#"
all:
  hosts:
    worker-1: {}
    manager-1: {}
  children:
    managers:
      hosts:
        manager-1: {}
    workers:
      hosts:
        worker-1: {}
"#;

    fn suite(name: &str, group: &str) -> Suite {
        Suite {
            name: name.to_string(),
            group: group.to_string(),
            checks: Vec::new(),
        }
    }

    #[test]
    fn hosts_follow_inventory_order_and_collect_suites() {
        let inv = load_inventory(Some(INVENTORY)).unwrap();
        let suites = vec![suite("manager", "managers"), suite("common", "all")];

        let plan = build_plan(&inv, &suites, None, None).unwrap();
        let names: Vec<&str> = plan.hosts.iter().map(|h| h.host.name.as_str()).collect();
        assert_eq!(names, vec!["worker-1", "manager-1"]);
        assert_eq!(plan.hosts[0].suites, vec![1]);
        assert_eq!(plan.hosts[1].suites, vec![0, 1]);
        assert_eq!(plan.groups, vec!["managers".to_string(), "all".to_string()]);
    }

    #[test]
    fn group_override_and_limit_apply_to_every_suite() {
        let inv = load_inventory(Some(INVENTORY)).unwrap();
        let suites = vec![suite("manager", "managers")];
        let limit = parse_limit(Some("worker-*")).unwrap();

        let plan = build_plan(&inv, &suites, Some("all"), limit.as_ref()).unwrap();
        let names: Vec<&str> = plan.hosts.iter().map(|h| h.host.name.as_str()).collect();
        assert_eq!(names, vec!["worker-1"]);
    }

    #[test]
    fn unknown_group_names_the_suite() {
        let inv = load_inventory(Some(INVENTORY)).unwrap();
        let err = build_plan(&inv, &[suite("db", "databases")], None, None).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("suite `db`"));
        assert!(msg.contains("databases"));
    }
}
