use crate::model::{GroupNode, Inventory, Vars};
use anyhow::Context;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

#[derive(Debug, Default, Deserialize)]
struct RawGroup {
    #[serde(default)]
    hosts: Option<Mapping>,
    #[serde(default)]
    children: Option<Mapping>,
    #[serde(default)]
    vars: Option<Mapping>,
}

/// Parse a YAML inventory.
///
/// ```yaml
/// all:
///   hosts:
///     manager-1: { ansible_connection: docker }
///   children:
///     workers:
///       hosts:
///         worker-1: { ansible_host: 10.0.0.5 }
/// ```
pub fn parse_inventory_yaml(input: &str) -> anyhow::Result<Inventory> {
    let mut inventory = Inventory::default();
    if input.trim().is_empty() {
        return Ok(inventory);
    }
    let top: Option<Mapping> = serde_yaml::from_str(input).context("parse inventory YAML")?;

    for (name, body) in top.unwrap_or_default() {
        let name = key_string(&name).context("inventory group name")?;
        add_group(&mut inventory, &name, body, 0)?;
    }

    tracing::debug!(
        hosts = inventory.hosts.len(),
        groups = inventory.groups.len(),
        "parsed inventory"
    );
    Ok(inventory)
}

fn add_group(inventory: &mut Inventory, name: &str, body: Value, depth: usize) -> anyhow::Result<()> {
    let raw: RawGroup = if body.is_null() {
        RawGroup::default()
    } else {
        serde_yaml::from_value(body).with_context(|| format!("inventory group `{name}`"))?
    };

    let node = inventory
        .groups
        .entry(name.to_string())
        .or_insert_with(|| GroupNode {
            depth,
            ..GroupNode::default()
        });
    if let Some(vars) = raw.vars {
        node.vars
            .extend(to_vars(vars).with_context(|| format!("vars of group `{name}`"))?);
    }

    for (host, host_body) in raw.hosts.unwrap_or_default() {
        let host = key_string(&host).with_context(|| format!("host name in group `{name}`"))?;
        let vars = match host_body {
            Value::Null => Vars::new(),
            Value::Mapping(m) => to_vars(m).with_context(|| format!("vars of host `{host}`"))?,
            other => anyhow::bail!("host `{host}`: expected a mapping of vars, got {other:?}"),
        };

        let node = inventory.groups.entry(name.to_string()).or_default();
        if !node.hosts.contains(&host) {
            node.hosts.push(host.clone());
        }
        if !inventory.hosts.contains(&host) {
            inventory.hosts.push(host.clone());
        }
        inventory.host_vars.entry(host).or_default().extend(vars);
    }

    for (child, child_body) in raw.children.unwrap_or_default() {
        let child = key_string(&child).with_context(|| format!("child of group `{name}`"))?;
        let node = inventory.groups.entry(name.to_string()).or_default();
        if !node.children.contains(&child) {
            node.children.push(child.clone());
        }
        add_group(inventory, &child, child_body, depth + 1)?;
    }

    Ok(())
}

fn key_string(value: &Value) -> anyhow::Result<String> {
    scalar_string(value).with_context(|| format!("expected a scalar key, got {value:?}"))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Only scalar vars are kept; structured values are not used by any connection.
fn to_vars(mapping: Mapping) -> anyhow::Result<Vars> {
    let mut vars = Vars::new();
    for (k, v) in mapping {
        let key = key_string(&k)?;
        match scalar_string(&v) {
            Some(value) => {
                vars.insert(key, value);
            }
            None => tracing::debug!(var = %key, "ignoring non-scalar inventory var"),
        }
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWARM: &str = r#"
all:
  vars:
    ansible_user: ops
  hosts:
    manager-1:
      ansible_connection: docker
    worker-1:
      ansible_host: 10.0.0.5
      ansible_port: 2222
  children:
    swarm_manager_instance:
      hosts:
        manager-1: {}
    workers:
      vars:
        ansible_user: root
      hosts:
        worker-1:
        worker-2:
          ansible_user: deploy
    swarm:
      children:
        swarm_manager_instance:
        workers:
"#;

    fn names(entries: &[crate::HostEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn all_lists_every_host_in_first_seen_order() {
        let inv = parse_inventory_yaml(SWARM).unwrap();
        let all = inv.resolve_group("all").unwrap();
        assert_eq!(names(&all), vec!["manager-1", "worker-1", "worker-2"]);
    }

    #[test]
    fn children_are_resolved_recursively() {
        let inv = parse_inventory_yaml(SWARM).unwrap();
        let swarm = inv.resolve_group("swarm").unwrap();
        assert_eq!(names(&swarm), vec!["manager-1", "worker-1", "worker-2"]);
        let managers = inv.resolve_group("swarm_manager_instance").unwrap();
        assert_eq!(names(&managers), vec!["manager-1"]);
    }

    #[test]
    fn host_vars_win_over_deeper_group_vars() {
        let inv = parse_inventory_yaml(SWARM).unwrap();
        let workers = inv.resolve_group("workers").unwrap();

        let w1 = &workers[0];
        assert_eq!(w1.var("ansible_user"), Some("root"));
        assert_eq!(w1.var("ansible_host"), Some("10.0.0.5"));
        assert_eq!(w1.var("ansible_port"), Some("2222"));

        let w2 = &workers[1];
        assert_eq!(w2.var("ansible_user"), Some("deploy"));

        let manager = &inv.resolve_group("swarm_manager_instance").unwrap()[0];
        assert_eq!(manager.var("ansible_user"), Some("ops"));
        assert_eq!(manager.var("ansible_connection"), Some("docker"));
    }

    #[test]
    fn unknown_group_is_an_error() {
        let inv = parse_inventory_yaml(SWARM).unwrap();
        let err = inv.resolve_group("databases").unwrap_err();
        assert!(err.to_string().contains("databases"));
    }

    #[test]
    fn implicit_inventory_answers_every_group_with_localhost() {
        let inv = Inventory::implicit_localhost();
        let hosts = inv.resolve_group("swarm_manager_instance").unwrap();
        assert_eq!(names(&hosts), vec!["localhost"]);
        assert_eq!(hosts[0].var("ansible_connection"), Some("local"));
    }

    #[test]
    fn empty_document_has_no_hosts() {
        let inv = parse_inventory_yaml("").unwrap();
        assert!(inv.resolve_group("all").unwrap().is_empty());
    }

    #[test]
    fn malformed_host_vars_are_rejected() {
        assert!(parse_inventory_yaml("all:\n  hosts:\n    web-1: [a, b]\n").is_err());
    }
}
