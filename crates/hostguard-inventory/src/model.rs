use std::collections::{BTreeMap, BTreeSet};

pub const LOCALHOST: &str = "localhost";

/// Flattened inventory variables (`ansible_host`, `ansible_user`, ...).
pub type Vars = BTreeMap<String, String>;

/// A resolved host with its effective variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostEntry {
    pub name: String,
    pub vars: Vars,
}

impl HostEntry {
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct GroupNode {
    /// Nesting depth of the first definition; `all` is 0.
    pub depth: usize,
    pub hosts: Vec<String>,
    pub children: Vec<String>,
    pub vars: Vars,
}

/// A parsed inventory.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    /// Every host, in first-seen order.
    pub(crate) hosts: Vec<String>,
    pub(crate) host_vars: BTreeMap<String, Vars>,
    pub(crate) groups: BTreeMap<String, GroupNode>,
    /// No inventory was given: every group resolves to the local machine.
    pub(crate) implicit: bool,
}

impl Inventory {
    /// The inventory used when none is supplied: `localhost` over the local connection.
    pub fn implicit_localhost() -> Self {
        let mut host_vars = BTreeMap::new();
        host_vars.insert(
            LOCALHOST.to_string(),
            Vars::from([("ansible_connection".to_string(), "local".to_string())]),
        );
        Self {
            hosts: vec![LOCALHOST.to_string()],
            host_vars,
            groups: BTreeMap::new(),
            implicit: true,
        }
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Hosts of `group` in first-seen order, recursing through `children`.
    ///
    /// `all` always contains every host. An unknown group is an error.
    pub fn resolve_group(&self, group: &str) -> anyhow::Result<Vec<HostEntry>> {
        if self.implicit || group == "all" {
            return Ok(self.hosts.iter().map(|h| self.entry(h)).collect());
        }
        if !self.groups.contains_key(group) {
            anyhow::bail!(
                "unknown inventory group `{group}` (known: {})",
                self.groups.keys().cloned().collect::<Vec<_>>().join(", ")
            );
        }

        let mut members = BTreeSet::new();
        let mut visited = BTreeSet::new();
        self.collect_members(group, &mut members, &mut visited);

        // Keep inventory order rather than set order.
        Ok(self
            .hosts
            .iter()
            .filter(|h| members.contains(h.as_str()))
            .map(|h| self.entry(h))
            .collect())
    }

    fn collect_members<'a>(
        &'a self,
        group: &'a str,
        members: &mut BTreeSet<&'a str>,
        visited: &mut BTreeSet<&'a str>,
    ) {
        if !visited.insert(group) {
            return;
        }
        let Some(node) = self.groups.get(group) else {
            return;
        };
        members.extend(node.hosts.iter().map(String::as_str));
        for child in &node.children {
            self.collect_members(child, members, visited);
        }
    }

    /// Effective vars: group vars from shallow to deep (ties by name), then host vars.
    fn entry(&self, host: &str) -> HostEntry {
        let mut containing: Vec<(&usize, &String, &GroupNode)> = self
            .groups
            .iter()
            .filter(|(name, _)| self.group_contains(name, host))
            .map(|(name, node)| (&node.depth, name, node))
            .collect();
        containing.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(b.1)));

        let mut vars = Vars::new();
        for (_, _, node) in containing {
            vars.extend(node.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(own) = self.host_vars.get(host) {
            vars.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        HostEntry {
            name: host.to_string(),
            vars,
        }
    }

    fn group_contains(&self, group: &str, host: &str) -> bool {
        if group == "all" {
            return true;
        }
        let mut members = BTreeSet::new();
        let mut visited = BTreeSet::new();
        self.collect_members(group, &mut members, &mut visited);
        members.contains(host)
    }
}
