use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Canonical path on a target host, as used by file predicates and results.
///
/// Normalization rules are intentionally simple and deterministic:
/// - runs of `/` collapse to one
/// - no trailing `/` (except for the root itself)
/// - relative inputs are preserved but rejected by suite validation
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct HostPath(String);

impl<'de> Deserialize<'de> for HostPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(HostPath::new)
    }
}

impl HostPath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let raw = s.as_ref().trim();
        let mut v = String::with_capacity(raw.len());
        let mut prev_slash = false;
        for c in raw.chars() {
            if c == '/' {
                if prev_slash {
                    continue;
                }
                prev_slash = true;
            } else {
                prev_slash = false;
            }
            v.push(c);
        }
        while v.len() > 1 && v.ends_with('/') {
            v.pop();
        }
        Self(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }

    pub fn join(&self, segment: &str) -> HostPath {
        if self.0 == "/" {
            HostPath::new(format!("/{segment}"))
        } else {
            HostPath::new(format!("{}/{segment}", self.0))
        }
    }
}

impl From<String> for HostPath {
    fn from(value: String) -> Self {
        HostPath::new(value)
    }
}

impl From<&str> for HostPath {
    fn from(value: &str) -> Self {
        HostPath::new(value)
    }
}

impl From<HostPath> for String {
    fn from(value: HostPath) -> Self {
        value.0
    }
}

impl std::fmt::Display for HostPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_slashes_and_trims_trailing() {
        assert_eq!(HostPath::new("//etc//apt/keyrings/").as_str(), "/etc/apt/keyrings");
        assert_eq!(HostPath::new("/").as_str(), "/");
        assert_eq!(HostPath::new("///").as_str(), "/");
    }

    #[test]
    fn relative_paths_are_kept_but_flagged() {
        let p = HostPath::new("opt/venv");
        assert_eq!(p.as_str(), "opt/venv");
        assert!(!p.is_absolute());
        assert!(HostPath::new("/opt/venv").is_absolute());
    }

    #[test]
    fn join_appends_segment() {
        assert_eq!(
            HostPath::new("/opt/ansible-venv").join("bin/pip").as_str(),
            "/opt/ansible-venv/bin/pip"
        );
        assert_eq!(HostPath::new("/").join("etc").as_str(), "/etc");
    }

    #[test]
    fn deserializes_with_normalization() {
        let p: HostPath = serde_json::from_str("\"/var/run//docker.sock\"").expect("parse");
        assert_eq!(p.as_str(), "/var/run/docker.sock");
    }
}
