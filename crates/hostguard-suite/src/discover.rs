use crate::parse::parse_suite_toml;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use hostguard_domain::model::Suite;
use walkdir::WalkDir;

pub fn load_suite_file(path: &Utf8Path) -> anyhow::Result<Suite> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read suite {path}"))?;
    parse_suite_toml(&text, path.as_str())
}

/// Load every `*.toml` suite below `dir`, in sorted path order.
pub fn discover_suites(dir: &Utf8Path) -> anyhow::Result<Vec<Suite>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk suite dir {dir}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|p| anyhow::anyhow!("non-UTF-8 suite path: {}", p.display()))?;
        if path.extension() == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();
    tracing::debug!(dir = %dir, count = paths.len(), "discovered suites");

    paths.iter().map(|p| load_suite_file(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_nested_toml_in_sorted_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(tmp.path()).unwrap();
        fs::create_dir_all(root.join("roles/swarm")).unwrap();
        fs::write(root.join("b.toml"), "name = \"b\"\n").unwrap();
        fs::write(root.join("a.toml"), "name = \"a\"\n").unwrap();
        fs::write(root.join("roles/swarm/c.toml"), "name = \"c\"\n").unwrap();
        fs::write(root.join("README.md"), "not a suite").unwrap();

        let suites = discover_suites(root).unwrap();
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn broken_suite_names_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(tmp.path()).unwrap();
        fs::write(root.join("broken.toml"), "name = ").unwrap();

        let err = discover_suites(root).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn bundled_role_suites_load() {
        use hostguard_domain::model::{ExitExpectation, OutputMatcher, Predicate};

        let dir = Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("../../suites");
        let suites = discover_suites(&dir).unwrap();
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "common",
                "docker-manager",
                "docker-swarm-init",
                "docker-swarm-manager",
                "docker-swarm-worker",
                "docker-worker",
                "docker",
                "integration",
                "python-requirements",
            ]
        );
        assert!(suites.iter().all(|s| !s.checks.is_empty()));

        let checks: Vec<_> = suites.iter().flat_map(|s| &s.checks).collect();
        let matchers: Vec<&OutputMatcher> = checks
            .iter()
            .filter_map(|c| match &c.predicate {
                Predicate::CommandResult { stdout, .. } => Some(stdout),
                _ => None,
            })
            .flatten()
            .collect();
        assert!(matchers.iter().any(|m| matches!(m, OutputMatcher::OneOf(_))));
        assert!(matchers.iter().any(|m| matches!(m, OutputMatcher::ContainsAny(_))));
        assert!(checks.iter().any(|c| matches!(
            c.predicate,
            Predicate::CommandResult {
                exit_code: ExitExpectation::NonZero,
                ..
            }
        )));

        let worker = suites.iter().find(|s| s.name == "docker-worker").unwrap();
        let gated = |fragment: &str| {
            worker
                .checks
                .iter()
                .filter(|c| c.applies_to(&format!("swarm-{fragment}-1")))
                .count()
        };
        assert_eq!(gated("worker"), 6);
        assert_eq!(gated("manager"), 2);
    }
}
