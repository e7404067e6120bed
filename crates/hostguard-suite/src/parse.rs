use anyhow::Context;
use hostguard_domain::model::{Check, Predicate, Suite};
use hostguard_domain::policy::ServiceFallback;
use hostguard_types::Severity;
use serde::Deserialize;
use std::collections::BTreeSet;

const DEFAULT_GROUP: &str = "all";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFile {
    name: String,
    #[serde(default)]
    hosts: Option<String>,
    #[serde(default, rename = "check")]
    checks: Vec<CheckSpec>,
}

// Unknown keys are rejected by the flattened `Predicate`, which sees every
// key not named here.
#[derive(Debug, Deserialize)]
struct CheckSpec {
    name: String,
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(default)]
    fallback: Option<ServiceFallback>,
    #[serde(default)]
    only_hosts: Vec<String>,
    #[serde(flatten)]
    predicate: Predicate,
}

/// Parse and validate one suite.
///
/// `origin` names the source (usually the file path) in error messages.
pub fn parse_suite_toml(input: &str, origin: &str) -> anyhow::Result<Suite> {
    let raw: SuiteFile =
        toml::from_str(input).with_context(|| format!("parse suite {origin}"))?;

    if raw.name.trim().is_empty() {
        anyhow::bail!("suite {origin}: name must not be empty");
    }
    let group = raw
        .hosts
        .unwrap_or_else(|| DEFAULT_GROUP.to_string());
    if group.trim().is_empty() {
        anyhow::bail!("suite {origin}: hosts must not be empty");
    }

    let mut seen = BTreeSet::new();
    let mut checks = Vec::with_capacity(raw.checks.len());
    for spec in raw.checks {
        if spec.name.trim().is_empty() {
            anyhow::bail!("suite {origin}: check name must not be empty");
        }
        if !seen.insert(spec.name.clone()) {
            anyhow::bail!("suite {origin}: duplicate check name `{}`", spec.name);
        }
        spec.predicate
            .validate()
            .with_context(|| format!("suite {origin}: check `{}`", spec.name))?;

        checks.push(Check {
            name: spec.name,
            predicate: spec.predicate,
            severity: spec.severity,
            fallback: spec.fallback,
            only_hosts: spec.only_hosts,
        });
    }

    Ok(Suite {
        name: raw.name,
        group,
        checks,
    })
}
