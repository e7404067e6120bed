use hostguard_domain::policy::{CheckPolicy, EffectiveConfig, FailOn, ServiceFallback};
use hostguard_types::{Severity, ids};
use std::collections::BTreeMap;

pub const PROFILES: &[&str] = &["strict", "container", "warn"];

const DEFAULT_MAX_OUTPUT_BYTES: usize = 4096;

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything else belongs in `hostguard.toml`.
pub fn preset(profile: &str) -> Option<EffectiveConfig> {
    match profile {
        "strict" => Some(strict_profile()),
        "container" => Some(container_profile()),
        "warn" => Some(warn_profile()),
        _ => None,
    }
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        fail_on: FailOn::Error,
        service_fallback: ServiceFallback::Strict,
        parallel: true,
        max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        checks: default_checks(Severity::Error),
    }
}

/// Containers rarely run a full init system, so missing unit files degrade.
fn container_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "container".to_string(),
        service_fallback: ServiceFallback::Degrade,
        ..strict_profile()
    }
}

fn warn_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "warn".to_string(),
        fail_on: FailOn::Warning,
        service_fallback: ServiceFallback::Strict,
        parallel: true,
        max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        checks: default_checks(Severity::Warning),
    }
}

fn default_checks(default_severity: Severity) -> BTreeMap<String, CheckPolicy> {
    ids::ALL_CHECK_IDS
        .iter()
        .map(|id| (id.to_string(), CheckPolicy::enabled(default_severity)))
        .collect()
}
