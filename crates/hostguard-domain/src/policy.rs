use hostguard_types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    Error,
    Warning,
}

/// What a `service_state` check does when the service has no unit file.
///
/// `Strict` treats a missing unit as "not enabled". `Degrade` answers an
/// `enabled = true` expectation with "the systemctl binary exists" and marks the
/// result as degraded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceFallback {
    Strict,
    Degrade,
}

impl ServiceFallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceFallback::Strict => "strict",
            ServiceFallback::Degrade => "degrade",
        }
    }
}

impl fmt::Display for ServiceFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct CheckPolicy {
    pub enabled: bool,
    pub severity: Severity,
}

impl CheckPolicy {
    pub fn enabled(severity: Severity) -> Self {
        Self {
            enabled: true,
            severity,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            severity: Severity::Info,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,
    pub fail_on: FailOn,
    pub service_fallback: ServiceFallback,
    /// Evaluate different hosts concurrently.
    pub parallel: bool,
    /// Cap on captured stdout/stderr copied into result messages and data.
    pub max_output_bytes: usize,
    /// Keyed by check id (`host.package_installed`, ...).
    pub checks: BTreeMap<String, CheckPolicy>,
}

impl EffectiveConfig {
    pub fn check_policy(&self, check_id: &str) -> Option<&CheckPolicy> {
        self.checks.get(check_id).filter(|p| p.enabled)
    }
}
