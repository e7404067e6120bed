use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// Stable schema identifier for hostguard reports.
pub const SCHEMA_REPORT_V1: &str = "hostguard.report.v1";

/// Severity is intentionally small: it maps cleanly to CI signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

/// Why a failed check failed: the expectation was false, or the host could not be queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Assertion,
    Transport,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

/// One named check evaluated on one host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CheckResult {
    pub host: String,
    pub suite: String,
    /// Author-given check name, unique within its suite.
    pub check: String,
    /// Predicate kind, e.g. `host.package_installed`.
    pub check_id: String,
    pub status: CheckStatus,
    pub severity: Severity,

    /// Failure code (fail) or skip reason (skip). Absent on pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,

    pub message: String,

    /// Set when a degraded-capability fallback answered part of the check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,

    /// Stable identifier intended for dedup and trending:
    /// a hash of `host + suite + check + code`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Check-specific structured payload (expected vs. observed values).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: JsonValue,
}

impl CheckResult {
    pub fn is_failure(&self) -> bool {
        self.status == CheckStatus::Fail
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerdictCounts {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    /// Passed or failed results answered through a capability fallback.
    pub degraded: u32,
    /// Failed results whose cause was a transport failure.
    pub transport_failures: u32,
}

impl VerdictCounts {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut counts = VerdictCounts::default();
        for r in results {
            match r.status {
                CheckStatus::Pass => counts.passed += 1,
                CheckStatus::Fail => counts.failed += 1,
                CheckStatus::Skip => counts.skipped += 1,
            }
            if r.degraded.is_some() {
                counts.degraded += 1;
            }
            if r.failure_kind == Some(FailureKind::Transport) {
                counts.transport_failures += 1;
            }
        }
        counts
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerdictSummary {
    pub status: Verdict,
    pub counts: VerdictCounts,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunMeta {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "Option<String>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Hostguard-specific summary payload for the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct HostguardData {
    pub profile: String,
    /// Effective default for the service enablement fallback (`strict` or `degrade`).
    pub service_fallback: String,

    /// Inventory groups targeted by the suites, in first-seen order.
    pub groups: Vec<String>,
    /// Host names checked, in inventory order.
    pub hosts: Vec<String>,
    pub suites: Vec<String>,

    pub checks_total: u32,
    pub checks_failed: u32,
}

/// A generic report envelope.
///
/// Keeping this generic allows hostguard to embed tool-specific data while still enforcing a
/// stable outer shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = HostguardData> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    pub run: RunMeta,
    pub verdict: VerdictSummary,
    pub results: Vec<CheckResult>,
    pub data: TData,
}

pub type HostguardReport = ReportEnvelope<HostguardData>;
