use crate::check::tool_meta;
use anyhow::Context;
use hostguard_render::{
    RenderableData, RenderableDegraded, RenderableFailure, RenderableHost, RenderableReport,
    RenderableSeverity, RenderableVerdictStatus,
};
use hostguard_types::{
    CheckResult, CheckStatus, FailureKind, HostguardData, HostguardReport, ReportEnvelope,
    RunMeta, SCHEMA_REPORT_V1, Severity, Verdict, VerdictCounts, VerdictSummary, ids,
};
use time::OffsetDateTime;

pub fn parse_report_json(text: &str) -> anyhow::Result<HostguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;
    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema:?} (expected {SCHEMA_REPORT_V1})");
    }
    serde_json::from_value(value).context("parse hostguard report")
}

pub fn serialize_report(report: &HostguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn to_renderable(report: &HostguardReport) -> RenderableReport {
    RenderableReport {
        verdict: match report.verdict.status {
            Verdict::Pass => RenderableVerdictStatus::Pass,
            Verdict::Warn => RenderableVerdictStatus::Warn,
            Verdict::Fail => RenderableVerdictStatus::Fail,
        },
        hosts: host_tallies(report),
        failures: report
            .results
            .iter()
            .filter(|r| r.is_failure())
            .map(renderable_failure)
            .collect(),
        degraded: report
            .results
            .iter()
            .filter_map(|r| {
                r.degraded.as_ref().map(|note| RenderableDegraded {
                    host: r.host.clone(),
                    check: r.check.clone(),
                    note: note.clone(),
                })
            })
            .collect(),
        data: RenderableData {
            profile: report.data.profile.clone(),
            service_fallback: report.data.service_fallback.clone(),
            checks_total: report.data.checks_total,
            checks_failed: report.data.checks_failed,
            reasons: report.verdict.reasons.clone(),
        },
    }
}

/// Per-host counts in the order hosts first appear in the results.
fn host_tallies(report: &HostguardReport) -> Vec<RenderableHost> {
    let mut hosts: Vec<RenderableHost> = Vec::new();
    for r in &report.results {
        let idx = match hosts.iter().position(|h| h.name == r.host) {
            Some(idx) => idx,
            None => {
                hosts.push(RenderableHost {
                    name: r.host.clone(),
                    passed: 0,
                    failed: 0,
                    skipped: 0,
                });
                hosts.len() - 1
            }
        };
        let h = &mut hosts[idx];
        match r.status {
            CheckStatus::Pass => h.passed += 1,
            CheckStatus::Fail => h.failed += 1,
            CheckStatus::Skip => h.skipped += 1,
        }
    }
    hosts
}

fn renderable_failure(r: &CheckResult) -> RenderableFailure {
    RenderableFailure {
        host: r.host.clone(),
        suite: r.suite.clone(),
        check: r.check.clone(),
        check_id: r.check_id.clone(),
        code: r.code.clone().unwrap_or_default(),
        severity: match r.severity {
            Severity::Info => RenderableSeverity::Info,
            Severity::Warning => RenderableSeverity::Warning,
            Severity::Error => RenderableSeverity::Error,
        },
        transport: r.failure_kind == Some(FailureKind::Transport),
        message: r.message.clone(),
    }
}

/// A report carrying a single `tool.runtime` failure, written when the run itself failed.
pub fn runtime_error_report(message: &str) -> HostguardReport {
    let now = OffsetDateTime::now_utc();
    let results = vec![CheckResult {
        host: String::new(),
        suite: String::new(),
        check: "runtime".to_string(),
        check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
        status: CheckStatus::Fail,
        severity: Severity::Error,
        code: Some(ids::CODE_RUNTIME_ERROR.to_string()),
        failure_kind: None,
        message: message.to_string(),
        degraded: None,
        fingerprint: None,
        data: serde_json::Value::Null,
    }];

    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at: now,
            ended_at: Some(now),
            duration_ms: Some(0),
        },
        verdict: VerdictSummary {
            status: Verdict::Fail,
            counts: VerdictCounts::from_results(&results),
            reasons: vec!["tool_error".to_string()],
        },
        results,
        data: HostguardData {
            profile: "unknown".to_string(),
            checks_total: 1,
            checks_failed: 1,
            ..HostguardData::default()
        },
    }
}
