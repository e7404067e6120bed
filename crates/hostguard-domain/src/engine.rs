use crate::checks::{self, EvalContext};
use crate::fingerprint::fingerprint_for_result;
use crate::model::{Check, Suite};
use crate::outcome::Outcome;
use crate::policy::{EffectiveConfig, FailOn};
use crate::report::{DomainReport, RunScope};
use crate::target::Target;
use hostguard_types::{
    CheckResult, CheckStatus, FailureKind, HostguardData, Severity, Verdict, VerdictCounts,
    VerdictSummary, ids,
};
use serde_json::Value;

/// Evaluate every check of `suite` against one host, in suite order.
///
/// Never stops early: a failing or unreachable check does not prevent the next one.
pub fn evaluate_suite(suite: &Suite, target: &dyn Target, cfg: &EffectiveConfig) -> Vec<CheckResult> {
    let span = tracing::debug_span!("suite", host = target.name(), suite = %suite.name);
    let _enter = span.enter();

    let mut results = Vec::with_capacity(suite.checks.len());
    for check in &suite.checks {
        results.push(evaluate_check(suite, check, target, cfg));
    }

    let failed = results.iter().filter(|r| r.is_failure()).count();
    tracing::info!(
        host = target.name(),
        suite = %suite.name,
        total = results.len(),
        failed,
        "suite evaluated"
    );
    results
}

fn evaluate_check(
    suite: &Suite,
    check: &Check,
    target: &dyn Target,
    cfg: &EffectiveConfig,
) -> CheckResult {
    let check_id = check.predicate.check_id();
    let host = target.name();

    let Some(policy) = cfg.check_policy(check_id) else {
        tracing::debug!(host, check = %check.name, check_id, "check disabled");
        return skipped(
            suite,
            check,
            host,
            Severity::Info,
            ids::REASON_CHECK_DISABLED,
            format!("{check_id} is disabled by configuration"),
        );
    };
    let severity = check.severity.unwrap_or(policy.severity);

    if !check.applies_to(host) {
        tracing::debug!(host, check = %check.name, "host filtered out");
        return skipped(
            suite,
            check,
            host,
            severity,
            ids::REASON_HOST_FILTERED,
            format!("host does not match only_hosts {:?}", check.only_hosts),
        );
    }

    let ctx = EvalContext {
        check: &check.name,
        fallback: check.fallback.unwrap_or(cfg.service_fallback),
        max_output_bytes: cfg.max_output_bytes,
    };
    let outcome = checks::evaluate(&check.predicate, target, &ctx);
    tracing::debug!(
        host,
        check = %check.name,
        check_id,
        passed = outcome.is_pass(),
        "check evaluated"
    );

    let (status, code, failure_kind, fingerprint) = match &outcome {
        Outcome::Pass { .. } => (CheckStatus::Pass, None, None, None),
        Outcome::Fail { kind, code, .. } => (
            CheckStatus::Fail,
            Some(code.to_string()),
            Some(*kind),
            Some(fingerprint_for_result(host, &suite.name, &check.name, code)),
        ),
    };

    CheckResult {
        host: host.to_string(),
        suite: suite.name.clone(),
        check: check.name.clone(),
        check_id: check_id.to_string(),
        status,
        severity,
        code,
        failure_kind,
        message: outcome.message().to_string(),
        degraded: outcome.degraded().map(str::to_string),
        fingerprint,
        data: outcome.data().clone(),
    }
}

fn skipped(
    suite: &Suite,
    check: &Check,
    host: &str,
    severity: Severity,
    reason: &str,
    message: String,
) -> CheckResult {
    CheckResult {
        host: host.to_string(),
        suite: suite.name.clone(),
        check: check.name.clone(),
        check_id: check.predicate.check_id().to_string(),
        status: CheckStatus::Skip,
        severity,
        code: Some(reason.to_string()),
        failure_kind: None,
        message,
        degraded: None,
        fingerprint: None,
        data: Value::Null,
    }
}

/// Roll per-check results up into a verdict.
///
/// Error-severity failures fail the run. Warning-severity failures warn, or fail
/// under `fail_on = warning`. Info failures are reported but never change the verdict.
pub fn compute_verdict(results: &[CheckResult], fail_on: FailOn) -> VerdictSummary {
    let counts = VerdictCounts::from_results(results);
    let failures = || results.iter().filter(|r| r.is_failure());

    let status = if failures().any(|r| r.severity == Severity::Error) {
        Verdict::Fail
    } else if failures().any(|r| r.severity == Severity::Warning) {
        match fail_on {
            FailOn::Warning => Verdict::Fail,
            FailOn::Error => Verdict::Warn,
        }
    } else {
        Verdict::Pass
    };

    let mut reasons = Vec::new();
    if failures().any(|r| r.failure_kind == Some(FailureKind::Assertion)) {
        reasons.push("check_failures".to_string());
    }
    if counts.transport_failures > 0 {
        reasons.push("transport_failures".to_string());
    }
    if counts.degraded > 0 {
        reasons.push("degraded_fallbacks".to_string());
    }
    if counts.passed + counts.failed == 0 {
        reasons.push("no_checks_evaluated".to_string());
    }

    VerdictSummary {
        status,
        counts,
        reasons,
    }
}

fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Build the domain report from results already in report order.
pub fn aggregate(results: Vec<CheckResult>, cfg: &EffectiveConfig, scope: RunScope) -> DomainReport {
    let verdict = compute_verdict(&results, cfg.fail_on);
    let data = HostguardData {
        profile: cfg.profile.clone(),
        service_fallback: cfg.service_fallback.to_string(),
        groups: scope.groups,
        hosts: scope.hosts,
        suites: scope.suites,
        checks_total: saturating_count(results.len()),
        checks_failed: verdict.counts.failed,
    };

    DomainReport {
        verdict,
        results,
        data,
    }
}
