//! The `check` use case: evaluate suites against inventory hosts and produce a report.

use crate::plan::{self, HostPlan};
use anyhow::Context;
use hostguard_domain::model::Suite;
use hostguard_domain::policy::EffectiveConfig;
use hostguard_domain::report::{DomainReport, RunScope};
use hostguard_settings::{Overrides, ResolvedConfig};
use hostguard_target::{Connection, ShellTarget};
use hostguard_types::{
    CheckResult, HostguardReport, ReportEnvelope, RunMeta, SCHEMA_REPORT_V1, ToolMeta, Verdict,
};
use rayon::prelude::*;
use time::OffsetDateTime;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// Inventory YAML; `None` targets the local machine only.
    pub inventory_text: Option<&'a str>,
    /// Loaded and validated suites, in run order.
    pub suites: Vec<Suite>,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Replaces every suite's target group.
    pub group: Option<String>,
    /// Host-name glob filter.
    pub limit: Option<String>,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    /// The generated report.
    pub report: HostguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the check use case: resolve config and hosts, evaluate every suite, produce a report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        hostguard_settings::HostguardConfigV1::default()
    } else {
        hostguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved = hostguard_settings::resolve_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let inventory = plan::load_inventory(input.inventory_text)?;
    let limit = plan::parse_limit(input.limit.as_deref())?;
    let run_plan = plan::build_plan(
        &inventory,
        &input.suites,
        input.group.as_deref(),
        limit.as_ref(),
    )?;
    if run_plan.hosts.is_empty() {
        tracing::warn!("no hosts matched; nothing to check");
    }

    // Build every connection up front so a bad inventory entry fails the run, not a check.
    let targets = run_plan
        .hosts
        .iter()
        .map(|plan| {
            let connection = Connection::from_host(&plan.host)?;
            tracing::debug!(host = %plan.host.name, %connection, "resolved connection");
            Ok((ShellTarget::new(plan.host.name.clone(), connection), plan))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cfg = &resolved.effective;
    let suites = &input.suites;
    let per_host: Vec<Vec<CheckResult>> = if cfg.parallel {
        targets
            .par_iter()
            .map(|(target, plan)| evaluate_host(target, plan, suites, cfg))
            .collect()
    } else {
        targets
            .iter()
            .map(|(target, plan)| evaluate_host(target, plan, suites, cfg))
            .collect()
    };

    let scope = RunScope {
        groups: run_plan.groups.clone(),
        hosts: run_plan.hosts.iter().map(|h| h.host.name.clone()).collect(),
        suites: input.suites.iter().map(|s| s.name.clone()).collect(),
    };
    let DomainReport {
        verdict,
        results,
        data,
    } = hostguard_domain::aggregate(per_host.into_iter().flatten().collect(), cfg, scope);

    let ended_at = OffsetDateTime::now_utc();
    let duration_ms = (ended_at - started_at).whole_milliseconds().max(0) as u64;

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at,
            ended_at: Some(ended_at),
            duration_ms: Some(duration_ms),
        },
        verdict,
        results,
        data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

fn evaluate_host(
    target: &ShellTarget,
    plan: &HostPlan,
    suites: &[Suite],
    cfg: &EffectiveConfig,
) -> Vec<CheckResult> {
    let mut results = Vec::new();
    for idx in &plan.suites {
        results.extend(hostguard_domain::evaluate_suite(&suites[*idx], target, cfg));
    }
    let failed = results.iter().filter(|r| r.is_failure()).count();
    tracing::info!(host = %plan.host.name, checks = results.len(), failed, "host done");
    results
}

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "hostguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}
