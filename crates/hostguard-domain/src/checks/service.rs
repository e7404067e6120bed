use super::EvalContext;
use crate::outcome::Outcome;
use crate::policy::ServiceFallback;
use crate::target::{Target, TransportError};
use hostguard_types::ids;
use serde_json::json;

const FALLBACK_BINARY: &str = "systemctl";

pub fn run(
    target: &dyn Target,
    ctx: &EvalContext<'_>,
    service: &str,
    running: Option<bool>,
    enabled: Option<bool>,
) -> Result<Outcome, TransportError> {
    let status = target.service(service)?;

    let mut enabled_observed = status.enabled;
    let mut degraded = None;
    if enabled == Some(true) && !status.unit_present && ctx.fallback == ServiceFallback::Degrade {
        enabled_observed = target.binary_exists(FALLBACK_BINARY)?;
        tracing::warn!(
            host = target.name(),
            check = ctx.check,
            service,
            capability = FALLBACK_BINARY,
            "no unit file; enabled state answered by binary presence"
        );
        degraded = Some(format!(
            "no unit file for '{service}'; enabled checked as `{FALLBACK_BINARY}` binary present"
        ));
    }

    // Order matters: running is reported before enabled.
    let mut mismatches: Vec<(&'static str, String)> = Vec::new();
    if let Some(expected) = running
        && expected != status.running
    {
        mismatches.push((
            ids::CODE_RUNNING_MISMATCH,
            format!("expected running={expected}, observed running={}", status.running),
        ));
    }
    if let Some(expected) = enabled
        && expected != enabled_observed
    {
        mismatches.push((
            ids::CODE_ENABLED_MISMATCH,
            format!("expected enabled={expected}, observed enabled={enabled_observed}"),
        ));
    }

    let data = json!({
        "service": service,
        "expected": { "running": running, "enabled": enabled },
        "observed": {
            "running": status.running,
            "enabled": enabled_observed,
            "unit_present": status.unit_present,
        },
    });

    let outcome = match mismatches.first() {
        None => Outcome::pass(format!("service '{service}' is in the expected state")),
        Some((code, _)) => {
            let details: Vec<&str> = mismatches.iter().map(|(_, m)| m.as_str()).collect();
            Outcome::fail(*code, format!("service '{service}': {}", details.join("; ")))
        }
    };
    Ok(outcome.with_data(data).with_degraded(degraded))
}
