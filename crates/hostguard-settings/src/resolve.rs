use crate::{model::HostguardConfigV1, presets};
use anyhow::Context;
use hostguard_domain::policy::{CheckPolicy, EffectiveConfig, FailOn, ServiceFallback};
use hostguard_types::{Severity, ids};

/// Command-line values; these win over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    /// `--serial` forces sequential host evaluation.
    pub serial: bool,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: HostguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile).with_context(|| {
        format!(
            "unknown profile: {profile} (expected {})",
            presets::PROFILES.join("|")
        )
    })?;

    if let Some(fail_on_s) = cfg.fail_on.as_deref() {
        effective.fail_on = parse_fail_on(fail_on_s)?;
    }
    if let Some(fallback_s) = cfg.service_fallback.as_deref() {
        effective.service_fallback = parse_service_fallback(fallback_s)?;
    }
    if let Some(parallel) = cfg.parallel {
        effective.parallel = parallel;
    }
    if overrides.serial {
        effective.parallel = false;
    }
    if let Some(max) = cfg.max_output_bytes {
        effective.max_output_bytes = max as usize;
    }

    // per-check overrides
    for (check_id, cc) in cfg.checks.iter() {
        if !ids::ALL_CHECK_IDS.contains(&check_id.as_str()) {
            anyhow::bail!("unknown check id in [checks]: {check_id}");
        }
        let entry = effective
            .checks
            .entry(check_id.clone())
            .or_insert_with(CheckPolicy::disabled);

        if let Some(enabled) = cc.enabled {
            entry.enabled = enabled;
        }
        if let Some(sev) = cc.severity.as_deref() {
            entry.severity =
                parse_severity(sev).with_context(|| format!("invalid severity for {check_id}"))?;
        }
    }

    Ok(ResolvedConfig { effective })
}

pub fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    match v {
        "info" => Ok(Severity::Info),
        "warning" | "warn" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        other => anyhow::bail!("unknown severity: {other} (expected info|warning|error)"),
    }
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning)"),
    }
}

fn parse_service_fallback(v: &str) -> anyhow::Result<ServiceFallback> {
    match v {
        "strict" => Ok(ServiceFallback::Strict),
        "degrade" => Ok(ServiceFallback::Degrade),
        other => anyhow::bail!("unknown service_fallback: {other} (expected strict|degrade)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    fn resolve(toml: &str, overrides: Overrides) -> anyhow::Result<EffectiveConfig> {
        let cfg = parse_config_toml(toml)?;
        Ok(resolve_config(cfg, overrides)?.effective)
    }

    #[test]
    fn empty_config_resolves_to_strict() {
        let cfg = resolve("", Overrides::default()).unwrap();
        assert_eq!(cfg.profile, "strict");
        assert_eq!(cfg.fail_on, FailOn::Error);
        assert_eq!(cfg.service_fallback, ServiceFallback::Strict);
        assert!(cfg.parallel);
        assert_eq!(cfg.max_output_bytes, 4096);
    }

    #[test]
    fn cli_profile_wins_over_file_profile() {
        let cfg = resolve(
            r#"profile = "warn""#,
            Overrides {
                profile: Some("container".to_string()),
                serial: false,
            },
        )
        .unwrap();
        assert_eq!(cfg.profile, "container");
        assert_eq!(cfg.service_fallback, ServiceFallback::Degrade);
    }

    #[test]
    fn file_values_win_over_preset() {
        let cfg = resolve(
            r#"
profile = "container"
fail_on = "warning"
service_fallback = "strict"
parallel = false
max_output_bytes = 128

[checks."host.command_result"]
severity = "warning"

[checks."host.socket_listening"]
enabled = false
"#,
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(cfg.fail_on, FailOn::Warning);
        assert_eq!(cfg.service_fallback, ServiceFallback::Strict);
        assert!(!cfg.parallel);
        assert_eq!(cfg.max_output_bytes, 128);
        assert_eq!(
            cfg.check_policy(ids::CHECK_COMMAND_RESULT).unwrap().severity,
            Severity::Warning
        );
        assert!(cfg.check_policy(ids::CHECK_SOCKET_LISTENING).is_none());
    }

    #[test]
    fn serial_override_disables_parallelism() {
        let cfg = resolve(
            "parallel = true",
            Overrides {
                profile: None,
                serial: true,
            },
        )
        .unwrap();
        assert!(!cfg.parallel);
    }

    #[test]
    fn invalid_values_are_errors() {
        for bad in [
            r#"profile = "lenient""#,
            r#"fail_on = "never""#,
            r#"service_fallback = "guess""#,
            "[checks.\"host.package_installed\"]\nseverity = \"fatal\"",
            "[checks.\"host.kernel_module\"]\nenabled = true",
            "colour = true",
        ] {
            assert!(resolve(bad, Overrides::default()).is_err(), "accepted: {bad}");
        }
    }
}
