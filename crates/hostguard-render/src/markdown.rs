use crate::{RenderableReport, RenderableSeverity, RenderableVerdictStatus};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Hostguard report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    out.push_str(&format!(
        "- Verdict: **{}**\n- Checks: {} evaluated / {} failed\n- Profile: {} (service fallback: {})\n",
        verdict,
        report.data.checks_total,
        report.data.checks_failed,
        report.data.profile,
        report.data.service_fallback
    ));
    if !report.data.reasons.is_empty() {
        out.push_str(&format!("- Reasons: {}\n", report.data.reasons.join(", ")));
    }
    out.push('\n');

    if !report.hosts.is_empty() {
        out.push_str("| Host | Passed | Failed | Skipped |\n");
        out.push_str("|---|---:|---:|---:|\n");
        for h in &report.hosts {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                h.name, h.passed, h.failed, h.skipped
            ));
        }
        out.push('\n');
    }

    if report.failures.is_empty() {
        out.push_str("No failures.\n");
    } else {
        out.push_str("## Failures\n\n");
        for f in &report.failures {
            let sev = match f.severity {
                RenderableSeverity::Info => "INFO",
                RenderableSeverity::Warning => "WARN",
                RenderableSeverity::Error => "ERROR",
            };
            let kind = if f.transport { " (transport)" } else { "" };
            out.push_str(&format!(
                "- [{}] `{}` {} / {} `{}`{}: {}\n",
                sev, f.host, f.suite, f.check, f.code, kind, f.message
            ));
        }
    }

    if !report.degraded.is_empty() {
        out.push_str("\n## Degraded checks\n\n");
        for d in &report.degraded {
            out.push_str(&format!("- `{}` {}: {}\n", d.host, d.check, d.note));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderableData, RenderableDegraded, RenderableFailure, RenderableHost};

    fn data() -> RenderableData {
        RenderableData {
            profile: "container".to_string(),
            service_fallback: "degrade".to_string(),
            checks_total: 3,
            checks_failed: 1,
            reasons: vec!["check_failures".to_string()],
        }
    }

    #[test]
    fn renders_passing_report() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Pass,
            hosts: Vec::new(),
            failures: Vec::new(),
            degraded: Vec::new(),
            data: RenderableData {
                checks_failed: 0,
                reasons: Vec::new(),
                ..data()
            },
        };
        let md = render_markdown(&report);
        assert!(md.contains("Verdict: **PASS**"));
        assert!(md.contains("No failures"));
        assert!(!md.contains("Reasons"));
    }

    #[test]
    fn renders_hosts_failures_and_degraded_notes() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            hosts: vec![
                RenderableHost {
                    name: "manager-1".to_string(),
                    passed: 2,
                    failed: 0,
                    skipped: 0,
                },
                RenderableHost {
                    name: "worker-1".to_string(),
                    passed: 0,
                    failed: 1,
                    skipped: 1,
                },
            ],
            failures: vec![RenderableFailure {
                host: "worker-1".to_string(),
                suite: "docker".to_string(),
                check: "docker_installed".to_string(),
                check_id: "host.package_installed".to_string(),
                code: "transport_failure".to_string(),
                severity: RenderableSeverity::Error,
                transport: true,
                message: "connection to worker-1 failed".to_string(),
            }],
            degraded: vec![RenderableDegraded {
                host: "manager-1".to_string(),
                check: "docker_enabled".to_string(),
                note: "enabled checked as systemctl binary present".to_string(),
            }],
            data: data(),
        };

        let md = render_markdown(&report);
        assert!(md.contains("Verdict: **FAIL**"));
        assert!(md.contains("Profile: container (service fallback: degrade)"));
        assert!(md.contains("Reasons: check_failures"));
        assert!(md.contains("| worker-1 | 0 | 1 | 1 |"));
        assert!(md.contains("## Failures"));
        assert!(md.contains("[ERROR] `worker-1` docker / docker_installed `transport_failure` (transport)"));
        assert!(md.contains("## Degraded checks"));
        assert!(md.contains("systemctl binary present"));
    }
}
