use crate::{RenderableReport, RenderableSeverity};

/// Render failures as GitHub Actions workflow command annotations.
///
/// Format:
/// `::{level} title={title}::{message}`
pub fn render_github_annotations(report: &RenderableReport) -> Vec<String> {
    let mut out = Vec::new();

    for f in &report.failures {
        let level = match f.severity {
            RenderableSeverity::Error => "error",
            RenderableSeverity::Warning => "warning",
            RenderableSeverity::Info => "notice",
        };

        let title = escape_property(&format!("hostguard {}:{}", f.check_id, f.code));
        let message = escape_data(&format!(
            "[{} / {} / {}] {}",
            f.host, f.suite, f.check, f.message
        ));

        out.push(format!("::{level} title={title}::{message}"));
    }

    out
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderableData, RenderableFailure, RenderableVerdictStatus};

    fn failure(severity: RenderableSeverity, message: &str) -> RenderableFailure {
        RenderableFailure {
            host: "worker-1".to_string(),
            suite: "swarm".to_string(),
            check: "manager_port".to_string(),
            check_id: "host.socket_listening".to_string(),
            code: "not_listening".to_string(),
            severity,
            transport: false,
            message: message.to_string(),
        }
    }

    fn report(failures: Vec<RenderableFailure>) -> RenderableReport {
        RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            hosts: Vec::new(),
            failures,
            degraded: Vec::new(),
            data: RenderableData {
                profile: "strict".to_string(),
                service_fallback: "strict".to_string(),
                checks_total: 1,
                checks_failed: 1,
                reasons: Vec::new(),
            },
        }
    }

    #[test]
    fn maps_severity_to_level_and_escapes() {
        let lines = render_github_annotations(&report(vec![
            failure(RenderableSeverity::Error, "tcp://0.0.0.0:2377 is not listening"),
            failure(RenderableSeverity::Info, "100% bad\nsecond line"),
        ]));

        assert_eq!(
            lines[0],
            "::error title=hostguard host.socket_listening%3Anot_listening::[worker-1 / swarm / manager_port] tcp://0.0.0.0:2377 is not listening"
        );
        assert!(lines[1].starts_with("::notice "));
        assert!(lines[1].ends_with("100%25 bad%0Asecond line"));
    }

    #[test]
    fn no_failures_no_annotations() {
        assert!(render_github_annotations(&report(Vec::new())).is_empty());
    }
}
