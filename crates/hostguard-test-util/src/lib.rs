//! Shared test utilities for the hostguard workspace.
//!
//! `xtask` and the CLI integration tests both compare emitted reports, so the
//! normalization lives in a regular crate rather than a `#[cfg(test)]` module.

#![forbid(unsafe_code)]

use serde_json::Value;

const TIMESTAMP: &str = "__TIMESTAMP__";
const VERSION: &str = "__VERSION__";

/// Normalize non-deterministic report fields for golden comparison.
///
/// `tool.version` is replaced only on a root report envelope (an object with
/// `schema`, `tool`, `run`, `verdict` and `results`), so check payloads that
/// happen to carry a `tool` object are left alone. Run timing (`started_at`,
/// `ended_at`, `duration_ms`) is normalized inside the root `run` object only.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    let Some(obj) = value.as_object_mut() else {
        return value;
    };
    let is_envelope = ["schema", "tool", "run", "verdict", "results"]
        .iter()
        .all(|key| obj.contains_key(*key));
    if !is_envelope {
        return value;
    }

    if let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
        && tool.contains_key("version")
    {
        tool.insert("version".to_string(), Value::String(VERSION.to_string()));
    }

    if let Some(run) = obj.get_mut("run").and_then(Value::as_object_mut) {
        for key in ["started_at", "ended_at"] {
            if run.contains_key(key) {
                run.insert(key.to_string(), Value::String(TIMESTAMP.to_string()));
            }
        }
        if run.contains_key("duration_ms") {
            run.insert("duration_ms".to_string(), Value::Number(0.into()));
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_envelope_run_and_version() {
        let input = json!({
            "schema": "hostguard.report.v1",
            "tool": { "name": "hostguard", "version": "0.1.0" },
            "run": {
                "started_at": "2026-01-01T00:00:00Z",
                "ended_at": "2026-01-01T00:00:03Z",
                "duration_ms": 3000
            },
            "verdict": { "status": "pass" },
            "results": []
        });

        let result = normalize_nondeterministic(input);

        assert_eq!(result["tool"]["version"], VERSION);
        assert_eq!(result["tool"]["name"], "hostguard");
        assert_eq!(result["run"]["started_at"], TIMESTAMP);
        assert_eq!(result["run"]["ended_at"], TIMESTAMP);
        assert_eq!(result["run"]["duration_ms"], 0);
    }

    #[test]
    fn leaves_check_payloads_alone() {
        let input = json!({
            "schema": "hostguard.report.v1",
            "tool": { "name": "hostguard", "version": "0.1.0" },
            "run": { "started_at": "2026-01-01T00:00:00Z" },
            "verdict": { "status": "fail" },
            "results": [
                {
                    "data": {
                        "stdout": "started_at=yesterday",
                        "tool": { "name": "docker", "version": "24.0.7" },
                        "duration_ms": 12
                    }
                }
            ]
        });

        let result = normalize_nondeterministic(input);

        let data = &result["results"][0]["data"];
        assert_eq!(data["tool"]["version"], "24.0.7");
        assert_eq!(data["duration_ms"], 12);
        assert!(result["run"].get("ended_at").is_none());
    }

    #[test]
    fn non_envelope_is_unchanged() {
        let input = json!({ "tool": { "version": "1" }, "run": { "started_at": "x" } });
        assert_eq!(normalize_nondeterministic(input.clone()), input);
    }
}
