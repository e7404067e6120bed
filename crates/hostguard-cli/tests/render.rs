//! `md`, `annotations`, `hosts` and `explain` subcommands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn hostguard_cmd() -> Command {
    Command::cargo_bin("hostguard").unwrap()
}

const FAILING_REPORT: &str = r#"{
  "schema": "hostguard.report.v1",
  "tool": { "name": "hostguard", "version": "0.1.0" },
  "run": { "started_at": "2026-01-01T00:00:00Z" },
  "verdict": {
    "status": "fail",
    "counts": { "passed": 1, "failed": 1, "skipped": 0, "degraded": 0, "transport_failures": 0 },
    "reasons": ["check_failures"]
  },
  "results": [
    {
      "host": "manager-1",
      "suite": "docker-swarm-manager",
      "check": "swarm_port_listening",
      "check_id": "host.socket_listening",
      "status": "fail",
      "severity": "error",
      "code": "not_listening",
      "failure_kind": "assertion",
      "message": "nothing listening on tcp://0.0.0.0:2377"
    },
    {
      "host": "worker-1",
      "suite": "docker",
      "check": "docker_installed",
      "check_id": "host.package_installed",
      "status": "pass",
      "severity": "error",
      "message": "package 'docker-ce' is installed"
    }
  ],
  "data": {
    "profile": "strict",
    "service_fallback": "strict",
    "groups": ["swarm_manager_instance", "docker_instance"],
    "hosts": ["manager-1", "worker-1"],
    "suites": ["docker-swarm-manager", "docker"],
    "checks_total": 2,
    "checks_failed": 1
  }
}"#;

fn write_report(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("report.json");
    std::fs::write(&path, FAILING_REPORT).expect("write report");
    path
}

#[test]
fn md_renders_report_to_stdout() {
    let tmp = TempDir::new().expect("temp dir");
    let report = write_report(tmp.path());

    hostguard_cmd()
        .arg("md")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Hostguard report"))
        .stdout(predicate::str::contains("tcp://0.0.0.0:2377"));
}

#[test]
fn annotations_render_failures() {
    let tmp = TempDir::new().expect("temp dir");
    let report = write_report(tmp.path());

    hostguard_cmd()
        .arg("annotations")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("::error"))
        .stdout(predicate::str::contains("host.socket_listening"));
}

#[test]
fn md_rejects_foreign_report() {
    let tmp = TempDir::new().expect("temp dir");
    let path = tmp.path().join("report.json");
    std::fs::write(&path, r#"{"schema": "other.report.v1"}"#).expect("write");

    hostguard_cmd()
        .arg("md")
        .arg("--report")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown report schema"));
}

#[test]
fn explain_known_code() {
    hostguard_cmd()
        .args(["explain", "running_mismatch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remediation"))
        .stdout(predicate::str::contains("Reported by: host.service_state"));
}

#[test]
fn explain_unknown_identifier_fails() {
    hostguard_cmd()
        .args(["explain", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Available check_ids"));
}

#[test]
fn hosts_lists_inventory_connections() {
    let tmp = TempDir::new().expect("temp dir");
    let inventory = tmp.path().join("inventory.yml");
    std::fs::write(
        &inventory,
        "all:\n  children:\n    swarm_worker_instance:\n      hosts:\n        worker-1:\n          ansible_host: 10.0.0.7\n        worker-2:\n          ansible_connection: podman\n",
    )
    .expect("write inventory");

    hostguard_cmd()
        .arg("--inventory")
        .arg(&inventory)
        .args(["hosts", "--group", "swarm_worker_instance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ssh:10.0.0.7"))
        .stdout(predicate::str::contains("podman:worker-2"));
}
