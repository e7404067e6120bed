//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Idempotence of read-only predicates
//! - Exit-code precedence over stdout matching
//! - FileContains branch coverage
//! - Verdict monotonicity

use crate::checks::{EvalContext, evaluate};
use crate::engine::compute_verdict;
use crate::model::{ExitExpectation, OutputMatcher, Predicate};
use crate::policy::{FailOn, ServiceFallback};
use crate::test_support::{FakeHost, path};
use hostguard_types::{CheckResult, CheckStatus, FailureKind, Severity, Verdict, ids};
use proptest::prelude::*;

fn ctx() -> EvalContext<'static> {
    EvalContext {
        check: "prop",
        fallback: ServiceFallback::Strict,
        max_output_bytes: 4096,
    }
}

fn arb_package_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9+.-]{0,31}").unwrap()
}

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error),
    ]
}

fn result(status: CheckStatus, severity: Severity) -> CheckResult {
    CheckResult {
        host: "h".to_string(),
        suite: "s".to_string(),
        check: "c".to_string(),
        check_id: ids::CHECK_PACKAGE_INSTALLED.to_string(),
        status,
        severity,
        code: None,
        failure_kind: (status == CheckStatus::Fail).then_some(FailureKind::Assertion),
        message: String::new(),
        degraded: None,
        fingerprint: None,
        data: serde_json::Value::Null,
    }
}

proptest! {
    #[test]
    fn package_installed_is_idempotent(
        name in arb_package_name(),
        installed in any::<bool>(),
    ) {
        let mut host = FakeHost::new("h");
        if installed {
            host = host.with_package(&name);
        }
        let predicate = Predicate::PackageInstalled { package: name };

        let first = evaluate(&predicate, &host, &ctx());
        let second = evaluate(&predicate, &host, &ctx());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.is_pass(), installed);
    }

    #[test]
    fn nonzero_exit_fails_expected_zero_regardless_of_stdout(
        code in prop_oneof![1i32..=255, -255i32..=-1],
        stdout in ".{0,64}",
    ) {
        let host = FakeHost::new("h").with_command("probe", code, &stdout);
        let predicate = Predicate::CommandResult {
            command: "probe".to_string(),
            exit_code: ExitExpectation::Code(0),
            stdout: vec![OutputMatcher::Contains(stdout.clone())],
        };

        let outcome = evaluate(&predicate, &host, &ctx());
        prop_assert_eq!(outcome.code(), Some(ids::CODE_EXIT_CODE_MISMATCH));
    }

    #[test]
    fn file_contains_matches_substring_presence(
        content in "[a-zA-Z0-9=\n ]{0,64}",
        needle in "[a-zA-Z0-9=]{1,4}",
        exists in any::<bool>(),
    ) {
        let mut host = FakeHost::new("h");
        if exists {
            host = host.with_file("/etc/app.conf", 0o644, &content);
        }
        let predicate = Predicate::FileContains {
            path: path("/etc/app.conf"),
            substring: needle.clone(),
        };

        let outcome = evaluate(&predicate, &host, &ctx());
        let expected = if !exists {
            Some(ids::CODE_FILE_MISSING)
        } else if content.contains(&needle) {
            None
        } else {
            Some(ids::CODE_SUBSTRING_MISSING)
        };
        prop_assert_eq!(outcome.code(), expected);
    }

    #[test]
    fn adding_an_error_failure_always_fails(
        severities in prop::collection::vec((arb_severity(), any::<bool>()), 0..16),
        fail_on_warning in any::<bool>(),
    ) {
        let fail_on = if fail_on_warning { FailOn::Warning } else { FailOn::Error };
        let mut results: Vec<CheckResult> = severities
            .into_iter()
            .map(|(sev, passed)| {
                result(if passed { CheckStatus::Pass } else { CheckStatus::Fail }, sev)
            })
            .collect();
        results.push(result(CheckStatus::Fail, Severity::Error));

        prop_assert_eq!(compute_verdict(&results, fail_on).status, Verdict::Fail);
    }

    #[test]
    fn passing_results_never_fail(
        severities in prop::collection::vec(arb_severity(), 1..16),
    ) {
        let results: Vec<CheckResult> = severities
            .into_iter()
            .map(|sev| result(CheckStatus::Pass, sev))
            .collect();
        prop_assert_eq!(compute_verdict(&results, FailOn::Warning).status, Verdict::Pass);
    }
}
