//! The `explain` use case: look up check/code documentation.

use hostguard_types::explain::{self, Explanation};

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    /// Found an explanation for the identifier.
    Found(Explanation),
    /// Unknown identifier; includes available check_ids and codes.
    NotFound {
        identifier: String,
        available_check_ids: &'static [&'static str],
        available_codes: &'static [&'static str],
    },
}

/// Look up an explanation for a check_id or code.
pub fn run_explain(identifier: &str) -> ExplainOutput {
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_check_ids: explain::all_check_ids(),
            available_codes: explain::all_codes(),
        },
    }
}

/// Format an explanation for terminal display.
///
/// Codes list the check ids that report them; both end with a suite entry.
pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();

    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");
    out.push_str(exp.description);
    out.push_str("\n\n");
    if !exp.raised_by.is_empty() {
        out.push_str("Reported by: ");
        out.push_str(&exp.raised_by.join(", "));
        out.push_str("\n\n");
    }
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(exp.remediation);
    out.push_str("\n\n");
    out.push_str("Suite check\n");
    out.push_str("-----------\n\n");
    out.push_str("```toml\n");
    out.push_str(exp.suite_example);
    out.push_str("\n```\n");

    out
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(identifier: &str, check_ids: &[&str], codes: &[&str]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown check_id or code: {identifier}\n\n"));
    out.push_str("Available check_ids:\n");
    for id in check_ids {
        out.push_str(&format!("  - {id}\n"));
    }
    out.push_str("\nAvailable codes:\n");
    for code in codes {
        out.push_str(&format!("  - {code}\n"));
    }

    out
}
