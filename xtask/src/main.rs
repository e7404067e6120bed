//! Developer tasks (schema generation, explain coverage, report linting).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use hostguard_types::{CheckStatus, HostguardReport, SCHEMA_REPORT_V1, VerdictCounts, explain};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// The workspace root (parent of the xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(hostguard_types::HostguardReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(hostguard_settings::HostguardConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "hostguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "hostguard.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {name}");
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {name}");
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

/// Token pattern for codes and verdict reasons.
fn is_valid_token(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Structural problems in an emitted report; empty when the report is consistent.
fn lint_report(report: &HostguardReport) -> Vec<String> {
    let mut errors = Vec::new();

    if report.schema != SCHEMA_REPORT_V1 {
        errors.push(format!("schema is {:?}, expected {SCHEMA_REPORT_V1}", report.schema));
    }
    if report.tool.name != "hostguard" {
        errors.push(format!("tool.name is {:?}", report.tool.name));
    }
    if report.verdict.counts != VerdictCounts::from_results(&report.results) {
        errors.push("verdict.counts do not match results".to_string());
    }
    for reason in &report.verdict.reasons {
        if !is_valid_token(reason) {
            errors.push(format!("verdict reason {reason:?} is not a snake_case token"));
        }
    }

    for (idx, r) in report.results.iter().enumerate() {
        let at = format!("results[{idx}] ({} / {})", r.host, r.check);
        match (r.status, &r.code) {
            (CheckStatus::Pass, Some(code)) => {
                errors.push(format!("{at}: pass carries code {code:?}"));
            }
            (CheckStatus::Fail | CheckStatus::Skip, None) => {
                errors.push(format!("{at}: missing code"));
            }
            (_, Some(code)) if !is_valid_token(code) => {
                errors.push(format!("{at}: code {code:?} is not a snake_case token"));
            }
            _ => {}
        }
        if r.status == CheckStatus::Fail && r.failure_kind.is_none() && r.check_id != "tool.runtime"
        {
            errors.push(format!("{at}: failure without failure_kind"));
        }
    }

    errors
}

/// Lint one emitted report file.
fn conform(path: &Path) -> anyhow::Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let report: HostguardReport = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a hostguard report", path.display()))?;

    let errors = lint_report(&report);
    if errors.is_empty() {
        println!("✓ {} conforms to {SCHEMA_REPORT_V1}", path.display());
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {error}");
    }
    bail!("{} failed conformance with {} errors", path.display(), errors.len())
}

/// Validate that all check IDs and codes have explanations.
fn explain_coverage() -> anyhow::Result<()> {
    let check_ids = explain::all_check_ids();
    let codes = explain::all_codes();
    let mut errors = Vec::new();

    for (kind, ids) in [("Check ID", check_ids), ("Code", codes)] {
        for id in ids {
            let Some(exp) = explain::lookup_explanation(id) else {
                errors.push(format!("{kind} '{id}' has no explanation"));
                continue;
            };
            for (field, value) in [
                ("title", exp.title),
                ("description", exp.description),
                ("remediation", exp.remediation),
            ] {
                if value.is_empty() {
                    errors.push(format!("{kind} '{id}' has empty {field}"));
                }
            }
        }
    }

    if errors.is_empty() {
        println!("✓ {} check IDs have explanations", check_ids.len());
        println!("✓ {} codes have explanations", codes.len());
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {error}");
    }
    bail!("Explain coverage validation failed with {} errors", errors.len())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform <report>  Check an emitted report for internal consistency");
    eprintln!("  explain-coverage  Validate all check IDs and codes have explanations");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "explain-coverage" => explain_coverage(),
        "conform" => match args.get(2) {
            Some(path) => conform(Path::new(path)),
            None => bail!("conform needs a report path"),
        },
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
