//! CLI entry point for hostguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, logging and exit codes.
//! All business logic lives in the `hostguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use hostguard_app::{
    CheckInput, ExplainOutput, HostsInput, format_explanation, format_hosts, format_not_found,
    parse_report_json, render_annotations, render_markdown, run_check, run_explain, run_hosts,
    runtime_error_report, serialize_report, to_renderable, verdict_exit_code,
};
use hostguard_settings::Overrides;
use hostguard_types::HostguardReport;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hostguard",
    version,
    about = "Declarative host-state assertions for provisioned machines"
)]
struct Cli {
    /// Path to hostguard config TOML (optional; defaults apply when missing).
    #[arg(long, default_value = "hostguard.toml")]
    config: Utf8PathBuf,

    /// Override profile (strict|container|warn).
    #[arg(long)]
    profile: Option<String>,

    /// Ansible-style YAML inventory. Without one, only localhost is checked.
    #[arg(long)]
    inventory: Option<Utf8PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate suites against inventory hosts and write artifacts.
    Check {
        /// Suite TOML file (repeatable).
        #[arg(long = "suite")]
        suites: Vec<Utf8PathBuf>,

        /// Load every `*.toml` suite under this directory.
        #[arg(long)]
        suite_dir: Option<Utf8PathBuf>,

        /// Run every suite against this inventory group instead of its own.
        #[arg(long)]
        group: Option<String>,

        /// Only check hosts matching these comma-separated globs.
        #[arg(long)]
        limit: Option<String>,

        /// Check hosts one at a time.
        #[arg(long)]
        serial: bool,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/hostguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/hostguard/comment.md")]
        markdown_out: Utf8PathBuf,
    },

    /// List resolved hosts and how they would be reached.
    Hosts {
        /// Inventory group (defaults to `all`).
        #[arg(long)]
        group: Option<String>,

        /// Only list hosts matching these comma-separated globs.
        #[arg(long)]
        limit: Option<String>,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/hostguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/hostguard/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// The check_id (e.g., "host.service_state") or code (e.g., "running_mismatch") to explain.
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.cmd {
        Commands::Check {
            suites,
            suite_dir,
            group,
            limit,
            serial,
            report_out,
            write_markdown,
            markdown_out,
        } => cmd_check(
            &cli,
            CheckArgs {
                suites,
                suite_dir: suite_dir.as_deref(),
                group: group.clone(),
                limit: limit.clone(),
                serial: *serial,
                report_out,
                markdown_out: write_markdown.then_some(markdown_out.as_path()),
            },
        ),
        Commands::Hosts { group, limit } => cmd_hosts(&cli, group.clone(), limit.clone()),
        Commands::Md { report, output } => cmd_md(report, output.as_deref()),
        Commands::Annotations { report, max } => cmd_annotations(report, *max),
        Commands::Explain { identifier } => cmd_explain(identifier),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct CheckArgs<'a> {
    suites: &'a [Utf8PathBuf],
    suite_dir: Option<&'a Utf8Path>,
    group: Option<String>,
    limit: Option<String>,
    serial: bool,
    report_out: &'a Utf8Path,
    markdown_out: Option<&'a Utf8Path>,
}

fn cmd_check(cli: &Cli, args: CheckArgs<'_>) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let cfg_text = read_config(&cli.config)?;
        let inventory_text = read_inventory(cli.inventory.as_deref())?;

        let mut suites = Vec::new();
        for path in args.suites {
            suites.push(hostguard_suite::load_suite_file(path)?);
        }
        if let Some(dir) = args.suite_dir {
            suites.extend(hostguard_suite::discover_suites(dir)?);
        }
        if suites.is_empty() {
            anyhow::bail!("no suites given (use --suite or --suite-dir)");
        }

        let output = run_check(CheckInput {
            config_text: &cfg_text,
            inventory_text: inventory_text.as_deref(),
            suites,
            overrides: Overrides {
                profile: cli.profile.clone(),
                serial: args.serial,
            },
            group: args.group,
            limit: args.limit,
        })?;

        write_report_file(args.report_out, &output.report).context("write report json")?;
        if let Some(markdown_out) = args.markdown_out {
            let md = render_markdown(&to_renderable(&output.report));
            write_text_file(markdown_out, &md).context("write markdown")?;
        }

        Ok(verdict_exit_code(output.report.verdict.status))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"));
            let _ = write_report_file(args.report_out, &report);
            eprintln!("hostguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_hosts(cli: &Cli, group: Option<String>, limit: Option<String>) -> anyhow::Result<()> {
    let inventory_text = read_inventory(cli.inventory.as_deref())?;
    let hosts = run_hosts(HostsInput {
        inventory_text: inventory_text.as_deref(),
        group,
        limit,
    })?;
    print!("{}", format_hosts(&hosts));
    Ok(())
}

/// A missing config file is allowed; defaults apply.
fn read_config(path: &Utf8Path) -> anyhow::Result<String> {
    if !path.exists() {
        tracing::debug!(%path, "config file not found; using defaults");
        return Ok(String::new());
    }
    std::fs::read_to_string(path).with_context(|| format!("read config: {path}"))
}

fn read_inventory(path: Option<&Utf8Path>) -> anyhow::Result<Option<String>> {
    path.map(|path| {
        std::fs::read_to_string(path).with_context(|| format!("read inventory: {path}"))
    })
    .transpose()
}

fn write_report_file(path: &Utf8Path, report: &HostguardReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    let data = serialize_report(report)?;
    std::fs::write(path, data).with_context(|| format!("write report: {path}"))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {path}"))?;
    Ok(())
}

fn read_report(path: &Utf8Path) -> anyhow::Result<HostguardReport> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read report: {path}"))?;
    parse_report_json(&text)
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report = read_report(report_path)?;
    let md = render_markdown(&to_renderable(&report));

    match output {
        Some(out_path) => write_text_file(out_path, &md).context("write markdown output")?,
        None => print!("{md}"),
    }
    Ok(())
}

fn cmd_annotations(report_path: &Utf8Path, max: usize) -> anyhow::Result<()> {
    let report = read_report(report_path)?;
    for annotation in render_annotations(&to_renderable(&report), max) {
        println!("{annotation}");
    }
    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                format_not_found(&identifier, available_check_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}
