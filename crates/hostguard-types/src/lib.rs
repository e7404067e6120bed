//! Stable DTOs and IDs used across the hostguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted report
//! - stable string IDs and failure codes
//! - canonical target-side path handling
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod path;
pub mod receipt;

pub use explain::{Explanation, lookup_explanation};
pub use path::HostPath;
pub use receipt::{
    CheckResult, CheckStatus, FailureKind, HostguardData, HostguardReport, ReportEnvelope,
    RunMeta, SCHEMA_REPORT_V1, Severity, ToolMeta, Verdict, VerdictCounts, VerdictSummary,
};
