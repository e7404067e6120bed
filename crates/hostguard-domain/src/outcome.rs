use crate::target::TransportError;
use hostguard_types::{FailureKind, ids};
use serde_json::Value;

/// Result of evaluating one predicate against one host.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Pass {
        message: String,
        degraded: Option<String>,
        data: Value,
    },
    Fail {
        kind: FailureKind,
        code: &'static str,
        message: String,
        degraded: Option<String>,
        data: Value,
    },
}

impl Outcome {
    pub fn pass(message: impl Into<String>) -> Self {
        Outcome::Pass {
            message: message.into(),
            degraded: None,
            data: Value::Null,
        }
    }

    /// The expectation was false.
    pub fn fail(code: &'static str, message: impl Into<String>) -> Self {
        Outcome::Fail {
            kind: FailureKind::Assertion,
            code,
            message: message.into(),
            degraded: None,
            data: Value::Null,
        }
    }

    /// The host could not be queried.
    pub fn transport(err: &TransportError) -> Self {
        Outcome::Fail {
            kind: FailureKind::Transport,
            code: ids::CODE_TRANSPORT_FAILURE,
            message: err.to_string(),
            degraded: None,
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, value: Value) -> Self {
        match &mut self {
            Outcome::Pass { data, .. } | Outcome::Fail { data, .. } => *data = value,
        }
        self
    }

    pub fn with_degraded(mut self, note: Option<String>) -> Self {
        match &mut self {
            Outcome::Pass { degraded, .. } | Outcome::Fail { degraded, .. } => *degraded = note,
        }
        self
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass { .. })
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            Outcome::Pass { .. } => None,
            Outcome::Fail { code, .. } => Some(*code),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Pass { .. } => None,
            Outcome::Fail { kind, .. } => Some(*kind),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Pass { message, .. } | Outcome::Fail { message, .. } => message,
        }
    }

    pub fn degraded(&self) -> Option<&str> {
        match self {
            Outcome::Pass { degraded, .. } | Outcome::Fail { degraded, .. } => degraded.as_deref(),
        }
    }

    pub fn data(&self) -> &Value {
        match self {
            Outcome::Pass { data, .. } | Outcome::Fail { data, .. } => data,
        }
    }
}
