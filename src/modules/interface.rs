//! Module result types

use serde::Serialize;
use std::fmt;

/// Tagged result of executing one task on one host.
///
/// Re-running a task whose remote state already matches the desired state
/// must yield `Unchanged`, never `Changed` — that is the idempotency
/// contract every module upholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Changed,
    Unchanged,
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Changed => write!(f, "changed"),
            Outcome::Unchanged => write!(f, "unchanged"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome plus an optional diagnostic message.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleResult {
    pub outcome: Outcome,
    pub msg: Option<String>,
}

impl ModuleResult {
    pub fn changed(msg: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Changed,
            msg: Some(msg.into()),
        }
    }

    pub fn unchanged(msg: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Unchanged,
            msg: Some(msg.into()),
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            msg: Some(msg.into()),
        }
    }
}
