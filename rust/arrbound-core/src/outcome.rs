//! Allocation outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a failed allocation. Categories, not error types, are what
/// the two allocation paths must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    NegativeLength,
    CapacityExceeded,
    /// Anything else. Never expected from a correct constructor.
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::NegativeLength => "negative length",
            FailureKind::CapacityExceeded => "capacity exceeded",
            FailureKind::Unknown => "unknown failure",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Result of one allocation attempt: the array, or a categorized failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(Vec<T>),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        Outcome::Failure(Failure::new(kind, detail))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(f) => Some(f.kind),
        }
    }

    pub fn items(&self) -> Option<&[T]> {
        match self {
            Outcome::Success(items) => Some(items),
            Outcome::Failure(_) => None,
        }
    }

    pub fn summary(&self) -> OutcomeSummary {
        match self {
            Outcome::Success(items) => OutcomeSummary::Success { length: items.len() },
            Outcome::Failure(f) => OutcomeSummary::Failure {
                kind: f.kind,
                detail: f.detail.clone(),
            },
        }
    }
}

/// Contents-free view of an [`Outcome`], suitable for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeSummary {
    Success { length: usize },
    Failure { kind: FailureKind, detail: String },
}

impl fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeSummary::Success { length } => write!(f, "success(length {})", length),
            OutcomeSummary::Failure { kind, .. } => write!(f, "failure({})", kind),
        }
    }
}
