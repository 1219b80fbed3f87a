//! Oracle comparator: candidate outcome against reference outcome.
//!
//! Failures must agree on their [`FailureKind`]. Successes must agree on
//! length and then element by element, decoding each candidate value into
//! the native type and comparing with that type's `PartialEq`.

use crate::native::NativeElement;
use arrbound_core::outcome::{Failure, FailureKind, Outcome, OutcomeSummary};
use arrbound_core::values::Value;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leg {
    Candidate,
    Reference,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Candidate => f.write_str("candidate"),
            Leg::Reference => f.write_str("reference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "mismatch", rename_all = "snake_case")]
pub enum Mismatch {
    #[error("{leg} failed unexpectedly: {detail}")]
    UnknownFailure { leg: Leg, detail: String },
    #[error("evaluation panicked outside both legs: {detail}")]
    Panicked { detail: String },
    #[error("candidate {candidate}, reference {reference}")]
    OutcomeClass {
        candidate: OutcomeSummary,
        reference: OutcomeSummary,
    },
    #[error("candidate failed with {candidate}, reference with {reference}")]
    Kind {
        candidate: FailureKind,
        reference: FailureKind,
    },
    #[error("candidate length {candidate}, reference length {reference}")]
    Length { candidate: usize, reference: usize },
    #[error("element {index}: candidate value {value} is not a valid {element}")]
    Undecodable {
        index: usize,
        value: String,
        element: String,
    },
    #[error("element {index}: candidate {candidate}, reference {reference}")]
    Element {
        index: usize,
        candidate: String,
        reference: String,
    },
}

fn unknown(outcome_failure: Option<&Failure>, leg: Leg) -> Option<Mismatch> {
    match outcome_failure {
        Some(f) if f.kind == FailureKind::Unknown => Some(Mismatch::UnknownFailure {
            leg,
            detail: f.detail.clone(),
        }),
        _ => None,
    }
}

fn failure_of<T>(outcome: &Outcome<T>) -> Option<&Failure> {
    match outcome {
        Outcome::Failure(f) => Some(f),
        Outcome::Success(_) => None,
    }
}

/// Compare the candidate (dynamic) outcome with the reference (native) one.
pub fn compare<T: NativeElement>(
    candidate: &Outcome<Value>,
    reference: &Outcome<T>,
) -> Result<(), Mismatch> {
    if let Some(m) = unknown(failure_of(candidate), Leg::Candidate) {
        return Err(m);
    }
    if let Some(m) = unknown(failure_of(reference), Leg::Reference) {
        return Err(m);
    }

    match (candidate, reference) {
        (Outcome::Failure(c), Outcome::Failure(r)) => {
            if c.kind == r.kind {
                Ok(())
            } else {
                Err(Mismatch::Kind {
                    candidate: c.kind,
                    reference: r.kind,
                })
            }
        }
        (Outcome::Success(_), Outcome::Failure(_)) | (Outcome::Failure(_), Outcome::Success(_)) => {
            Err(Mismatch::OutcomeClass {
                candidate: candidate.summary(),
                reference: reference.summary(),
            })
        }
        (Outcome::Success(values), Outcome::Success(expected)) => {
            if values.len() != expected.len() {
                return Err(Mismatch::Length {
                    candidate: values.len(),
                    reference: expected.len(),
                });
            }
            for (index, (value, want)) in values.iter().zip(expected).enumerate() {
                let Some(got) = T::decode(value) else {
                    return Err(Mismatch::Undecodable {
                        index,
                        value: value.to_string(),
                        element: T::descriptor().to_string(),
                    });
                };
                if got != *want {
                    return Err(Mismatch::Element {
                        index,
                        candidate: format!("{:?}", got),
                        reference: format!("{:?}", want),
                    });
                }
            }
            Ok(())
        }
    }
}
