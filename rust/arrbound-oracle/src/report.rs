//! Run reports.

use crate::case::CaseResult;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub cases: Vec<CaseResult>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>, elapsed: Duration, cases: Vec<CaseResult>) -> Self {
        let passed = cases.iter().filter(|c| c.passed()).count();
        Self {
            started_at,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            total: cases.len(),
            passed,
            failed: cases.len() - passed,
            cases,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.iter().filter(|c| !c.passed())
    }

    /// Human-readable report. Passing cases are listed only when `verbose`.
    pub fn render_text(&self, verbose: bool) -> String {
        let mut out = String::new();
        for case in &self.cases {
            if verbose || !case.passed() {
                let _ = writeln!(out, "{}", case);
            }
        }
        let _ = writeln!(
            out,
            "{} cases: {} passed, {} failed ({} ms, started {})",
            self.total,
            self.passed,
            self.failed,
            self.elapsed_ms,
            self.started_at.to_rfc3339()
        );
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
