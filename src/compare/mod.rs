//! Expected vs. actual reconciliation.

use serde::Serialize;

use crate::{bank::ExampleId, execution::{ExecutionOutcome, OutcomeStatus}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    Mismatch,
    NoExpected,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Match => "match",
            Verdict::Mismatch => "mismatch",
            Verdict::NoExpected => "no_expected",
        }
    }
}

/// Both sides are trimmed; nothing else is normalized.
pub fn compare(expected: &str, actual: &str) -> Verdict {
    let expected = expected.trim();
    if expected.is_empty() {
        Verdict::NoExpected
    } else if expected == actual.trim() {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub id: ExampleId,
    pub expected: String,
    pub actual: String,
    pub verdict: Verdict,
    /// Compared output came from a run that exited nonzero.
    pub nonzero_exit: bool,
    pub outcome: ExecutionOutcome,
}

impl ComparisonResult {
    pub fn new(expected: &str, outcome: ExecutionOutcome) -> Self {
        let expected = expected.trim().to_string();
        let actual = outcome.status.stdout().trim().to_string();
        let verdict = compare(&expected, &actual);
        Self {
            id: outcome.id.clone(),
            expected,
            actual,
            verdict,
            nonzero_exit: matches!(outcome.status, OutcomeStatus::RuntimeNonzero { .. }),
            outcome,
        }
    }

    /// Anything a maintainer has to look at.
    pub fn needs_attention(&self) -> bool {
        self.verdict == Verdict::Mismatch || !self.outcome.status.is_ok()
    }
}
