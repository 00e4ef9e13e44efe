use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expectation::ExpectationKind;

/// Severity of a logged validation event.
///
/// Ordering follows escalation: `Info < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Returns the tag rendered into transcript lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pass/Fail/Error classification underlying an outcome's severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    /// The check could not be computed (e.g. mean over a text column).
    Error,
}

/// What an outcome is about: the table as a whole, one column, or a column
/// pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Table,
    Column(String),
    ColumnPair(String, String),
}

impl Subject {
    pub fn column(name: impl Into<String>) -> Self {
        Subject::Column(name.into())
    }

    pub fn pair(left: impl Into<String>, right: impl Into<String>) -> Self {
        Subject::ColumnPair(left.into(), right.into())
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Table => f.write_str("<table>"),
            Subject::Column(name) => f.write_str(name),
            Subject::ColumnPair(left, right) => write!(f, "{left},{right}"),
        }
    }
}

/// Value computed while evaluating an expectation, kept for programmatic
/// consumers of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Observed {
    Count(u64),
    Number(f64),
    Text(String),
}

/// The recorded result of evaluating one expectation instance against one
/// subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: ExpectationKind,
    pub subject: Subject,
    pub verdict: Verdict,
    pub severity: Severity,
    pub message: String,
    pub observed: Option<Observed>,
}

impl Outcome {
    /// A passing check. Passing checks are always INFO.
    pub fn pass(kind: ExpectationKind, subject: Subject, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject,
            verdict: Verdict::Pass,
            severity: Severity::Info,
            message: message.into(),
            observed: None,
        }
    }

    /// A failing check at the given severity.
    pub fn fail(
        kind: ExpectationKind,
        subject: Subject,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subject,
            verdict: Verdict::Fail,
            severity,
            message: message.into(),
            observed: None,
        }
    }

    /// A check that could not be computed. Computation failures are CRITICAL
    /// but isolated: they never abort the remaining instances.
    pub fn error(kind: ExpectationKind, subject: Subject, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject,
            verdict: Verdict::Error,
            severity: Severity::Critical,
            message: message.into(),
            observed: None,
        }
    }

    /// Attach the computed value to this outcome.
    #[must_use]
    pub fn with_observed(mut self, observed: Observed) -> Self {
        self.observed = Some(observed);
        self
    }
}
