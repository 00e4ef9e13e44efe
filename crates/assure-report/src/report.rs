//! The report value for one validation run.
//!
//! Lifecycle is create, append, finalize, render: outcomes are recorded in
//! evaluation order, `finish` stamps the wall-clock duration, and rendering
//! is deterministic given identical outcomes (only the execution-time line
//! varies between runs). A report is owned by exactly one run; concurrent
//! runs each build their own.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use assure_model::{Outcome, Severity, Verdict};

/// One severity-tagged transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub severity: Severity,
    pub message: String,
}

impl LogLine {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Overall status of a run, derived from the worst line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Pass,
    Warning,
    Critical,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Pass => "PASS",
            OverallStatus::Warning => "WARNING",
            OverallStatus::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict tallies and overall status for programmatic consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_checks: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub error_count: usize,
    pub overall_status: OverallStatus,
}

/// Ordered, severity-tagged record of one validation run.
#[derive(Debug, Clone)]
pub struct Report {
    run_name: String,
    outcomes: Vec<Outcome>,
    body: Vec<LogLine>,
    duration_secs: Option<f64>,
    failed: bool,
}

impl Report {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            outcomes: Vec::new(),
            body: Vec::new(),
            duration_secs: None,
            failed: false,
        }
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Append one outcome. Line order equals call order.
    pub fn record(&mut self, outcome: Outcome) {
        self.body
            .push(LogLine::new(outcome.severity, outcome.message.clone()));
        self.outcomes.push(outcome);
    }

    /// Record that the data-producing step itself failed. This is the one
    /// fatal failure class: the run is marked failed and nothing else is
    /// evaluated.
    pub fn record_execution_failure(&mut self, detail: &str) {
        self.body.push(LogLine::new(
            Severity::Critical,
            format!("Failed to execute data source: {detail}"),
        ));
        self.failed = true;
    }

    /// Stamp the measured wall-clock duration, finalizing the report.
    pub fn finish(&mut self, duration: Duration) {
        self.duration_secs = Some(duration.as_secs_f64());
    }

    /// True when the data-producing step failed and the run was abandoned.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// All transcript lines in order: header, execution time (once
    /// finalized), then one line per recorded event.
    pub fn lines(&self) -> Vec<LogLine> {
        let mut lines = Vec::with_capacity(self.body.len() + 2);
        lines.push(LogLine::new(
            Severity::Info,
            format!("Validation report for: {}", self.run_name),
        ));
        if let Some(secs) = self.duration_secs {
            lines.push(LogLine::new(
                Severity::Info,
                format!("Execution time: {secs:.4} seconds"),
            ));
        }
        lines.extend(self.body.iter().cloned());
        lines
    }

    /// Render the plain-text transcript, one `[SEVERITY] message` per line.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }

    /// Tally verdicts and derive the overall status from line severities:
    /// CRITICAL beats WARNING beats PASS.
    pub fn summary(&self) -> RunSummary {
        let mut pass_count = 0;
        let mut fail_count = 0;
        let mut error_count = 0;
        for outcome in &self.outcomes {
            match outcome.verdict {
                Verdict::Pass => pass_count += 1,
                Verdict::Fail => fail_count += 1,
                Verdict::Error => error_count += 1,
            }
        }
        let worst = self
            .lines()
            .iter()
            .map(|line| line.severity)
            .max()
            .unwrap_or(Severity::Info);
        let overall_status = match worst {
            Severity::Critical => OverallStatus::Critical,
            Severity::Warning => OverallStatus::Warning,
            Severity::Info => OverallStatus::Pass,
        };
        RunSummary {
            total_checks: self.outcomes.len(),
            pass_count,
            fail_count,
            error_count,
            overall_status,
        }
    }
}
