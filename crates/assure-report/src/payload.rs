//! Machine-consumable report payload and file persistence.
//!
//! The transcript itself stays timestamp-free; only the JSON payload carries
//! a generated-at stamp for downstream tooling.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use assure_model::Outcome;

use crate::report::{LogLine, Report, RunSummary};

const REPORT_SCHEMA: &str = "dataassure.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct ReportPayload {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    pub run_name: String,
    pub failed: bool,
    pub summary: RunSummary,
    pub lines: Vec<LogLine>,
    pub outcomes: Vec<Outcome>,
}

/// Build the JSON payload for a finalized report.
pub fn build_report_payload(report: &Report) -> ReportPayload {
    ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        run_name: report.run_name().to_string(),
        failed: report.is_failed(),
        summary: report.summary(),
        lines: report.lines(),
        outcomes: report.outcomes().to_vec(),
    }
}

/// Write the JSON payload to `<output_dir>/validation_report.json`.
pub fn write_report_json(output_dir: &Path, report: &Report) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("validation_report.json");
    let payload = build_report_payload(report);
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&output_path, format!("{json}\n"))?;
    Ok(output_path)
}

/// Write the plain-text transcript to `<output_dir>/validation_report.txt`.
pub fn write_transcript(output_dir: &Path, report: &Report) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("validation_report.txt");
    std::fs::write(&output_path, report.transcript())?;
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assure_model::{ExpectationKind, Outcome, Subject};

    use super::*;

    fn temp_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        dir.push(format!("assure_report_{stamp}"));
        dir
    }

    #[test]
    fn payload_serializes_with_schema_header() {
        let mut report = Report::new("orders");
        report.record(Outcome::pass(
            ExpectationKind::ColumnExists,
            Subject::column("id"),
            "Column exists: id",
        ));
        report.finish(Duration::from_millis(10));

        let payload = build_report_payload(&report);
        let json = serde_json::to_string(&payload).expect("serialize payload");
        assert!(json.contains("dataassure.validation-report"));
        assert!(json.contains("expect_column_to_exist"));
    }

    #[test]
    fn writes_transcript_and_json() {
        let dir = temp_dir();
        let mut report = Report::new("orders");
        report.record(Outcome::pass(
            ExpectationKind::ColumnExists,
            Subject::column("id"),
            "Column exists: id",
        ));
        report.finish(Duration::from_millis(10));

        let text_path = write_transcript(&dir, &report).expect("write transcript");
        let json_path = write_report_json(&dir, &report).expect("write json");
        assert_eq!(text_path.file_name().unwrap(), "validation_report.txt");
        assert_eq!(json_path.file_name().unwrap(), "validation_report.json");
        let contents = std::fs::read_to_string(&text_path).expect("read transcript");
        assert!(contents.starts_with("[INFO] Validation report for: orders"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
