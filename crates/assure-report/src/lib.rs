pub mod payload;
pub mod report;

pub use payload::{ReportPayload, build_report_payload, write_report_json, write_transcript};
pub use report::{LogLine, OverallStatus, Report, RunSummary};
