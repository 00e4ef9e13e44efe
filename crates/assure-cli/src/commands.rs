//! Command implementations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use assure_model::{ExpectationKind, suite_from_json};
use assure_report::{Report, write_report_json, write_transcript};
use assure_validate::validate_source;

use crate::cli::{ReportFormatArg, ValidateArgs};

pub struct ValidateResult {
    pub report: Report,
    pub transcript_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateResult> {
    let suite_json = std::fs::read_to_string(&args.suite)
        .with_context(|| format!("Failed to read expectation suite: {}", args.suite.display()))?;
    let suite = suite_from_json(&suite_json)
        .with_context(|| format!("Invalid expectation suite: {}", args.suite.display()))?;

    let run_name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .data
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "validation".to_string()),
    };
    info!(
        run = %run_name,
        expectations = suite.len(),
        "starting validation run"
    );

    // The CSV read is the data-producing step: if it fails, the run is
    // reported as failed rather than erroring out of the CLI.
    let data_path = args.data.clone();
    let report = validate_source(&run_name, move || assure_ingest::read_csv(&data_path), &suite)?;

    let mut transcript_path = None;
    let mut json_path = None;
    if !args.dry_run {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if matches!(args.format, ReportFormatArg::Text | ReportFormatArg::Both) {
            transcript_path = Some(write_transcript(&output_dir, &report)?);
        }
        if matches!(args.format, ReportFormatArg::Json | ReportFormatArg::Both) {
            json_path = Some(write_report_json(&output_dir, &report)?);
        }
    }

    Ok(ValidateResult {
        report,
        transcript_path,
        json_path,
    })
}

pub fn run_kinds() -> Result<()> {
    for kind in ExpectationKind::ALL {
        println!("{:<56} {}", kind.key(), kind.param_shape());
    }
    Ok(())
}
