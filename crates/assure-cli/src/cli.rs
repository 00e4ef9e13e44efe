//! CLI argument definitions for DataAssure.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dataassure",
    version,
    about = "DataAssure - Rule-based validation for tabular data",
    long_about = "Validate a CSV dataset against a declarative expectation suite.\n\n\
                  Each expectation is checked independently and reported with a\n\
                  severity; the run exits nonzero when any CRITICAL finding exists."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a CSV dataset against an expectation suite.
    Validate(ValidateArgs),

    /// List all supported expectation kinds and their parameter shapes.
    Kinds,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Path to the CSV dataset to validate.
    #[arg(value_name = "DATA_CSV")]
    pub data: PathBuf,

    /// Path to the JSON expectation suite.
    #[arg(long = "suite", value_name = "SUITE_JSON")]
    pub suite: PathBuf,

    /// Directory for report files (default: current directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report format(s) to write.
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: ReportFormatArg,

    /// Run name shown in the report header (default: data file stem).
    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Print the transcript and summary without writing report files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Text,
    Json,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
