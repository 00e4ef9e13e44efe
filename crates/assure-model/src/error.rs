use thiserror::Error;

/// Configuration errors detected before evaluation starts.
///
/// Any of these aborts the whole run: a malformed suite indicates caller
/// misuse, not a data failure, so nothing is partially evaluated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown expectation kind: {0}")]
    UnknownKind(String),
    #[error("{kind}: no columns configured")]
    EmptyColumns { kind: &'static str },
    #[error("{kind}: no column entries configured")]
    EmptyEntries { kind: &'static str },
    #[error("{kind}: invalid range for column '{column}' (min {min} exceeds max {max})")]
    InvertedRange {
        kind: &'static str,
        column: String,
        min: f64,
        max: f64,
    },
    #[error("{kind}: invalid row count range (min {min} exceeds max {max})")]
    InvertedRowCountRange {
        kind: &'static str,
        min: usize,
        max: usize,
    },
    #[error("{kind}: invalid regex for column '{column}': {source}")]
    InvalidPattern {
        kind: &'static str,
        column: String,
        #[source]
        source: regex::Error,
    },
    #[error("malformed expectation suite: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
