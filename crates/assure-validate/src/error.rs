use thiserror::Error;

/// A statistic or predicate that could not be computed from the column's
/// data. Surfaced as an Error outcome, never as a crash, and never fatal to
/// the remaining instances.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("column '{column}' is not numeric (found value '{value}')")]
    NotNumeric { column: String, value: String },
    #[error("column '{column}' has no values to aggregate")]
    EmptyColumn { column: String },
    #[error("dataset has no rows")]
    EmptyTable,
}
