pub mod error;
pub mod expectation;
pub mod outcome;

pub use error::ConfigError;
pub use expectation::{
    ColumnDtype, ColumnExpectedValue, ColumnLengthRange, ColumnPair, ColumnPattern, ColumnRange,
    ColumnThreshold, ColumnValues, Expectation, ExpectationKind, ParamShape, ScalarValue,
    suite_from_json, validate_suite,
};
pub use outcome::{Observed, Outcome, Severity, Subject, Verdict};
