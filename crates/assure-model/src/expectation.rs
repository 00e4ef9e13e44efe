//! The expectation registry and typed expectation instances.
//!
//! Every supported check is one variant of the closed [`Expectation`] enum,
//! tagged for serde with its stable registry key. [`ExpectationKind`]
//! enumerates the registry itself: key, parameter shape, and nothing else.
//! Parameter shape conformance is enforced structurally by deserialization;
//! [`Expectation::validate`] covers what the type system cannot (non-empty
//! column lists, ordered ranges, compilable regex patterns) and runs before
//! any evaluation starts.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Declared parameter shape of an expectation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamShape {
    None,
    ColumnList,
    ColumnToValueList,
    ColumnToScalar,
    ColumnToRange,
    ColumnToPattern,
    ColumnPairList,
    OrderedColumnList,
    Range,
}

impl ParamShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamShape::None => "none",
            ParamShape::ColumnList => "list of columns",
            ParamShape::ColumnToValueList => "column -> value list",
            ParamShape::ColumnToScalar => "column -> scalar",
            ParamShape::ColumnToRange => "column -> range",
            ParamShape::ColumnToPattern => "column -> pattern",
            ParamShape::ColumnPairList => "list of column pairs",
            ParamShape::OrderedColumnList => "ordered list of columns",
            ParamShape::Range => "range",
        }
    }
}

impl fmt::Display for ParamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of expectation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpectationKind {
    #[serde(rename = "expect_column_to_exist")]
    ColumnExists,
    #[serde(rename = "expect_no_nulls")]
    NoNulls,
    #[serde(rename = "expect_column_values_to_be_in_set")]
    ValuesInSet,
    #[serde(rename = "expect_column_values_to_be_unique")]
    ValuesUnique,
    #[serde(rename = "expect_column_values_to_be_between")]
    ValuesBetween,
    #[serde(rename = "expect_column_dtype_to_be")]
    DtypeIs,
    #[serde(rename = "expect_column_mean_to_be_between")]
    MeanBetween,
    #[serde(rename = "expect_column_median_to_be_between")]
    MedianBetween,
    #[serde(rename = "expect_column_max_to_be_between")]
    MaxBetween,
    #[serde(rename = "expect_column_min_to_be_between")]
    MinBetween,
    #[serde(rename = "expect_column_std_to_be_less_than")]
    StdLessThan,
    #[serde(rename = "expect_column_value_lengths_to_be_between")]
    ValueLengthsBetween,
    #[serde(rename = "expect_table_row_count_to_be_between")]
    RowCountBetween,
    #[serde(rename = "expect_column_proportion_of_unique_values_to_be_between")]
    ProportionUniqueBetween,
    #[serde(rename = "expect_column_pair_values_to_be_unique")]
    ColumnPairUnique,
    #[serde(rename = "expect_column_values_to_not_match_regex")]
    ValuesNotMatchRegex,
    #[serde(rename = "expect_column_values_to_match_regex")]
    ValuesMatchRegex,
    #[serde(rename = "expect_column_values_to_not_be_in_set")]
    ValuesNotInSet,
    #[serde(rename = "expect_column_most_common_value_to_be")]
    MostCommonValueIs,
    #[serde(rename = "expect_table_columns_to_match_ordered_list")]
    ColumnsMatchOrderedList,
}

impl ExpectationKind {
    /// Every kind in the registry, in its canonical listing order.
    pub const ALL: [ExpectationKind; 20] = [
        ExpectationKind::ColumnExists,
        ExpectationKind::NoNulls,
        ExpectationKind::ValuesInSet,
        ExpectationKind::ValuesUnique,
        ExpectationKind::ValuesBetween,
        ExpectationKind::DtypeIs,
        ExpectationKind::MeanBetween,
        ExpectationKind::MedianBetween,
        ExpectationKind::MaxBetween,
        ExpectationKind::MinBetween,
        ExpectationKind::StdLessThan,
        ExpectationKind::ValueLengthsBetween,
        ExpectationKind::RowCountBetween,
        ExpectationKind::ProportionUniqueBetween,
        ExpectationKind::ColumnPairUnique,
        ExpectationKind::ValuesNotMatchRegex,
        ExpectationKind::ValuesMatchRegex,
        ExpectationKind::ValuesNotInSet,
        ExpectationKind::MostCommonValueIs,
        ExpectationKind::ColumnsMatchOrderedList,
    ];

    /// Stable string identifier, used as the serde tag and in reports.
    pub fn key(&self) -> &'static str {
        match self {
            ExpectationKind::ColumnExists => "expect_column_to_exist",
            ExpectationKind::NoNulls => "expect_no_nulls",
            ExpectationKind::ValuesInSet => "expect_column_values_to_be_in_set",
            ExpectationKind::ValuesUnique => "expect_column_values_to_be_unique",
            ExpectationKind::ValuesBetween => "expect_column_values_to_be_between",
            ExpectationKind::DtypeIs => "expect_column_dtype_to_be",
            ExpectationKind::MeanBetween => "expect_column_mean_to_be_between",
            ExpectationKind::MedianBetween => "expect_column_median_to_be_between",
            ExpectationKind::MaxBetween => "expect_column_max_to_be_between",
            ExpectationKind::MinBetween => "expect_column_min_to_be_between",
            ExpectationKind::StdLessThan => "expect_column_std_to_be_less_than",
            ExpectationKind::ValueLengthsBetween => "expect_column_value_lengths_to_be_between",
            ExpectationKind::RowCountBetween => "expect_table_row_count_to_be_between",
            ExpectationKind::ProportionUniqueBetween => {
                "expect_column_proportion_of_unique_values_to_be_between"
            }
            ExpectationKind::ColumnPairUnique => "expect_column_pair_values_to_be_unique",
            ExpectationKind::ValuesNotMatchRegex => "expect_column_values_to_not_match_regex",
            ExpectationKind::ValuesMatchRegex => "expect_column_values_to_match_regex",
            ExpectationKind::ValuesNotInSet => "expect_column_values_to_not_be_in_set",
            ExpectationKind::MostCommonValueIs => "expect_column_most_common_value_to_be",
            ExpectationKind::ColumnsMatchOrderedList => "expect_table_columns_to_match_ordered_list",
        }
    }

    /// Resolve a kind from its registry key.
    pub fn from_key(key: &str) -> Option<ExpectationKind> {
        ExpectationKind::ALL.iter().copied().find(|kind| kind.key() == key)
    }

    /// Declared parameter shape for this kind.
    pub fn param_shape(&self) -> ParamShape {
        match self {
            ExpectationKind::ColumnExists
            | ExpectationKind::NoNulls
            | ExpectationKind::ValuesUnique => ParamShape::ColumnList,
            ExpectationKind::ValuesInSet | ExpectationKind::ValuesNotInSet => {
                ParamShape::ColumnToValueList
            }
            ExpectationKind::DtypeIs
            | ExpectationKind::StdLessThan
            | ExpectationKind::MostCommonValueIs => ParamShape::ColumnToScalar,
            ExpectationKind::ValuesBetween
            | ExpectationKind::MeanBetween
            | ExpectationKind::MedianBetween
            | ExpectationKind::MaxBetween
            | ExpectationKind::MinBetween
            | ExpectationKind::ValueLengthsBetween
            | ExpectationKind::ProportionUniqueBetween => ParamShape::ColumnToRange,
            ExpectationKind::ValuesNotMatchRegex | ExpectationKind::ValuesMatchRegex => {
                ParamShape::ColumnToPattern
            }
            ExpectationKind::ColumnPairUnique => ParamShape::ColumnPairList,
            ExpectationKind::ColumnsMatchOrderedList => ParamShape::OrderedColumnList,
            ExpectationKind::RowCountBetween => ParamShape::Range,
        }
    }
}

impl fmt::Display for ExpectationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A scalar parameter value: set member, expected mode, and similar.
///
/// Rendered with the same rules as dataset cells so membership and equality
/// checks compare on a common string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(value) => write!(f, "{value}"),
            ScalarValue::Int(value) => write!(f, "{value}"),
            ScalarValue::Float(value) => {
                let rendered = format!("{value}");
                if rendered.contains('.') {
                    f.write_str(rendered.trim_end_matches('0').trim_end_matches('.'))
                } else {
                    f.write_str(&rendered)
                }
            }
            ScalarValue::Str(value) => f.write_str(value),
        }
    }
}

/// One column with its allowed (or forbidden) value set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValues {
    pub column: String,
    pub values: Vec<ScalarValue>,
}

/// One column with an inclusive numeric range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

/// One column with an inclusive rendered-length range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLengthRange {
    pub column: String,
    pub min: usize,
    pub max: usize,
}

/// One column with its expected type label (e.g. "int64").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDtype {
    pub column: String,
    pub dtype: String,
}

/// One column with an upper bound on a statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnThreshold {
    pub column: String,
    pub threshold: f64,
}

/// One column with its expected most common value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnExpectedValue {
    pub column: String,
    pub value: ScalarValue,
}

/// One column with a regex pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPattern {
    pub column: String,
    pub pattern: String,
}

/// A pair of columns whose combined values must be unique per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub left: String,
    pub right: String,
}

/// One configured expectation instance: kind plus typed parameters.
///
/// The serde tag is the registry key, so a suite file is a JSON array of
/// objects like `{"kind": "expect_no_nulls", "columns": ["age"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expectation {
    #[serde(rename = "expect_column_to_exist")]
    ColumnExists { columns: Vec<String> },
    #[serde(rename = "expect_no_nulls")]
    NoNulls { columns: Vec<String> },
    #[serde(rename = "expect_column_values_to_be_in_set")]
    ValuesInSet { entries: Vec<ColumnValues> },
    #[serde(rename = "expect_column_values_to_be_unique")]
    ValuesUnique { columns: Vec<String> },
    #[serde(rename = "expect_column_values_to_be_between")]
    ValuesBetween { entries: Vec<ColumnRange> },
    #[serde(rename = "expect_column_dtype_to_be")]
    DtypeIs { entries: Vec<ColumnDtype> },
    #[serde(rename = "expect_column_mean_to_be_between")]
    MeanBetween { entries: Vec<ColumnRange> },
    #[serde(rename = "expect_column_median_to_be_between")]
    MedianBetween { entries: Vec<ColumnRange> },
    #[serde(rename = "expect_column_max_to_be_between")]
    MaxBetween { entries: Vec<ColumnRange> },
    #[serde(rename = "expect_column_min_to_be_between")]
    MinBetween { entries: Vec<ColumnRange> },
    #[serde(rename = "expect_column_std_to_be_less_than")]
    StdLessThan { entries: Vec<ColumnThreshold> },
    #[serde(rename = "expect_column_value_lengths_to_be_between")]
    ValueLengthsBetween { entries: Vec<ColumnLengthRange> },
    #[serde(rename = "expect_table_row_count_to_be_between")]
    RowCountBetween { min: usize, max: usize },
    #[serde(rename = "expect_column_proportion_of_unique_values_to_be_between")]
    ProportionUniqueBetween { entries: Vec<ColumnRange> },
    #[serde(rename = "expect_column_pair_values_to_be_unique")]
    ColumnPairUnique { pairs: Vec<ColumnPair> },
    #[serde(rename = "expect_column_values_to_not_match_regex")]
    ValuesNotMatchRegex { entries: Vec<ColumnPattern> },
    #[serde(rename = "expect_column_values_to_match_regex")]
    ValuesMatchRegex { entries: Vec<ColumnPattern> },
    #[serde(rename = "expect_column_values_to_not_be_in_set")]
    ValuesNotInSet { entries: Vec<ColumnValues> },
    #[serde(rename = "expect_column_most_common_value_to_be")]
    MostCommonValueIs { entries: Vec<ColumnExpectedValue> },
    #[serde(rename = "expect_table_columns_to_match_ordered_list")]
    ColumnsMatchOrderedList { columns: Vec<String> },
}

impl Expectation {
    /// The registry kind of this instance.
    pub fn kind(&self) -> ExpectationKind {
        match self {
            Expectation::ColumnExists { .. } => ExpectationKind::ColumnExists,
            Expectation::NoNulls { .. } => ExpectationKind::NoNulls,
            Expectation::ValuesInSet { .. } => ExpectationKind::ValuesInSet,
            Expectation::ValuesUnique { .. } => ExpectationKind::ValuesUnique,
            Expectation::ValuesBetween { .. } => ExpectationKind::ValuesBetween,
            Expectation::DtypeIs { .. } => ExpectationKind::DtypeIs,
            Expectation::MeanBetween { .. } => ExpectationKind::MeanBetween,
            Expectation::MedianBetween { .. } => ExpectationKind::MedianBetween,
            Expectation::MaxBetween { .. } => ExpectationKind::MaxBetween,
            Expectation::MinBetween { .. } => ExpectationKind::MinBetween,
            Expectation::StdLessThan { .. } => ExpectationKind::StdLessThan,
            Expectation::ValueLengthsBetween { .. } => ExpectationKind::ValueLengthsBetween,
            Expectation::RowCountBetween { .. } => ExpectationKind::RowCountBetween,
            Expectation::ProportionUniqueBetween { .. } => {
                ExpectationKind::ProportionUniqueBetween
            }
            Expectation::ColumnPairUnique { .. } => ExpectationKind::ColumnPairUnique,
            Expectation::ValuesNotMatchRegex { .. } => ExpectationKind::ValuesNotMatchRegex,
            Expectation::ValuesMatchRegex { .. } => ExpectationKind::ValuesMatchRegex,
            Expectation::ValuesNotInSet { .. } => ExpectationKind::ValuesNotInSet,
            Expectation::MostCommonValueIs { .. } => ExpectationKind::MostCommonValueIs,
            Expectation::ColumnsMatchOrderedList { .. } => {
                ExpectationKind::ColumnsMatchOrderedList
            }
        }
    }

    /// Validate the parameters of this instance.
    ///
    /// Shape conformance is guaranteed by construction; this covers the
    /// registry's per-kind rules: non-empty column lists and entry lists,
    /// ordered ranges, compilable regex patterns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.kind().key();
        match self {
            Expectation::ColumnExists { columns }
            | Expectation::NoNulls { columns }
            | Expectation::ValuesUnique { columns }
            | Expectation::ColumnsMatchOrderedList { columns } => {
                if columns.is_empty() {
                    return Err(ConfigError::EmptyColumns { kind: key });
                }
            }
            Expectation::ValuesInSet { entries } | Expectation::ValuesNotInSet { entries } => {
                if entries.is_empty() {
                    return Err(ConfigError::EmptyEntries { kind: key });
                }
            }
            Expectation::ValuesBetween { entries }
            | Expectation::MeanBetween { entries }
            | Expectation::MedianBetween { entries }
            | Expectation::MaxBetween { entries }
            | Expectation::MinBetween { entries }
            | Expectation::ProportionUniqueBetween { entries } => {
                if entries.is_empty() {
                    return Err(ConfigError::EmptyEntries { kind: key });
                }
                for entry in entries {
                    if !(entry.min <= entry.max) {
                        return Err(ConfigError::InvertedRange {
                            kind: key,
                            column: entry.column.clone(),
                            min: entry.min,
                            max: entry.max,
                        });
                    }
                }
            }
            Expectation::DtypeIs { entries } => {
                if entries.is_empty() {
                    return Err(ConfigError::EmptyEntries { kind: key });
                }
            }
            Expectation::StdLessThan { entries } => {
                if entries.is_empty() {
                    return Err(ConfigError::EmptyEntries { kind: key });
                }
            }
            Expectation::ValueLengthsBetween { entries } => {
                if entries.is_empty() {
                    return Err(ConfigError::EmptyEntries { kind: key });
                }
                for entry in entries {
                    if entry.min > entry.max {
                        return Err(ConfigError::InvertedRange {
                            kind: key,
                            column: entry.column.clone(),
                            min: entry.min as f64,
                            max: entry.max as f64,
                        });
                    }
                }
            }
            Expectation::RowCountBetween { min, max } => {
                if min > max {
                    return Err(ConfigError::InvertedRowCountRange {
                        kind: key,
                        min: *min,
                        max: *max,
                    });
                }
            }
            Expectation::ColumnPairUnique { pairs } => {
                if pairs.is_empty() {
                    return Err(ConfigError::EmptyEntries { kind: key });
                }
            }
            Expectation::ValuesNotMatchRegex { entries }
            | Expectation::ValuesMatchRegex { entries } => {
                if entries.is_empty() {
                    return Err(ConfigError::EmptyEntries { kind: key });
                }
                for entry in entries {
                    if let Err(source) = Regex::new(&entry.pattern) {
                        return Err(ConfigError::InvalidPattern {
                            kind: key,
                            column: entry.column.clone(),
                            source,
                        });
                    }
                }
            }
            Expectation::MostCommonValueIs { entries } => {
                if entries.is_empty() {
                    return Err(ConfigError::EmptyEntries { kind: key });
                }
            }
        }
        Ok(())
    }
}

/// Validate every instance of a suite, failing fast on the first error.
pub fn validate_suite(expectations: &[Expectation]) -> Result<(), ConfigError> {
    for expectation in expectations {
        expectation.validate()?;
    }
    Ok(())
}

/// Parse and validate an expectation suite from its JSON form.
///
/// Any malformed entry (unknown kind, wrong parameter shape) fails the whole
/// load: the run never starts on a partially understood configuration.
pub fn suite_from_json(json: &str) -> Result<Vec<Expectation>, ConfigError> {
    let suite: Vec<Expectation> =
        serde_json::from_str(json).map_err(|error| ConfigError::Malformed(error.to_string()))?;
    validate_suite(&suite)?;
    Ok(suite)
}
