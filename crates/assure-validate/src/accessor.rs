//! Read-only adapter between a `DataFrame` and the evaluator.
//!
//! All comparisons downstream happen on rendered cell forms; missing cells
//! (null or NaN) are `None` keys, so two missing cells compare equal in
//! uniqueness, cardinality, and duplicate counting.

use std::collections::HashSet;

use polars::prelude::{AnyValue, DataFrame, DataType};

use assure_ingest::{any_to_f64, any_to_string, is_missing};

use crate::error::ComputeError;

pub struct ColumnAccessor<'a> {
    df: &'a DataFrame,
}

impl<'a> ColumnAccessor<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        Self { df }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.df
            .get_column_names()
            .iter()
            .any(|column| column.as_str() == name)
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_order(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Cells of a column in row order. Unknown columns yield no cells; the
    /// evaluator checks existence before computing.
    pub fn values(&self, name: &str) -> Vec<AnyValue<'a>> {
        let Ok(series) = self.df.column(name) else {
            return Vec::new();
        };
        (0..self.df.height())
            .map(|idx| series.get(idx).unwrap_or(AnyValue::Null))
            .collect()
    }

    pub fn null_count(&self, name: &str) -> usize {
        self.values(name)
            .iter()
            .filter(|value| is_missing(value))
            .count()
    }

    /// Rendered comparison key per cell; `None` marks a missing cell.
    fn keys(&self, name: &str) -> Vec<Option<String>> {
        self.values(name)
            .into_iter()
            .map(|value| {
                if is_missing(&value) {
                    None
                } else {
                    Some(any_to_string(value))
                }
            })
            .collect()
    }

    pub fn is_unique(&self, name: &str) -> bool {
        let mut seen = HashSet::new();
        self.keys(name).into_iter().all(|key| seen.insert(key))
    }

    /// Count of distinct non-missing values.
    pub fn cardinality(&self, name: &str) -> usize {
        let mut distinct = HashSet::new();
        for key in self.keys(name).into_iter().flatten() {
            distinct.insert(key);
        }
        distinct.len()
    }

    /// Rows sharing identical values across the given columns, counted as
    /// all-but-first-occurrence duplicates.
    pub fn duplicate_count(&self, columns: &[&str]) -> usize {
        let keyed: Vec<Vec<Option<String>>> =
            columns.iter().map(|name| self.keys(name)).collect();
        let mut seen = HashSet::new();
        let mut duplicates = 0;
        for idx in 0..self.row_count() {
            let row: Vec<Option<String>> = keyed.iter().map(|column| column[idx].clone()).collect();
            if !seen.insert(row) {
                duplicates += 1;
            }
        }
        duplicates
    }

    /// Stable label for the observed column type.
    pub fn type_label(&self, name: &str) -> &'static str {
        let Ok(column) = self.df.column(name) else {
            return "other";
        };
        match column.dtype() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => "int64",
            DataType::Float32 | DataType::Float64 => "float64",
            DataType::String => "str",
            DataType::Boolean => "bool",
            DataType::Null => "null",
            _ => "other",
        }
    }

    /// Non-missing cells as f64. Any non-missing cell that is not numeric
    /// makes the whole column non-aggregatable.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>, ComputeError> {
        let mut values = Vec::new();
        for value in self.values(name) {
            if is_missing(&value) {
                continue;
            }
            match any_to_f64(&value) {
                Some(number) => values.push(number),
                None => {
                    return Err(ComputeError::NotNumeric {
                        column: name.to_string(),
                        value: any_to_string(value),
                    });
                }
            }
        }
        Ok(values)
    }

    fn aggregatable(&self, name: &str) -> Result<Vec<f64>, ComputeError> {
        let values = self.numeric_values(name)?;
        if values.is_empty() {
            return Err(ComputeError::EmptyColumn {
                column: name.to_string(),
            });
        }
        Ok(values)
    }

    pub fn mean(&self, name: &str) -> Result<f64, ComputeError> {
        let values = self.aggregatable(name)?;
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn median(&self, name: &str) -> Result<f64, ComputeError> {
        let mut values = self.aggregatable(name)?;
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        if values.len() % 2 == 1 {
            Ok(values[mid])
        } else {
            Ok((values[mid - 1] + values[mid]) / 2.0)
        }
    }

    pub fn min(&self, name: &str) -> Result<f64, ComputeError> {
        let values = self.aggregatable(name)?;
        Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn max(&self, name: &str) -> Result<f64, ComputeError> {
        let values = self.aggregatable(name)?;
        Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Sample standard deviation (ddof = 1). A single value yields NaN,
    /// which fails any threshold comparison downstream.
    pub fn std(&self, name: &str) -> Result<f64, ComputeError> {
        let values = self.aggregatable(name)?;
        if values.len() < 2 {
            return Ok(f64::NAN);
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / (values.len() - 1) as f64;
        Ok(variance.sqrt())
    }
}
