//! CSV ingestion: one materialized `DataFrame` per input file.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::CsvReadOptions;
use polars::prelude::DataFrame;
use polars::prelude::SerReader;

/// Pandas-style unnamed index column written by some CSV exporters.
const PANDAS_INDEX_COLUMN: &str = "Unnamed: 0";

/// Read a CSV file into a `DataFrame` with inferred column types.
///
/// A leading `Unnamed: 0` index column is dropped when present so exported
/// row numbers never participate in validation.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        anyhow::bail!("CSV file not found: {}", path.display());
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))?;

    if df
        .get_column_names()
        .iter()
        .any(|name| name.as_str() == PANDAS_INDEX_COLUMN)
    {
        df = df
            .drop(PANDAS_INDEX_COLUMN)
            .with_context(|| format!("Failed to drop index column: {}", path.display()))?;
    }

    Ok(df)
}
