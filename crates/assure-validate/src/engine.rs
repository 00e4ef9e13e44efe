//! The evaluation engine: one dispatch table over the closed expectation
//! registry.
//!
//! Instances are evaluated in configuration order and are fully isolated
//! from each other: a missing column or an uncomputable statistic becomes an
//! outcome for that subject and evaluation moves on. Only two failures abort
//! a run, and both happen before any evaluation: a malformed suite
//! (configuration error) and a failing data producer (execution failure).

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use polars::prelude::DataFrame;
use regex::Regex;
use tracing::debug;

use assure_ingest::{any_to_f64, any_to_string, format_numeric, is_missing};
use assure_model::{
    ColumnDtype, ColumnExpectedValue, ColumnLengthRange, ColumnPair, ColumnPattern, ColumnRange,
    ColumnThreshold, ColumnValues, ConfigError, Expectation, ExpectationKind, Observed, Outcome,
    Severity, Subject, validate_suite,
};
use assure_report::Report;

use crate::accessor::ColumnAccessor;
use crate::error::ComputeError;

/// Offending values quoted in failure messages, at most.
const EXAMPLE_LIMIT: usize = 5;

/// Validate a materialized dataset against an ordered expectation suite.
///
/// The suite is validated in full before evaluation starts; a malformed
/// instance aborts the run with a [`ConfigError`] and nothing is reported.
pub fn validate(
    run_name: &str,
    df: &DataFrame,
    expectations: &[Expectation],
) -> Result<Report, ConfigError> {
    validate_suite(expectations)?;
    let mut report = Report::new(run_name);
    let start = Instant::now();
    evaluate_all(&mut report, df, expectations);
    report.finish(start.elapsed());
    Ok(report)
}

/// Validate data produced by a fallible step (e.g. an upstream transform).
///
/// A producer failure is the only failure class fatal to the run: it is
/// recorded as a CRITICAL line, the report is marked failed, and nothing is
/// evaluated, since without data there is nothing to check.
pub fn validate_source<F>(
    run_name: &str,
    producer: F,
    expectations: &[Expectation],
) -> Result<Report, ConfigError>
where
    F: FnOnce() -> anyhow::Result<DataFrame>,
{
    validate_suite(expectations)?;
    let mut report = Report::new(run_name);
    let start = Instant::now();
    match producer() {
        Ok(df) => evaluate_all(&mut report, &df, expectations),
        Err(error) => report.record_execution_failure(&format!("{error:#}")),
    }
    report.finish(start.elapsed());
    Ok(report)
}

fn evaluate_all(report: &mut Report, df: &DataFrame, expectations: &[Expectation]) {
    let accessor = ColumnAccessor::new(df);
    for expectation in expectations {
        debug!(kind = expectation.kind().key(), "evaluating expectation");
        for outcome in evaluate(&accessor, expectation) {
            report.record(outcome);
        }
    }
}

/// Evaluate one instance, fanning out per referenced column (or pair).
pub fn evaluate(accessor: &ColumnAccessor<'_>, expectation: &Expectation) -> Vec<Outcome> {
    match expectation {
        Expectation::ColumnExists { columns } => check_column_exists(accessor, columns),
        Expectation::NoNulls { columns } => check_no_nulls(accessor, columns),
        Expectation::ValuesInSet { entries } => check_values_in_set(accessor, entries),
        Expectation::ValuesUnique { columns } => check_values_unique(accessor, columns),
        Expectation::ValuesBetween { entries } => check_values_between(accessor, entries),
        Expectation::DtypeIs { entries } => check_dtype(accessor, entries),
        Expectation::MeanBetween { entries } => check_statistic_between(
            accessor,
            ExpectationKind::MeanBetween,
            "Mean",
            ColumnAccessor::mean,
            entries,
        ),
        Expectation::MedianBetween { entries } => check_statistic_between(
            accessor,
            ExpectationKind::MedianBetween,
            "Median",
            ColumnAccessor::median,
            entries,
        ),
        Expectation::MaxBetween { entries } => check_statistic_between(
            accessor,
            ExpectationKind::MaxBetween,
            "Max",
            ColumnAccessor::max,
            entries,
        ),
        Expectation::MinBetween { entries } => check_statistic_between(
            accessor,
            ExpectationKind::MinBetween,
            "Min",
            ColumnAccessor::min,
            entries,
        ),
        Expectation::StdLessThan { entries } => check_std_less_than(accessor, entries),
        Expectation::ValueLengthsBetween { entries } => check_value_lengths(accessor, entries),
        Expectation::RowCountBetween { min, max } => check_row_count(accessor, *min, *max),
        Expectation::ProportionUniqueBetween { entries } => {
            check_proportion_unique(accessor, entries)
        }
        Expectation::ColumnPairUnique { pairs } => check_pair_unique(accessor, pairs),
        Expectation::ValuesNotMatchRegex { entries } => {
            check_regex(accessor, ExpectationKind::ValuesNotMatchRegex, entries)
        }
        Expectation::ValuesMatchRegex { entries } => {
            check_regex(accessor, ExpectationKind::ValuesMatchRegex, entries)
        }
        Expectation::ValuesNotInSet { entries } => check_values_not_in_set(accessor, entries),
        Expectation::MostCommonValueIs { entries } => check_most_common(accessor, entries),
        Expectation::ColumnsMatchOrderedList { columns } => check_column_order(accessor, columns),
    }
}

/// CRITICAL outcome for a reference to a column the dataset does not have.
/// Emitting this suppresses the column's computation.
fn missing_column(kind: ExpectationKind, name: &str) -> Outcome {
    Outcome::fail(
        kind,
        Subject::column(name),
        Severity::Critical,
        format!("Column '{name}' does not exist"),
    )
}

fn compute_error(kind: ExpectationKind, subject: Subject, error: &ComputeError) -> Outcome {
    Outcome::error(kind, subject, format!("Computation failed: {error}"))
}

fn join_examples(examples: &BTreeSet<String>) -> String {
    examples
        .iter()
        .take(EXAMPLE_LIMIT)
        .map(|example| format!("'{example}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_column_exists(accessor: &ColumnAccessor<'_>, columns: &[String]) -> Vec<Outcome> {
    let kind = ExpectationKind::ColumnExists;
    columns
        .iter()
        .map(|column| {
            if accessor.exists(column) {
                Outcome::pass(kind, Subject::column(column), format!("Column exists: {column}"))
            } else {
                missing_column(kind, column)
            }
        })
        .collect()
}

fn check_no_nulls(accessor: &ColumnAccessor<'_>, columns: &[String]) -> Vec<Outcome> {
    let kind = ExpectationKind::NoNulls;
    let mut outcomes = Vec::new();
    for column in columns {
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let nulls = accessor.null_count(column);
        let message = format!("Column '{column}' nulls: {nulls}");
        let outcome = if nulls == 0 {
            Outcome::pass(kind, Subject::column(column), message)
        } else {
            Outcome::fail(kind, Subject::column(column), Severity::Warning, message)
        };
        outcomes.push(outcome.with_observed(Observed::Count(nulls as u64)));
    }
    outcomes
}

fn check_values_in_set(accessor: &ColumnAccessor<'_>, entries: &[ColumnValues]) -> Vec<Outcome> {
    let kind = ExpectationKind::ValuesInSet;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let allowed: BTreeSet<String> =
            entry.values.iter().map(|value| value.to_string()).collect();
        let mut invalid = 0u64;
        let mut examples = BTreeSet::new();
        for value in accessor.values(column) {
            if is_missing(&value) {
                continue;
            }
            let rendered = any_to_string(value);
            if !allowed.contains(&rendered) {
                invalid += 1;
                examples.insert(rendered);
            }
        }
        let outcome = if invalid == 0 {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("Column '{column}' values are in the allowed set"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!(
                    "Column '{column}' has {invalid} value(s) outside the allowed set: {}",
                    join_examples(&examples)
                ),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Count(invalid)));
    }
    outcomes
}

fn check_values_unique(accessor: &ColumnAccessor<'_>, columns: &[String]) -> Vec<Outcome> {
    let kind = ExpectationKind::ValuesUnique;
    let mut outcomes = Vec::new();
    for column in columns {
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let duplicates = accessor.duplicate_count(&[column.as_str()]) as u64;
        let outcome = if duplicates == 0 {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("Column '{column}' values are unique"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!("Column '{column}' has {duplicates} duplicate value(s)"),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Count(duplicates)));
    }
    outcomes
}

fn check_values_between(accessor: &ColumnAccessor<'_>, entries: &[ColumnRange]) -> Vec<Outcome> {
    let kind = ExpectationKind::ValuesBetween;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let mut outside = 0u64;
        let mut failed = None;
        for value in accessor.values(column) {
            if is_missing(&value) {
                continue;
            }
            match any_to_f64(&value) {
                Some(number) => {
                    if number < entry.min || number > entry.max {
                        outside += 1;
                    }
                }
                None => {
                    failed = Some(ComputeError::NotNumeric {
                        column: column.clone(),
                        value: any_to_string(value),
                    });
                    break;
                }
            }
        }
        if let Some(error) = failed {
            outcomes.push(compute_error(kind, Subject::column(column), &error));
            continue;
        }
        let low = format_numeric(entry.min);
        let high = format_numeric(entry.max);
        let outcome = if outside == 0 {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("Column '{column}' values are in range [{low}, {high}]"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!("Column '{column}' has {outside} value(s) outside range [{low}, {high}]"),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Count(outside)));
    }
    outcomes
}

fn check_dtype(accessor: &ColumnAccessor<'_>, entries: &[ColumnDtype]) -> Vec<Outcome> {
    let kind = ExpectationKind::DtypeIs;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let actual = accessor.type_label(column);
        let outcome = if actual == entry.dtype {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("Column '{column}' dtype is {actual}"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!(
                    "Column '{column}' dtype is {actual}, expected {}",
                    entry.dtype
                ),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Text(actual.to_string())));
    }
    outcomes
}

fn check_statistic_between<'a>(
    accessor: &ColumnAccessor<'a>,
    kind: ExpectationKind,
    label: &str,
    stat: fn(&ColumnAccessor<'a>, &str) -> Result<f64, ComputeError>,
    entries: &[ColumnRange],
) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let value = match stat(accessor, column) {
            Ok(value) => value,
            Err(error) => {
                outcomes.push(compute_error(kind, Subject::column(column), &error));
                continue;
            }
        };
        let rendered = format_numeric(value);
        let outcome = if entry.min <= value && value <= entry.max {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("{label} of '{column}' is {rendered}"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!(
                    "{label} of '{column}' is {rendered} (expected [{}, {}])",
                    format_numeric(entry.min),
                    format_numeric(entry.max)
                ),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Number(value)));
    }
    outcomes
}

fn check_std_less_than(accessor: &ColumnAccessor<'_>, entries: &[ColumnThreshold]) -> Vec<Outcome> {
    let kind = ExpectationKind::StdLessThan;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let value = match accessor.std(column) {
            Ok(value) => value,
            Err(error) => {
                outcomes.push(compute_error(kind, Subject::column(column), &error));
                continue;
            }
        };
        let rendered = format_numeric(value);
        let outcome = if value <= entry.threshold {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("Std of '{column}' is {rendered}"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!(
                    "Std of '{column}' is {rendered} (expected <= {})",
                    format_numeric(entry.threshold)
                ),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Number(value)));
    }
    outcomes
}

fn check_value_lengths(
    accessor: &ColumnAccessor<'_>,
    entries: &[ColumnLengthRange],
) -> Vec<Outcome> {
    let kind = ExpectationKind::ValueLengthsBetween;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let mut outside = 0u64;
        for value in accessor.values(column) {
            if is_missing(&value) {
                continue;
            }
            let length = any_to_string(value).chars().count();
            if length < entry.min || length > entry.max {
                outside += 1;
            }
        }
        let outcome = if outside == 0 {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!(
                    "Value lengths of '{column}' are in range [{}, {}]",
                    entry.min, entry.max
                ),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!(
                    "Column '{column}' has {outside} value(s) with length outside range [{}, {}]",
                    entry.min, entry.max
                ),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Count(outside)));
    }
    outcomes
}

fn check_row_count(accessor: &ColumnAccessor<'_>, min: usize, max: usize) -> Vec<Outcome> {
    let kind = ExpectationKind::RowCountBetween;
    let rows = accessor.row_count();
    let outcome = if min <= rows && rows <= max {
        Outcome::pass(kind, Subject::Table, format!("Row count: {rows}"))
    } else {
        Outcome::fail(
            kind,
            Subject::Table,
            Severity::Critical,
            format!("Row count: {rows} (expected [{min}, {max}])"),
        )
    };
    vec![outcome.with_observed(Observed::Count(rows as u64))]
}

fn check_proportion_unique(
    accessor: &ColumnAccessor<'_>,
    entries: &[ColumnRange],
) -> Vec<Outcome> {
    let kind = ExpectationKind::ProportionUniqueBetween;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let rows = accessor.row_count();
        if rows == 0 {
            outcomes.push(compute_error(
                kind,
                Subject::column(column),
                &ComputeError::EmptyTable,
            ));
            continue;
        }
        let ratio = accessor.cardinality(column) as f64 / rows as f64;
        let rendered = format_numeric((ratio * 1000.0).round() / 1000.0);
        let outcome = if entry.min <= ratio && ratio <= entry.max {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("Unique ratio for '{column}': {rendered}"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!(
                    "Unique ratio for '{column}': {rendered} (expected [{}, {}])",
                    format_numeric(entry.min),
                    format_numeric(entry.max)
                ),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Number(ratio)));
    }
    outcomes
}

fn check_pair_unique(accessor: &ColumnAccessor<'_>, pairs: &[ColumnPair]) -> Vec<Outcome> {
    let kind = ExpectationKind::ColumnPairUnique;
    let mut outcomes = Vec::new();
    for pair in pairs {
        let mut absent = false;
        for column in [&pair.left, &pair.right] {
            if !accessor.exists(column) {
                outcomes.push(missing_column(kind, column));
                absent = true;
            }
        }
        if absent {
            continue;
        }
        let duplicates =
            accessor.duplicate_count(&[pair.left.as_str(), pair.right.as_str()]) as u64;
        let subject = Subject::pair(&pair.left, &pair.right);
        let outcome = if duplicates == 0 {
            Outcome::pass(
                kind,
                subject,
                format!(
                    "Column pair ('{}', '{}') values are unique",
                    pair.left, pair.right
                ),
            )
        } else {
            Outcome::fail(
                kind,
                subject,
                Severity::Warning,
                format!(
                    "Column pair ('{}', '{}') has {duplicates} duplicate row(s)",
                    pair.left, pair.right
                ),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Count(duplicates)));
    }
    outcomes
}

fn check_regex(
    accessor: &ColumnAccessor<'_>,
    kind: ExpectationKind,
    entries: &[ColumnPattern],
) -> Vec<Outcome> {
    let forbid = kind == ExpectationKind::ValuesNotMatchRegex;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        let pattern = &entry.pattern;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        // Forbidden patterns search anywhere; required patterns must match
        // the full rendered value.
        let compiled = if forbid {
            Regex::new(pattern)
        } else {
            Regex::new(&format!("^(?:{pattern})$"))
        };
        let regex = match compiled {
            Ok(regex) => regex,
            Err(error) => {
                outcomes.push(Outcome::error(
                    kind,
                    Subject::column(column),
                    format!("Computation failed: invalid pattern '{pattern}': {error}"),
                ));
                continue;
            }
        };
        let mut offending = 0u64;
        for value in accessor.values(column) {
            if is_missing(&value) {
                continue;
            }
            let rendered = any_to_string(value);
            let matched = regex.is_match(&rendered);
            if matched == forbid {
                offending += 1;
            }
        }
        let outcome = if offending == 0 {
            let message = if forbid {
                format!("Column '{column}' has no values matching pattern '{pattern}'")
            } else {
                format!("Column '{column}' values match pattern '{pattern}'")
            };
            Outcome::pass(kind, Subject::column(column), message)
        } else {
            let message = if forbid {
                format!("Column '{column}' has {offending} value(s) matching pattern '{pattern}'")
            } else {
                format!(
                    "Column '{column}' has {offending} value(s) not matching pattern '{pattern}'"
                )
            };
            Outcome::fail(kind, Subject::column(column), Severity::Warning, message)
        };
        outcomes.push(outcome.with_observed(Observed::Count(offending)));
    }
    outcomes
}

fn check_values_not_in_set(
    accessor: &ColumnAccessor<'_>,
    entries: &[ColumnValues],
) -> Vec<Outcome> {
    let kind = ExpectationKind::ValuesNotInSet;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        let forbidden: BTreeSet<String> =
            entry.values.iter().map(|value| value.to_string()).collect();
        let mut hits = 0u64;
        let mut examples = BTreeSet::new();
        for value in accessor.values(column) {
            if is_missing(&value) {
                continue;
            }
            let rendered = any_to_string(value);
            if forbidden.contains(&rendered) {
                hits += 1;
                examples.insert(rendered);
            }
        }
        let outcome = if hits == 0 {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("Column '{column}' has no forbidden values"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!(
                    "Column '{column}' has {hits} forbidden value(s): {}",
                    join_examples(&examples)
                ),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Count(hits)));
    }
    outcomes
}

fn check_most_common(
    accessor: &ColumnAccessor<'_>,
    entries: &[ColumnExpectedValue],
) -> Vec<Outcome> {
    let kind = ExpectationKind::MostCommonValueIs;
    let mut outcomes = Vec::new();
    for entry in entries {
        let column = &entry.column;
        if !accessor.exists(column) {
            outcomes.push(missing_column(kind, column));
            continue;
        }
        // Frequency plus first-seen row index: ties break to the value
        // encountered first in row order.
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for (idx, value) in accessor.values(column).into_iter().enumerate() {
            if is_missing(&value) {
                continue;
            }
            let slot = counts.entry(any_to_string(value)).or_insert((0, idx));
            slot.0 += 1;
        }
        let mode = counts
            .into_iter()
            .max_by(|a, b| a.1.0.cmp(&b.1.0).then(b.1.1.cmp(&a.1.1)))
            .map(|(value, _)| value);
        let mode = match mode {
            Some(mode) => mode,
            None => {
                outcomes.push(compute_error(
                    kind,
                    Subject::column(column),
                    &ComputeError::EmptyColumn {
                        column: column.clone(),
                    },
                ));
                continue;
            }
        };
        let expected = entry.value.to_string();
        let outcome = if mode == expected {
            Outcome::pass(
                kind,
                Subject::column(column),
                format!("Most common value in '{column}' is '{mode}'"),
            )
        } else {
            Outcome::fail(
                kind,
                Subject::column(column),
                Severity::Warning,
                format!("Most common value in '{column}' is '{mode}' (expected '{expected}')"),
            )
        };
        outcomes.push(outcome.with_observed(Observed::Text(mode)));
    }
    outcomes
}

fn check_column_order(accessor: &ColumnAccessor<'_>, expected: &[String]) -> Vec<Outcome> {
    let kind = ExpectationKind::ColumnsMatchOrderedList;
    let actual = accessor.column_order();
    let outcome = if actual == expected {
        Outcome::pass(kind, Subject::Table, "Column order matches expected")
    } else {
        Outcome::fail(
            kind,
            Subject::Table,
            Severity::Critical,
            format!(
                "Column order mismatch: expected [{}], found [{}]",
                expected.join(", "),
                actual.join(", ")
            ),
        )
    };
    vec![outcome]
}
