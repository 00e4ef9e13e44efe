//! Integration tests for the evaluation engine.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use assure_model::{
    ColumnDtype, ColumnExpectedValue, ColumnLengthRange, ColumnPair, ColumnPattern, ColumnRange,
    ColumnThreshold, ColumnValues, ConfigError, Expectation, Observed, ScalarValue, Severity,
    Subject, Verdict,
};
use assure_report::OverallStatus;
use assure_validate::{ColumnAccessor, evaluate, validate, validate_source};

fn people_frame() -> DataFrame {
    DataFrame::new(vec![
        Series::new("id".into(), vec![1i64, 2, 3, 4]).into_column(),
        Series::new("age".into(), vec![Some(10i64), Some(20), Some(30), None]).into_column(),
        Series::new("name".into(), vec!["ada", "bob", "cal", "dee"]).into_column(),
    ])
    .expect("frame")
}

fn range_entry(column: &str, min: f64, max: f64) -> ColumnRange {
    ColumnRange {
        column: column.to_string(),
        min,
        max,
    }
}

#[test]
fn missing_column_yields_one_critical_outcome_per_kind() {
    let df = people_frame();
    let accessor = ColumnAccessor::new(&df);
    let ghost = "ghost".to_string();
    let instances = vec![
        Expectation::ColumnExists {
            columns: vec![ghost.clone()],
        },
        Expectation::NoNulls {
            columns: vec![ghost.clone()],
        },
        Expectation::ValuesInSet {
            entries: vec![ColumnValues {
                column: ghost.clone(),
                values: vec![ScalarValue::Str("x".to_string())],
            }],
        },
        Expectation::ValuesUnique {
            columns: vec![ghost.clone()],
        },
        Expectation::ValuesBetween {
            entries: vec![range_entry("ghost", 0.0, 1.0)],
        },
        Expectation::DtypeIs {
            entries: vec![ColumnDtype {
                column: ghost.clone(),
                dtype: "int64".to_string(),
            }],
        },
        Expectation::MeanBetween {
            entries: vec![range_entry("ghost", 0.0, 1.0)],
        },
        Expectation::MedianBetween {
            entries: vec![range_entry("ghost", 0.0, 1.0)],
        },
        Expectation::MaxBetween {
            entries: vec![range_entry("ghost", 0.0, 1.0)],
        },
        Expectation::MinBetween {
            entries: vec![range_entry("ghost", 0.0, 1.0)],
        },
        Expectation::StdLessThan {
            entries: vec![ColumnThreshold {
                column: ghost.clone(),
                threshold: 1.0,
            }],
        },
        Expectation::ValueLengthsBetween {
            entries: vec![ColumnLengthRange {
                column: ghost.clone(),
                min: 0,
                max: 10,
            }],
        },
        Expectation::ProportionUniqueBetween {
            entries: vec![range_entry("ghost", 0.0, 1.0)],
        },
        Expectation::ValuesNotMatchRegex {
            entries: vec![ColumnPattern {
                column: ghost.clone(),
                pattern: r"\d".to_string(),
            }],
        },
        Expectation::ValuesMatchRegex {
            entries: vec![ColumnPattern {
                column: ghost.clone(),
                pattern: "[a-z]+".to_string(),
            }],
        },
        Expectation::ValuesNotInSet {
            entries: vec![ColumnValues {
                column: ghost.clone(),
                values: vec![ScalarValue::Str("x".to_string())],
            }],
        },
        Expectation::MostCommonValueIs {
            entries: vec![ColumnExpectedValue {
                column: ghost.clone(),
                value: ScalarValue::Str("x".to_string()),
            }],
        },
    ];

    for instance in instances {
        let outcomes = evaluate(&accessor, &instance);
        assert_eq!(outcomes.len(), 1, "kind {}", instance.kind().key());
        let outcome = &outcomes[0];
        assert_eq!(outcome.severity, Severity::Critical);
        assert_eq!(outcome.verdict, Verdict::Fail);
        assert_eq!(outcome.subject, Subject::column("ghost"));
        assert_eq!(outcome.message, "Column 'ghost' does not exist");
    }
}

#[test]
fn pair_with_one_missing_member_reports_that_column_only() {
    let df = people_frame();
    let accessor = ColumnAccessor::new(&df);
    let outcomes = evaluate(
        &accessor,
        &Expectation::ColumnPairUnique {
            pairs: vec![ColumnPair {
                left: "id".to_string(),
                right: "ghost".to_string(),
            }],
        },
    );
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].subject, Subject::column("ghost"));
    assert_eq!(outcomes[0].severity, Severity::Critical);
}

#[test]
fn values_between_degenerate_range_matches_constant_column() {
    let df = DataFrame::new(vec![
        Series::new("v".into(), vec![7i64, 7, 7]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);

    let pass = evaluate(
        &accessor,
        &Expectation::ValuesBetween {
            entries: vec![range_entry("v", 7.0, 7.0)],
        },
    );
    assert_eq!(pass[0].verdict, Verdict::Pass);
    assert_eq!(pass[0].severity, Severity::Info);

    let df = DataFrame::new(vec![
        Series::new("v".into(), vec![7i64, 8, 7]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);
    let fail = evaluate(
        &accessor,
        &Expectation::ValuesBetween {
            entries: vec![range_entry("v", 7.0, 7.0)],
        },
    );
    assert_eq!(fail[0].verdict, Verdict::Fail);
    assert_eq!(fail[0].observed, Some(Observed::Count(1)));
}

#[test]
fn row_count_boundary_is_inclusive_and_critical_on_miss() {
    let df = people_frame();
    let accessor = ColumnAccessor::new(&df);

    let at_low = evaluate(&accessor, &Expectation::RowCountBetween { min: 4, max: 10 });
    assert_eq!(at_low[0].verdict, Verdict::Pass);

    let below_low = evaluate(&accessor, &Expectation::RowCountBetween { min: 5, max: 10 });
    assert_eq!(below_low[0].verdict, Verdict::Fail);
    assert_eq!(below_low[0].severity, Severity::Critical);
    assert_eq!(below_low[0].subject, Subject::Table);
}

#[test]
fn pair_uniqueness_counts_all_but_first_duplicates() {
    let df = DataFrame::new(vec![
        Series::new("a".into(), vec!["x", "x", "y"]).into_column(),
        Series::new("b".into(), vec!["1", "1", "2"]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);
    let outcomes = evaluate(
        &accessor,
        &Expectation::ColumnPairUnique {
            pairs: vec![ColumnPair {
                left: "a".to_string(),
                right: "b".to_string(),
            }],
        },
    );
    assert_eq!(outcomes[0].verdict, Verdict::Fail);
    assert_eq!(outcomes[0].observed, Some(Observed::Count(1)));

    let distinct = DataFrame::new(vec![
        Series::new("a".into(), vec!["x", "x", "y"]).into_column(),
        Series::new("b".into(), vec!["1", "2", "1"]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&distinct);
    let outcomes = evaluate(
        &accessor,
        &Expectation::ColumnPairUnique {
            pairs: vec![ColumnPair {
                left: "a".to_string(),
                right: "b".to_string(),
            }],
        },
    );
    assert_eq!(outcomes[0].verdict, Verdict::Pass);
}

#[test]
fn mode_ties_break_to_first_encountered_value() {
    let df = DataFrame::new(vec![
        Series::new("grade".into(), vec!["a", "a", "b", "b"]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);

    let expecting_a = evaluate(
        &accessor,
        &Expectation::MostCommonValueIs {
            entries: vec![ColumnExpectedValue {
                column: "grade".to_string(),
                value: ScalarValue::Str("a".to_string()),
            }],
        },
    );
    assert_eq!(expecting_a[0].verdict, Verdict::Pass);

    let expecting_b = evaluate(
        &accessor,
        &Expectation::MostCommonValueIs {
            entries: vec![ColumnExpectedValue {
                column: "grade".to_string(),
                value: ScalarValue::Str("b".to_string()),
            }],
        },
    );
    assert_eq!(expecting_b[0].verdict, Verdict::Fail);
    assert_eq!(expecting_b[0].observed, Some(Observed::Text("a".to_string())));
}

#[test]
fn permuted_column_order_fails_critical() {
    let df = people_frame();
    let accessor = ColumnAccessor::new(&df);
    let outcomes = evaluate(
        &accessor,
        &Expectation::ColumnsMatchOrderedList {
            columns: vec!["age".to_string(), "id".to_string(), "name".to_string()],
        },
    );
    assert_eq!(outcomes[0].verdict, Verdict::Fail);
    assert_eq!(outcomes[0].severity, Severity::Critical);

    let exact = evaluate(
        &accessor,
        &Expectation::ColumnsMatchOrderedList {
            columns: vec!["id".to_string(), "age".to_string(), "name".to_string()],
        },
    );
    assert_eq!(exact[0].verdict, Verdict::Pass);
}

#[test]
fn nulls_are_counted_but_excluded_from_range_checks() {
    let df = people_frame();
    let suite = vec![
        Expectation::NoNulls {
            columns: vec!["age".to_string()],
        },
        Expectation::ValuesBetween {
            entries: vec![range_entry("age", 0.0, 100.0)],
        },
    ];
    let report = validate("people", &df, &suite).expect("run");
    let outcomes = report.outcomes();
    assert_eq!(outcomes.len(), 2);

    assert_eq!(outcomes[0].verdict, Verdict::Fail);
    assert_eq!(outcomes[0].severity, Severity::Warning);
    assert_eq!(outcomes[0].message, "Column 'age' nulls: 1");

    assert_eq!(outcomes[1].verdict, Verdict::Pass);
    assert_eq!(outcomes[1].severity, Severity::Info);
}

#[test]
fn computation_errors_are_isolated() {
    let df = people_frame();
    let suite = vec![
        Expectation::MeanBetween {
            entries: vec![range_entry("name", 0.0, 1.0)],
        },
        Expectation::ColumnExists {
            columns: vec!["id".to_string()],
        },
    ];
    let report = validate("people", &df, &suite).expect("run");
    let outcomes = report.outcomes();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].verdict, Verdict::Error);
    assert_eq!(outcomes[0].severity, Severity::Critical);
    assert!(outcomes[0].message.contains("not numeric"));
    assert_eq!(outcomes[1].verdict, Verdict::Pass);
}

#[test]
fn match_regex_is_anchored_and_not_match_searches_anywhere() {
    let df = DataFrame::new(vec![
        Series::new("code".into(), vec!["abc", "abc1"]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);

    let anchored = evaluate(
        &accessor,
        &Expectation::ValuesMatchRegex {
            entries: vec![ColumnPattern {
                column: "code".to_string(),
                pattern: "[a-z]+".to_string(),
            }],
        },
    );
    // "abc1" is a prefix match only, so the anchored check fails it.
    assert_eq!(anchored[0].verdict, Verdict::Fail);
    assert_eq!(anchored[0].observed, Some(Observed::Count(1)));

    let forbidden = evaluate(
        &accessor,
        &Expectation::ValuesNotMatchRegex {
            entries: vec![ColumnPattern {
                column: "code".to_string(),
                pattern: r"\d".to_string(),
            }],
        },
    );
    // The digit appears mid-value; an unanchored search still finds it.
    assert_eq!(forbidden[0].verdict, Verdict::Fail);
    assert_eq!(forbidden[0].observed, Some(Observed::Count(1)));
}

#[test]
fn set_membership_ignores_missing_cells() {
    let df = DataFrame::new(vec![
        Series::new("answer".into(), vec![Some("yes"), Some("no"), None]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);
    let outcomes = evaluate(
        &accessor,
        &Expectation::ValuesInSet {
            entries: vec![ColumnValues {
                column: "answer".to_string(),
                values: vec![
                    ScalarValue::Str("yes".to_string()),
                    ScalarValue::Str("no".to_string()),
                ],
            }],
        },
    );
    assert_eq!(outcomes[0].verdict, Verdict::Pass);
}

#[test]
fn dtype_check_compares_type_labels() {
    let df = people_frame();
    let accessor = ColumnAccessor::new(&df);
    let outcomes = evaluate(
        &accessor,
        &Expectation::DtypeIs {
            entries: vec![
                ColumnDtype {
                    column: "id".to_string(),
                    dtype: "int64".to_string(),
                },
                ColumnDtype {
                    column: "name".to_string(),
                    dtype: "int64".to_string(),
                },
            ],
        },
    );
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].verdict, Verdict::Pass);
    assert_eq!(outcomes[1].verdict, Verdict::Fail);
    assert!(outcomes[1].message.contains("dtype is str, expected int64"));
}

#[test]
fn proportion_unique_uses_row_count_denominator() {
    let df = DataFrame::new(vec![
        Series::new("tag".into(), vec![Some("x"), Some("y"), None, None]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);
    let outcomes = evaluate(
        &accessor,
        &Expectation::ProportionUniqueBetween {
            entries: vec![range_entry("tag", 0.5, 0.5)],
        },
    );
    // 2 distinct non-missing values over 4 rows.
    assert_eq!(outcomes[0].verdict, Verdict::Pass);
    assert_eq!(outcomes[0].observed, Some(Observed::Number(0.5)));
}

#[test]
fn transcript_line_count_and_determinism() {
    let df = people_frame();
    let suite = vec![
        Expectation::ColumnExists {
            columns: vec!["id".to_string(), "age".to_string()],
        },
        Expectation::RowCountBetween { min: 1, max: 10 },
    ];
    let first = validate("people", &df, &suite).expect("run");
    let second = validate("people", &df, &suite).expect("run");

    // Two fan-out outcomes plus the table outcome, plus header and time.
    assert_eq!(first.lines().len(), 3 + 2);

    let strip_time = |report: &assure_report::Report| {
        report
            .transcript()
            .lines()
            .filter(|line| !line.contains("Execution time"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip_time(&first), strip_time(&second));
}

#[test]
fn malformed_suite_aborts_before_evaluation() {
    let df = people_frame();
    let suite = vec![
        Expectation::ColumnExists {
            columns: vec!["id".to_string()],
        },
        Expectation::ValuesBetween {
            entries: vec![range_entry("age", 10.0, 0.0)],
        },
    ];
    assert!(matches!(
        validate("people", &df, &suite),
        Err(ConfigError::InvertedRange { .. })
    ));
}

#[test]
fn failing_producer_marks_run_failed() {
    let suite = vec![Expectation::RowCountBetween { min: 1, max: 10 }];
    let report = validate_source(
        "people",
        || anyhow::bail!("upstream transform exploded"),
        &suite,
    )
    .expect("run");
    assert!(report.is_failed());
    assert!(report.outcomes().is_empty());
    let summary = report.summary();
    assert_eq!(summary.overall_status, OverallStatus::Critical);
    assert_eq!(summary.total_checks, 0);
    assert!(
        report
            .transcript()
            .contains("[CRITICAL] Failed to execute data source: upstream transform exploded")
    );
}

#[test]
fn empty_column_mode_is_a_computation_error() {
    let df = DataFrame::new(vec![
        Series::new("empty".into(), vec![None::<&str>, None]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);
    let outcomes = evaluate(
        &accessor,
        &Expectation::MostCommonValueIs {
            entries: vec![ColumnExpectedValue {
                column: "empty".to_string(),
                value: ScalarValue::Str("x".to_string()),
            }],
        },
    );
    assert_eq!(outcomes[0].verdict, Verdict::Error);
}

#[test]
fn value_lengths_measure_rendered_form() {
    let df = DataFrame::new(vec![
        Series::new("code".into(), vec!["ab", "abcd", "a"]).into_column(),
    ])
    .expect("frame");
    let accessor = ColumnAccessor::new(&df);
    let outcomes = evaluate(
        &accessor,
        &Expectation::ValueLengthsBetween {
            entries: vec![ColumnLengthRange {
                column: "code".to_string(),
                min: 2,
                max: 4,
            }],
        },
    );
    assert_eq!(outcomes[0].verdict, Verdict::Fail);
    assert_eq!(outcomes[0].observed, Some(Observed::Count(1)));
}
