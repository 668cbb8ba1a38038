//! Integration tests for the cleaning pipeline.
//!
//! These tests load fixture files from disk and run them end to end.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tidyframe::reporting::{CLEANED_DATA_FILE, CLEANED_EXCEL_FILE, DASHBOARD_FILE};
use tidyframe::{
    ActionDetail, ActionKind, CleaningConfig, CleaningError, CleaningOutcome, CleaningStage,
    DuplicateEliminator, IqrBounds, Pipeline, ReportGenerator, ZeroIqrPolicy, load_dataset,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> DataFrame {
    load_dataset(fixtures_path().join(filename)).expect("Failed to load fixture")
}

fn clean(df: DataFrame) -> CleaningOutcome {
    Pipeline::builder()
        .build()
        .unwrap()
        .process(df)
        .expect("Pipeline failed")
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

// ============================================================================
// End-to-end Scenarios
// ============================================================================

#[test]
fn test_mostly_missing_column_is_dropped() {
    let df = load_fixture("survey.csv");
    assert_eq!(df.shape(), (7, 3));

    let outcome = clean(df);

    assert_eq!(
        column_names(&outcome.cleaned_table),
        vec!["customer_id", "monthly_spend"]
    );
    assert_eq!(outcome.cleaned_table.height(), 7);

    let drops: Vec<_> = outcome.actions_of(ActionKind::Drop).collect();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].column.as_deref(), Some("notes"));
    assert_eq!(drops[0].count_affected, 7);

    // Median of the six observed spends
    let imputes: Vec<_> = outcome.actions_of(ActionKind::Impute).collect();
    assert_eq!(imputes.len(), 1);
    assert_eq!(imputes[0].detail, ActionDetail::Median { value: 105.875 });
    assert_eq!(
        outcome.cleaned_table.column("monthly_spend").unwrap().null_count(),
        0
    );
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_extreme_reading_is_capped() {
    let outcome = clean(load_fixture("sensor.csv"));

    let caps: Vec<_> = outcome.actions_of(ActionKind::Cap).collect();
    assert_eq!(caps.len(), 1);
    assert_eq!(caps[0].column.as_deref(), Some("reading"));
    assert_eq!(caps[0].count_affected, 1);
    assert_eq!(
        caps[0].detail,
        ActionDetail::Bounds {
            lower: -1.75,
            upper: 8.25
        }
    );

    assert_eq!(
        f64_values(&outcome.cleaned_table, "reading"),
        vec![1.0, 2.0, 2.0, 3.0, 4.0, 5.0, 8.25]
    );
    assert_eq!(outcome.statistics_before.total_outliers(), 1);
    assert_eq!(outcome.statistics_after.total_outliers(), 0);
}

#[test]
fn test_duplicate_orders_removed_after_imputation() {
    let df = load_fixture("orders.csv");
    assert_eq!(df.column("Quantity").unwrap().null_count(), 2);

    let outcome = clean(df);
    let cleaned = &outcome.cleaned_table;

    assert_eq!(cleaned.height(), 4);
    let dedup: Vec<_> = outcome.actions_of(ActionKind::Deduplicate).collect();
    assert_eq!(dedup.len(), 1);
    assert_eq!(dedup[0].count_affected, 1);
    assert_eq!(dedup[0].column, None);

    // apple and banana tie on count; apple appears first
    let products: Vec<Option<&str>> = cleaned
        .column("product")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        products,
        vec![Some("apple"), Some("banana"), Some("apple"), Some("apple")]
    );

    let order_ids = f64_values(cleaned, "order_id");
    assert_eq!(order_ids, vec![1.0, 2.0, 3.0, 4.0]);

    let quantities = f64_values(cleaned, "quantity");
    let bounds = IqrBounds::from_values(&[3.0, 3.0, 5.0, 2.0], 1.5).unwrap();
    assert!(quantities.iter().all(|v| bounds.contains(*v)));
    assert_eq!(outcome.statistics_after.duplicate_row_count, 0);
}

#[test]
fn test_header_only_file_is_empty_input() {
    let df = load_fixture("header_only.csv");
    assert_eq!(df.height(), 0);

    let result = Pipeline::builder().build().unwrap().process(df);

    match result {
        Err(CleaningError::EmptyInput { rows, columns }) => {
            assert_eq!(rows, 0);
            assert_eq!(columns, 2);
        }
        other => panic!("Expected EmptyInput, got {:?}", other.map(|o| o.action_log)),
    }
}

#[test]
fn test_messy_headers_are_normalized() {
    let outcome = clean(load_fixture("messy_headers.csv"));

    assert_eq!(
        column_names(&outcome.cleaned_table),
        vec!["first_name", "first_name_1", "unit_price", "column_3"]
    );
    assert_eq!(outcome.column_mapping.len(), 4);
    assert_eq!(outcome.column_mapping[2].original, "  Unit Price ");
    assert!(outcome.column_mapping.iter().all(|r| r.is_changed()));

    // Snapshots are taken after renaming
    let before: Vec<&str> = outcome
        .statistics_before
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(before, vec!["first_name", "first_name_1", "unit_price", "column_3"]);
}

#[test]
fn test_clean_dataset_has_empty_action_log() {
    let df = df! {
        "id" => &[1i64, 2, 3, 4],
        "label" => &["a", "b", "c", "d"],
    }
    .unwrap();

    let outcome = clean(df.clone());

    assert!(outcome.action_log.is_empty());
    assert!(outcome.warnings.is_empty());
    assert!(outcome.cleaned_table.equals(&df));
    assert_eq!(outcome.statistics_before, outcome.statistics_after);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_no_missing_values_survive() {
    for fixture in ["survey.csv", "orders.csv", "scores.tsv", "weather.ndjson"] {
        let outcome = clean(load_fixture(fixture));
        assert_eq!(
            outcome.statistics_after.missing_cell_count, 0,
            "missing values left in {}",
            fixture
        );
    }
}

#[test]
fn test_deduplication_is_idempotent() {
    let outcome = clean(load_fixture("orders.csv"));

    let (again, action) = DuplicateEliminator::eliminate(outcome.cleaned_table.clone()).unwrap();

    assert_eq!(action.count_affected, 0);
    assert!(again.equals(&outcome.cleaned_table));
}

#[test]
fn test_rerunning_cleaned_output_changes_nothing_structural() {
    let first = clean(load_fixture("survey.csv"));
    let second = clean(first.cleaned_table.clone());

    assert_eq!(second.actions_of(ActionKind::Drop).count(), 0);
    assert_eq!(second.actions_of(ActionKind::Impute).count(), 0);
    assert_eq!(second.actions_of(ActionKind::Deduplicate).count(), 0);
    assert_eq!(second.cleaned_table.shape(), first.cleaned_table.shape());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_lower_threshold_drops_more_columns() {
    let config = CleaningConfig::builder()
        .missing_threshold(0.1)
        .build()
        .unwrap();

    let outcome = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(load_fixture("survey.csv"))
        .unwrap();

    // 1/7 missing in monthly_spend is above 10%
    assert_eq!(column_names(&outcome.cleaned_table), vec!["customer_id"]);
    assert_eq!(outcome.actions_of(ActionKind::Drop).count(), 2);
}

#[test]
fn test_skip_policy_leaves_constant_columns() {
    let df = df! {
        "flag" => &[0i64, 0, 0, 0, 0, 0, 1],
    }
    .unwrap();
    let config = CleaningConfig::builder()
        .zero_iqr_policy(ZeroIqrPolicy::Skip)
        .build()
        .unwrap();

    let outcome = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(df)
        .unwrap();

    assert_eq!(outcome.actions_of(ActionKind::Cap).count(), 0);
    assert_eq!(outcome.statistics_after.total_outliers(), 0);
}

#[test]
fn test_config_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"missing_threshold": 0.5, "zero_iqr_policy": "skip"}"#).unwrap();

    let config = CleaningConfig::from_json_file(&path).unwrap();

    assert_eq!(config.missing_threshold, 0.5);
    assert_eq!(config.zero_iqr_policy, ZeroIqrPolicy::Skip);
    assert_eq!(config.iqr_multiplier, 1.5);
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_loads_tsv_with_markers() {
    let df = load_fixture("scores.tsv");

    assert_eq!(df.shape(), (4, 2));
    assert_eq!(df.column("score").unwrap().null_count(), 1);
}

#[test]
fn test_ndjson_pipeline() {
    let outcome = clean(load_fixture("weather.ndjson"));

    let imputes: Vec<_> = outcome.actions_of(ActionKind::Impute).collect();
    assert_eq!(imputes.len(), 2);
    assert!(imputes.iter().any(|a| a.detail == ActionDetail::Median { value: 20.25 }));
    assert!(imputes.iter().any(|a| a.detail
        == ActionDetail::Mode {
            value: "Paris".to_string()
        }));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let err = load_dataset(fixtures_path().join("notes.xml")).unwrap_err();
    assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
}

#[test]
fn test_json_list_field_is_cleaned() {
    let outcome = clean(load_fixture("events.json"));
    let table = &outcome.cleaned_table;

    assert_eq!(table.height(), 3);
    assert_eq!(outcome.diff().duplicates_removed, 1);
    assert!(matches!(
        table.column("tags").unwrap().dtype(),
        DataType::List(_)
    ));
    assert_eq!(table.column("tags").unwrap().null_count(), 0);

    let imputes: Vec<_> = outcome.actions_of(ActionKind::Impute).collect();
    assert_eq!(imputes.len(), 1);
    assert_eq!(imputes[0].column.as_deref(), Some("tags"));
    assert_eq!(
        imputes[0].detail,
        ActionDetail::Mode {
            value: "[c]".to_string()
        }
    );
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_date_and_list_columns_keep_their_dtype() {
    let visit = Series::new(
        "Visit Date".into(),
        &[Some(19000i32), None, Some(19000), Some(19001)],
    )
    .cast(&DataType::Date)
    .unwrap();
    let tags: ListChunked = [Some(vec!["x"]), Some(vec!["y", "z"]), None, Some(vec!["x"])]
        .into_iter()
        .map(|items| items.map(|items| Series::new("".into(), items)))
        .collect();
    let df = DataFrame::new(vec![
        visit.into_column(),
        tags.into_series().with_name("Tags".into()).into_column(),
        Series::new("Score".into(), &[1.0f64, 2.0, 3.0, 4.0]).into_column(),
    ])
    .unwrap();

    let outcome = clean(df);
    let table = &outcome.cleaned_table;

    assert_eq!(table.height(), 4);
    assert_eq!(table.column("visit_date").unwrap().dtype(), &DataType::Date);
    assert_eq!(table.column("visit_date").unwrap().null_count(), 0);
    assert!(matches!(
        table.column("tags").unwrap().dtype(),
        DataType::List(_)
    ));
    assert_eq!(table.column("tags").unwrap().null_count(), 0);

    let imputed: Vec<_> = outcome
        .actions_of(ActionKind::Impute)
        .map(|a| (a.column.clone().unwrap_or_default(), a.detail.clone()))
        .collect();
    assert_eq!(
        imputed,
        vec![
            (
                "visit_date".to_string(),
                ActionDetail::Mode {
                    value: "2022-01-08".to_string()
                }
            ),
            (
                "tags".to_string(),
                ActionDetail::Mode {
                    value: "[x]".to_string()
                }
            ),
        ]
    );
}

#[test]
fn test_excel_round_trip() {
    let dir = TempDir::new().unwrap();
    let df = df! {
        "id" => &[1i64, 2, 3],
        "city" => &[Some("Paris"), None, Some("Rome")],
        "active" => &[true, false, true],
        "reading" => &[1.5f64, f64::NAN, 3.25],
    }
    .unwrap();

    let path = ReportGenerator::new(dir.path())
        .write_cleaned_excel(&df)
        .unwrap();
    assert_eq!(path, dir.path().join(CLEANED_EXCEL_FILE));

    let reloaded = load_dataset(&path).unwrap();

    assert_eq!(reloaded.shape(), (3, 4));
    assert_eq!(column_names(&reloaded), vec!["id", "city", "active", "reading"]);
    assert!(reloaded.column("id").unwrap().dtype().is_numeric());
    assert_eq!(f64_values(&reloaded, "id"), vec![1.0, 2.0, 3.0]);
    assert_eq!(reloaded.column("city").unwrap().null_count(), 1);
    assert_eq!(reloaded.column("active").unwrap().dtype(), &DataType::Boolean);
    assert_eq!(reloaded.column("reading").unwrap().null_count(), 1);
    assert_eq!(f64_values(&reloaded, "reading"), vec![1.5, 3.25]);

    let outcome = clean(reloaded);
    assert_eq!(outcome.cleaned_table.height(), 3);
    assert_eq!(outcome.statistics_after.missing_cell_count, 0);
}

// ============================================================================
// Progress Reporting
// ============================================================================

#[test]
fn test_progress_stages_reported_in_order() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);

    Pipeline::builder()
        .on_progress(move |update| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .process(load_fixture("orders.csv"))
        .unwrap();

    let mut seen = stages.lock().unwrap().clone();
    seen.dedup();
    assert_eq!(
        seen,
        vec![
            CleaningStage::Normalizing,
            CleaningStage::Profiling,
            CleaningStage::ResolvingMissing,
            CleaningStage::Deduplicating,
            CleaningStage::CappingOutliers,
            CleaningStage::Summarizing,
            CleaningStage::Complete,
        ]
    );
}

// ============================================================================
// Output Files
// ============================================================================

#[test]
fn test_output_files_written() {
    let dir = TempDir::new().unwrap();
    let config = CleaningConfig::default();
    let outcome = clean(load_fixture("sensor.csv"));
    let generator = ReportGenerator::new(dir.path());

    let csv_path = generator.write_cleaned_csv(&outcome.cleaned_table).unwrap();
    let dashboard_path = generator.write_dashboard(&outcome, "sensor").unwrap();
    let report = ReportGenerator::build_report(
        "sensor.csv",
        Some(&csv_path.display().to_string()),
        &outcome,
        &config,
    );
    let report_path = generator.write_report_to_file(&report, "sensor").unwrap();

    assert_eq!(csv_path, dir.path().join(CLEANED_DATA_FILE));
    assert_eq!(dashboard_path, dir.path().join(DASHBOARD_FILE));
    assert_eq!(report_path, dir.path().join("sensor_report.json"));

    let reloaded = load_dataset(&csv_path).unwrap();
    assert!(reloaded.column("reading").unwrap().dtype().is_float());
    assert_eq!(f64_values(&reloaded, "reading").last().copied(), Some(8.25));

    let html = std::fs::read_to_string(&dashboard_path).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("reading"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["outliers_capped"], 1);
    assert_eq!(json["actions"][0]["action"], "cap");
}
