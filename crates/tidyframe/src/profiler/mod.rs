//! Data profiling module.
//!
//! This module provides:
//! - Column typing (numeric vs categorical)
//! - Per-column profiles consumed by the cleaning decisions
//! - Whole-table statistics snapshots for the before/after report

mod statistics;

use crate::config::CleaningConfig;
use crate::error::CleaningError;
use crate::pipeline::outliers::IqrBounds;
use crate::types::{
    ColumnOutlierCount, ColumnProfile, ColumnStatistics, ColumnType, DatasetStatistics,
};
use crate::utils::{
    first_occurrence_rows, is_numeric_dtype, missing_count, observed_f64_values,
    value_frequencies,
};
use anyhow::Result;
use polars::prelude::*;

pub(crate) use statistics::{categorical_summary, numeric_summary};

/// Classify a polars dtype.
pub fn column_type_of(dtype: &DataType) -> ColumnType {
    if is_numeric_dtype(dtype) {
        ColumnType::Numeric
    } else {
        ColumnType::Categorical
    }
}

/// Data profiler for per-column decisions.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of a table, in column order.
    pub fn profile_columns(df: &DataFrame) -> Result<Vec<ColumnProfile>> {
        df.get_column_names()
            .iter()
            .map(|name| Self::profile_column(df, name))
            .collect()
    }

    /// Profile a single column.
    ///
    /// Fails with [`CleaningError::ColumnNotFound`] for an unknown name.
    pub fn profile_column(df: &DataFrame, col_name: &str) -> Result<ColumnProfile> {
        let series = df
            .column(col_name)
            .map_err(|_| CleaningError::ColumnNotFound(col_name.to_string()))?
            .as_materialized_series();
        let row_count = df.height();
        let missing = missing_count(series)?;
        let column_type = column_type_of(series.dtype());

        let cardinality = match column_type {
            ColumnType::Categorical => Some(value_frequencies(series)?.len()),
            ColumnType::Numeric => None,
        };

        Ok(ColumnProfile {
            name: col_name.to_string(),
            column_type,
            row_count,
            missing_count: missing,
            observed_count: row_count - missing,
            missing_ratio: if row_count > 0 {
                missing as f64 / row_count as f64
            } else {
                0.0
            },
            cardinality,
        })
    }
}

/// Captures [`DatasetStatistics`] snapshots.
pub struct StatisticsCollector;

impl StatisticsCollector {
    /// Compute a statistics snapshot of `df`. Pure read.
    ///
    /// Outlier counts follow the same IQR rule and zero-IQR policy as the
    /// capping stage.
    pub fn capture(df: &DataFrame, config: &CleaningConfig) -> Result<DatasetStatistics> {
        let row_count = df.height();
        let mut columns = Vec::with_capacity(df.width());
        let mut outliers = Vec::new();

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let column_type = column_type_of(series.dtype());
            let missing = missing_count(series)?;
            let frequencies = value_frequencies(series)?;

            let (numeric, categorical) = match column_type {
                ColumnType::Numeric => {
                    let values = observed_f64_values(series)?;
                    let finite: Vec<f64> =
                        values.iter().copied().filter(|v| v.is_finite()).collect();
                    let count = IqrBounds::from_values(&finite, config.iqr_multiplier)
                        .filter(|b| !b.is_skipped_by(config))
                        .map(|b| b.count_outside(&finite))
                        .unwrap_or(0);
                    outliers.push(ColumnOutlierCount {
                        column: series.name().to_string(),
                        count,
                        percentage: percentage_of(count, row_count),
                    });
                    (numeric_summary(&values), None)
                }
                ColumnType::Categorical => (None, Some(categorical_summary(&frequencies))),
            };

            columns.push(ColumnStatistics {
                name: series.name().to_string(),
                column_type,
                dtype: series.dtype().to_string(),
                missing_count: missing,
                missing_percentage: percentage_of(missing, row_count),
                unique_count: frequencies.len(),
                numeric,
                categorical,
            });
        }

        let numeric_column_count = columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Numeric)
            .count();

        Ok(DatasetStatistics {
            row_count,
            column_count: df.width(),
            missing_cell_count: columns.iter().map(|c| c.missing_count).sum(),
            duplicate_row_count: Self::count_duplicates(df)?,
            numeric_column_count,
            categorical_column_count: columns.len() - numeric_column_count,
            memory_bytes: df.estimated_size(),
            columns,
            outliers,
        })
    }

    /// Rows that repeat an earlier row across every column.
    pub fn count_duplicates(df: &DataFrame) -> Result<usize> {
        if df.width() == 0 {
            return Ok(0);
        }
        Ok(df.height() - first_occurrence_rows(df)?.len())
    }
}

/// `part` as a percentage of `total`; `0.0` when `total` is zero.
fn percentage_of(part: usize, total: usize) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_of() {
        assert_eq!(column_type_of(&DataType::Int32), ColumnType::Numeric);
        assert_eq!(column_type_of(&DataType::Float64), ColumnType::Numeric);
        assert_eq!(column_type_of(&DataType::String), ColumnType::Categorical);
        assert_eq!(column_type_of(&DataType::Boolean), ColumnType::Categorical);
    }

    #[test]
    fn test_profile_column_ratios() {
        let df = df! {
            "age" => &[Some(30.0f64), None, Some(f64::NAN), Some(40.0)],
            "city" => &[Some("a"), Some("b"), None, Some("a")],
        }
        .unwrap();

        let age = DataProfiler::profile_column(&df, "age").unwrap();
        assert_eq!(age.column_type, ColumnType::Numeric);
        assert_eq!(age.missing_count, 2);
        assert_eq!(age.observed_count, 2);
        assert_eq!(age.missing_ratio, 0.5);
        assert_eq!(age.cardinality, None);

        let city = DataProfiler::profile_column(&df, "city").unwrap();
        assert_eq!(city.column_type, ColumnType::Categorical);
        assert_eq!(city.missing_count, 1);
        assert_eq!(city.cardinality, Some(2));
    }

    #[test]
    fn test_profile_missing_column_errors() {
        let df = df! { "a" => &[1i64] }.unwrap();
        let err = DataProfiler::profile_column(&df, "b").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CleaningError>(),
            Some(CleaningError::ColumnNotFound(name)) if name == "b"
        ));
    }

    #[test]
    fn test_capture_basic_counts() {
        let df = df! {
            "x" => &[Some(1i64), Some(1), None, Some(100)],
            "s" => &[Some("a"), Some("a"), Some("b"), None],
        }
        .unwrap();

        let stats = StatisticsCollector::capture(&df, &CleaningConfig::default()).unwrap();

        assert_eq!(stats.row_count, 4);
        assert_eq!(stats.column_count, 2);
        assert_eq!(stats.missing_cell_count, 2);
        assert_eq!(stats.duplicate_row_count, 1);
        assert_eq!(stats.numeric_column_count, 1);
        assert_eq!(stats.categorical_column_count, 1);

        let s = &stats.columns[1];
        assert_eq!(s.unique_count, 2);
        assert_eq!(
            s.categorical.as_ref().unwrap().most_frequent.as_deref(),
            Some("a")
        );
        assert_eq!(stats.outliers.len(), 1);
        assert_eq!(stats.outliers[0].percentage, 0.0);
        assert!(stats.memory_bytes > 0);
    }

    #[test]
    fn test_capture_memory_tracks_table_size() {
        let small = df! { "x" => &[1i64, 2] }.unwrap();
        let large = df! { "x" => (0..1000i64).collect::<Vec<_>>() }.unwrap();
        let config = CleaningConfig::default();

        let small_stats = StatisticsCollector::capture(&small, &config).unwrap();
        let large_stats = StatisticsCollector::capture(&large, &config).unwrap();

        assert_eq!(small_stats.memory_bytes, small.estimated_size());
        assert!(large_stats.memory_bytes > small_stats.memory_bytes);
        assert_eq!(
            StatisticsCollector::capture(&DataFrame::empty(), &config)
                .unwrap()
                .memory_bytes,
            0
        );
    }

    #[test]
    fn test_capture_outlier_count() {
        let df = df! {
            "value" => &[1i64, 2, 2, 3, 4, 5, 100],
        }
        .unwrap();

        let stats = StatisticsCollector::capture(&df, &CleaningConfig::default()).unwrap();

        assert_eq!(stats.total_outliers(), 1);
        assert!((stats.outliers[0].percentage - 100.0 / 7.0).abs() < 1e-9);
        let summary = stats.columns[0].numeric.as_ref().unwrap();
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.max, 100.0);
    }

    #[test]
    fn test_count_duplicates_zero_columns() {
        let df = DataFrame::empty();
        assert_eq!(StatisticsCollector::count_duplicates(&df).unwrap(), 0);
    }
}
