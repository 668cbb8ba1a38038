//! Statistical imputation methods.
//!
//! Median for numeric columns, mode for everything else.

use crate::types::{ActionDetail, CleaningAction};
use crate::utils::{
    fill_missing_from_row, fill_numeric_missing, median, missing_count, mode,
    observed_f64_values,
};
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing cells of a numeric column with the median of its observed
    /// values. The column becomes Float64.
    ///
    /// Returns `None` when the column has nothing to fill or no observed value.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
    ) -> Result<Option<CleaningAction>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let missing = missing_count(&series)?;
        if missing == 0 {
            return Ok(None);
        }

        let Some(median_val) = median(&observed_f64_values(&series)?) else {
            return Ok(None);
        };

        let filled = fill_numeric_missing(&series, median_val)?;
        df.replace(col_name, filled)?;

        debug!("Filled {} values in '{}' with median {}", missing, col_name, median_val);
        Ok(Some(CleaningAction::impute(
            col_name,
            ActionDetail::Median { value: median_val },
            missing,
        )))
    }

    /// Fill missing cells with the most frequent observed value, keeping the
    /// column dtype.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
    ) -> Result<Option<CleaningAction>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let missing = missing_count(&series)?;
        if missing == 0 {
            return Ok(None);
        }

        let Some(mode_val) = mode(&series)? else {
            return Ok(None);
        };

        let filled = fill_missing_from_row(&series, mode_val.first_index)?;
        df.replace(col_name, filled)?;

        debug!("Filled {} values in '{}' with mode '{}'", missing, col_name, mode_val.value);
        Ok(Some(CleaningAction::impute(
            col_name,
            ActionDetail::Mode {
                value: mode_val.value,
            },
            missing,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_imputation() {
        let mut df = df! {
            "age" => &[Some(10i64), None, Some(30), Some(20), None, Some(40)],
        }
        .unwrap();

        let action = StatisticalImputer::apply_numeric_median(&mut df, "age")
            .unwrap()
            .unwrap();

        assert_eq!(action.count_affected, 2);
        assert_eq!(action.detail, ActionDetail::Median { value: 25.0 });

        let col = df.column("age").unwrap();
        assert_eq!(col.dtype(), &DataType::Float64);
        assert_eq!(col.null_count(), 0);
        let values: Vec<f64> = col
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec![10.0, 25.0, 30.0, 20.0, 25.0, 40.0]);
    }

    #[test]
    fn test_median_imputation_fills_nan() {
        let mut df = df! {
            "score" => &[1.0f64, f64::NAN, 3.0],
        }
        .unwrap();

        let action = StatisticalImputer::apply_numeric_median(&mut df, "score")
            .unwrap()
            .unwrap();

        assert_eq!(action.count_affected, 1);
        let value = df
            .column("score")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(1);
        assert_eq!(value, Some(2.0));
    }

    #[test]
    fn test_mode_imputation_tie_uses_first_seen() {
        let mut df = df! {
            "color" => &[Some("blue"), Some("red"), None, Some("red"), Some("blue")],
        }
        .unwrap();

        let action = StatisticalImputer::apply_mode_imputation(&mut df, "color")
            .unwrap()
            .unwrap();

        assert_eq!(
            action.detail,
            ActionDetail::Mode {
                value: "blue".to_string()
            }
        );
        let col = df.column("color").unwrap();
        assert_eq!(col.dtype(), &DataType::String);
        assert_eq!(
            col.as_materialized_series().str().unwrap().get(2),
            Some("blue")
        );
    }

    #[test]
    fn test_nothing_missing_returns_none() {
        let mut df = df! {
            "x" => &[1i64, 2, 3],
        }
        .unwrap();

        assert!(
            StatisticalImputer::apply_numeric_median(&mut df, "x")
                .unwrap()
                .is_none()
        );
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::Int64);
    }
}
