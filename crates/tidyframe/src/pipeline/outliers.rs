//! Outlier capping module.
//!
//! Detects outliers in numeric columns with the interquartile-range rule and
//! clamps them to the fence values.

use crate::config::{CleaningConfig, ZeroIqrPolicy};
use crate::error::CleaningError;
use crate::types::CleaningAction;
use crate::utils::{is_numeric_dtype, observed_f64_values, quantile_linear, sort_values};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, warn};

/// Quartiles and fences of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Compute bounds from ascending values. `None` when there are no values.
    pub fn from_sorted(sorted: &[f64], multiplier: f64) -> Option<Self> {
        let q1 = quantile_linear(sorted, 0.25)?;
        let q3 = quantile_linear(sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// Compute bounds from values in any order.
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        let mut sorted = values.to_vec();
        sort_values(&mut sorted);
        Self::from_sorted(&sorted, multiplier)
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Whether `value` lies within `[lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    /// Number of values outside the fences.
    pub fn count_outside(&self, values: &[f64]) -> usize {
        values.iter().filter(|v| !self.contains(**v)).count()
    }

    /// Whether the configured policy leaves a column with these bounds alone.
    pub fn is_skipped_by(&self, config: &CleaningConfig) -> bool {
        config.zero_iqr_policy == ZeroIqrPolicy::Skip && self.iqr() <= config.min_iqr
    }
}

/// Clamps numeric outliers to their IQR fences.
pub struct OutlierCapper;

impl OutlierCapper {
    /// Cap outliers in every numeric column of `df`.
    ///
    /// Returns one action per column in which at least one value changed.
    /// Numeric columns holding infinite values are left untouched and
    /// reported through `warnings`.
    pub fn cap_outliers(
        df: &mut DataFrame,
        config: &CleaningConfig,
        warnings: &mut Vec<CleaningError>,
    ) -> Result<Vec<CleaningAction>> {
        let mut actions = Vec::new();
        let col_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for name in &col_names {
            let series = df.column(name)?.as_materialized_series().clone();
            if !is_numeric_dtype(series.dtype()) {
                continue;
            }

            let values = observed_f64_values(&series)?;
            if values.iter().any(|v| !v.is_finite()) {
                warn!("Column '{}' holds non-finite values, not capping", name);
                warnings.push(CleaningError::NonNumericOutlierTarget(name.clone()));
                continue;
            }

            let Some(bounds) = IqrBounds::from_values(&values, config.iqr_multiplier) else {
                continue;
            };

            if bounds.is_skipped_by(config) {
                debug!(
                    "Skipping '{}': IQR {} at or below minimum {}",
                    name,
                    bounds.iqr(),
                    config.min_iqr
                );
                continue;
            }

            let outliers = bounds.count_outside(&values);
            if outliers == 0 {
                continue;
            }

            let float_series = series.cast(&DataType::Float64)?;
            let capped = float_series
                .f64()?
                .apply(|v| v.map(|val| bounds.clamp(val)));
            df.replace(name, capped.into_series())?;

            debug!(
                "Capped {} outliers in '{}' to [{}, {}]",
                outliers, name, bounds.lower, bounds.upper
            );
            actions.push(CleaningAction::cap(
                name.as_str(),
                bounds.lower,
                bounds.upper,
                outliers,
            ));
        }

        Ok(actions)
    }
}
