//! Statistical summaries for column profiling.

use crate::types::{CategoricalSummary, NumericSummary, ValueCount};
use crate::utils::{ValueFrequency, median};

/// Number of values listed in a categorical summary.
const TOP_VALUES: usize = 3;

/// Summarize observed numeric values. `None` when nothing was observed.
pub(crate) fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }

    let mean = calculate_mean(values);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(NumericSummary {
        mean,
        median: median(values).unwrap_or(mean),
        std: calculate_std(values),
        min,
        max,
        zeros: values.iter().filter(|v| **v == 0.0).count(),
    })
}

/// Summarize a frequency table (as produced by `utils::value_frequencies`).
pub(crate) fn categorical_summary(frequencies: &[ValueFrequency]) -> CategoricalSummary {
    CategoricalSummary {
        most_frequent: frequencies.first().map(|f| f.value.clone()),
        top_values: frequencies
            .iter()
            .take(TOP_VALUES)
            .map(|f| ValueCount {
                value: f.value.clone(),
                count: f.count,
            })
            .collect(),
    }
}

pub(crate) fn calculate_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; `0.0` for fewer than two values.
pub(crate) fn calculate_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }

    let mean = calculate_mean(values);
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
