//! Shared utilities for the cleaning pipeline.
//!
//! Cell-level helpers used by several stages: missing-value masks,
//! observed-value extraction, frequency tables and quantiles.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds a nested collection per cell (lists, arrays).
///
/// Polars cannot cast these to strings, so they are rendered with
/// [`render_as_string`] instead.
#[inline]
pub fn is_nested_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::List(_) | DataType::Array(_, _))
}

/// Check if a DataType is a floating point type (the only types that can hold NaN).
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

// =============================================================================
// Missing Values
// =============================================================================

/// Tokens treated as missing when parsing delimited text. Empty fields are
/// always missing.
pub const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Per-row missing flags: null cells, plus NaN cells in float columns.
pub fn missing_mask(series: &Series) -> PolarsResult<Vec<bool>> {
    if is_float_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        let chunked = floats.f64()?;
        Ok(chunked
            .into_iter()
            .map(|v| v.is_none_or(|x| x.is_nan()))
            .collect())
    } else {
        let nulls = series.is_null();
        Ok(nulls.into_iter().map(|v| v.unwrap_or(false)).collect())
    }
}

/// Number of missing cells in a Series.
pub fn missing_count(series: &Series) -> PolarsResult<usize> {
    if is_float_dtype(series.dtype()) {
        Ok(missing_mask(series)?.into_iter().filter(|m| *m).count())
    } else {
        Ok(series.null_count())
    }
}

/// Observed (non-missing) values of a numeric Series as `f64`, in row order.
pub fn observed_f64_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let floats = series.cast(&DataType::Float64)?;
    let chunked = floats.f64()?;
    Ok(chunked
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

// =============================================================================
// Frequencies
// =============================================================================

/// A distinct observed value with its frequency and first row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFrequency {
    pub value: String,
    pub count: usize,
    pub first_index: usize,
}

/// Frequency table of the observed values of a Series.
///
/// Sorted by descending count; equal counts keep first-appearance order, so
/// the first entry is the mode with the tie-break applied.
pub fn value_frequencies(series: &Series) -> PolarsResult<Vec<ValueFrequency>> {
    let mask = missing_mask(series)?;
    let as_str = render_as_string(series)?;
    let chunked = as_str.str()?;

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut table: Vec<ValueFrequency> = Vec::new();

    for (i, (val, missing)) in chunked.into_iter().zip(mask).enumerate() {
        let Some(val) = val else { continue };
        if missing {
            continue;
        }
        match positions.get(val) {
            Some(&pos) => table[pos].count += 1,
            None => {
                positions.insert(val.to_string(), table.len());
                table.push(ValueFrequency {
                    value: val.to_string(),
                    count: 1,
                    first_index: i,
                });
            }
        }
    }

    // Stable sort keeps first-appearance order among ties.
    table.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(table)
}

/// Most frequent observed value, ties broken by first appearance.
pub fn mode(series: &Series) -> PolarsResult<Option<ValueFrequency>> {
    Ok(value_frequencies(series)?.into_iter().next())
}

// =============================================================================
// Rendering
// =============================================================================

/// String form of every cell, nulls kept. Nested cells are written out in
/// full (`[a, b]`) so distinct lists never render alike.
pub fn render_as_string(series: &Series) -> PolarsResult<Series> {
    if !is_nested_dtype(series.dtype()) {
        return series.cast(&DataType::String);
    }

    let rechunked = series.rechunk();
    let rendered: StringChunked = rechunked
        .iter()
        .map(|value| match value {
            AnyValue::Null => None,
            other => Some(render_any_value(&other)),
        })
        .collect();
    Ok(rendered.with_name(series.name().clone()).into_series())
}

fn render_any_value(value: &AnyValue) -> String {
    match value {
        AnyValue::List(inner) | AnyValue::Array(inner, _) => {
            let items: Vec<String> = inner
                .rechunk()
                .iter()
                .map(|item| render_any_value(&item))
                .collect();
            format!("[{}]", items.join(", "))
        }
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Copy of `df` in which nested columns are replaced by their string form.
pub fn comparable_frame(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut comparable = df.clone();
    for column in df.get_columns() {
        if is_nested_dtype(column.dtype()) {
            let rendered = render_as_string(column.as_materialized_series())?;
            comparable.replace(column.name().as_str(), rendered)?;
        }
    }
    Ok(comparable)
}

// =============================================================================
// Duplicates
// =============================================================================

const ROW_INDEX_COLUMN: &str = "#row";

/// Row positions of the first occurrence of every distinct row, ascending.
///
/// Rows are compared across all columns; nested cells compare by their
/// rendered form.
pub fn first_occurrence_rows(df: &DataFrame) -> PolarsResult<IdxCa> {
    let subset: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let unique = comparable_frame(df)?
        .with_row_index(PlSmallStr::from_static(ROW_INDEX_COLUMN), None)?
        .unique_stable(Some(&subset), UniqueKeepStrategy::First, None)?;

    Ok(unique
        .column(ROW_INDEX_COLUMN)?
        .as_materialized_series()
        .idx()?
        .clone())
}

// =============================================================================
// Order Statistics
// =============================================================================

/// Quantile of an ascending slice by linear interpolation between closest ranks
/// (`h = (n - 1) * q`).
pub fn quantile_linear(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Sort values ascending in place.
pub fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// Median of arbitrary-order values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sort_values(&mut sorted);
    quantile_linear(&sorted, 0.5)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Replace missing cells with `fill_value`; the result is Float64.
pub fn fill_numeric_missing(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let mask = missing_mask(series)?;
    let floats = series.cast(&DataType::Float64)?;
    let chunked = floats.f64()?;

    let filled: Vec<Option<f64>> = chunked
        .into_iter()
        .zip(mask)
        .map(|(val, missing)| if missing { Some(fill_value) } else { val })
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Replace missing cells with the value found at `source_row`, preserving the
/// column dtype.
pub fn fill_missing_from_row(series: &Series, source_row: usize) -> PolarsResult<Series> {
    let mask = missing_mask(series)?;
    let indices: Vec<IdxSize> = mask
        .into_iter()
        .enumerate()
        .map(|(i, missing)| if missing { source_row } else { i } as IdxSize)
        .collect();
    let idx = IdxCa::from_vec(PlSmallStr::from_static("idx"), indices);
    series.take(&idx)
}

// =============================================================================
// Tests
// =============================================================================
