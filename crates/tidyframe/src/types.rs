use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse column typing used by every cleaning decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Integer or floating point values.
    Numeric,
    /// Everything else: text, booleans, categories, dates.
    Categorical,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of a single column, recomputed whenever a stage needs
/// to make a decision about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub column_type: ColumnType,
    pub row_count: usize,
    pub missing_count: usize,
    pub observed_count: usize,
    /// Always within `[0, 1]`; `0.0` for an empty column.
    pub missing_ratio: f64,
    /// Number of distinct observed values (categorical columns only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<usize>,
}

/// Kind of a cleaning decision recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// A column was removed from the table.
    Drop,
    /// Missing values were filled.
    Impute,
    /// Out-of-range values were clamped to IQR bounds.
    Cap,
    /// Duplicate rows were removed.
    Deduplicate,
}

impl ActionKind {
    /// Human-readable name for the action kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Drop => "Column Dropped",
            Self::Impute => "Values Imputed",
            Self::Cap => "Outliers Capped",
            Self::Deduplicate => "Duplicates Removed",
        }
    }
}

/// Strategy or bounds behind a [`CleaningAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDetail {
    /// Dropped because the missing ratio exceeded the threshold.
    MissingThreshold { missing_ratio: f64, threshold: f64 },
    /// Dropped because no value was observed at all.
    NoObservedValues,
    /// Filled with the median of the observed values.
    Median { value: f64 },
    /// Filled with the most frequent observed value.
    Mode { value: String },
    /// Clamped to `[lower, upper]`.
    Bounds { lower: f64, upper: f64 },
    /// Exact row duplicates, first occurrence kept.
    ExactDuplicates,
}

impl fmt::Display for ActionDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingThreshold {
                missing_ratio,
                threshold,
            } => write!(
                f,
                "{:.1}% missing (threshold {:.1}%)",
                missing_ratio * 100.0,
                threshold * 100.0
            ),
            Self::NoObservedValues => f.write_str("no observed values"),
            Self::Median { value } => write!(f, "median = {value}"),
            Self::Mode { value } => write!(f, "mode = '{value}'"),
            Self::Bounds { lower, upper } => write!(f, "bounds [{lower}, {upper}]"),
            Self::ExactDuplicates => f.write_str("exact duplicates, first occurrence kept"),
        }
    }
}

/// A single entry of the action log.
///
/// Actions are appended in the order they are applied and never mutated,
/// giving the report an audit trail of what was done to the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningAction {
    /// Affected column, or `None` for table-wide actions.
    pub column: Option<String>,
    pub action: ActionKind,
    pub detail: ActionDetail,
    pub count_affected: usize,
}

impl CleaningAction {
    pub fn drop(column: impl Into<String>, detail: ActionDetail, count_affected: usize) -> Self {
        Self {
            column: Some(column.into()),
            action: ActionKind::Drop,
            detail,
            count_affected,
        }
    }

    pub fn impute(column: impl Into<String>, detail: ActionDetail, count_affected: usize) -> Self {
        Self {
            column: Some(column.into()),
            action: ActionKind::Impute,
            detail,
            count_affected,
        }
    }

    pub fn cap(column: impl Into<String>, lower: f64, upper: f64, count_affected: usize) -> Self {
        Self {
            column: Some(column.into()),
            action: ActionKind::Cap,
            detail: ActionDetail::Bounds { lower, upper },
            count_affected,
        }
    }

    pub fn deduplicate(count_affected: usize) -> Self {
        Self {
            column: None,
            action: ActionKind::Deduplicate,
            detail: ActionDetail::ExactDuplicates,
            count_affected,
        }
    }

    /// One-line description used in logs and reports.
    pub fn describe(&self) -> String {
        match (&self.action, &self.column) {
            (ActionKind::Drop, Some(col)) => format!("Dropped column '{}' ({})", col, self.detail),
            (ActionKind::Impute, Some(col)) => format!(
                "Filled {} missing values in '{}' with {}",
                self.count_affected, col, self.detail
            ),
            (ActionKind::Cap, Some(col)) => format!(
                "Capped {} outliers in '{}' to {}",
                self.count_affected, col, self.detail
            ),
            (ActionKind::Deduplicate, _) => {
                format!("Removed {} duplicate rows", self.count_affected)
            }
            (kind, None) => format!("{}: {}", kind.display_name(), self.detail),
        }
    }
}

/// Mapping from a raw column label to its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub original: String,
    pub normalized: String,
}

impl ColumnRename {
    pub fn is_changed(&self) -> bool {
        self.original != self.normalized
    }
}

/// A value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub zeros: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub most_frequent: Option<String>,
    /// Up to three most frequent values, ties in first-appearance order.
    pub top_values: Vec<ValueCount>,
}

/// Per-column part of a [`DatasetStatistics`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub name: String,
    pub column_type: ColumnType,
    /// Storage type as reported by polars.
    pub dtype: String,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorical: Option<CategoricalSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutlierCount {
    pub column: String,
    pub count: usize,
    /// Share of the table's rows outside the fences (0 - 100).
    pub percentage: f64,
}

/// Whole-table snapshot captured before and after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub row_count: usize,
    pub column_count: usize,
    pub missing_cell_count: usize,
    pub duplicate_row_count: usize,
    pub numeric_column_count: usize,
    pub categorical_column_count: usize,
    /// Estimated in-memory size of the table.
    pub memory_bytes: usize,
    pub columns: Vec<ColumnStatistics>,
    /// IQR outlier counts for numeric columns, in column order.
    pub outliers: Vec<ColumnOutlierCount>,
}

impl DatasetStatistics {
    pub fn total_outliers(&self) -> usize {
        self.outliers.iter().map(|o| o.count).sum()
    }

    pub fn total_cells(&self) -> usize {
        self.row_count * self.column_count
    }

    /// Share of observed cells (0.0 - 1.0); `0.0` for an empty table.
    pub fn completeness(&self) -> f64 {
        let total = self.total_cells();
        if total == 0 {
            0.0
        } else {
            total.saturating_sub(self.missing_cell_count) as f64 / total as f64
        }
    }
}

/// What changed between the two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatisticsDiff {
    pub rows_removed: usize,
    pub columns_removed: usize,
    pub missing_cells_filled: usize,
    pub outliers_capped: usize,
    pub duplicates_removed: usize,
}

impl StatisticsDiff {
    /// Shape changes come from the snapshots, fill and cap counts from the
    /// action log.
    pub fn between(
        before: &DatasetStatistics,
        after: &DatasetStatistics,
        actions: &[CleaningAction],
    ) -> Self {
        let sum_of = |kind: ActionKind| -> usize {
            actions
                .iter()
                .filter(|a| a.action == kind)
                .map(|a| a.count_affected)
                .sum()
        };

        Self {
            rows_removed: before.row_count.saturating_sub(after.row_count),
            columns_removed: before.column_count.saturating_sub(after.column_count),
            missing_cells_filled: sum_of(ActionKind::Impute),
            outliers_capped: sum_of(ActionKind::Cap),
            duplicates_removed: sum_of(ActionKind::Deduplicate),
        }
    }
}

/// Terminal output of a pipeline run.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub cleaned_table: DataFrame,
    pub action_log: Vec<CleaningAction>,
    pub statistics_before: DatasetStatistics,
    pub statistics_after: DatasetStatistics,
    pub column_mapping: Vec<ColumnRename>,
    /// Warning-level conditions encountered during the run.
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

impl CleaningOutcome {
    pub fn diff(&self) -> StatisticsDiff {
        StatisticsDiff::between(
            &self.statistics_before,
            &self.statistics_after,
            &self.action_log,
        )
    }

    /// Actions of one kind, in log order.
    pub fn actions_of(&self, kind: ActionKind) -> impl Iterator<Item = &CleaningAction> {
        self.action_log.iter().filter(move |a| a.action == kind)
    }
}

// ============================================================================
// Tests
// ============================================================================
