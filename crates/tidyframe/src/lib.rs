//! Tabular Data Cleaning Library
//!
//! Automated cleaning of tabular datasets built on Polars, with a
//! before/after statistics report for every run.
//!
//! # Overview
//!
//! A single [`Pipeline::process`] call runs these stages in order:
//!
//! - **Column names**: labels are lowercased, separators become `_`, and
//!   collisions get numeric suffixes
//! - **Missing values**: mostly-empty columns are dropped, numeric gaps get the
//!   median, categorical gaps get the mode
//! - **Duplicates**: exact duplicate rows are removed, keeping the first
//! - **Outliers**: numeric values outside the IQR fences are clamped
//! - **Statistics**: snapshots of the table before and after cleaning
//!
//! Every change is recorded in the action log of the returned
//! [`CleaningOutcome`]. Anomalies that do not abort the run are collected as
//! warnings.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tidyframe::{CleaningConfig, Pipeline, loader::load_dataset};
//!
//! let df = load_dataset("data.csv")?;
//!
//! let config = CleaningConfig::builder()
//!     .missing_threshold(0.5)
//!     .iqr_multiplier(3.0)
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! for action in &outcome.action_log {
//!     println!("{}", action.describe());
//! }
//! ```
//!
//! # Reports
//!
//! [`ReportGenerator`] writes the cleaned table as CSV, a JSON report and a
//! self-contained HTML dashboard.

pub mod cleaner;
pub mod config;
pub mod decisions;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DuplicateEliminator, normalize_column_names};
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError, ZeroIqrPolicy};
pub use decisions::{CleaningDecision, DropReason, decide};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::{MissingValueResolver, StatisticalImputer};
pub use loader::{DatasetFormat, load_dataset};
pub use pipeline::{
    ClosureProgressReporter, CleaningStage, IqrBounds, OutlierCapper, Pipeline, PipelineBuilder,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::{DataProfiler, StatisticsCollector};
pub use reporting::{CleaningReport, CleaningSummaryReport, ReportGenerator};
pub use types::{
    ActionDetail, ActionKind, CleaningAction, CleaningOutcome, ColumnProfile, ColumnRename,
    ColumnStatistics, ColumnType, DatasetStatistics, StatisticsDiff,
};
