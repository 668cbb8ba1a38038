//! Error types for the cleaning pipeline.
//!
//! Whole-dataset failures (such as an empty input) abort the pipeline and are
//! returned to the caller. Stage-local anomalies use the same type but are
//! demoted to warnings on the [`CleaningOutcome`](crate::types::CleaningOutcome)
//! instead of being propagated.
//!
//! Errors are serializable so they can be emitted in machine-readable output.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// The input table has no rows or no columns.
    #[error("Empty input: {rows} rows x {columns} columns, nothing to clean")]
    EmptyInput { rows: usize, columns: usize },

    /// Every column exceeded the missing-value threshold and was dropped.
    #[error("All columns were dropped for missing values; the cleaned table is empty")]
    AllColumnsDropped,

    /// A column typed as numeric could not be used for IQR capping.
    #[error("Column '{0}' is not a valid numeric outlier target and was excluded from capping")]
    NonNumericOutlierTarget(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input file format cannot be loaded.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A cleaning stage failed unexpectedly.
    #[error("Cleaning stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet workbook could not be opened or read.
    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyInput { .. } => "EMPTY_INPUT",
            Self::AllColumnsDropped => "ALL_COLUMNS_DROPPED",
            Self::NonNumericOutlierTarget(_) => "NON_NUMERIC_OUTLIER_TARGET",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::StageFailed { .. } => "STAGE_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Excel(_) => "EXCEL_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error is a warning-level condition that never aborts the pipeline.
    pub fn is_warning(&self) -> bool {
        match self {
            Self::AllColumnsDropped | Self::NonNumericOutlierTarget(_) => true,
            Self::WithContext { source, .. } => source.is_warning(),
            _ => false,
        }
    }

    pub(crate) fn stage_failed(stage: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            reason: err.to_string(),
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, calamine::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Excel(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CleaningError::EmptyInput { rows: 0, columns: 3 }.error_code(),
            "EMPTY_INPUT"
        );
        assert_eq!(
            CleaningError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_warning() {
        assert!(CleaningError::AllColumnsDropped.is_warning());
        assert!(CleaningError::NonNumericOutlierTarget("x".to_string()).is_warning());
        assert!(!CleaningError::EmptyInput { rows: 0, columns: 0 }.is_warning());
        assert!(
            CleaningError::AllColumnsDropped
                .with_context("resolving missing values")
                .is_warning()
        );
    }

    #[test]
    fn test_empty_input_message() {
        let error = CleaningError::EmptyInput { rows: 0, columns: 4 };
        assert!(error.to_string().contains("0 rows x 4 columns"));
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::NonNumericOutlierTarget("price".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("NON_NUMERIC_OUTLIER_TARGET"));
        assert!(json.contains("price"));
    }

    #[test]
    fn test_with_context() {
        let error =
            CleaningError::ColumnNotFound("test".to_string()).with_context("During capping");
        assert!(error.to_string().contains("During capping"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
