use crate::config::CleaningConfig;
use crate::reporting::html::dashboard_html;
use crate::types::{CleaningAction, CleaningOutcome, ColumnRename, DatasetStatistics};
use crate::utils::{comparable_frame, is_numeric_dtype, render_as_string};
use anyhow::Result;
use chrono::Local;
use polars::prelude::*;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// File name of the cleaned table inside the output directory.
pub const CLEANED_DATA_FILE: &str = "cleaned_data.csv";

/// File name of the cleaned workbook inside the output directory.
pub const CLEANED_EXCEL_FILE: &str = "cleaned_data.xlsx";

/// File name of the HTML dashboard inside the output directory.
pub const DASHBOARD_FILE: &str = "dashboard.html";

// ============================================================================
// Report Types
// ============================================================================

/// Machine-readable report of a cleaning run.
///
/// Use this for both JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the cleaned output file (if written)
    pub output_file: Option<String>,

    /// Headline numbers of the run
    pub summary: CleaningSummaryReport,

    /// Thresholds the run was made with
    pub config: CleaningConfig,

    /// Column label changes, one entry per input column
    pub column_mapping: Vec<ColumnRename>,

    /// Applied cleaning decisions, in order
    pub actions: Vec<CleaningAction>,

    pub statistics_before: DatasetStatistics,
    pub statistics_after: DatasetStatistics,
}

/// Summary numbers for the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSummaryReport {
    /// Total execution time in milliseconds
    pub duration_ms: u64,
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub columns_removed: usize,
    pub missing_before: usize,
    pub missing_after: usize,
    pub missing_cells_filled: usize,
    pub outliers_capped: usize,
    pub duplicates_removed: usize,
    /// Share of observed cells before cleaning (0.0-1.0)
    pub completeness_before: f64,
    /// Share of observed cells after cleaning (0.0-1.0)
    pub completeness_after: f64,
    /// Warnings generated during processing
    pub warnings: Vec<String>,
}

/// Writes cleaning results into an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    /// Create a new ReportGenerator writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Build a report from a cleaning outcome.
    pub fn build_report(
        input_file: &str,
        output_file: Option<&str>,
        outcome: &CleaningOutcome,
        config: &CleaningConfig,
    ) -> CleaningReport {
        let before = &outcome.statistics_before;
        let after = &outcome.statistics_after;
        let diff = outcome.diff();

        let summary = CleaningSummaryReport {
            duration_ms: outcome.duration_ms,
            rows_before: before.row_count,
            rows_after: after.row_count,
            rows_removed: diff.rows_removed,
            columns_before: before.column_count,
            columns_after: after.column_count,
            columns_removed: diff.columns_removed,
            missing_before: before.missing_cell_count,
            missing_after: after.missing_cell_count,
            missing_cells_filled: diff.missing_cells_filled,
            outliers_capped: diff.outliers_capped,
            duplicates_removed: diff.duplicates_removed,
            completeness_before: before.completeness(),
            completeness_after: after.completeness(),
            warnings: outcome.warnings.clone(),
        };

        CleaningReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(String::from),
            summary,
            config: config.clone(),
            column_mapping: outcome.column_mapping.clone(),
            actions: outcome.action_log.clone(),
            statistics_before: before.clone(),
            statistics_after: after.clone(),
        }
    }

    /// Write the cleaned table as CSV and return its path.
    ///
    /// List cells are written in their `[a, b]` text form.
    pub fn write_cleaned_csv(&self, df: &DataFrame) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(CLEANED_DATA_FILE);
        let mut file = File::create(&output_path)?;
        let mut flat = comparable_frame(df)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut flat)?;

        info!("Cleaned dataset saved: {}", output_path.display());
        Ok(output_path)
    }

    /// Write the cleaned table as a single-sheet xlsx workbook and return its
    /// path.
    ///
    /// Numbers and booleans keep their cell type, everything else is written
    /// as text. Missing cells (null or NaN) are left blank.
    pub fn write_cleaned_excel(&self, df: &DataFrame) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(CLEANED_EXCEL_FILE);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (idx, column) in df.get_columns().iter().enumerate() {
            let col = u16::try_from(idx)?;
            worksheet.write_string(0, col, column.name().as_str())?;
            write_sheet_column(worksheet, col, column.as_materialized_series())?;
        }
        workbook.save(&output_path)?;

        info!("Cleaned workbook saved: {}", output_path.display());
        Ok(output_path)
    }

    /// Render and write the HTML dashboard and return its path.
    pub fn write_dashboard(&self, outcome: &CleaningOutcome, title: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let dashboard_path = self.output_dir.join(DASHBOARD_FILE);
        let mut file = File::create(&dashboard_path)?;
        file.write_all(dashboard_html(outcome, title).as_bytes())?;

        info!("Dashboard saved: {}", dashboard_path.display());
        Ok(dashboard_path)
    }

    /// Write a report to a JSON file.
    ///
    /// If `report_base_name` is "sales", the file will be "sales_report.json".
    pub fn write_report_to_file(
        &self,
        report: &CleaningReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

fn write_sheet_column(worksheet: &mut Worksheet, col: u16, series: &Series) -> Result<()> {
    let dtype = series.dtype();
    if dtype.is_bool() {
        for (idx, value) in series.bool()?.into_iter().enumerate() {
            if let Some(value) = value {
                worksheet.write_boolean(sheet_row(idx)?, col, value)?;
            }
        }
    } else if is_numeric_dtype(dtype) {
        let numbers = series.cast(&DataType::Float64)?;
        for (idx, value) in numbers.f64()?.into_iter().enumerate() {
            if let Some(value) = value.filter(|v| v.is_finite()) {
                worksheet.write_number(sheet_row(idx)?, col, value)?;
            }
        }
    } else {
        let text = render_as_string(series)?;
        for (idx, value) in text.str()?.into_iter().enumerate() {
            if let Some(value) = value {
                worksheet.write_string(sheet_row(idx)?, col, value)?;
            }
        }
    }
    Ok(())
}

/// Worksheet row of a data row; row 0 holds the labels.
fn sheet_row(idx: usize) -> Result<u32> {
    Ok(u32::try_from(idx + 1)?)
}
