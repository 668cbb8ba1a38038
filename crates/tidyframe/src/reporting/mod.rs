//! Report generation module.
//!
//! Turns a [`CleaningOutcome`](crate::types::CleaningOutcome) into output
//! files: the cleaned table as CSV and xlsx, a JSON [`CleaningReport`] and a
//! standalone HTML dashboard.
//!
//! # Example
//!
//! ```rust,ignore
//! use tidyframe::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report("data/sales.csv", None, &outcome, &config);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new("sales_output");
//! generator.write_cleaned_csv(&outcome.cleaned_table)?;
//! generator.write_cleaned_excel(&outcome.cleaned_table)?;
//! generator.write_dashboard(&outcome, "Sales")?;
//! generator.write_report_to_file(&report, "sales")?;
//! ```

mod generator;
pub mod html;

pub use generator::{
    CLEANED_DATA_FILE, CLEANED_EXCEL_FILE, CleaningReport, CleaningSummaryReport, DASHBOARD_FILE,
    ReportGenerator,
};
pub use html::dashboard_html;
