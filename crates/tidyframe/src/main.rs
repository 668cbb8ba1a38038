//! tidyframe CLI - clean a tabular dataset and report what changed.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tidyframe::reporting::{CLEANED_DATA_FILE, CLEANED_EXCEL_FILE};
use tidyframe::{
    CleaningConfig, CleaningConfigBuilder, CleaningOutcome, CleaningReport, Pipeline,
    ReportGenerator, ZeroIqrPolicy, load_dataset,
};
use tracing::{error, info};

/// CLI-compatible zero-IQR policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliZeroIqrPolicy {
    /// Cap against the collapsed bounds
    Cap,
    /// Leave near-constant columns untouched
    Skip,
}

impl From<CliZeroIqrPolicy> for ZeroIqrPolicy {
    fn from(cli: CliZeroIqrPolicy) -> Self {
        match cli {
            CliZeroIqrPolicy::Cap => ZeroIqrPolicy::Cap,
            CliZeroIqrPolicy::Skip => ZeroIqrPolicy::Skip,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data cleaning with before/after statistics",
    long_about = "Normalizes column names, resolves missing values, removes duplicate rows \
                  and caps numeric outliers, then writes the cleaned table with a report.\n\n\
                  EXAMPLES:\n  \
                  # Clean a CSV into ./sales_output/\n  \
                  tidyframe sales.csv\n\n  \
                  # Stricter missing-value threshold and wider fences\n  \
                  tidyframe sales.csv --missing-threshold 0.5 --iqr-multiplier 3\n\n  \
                  # Machine-readable report on stdout\n  \
                  tidyframe sales.parquet --json | jq .summary"
)]
struct Args {
    /// Dataset to clean (csv, tsv, json, ndjson, parquet, xlsx, xls, ods)
    input: PathBuf,

    /// Output directory for results
    ///
    /// Defaults to "<input_name>_output" next to the working directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with a cleaning configuration
    ///
    /// Flags given on the command line override values from the file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Columns with a missing ratio above this value are dropped (0.0 - 1.0)
    #[arg(long)]
    missing_threshold: Option<f64>,

    /// IQR multiplier for the outlier fences
    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Treatment of columns whose IQR is at or below --min-iqr
    #[arg(long, value_enum)]
    zero_iqr: Option<CliZeroIqrPolicy>,

    /// IQR at or below which the skip policy applies
    #[arg(long)]
    min_iqr: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; output files are still written.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Do not write the HTML dashboard
    #[arg(long)]
    no_dashboard: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries
/// the JSON report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = build_config(&args)?;
    let input_stem = extract_file_stem(&args.input);
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_output", input_stem)));

    info!("Loading dataset from: {}", args.input.display());
    let data = load_dataset(&args.input)?;

    let mut builder = Pipeline::builder().config(config.clone());
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    info!("{}", "=".repeat(80));
    info!("Starting cleaning pipeline...");
    info!("{}", "=".repeat(80));

    let outcome = match pipeline.process(data) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    handle_pipeline_output(outcome, &config, &args, &output_dir, &input_stem)
}

/// Merge the config file (if any) with command line overrides.
fn build_config(args: &Args) -> Result<CleaningConfig> {
    let base = match args.config {
        Some(ref path) => {
            info!("Loading configuration from: {}", path.display());
            CleaningConfig::from_json_file(path)?
        }
        None => CleaningConfig::default(),
    };

    let mut builder = CleaningConfigBuilder::from_config(&base);
    if let Some(threshold) = args.missing_threshold {
        builder = builder.missing_threshold(threshold);
    }
    if let Some(multiplier) = args.iqr_multiplier {
        builder = builder.iqr_multiplier(multiplier);
    }
    if let Some(policy) = args.zero_iqr {
        builder = builder.zero_iqr_policy(policy.into());
    }
    if let Some(min_iqr) = args.min_iqr {
        builder = builder.min_iqr(min_iqr);
    }

    Ok(builder.build()?)
}

/// Write output files and print the result.
///
/// Output behavior:
/// - Always: cleaned CSV and xlsx workbook in the output directory
/// - Unless `--no-dashboard`: HTML dashboard
/// - `--emit-report`: JSON report file
/// - `--json`: report JSON on stdout instead of the summary
fn handle_pipeline_output(
    outcome: CleaningOutcome,
    config: &CleaningConfig,
    args: &Args,
    output_dir: &Path,
    input_stem: &str,
) -> Result<()> {
    let generator = ReportGenerator::new(output_dir);

    let csv_path = generator.write_cleaned_csv(&outcome.cleaned_table)?;
    let excel_path = generator.write_cleaned_excel(&outcome.cleaned_table)?;
    info!("Workbook written to: {}", excel_path.display());

    if !args.no_dashboard {
        generator.write_dashboard(&outcome, input_stem)?;
    }

    let input_file = args.input.display().to_string();
    let output_file = csv_path.display().to_string();
    let report = ReportGenerator::build_report(&input_file, Some(&output_file), &outcome, config);

    if args.emit_report {
        let report_path = generator.write_report_to_file(&report, input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report, output_dir, args);

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

/// Print a human-readable summary of the cleaning results.
///
/// This is the default output when `--json` is not given.
fn print_human_readable_summary(report: &CleaningReport, output_dir: &Path, args: &Args) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, summary.rows_before, summary.columns_before
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        report
            .output_file
            .clone()
            .unwrap_or_else(|| output_dir.join(CLEANED_DATA_FILE).display().to_string()),
        summary.rows_after,
        summary.columns_after
    );
    println!("Workbook: {}", output_dir.join(CLEANED_EXCEL_FILE).display());
    println!();

    println!("Cleaning Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} duplicates removed)",
        summary.rows_before, summary.rows_after, summary.duplicates_removed
    );
    println!(
        "  Columns: {} -> {} ({} dropped)",
        summary.columns_before, summary.columns_after, summary.columns_removed
    );
    println!(
        "  Missing cells: {} -> {} ({} filled)",
        summary.missing_before, summary.missing_after, summary.missing_cells_filled
    );
    println!("  Outliers capped: {}", summary.outliers_capped);
    println!(
        "  Memory: {} -> {} bytes",
        report.statistics_before.memory_bytes, report.statistics_after.memory_bytes
    );
    println!(
        "  Completeness: {:.1}% -> {:.1}%",
        summary.completeness_before * 100.0,
        summary.completeness_after * 100.0
    );
    println!();

    let renamed: Vec<_> = report
        .column_mapping
        .iter()
        .filter(|r| r.is_changed())
        .collect();
    if !renamed.is_empty() {
        println!("Renamed Columns:");
        for rename in renamed {
            println!("  {} -> {}", rename.original, rename.normalized);
        }
        println!();
    }

    if !report.actions.is_empty() {
        println!("Actions Taken:");
        for action in report.actions.iter().take(10) {
            println!("  - {}", action.describe());
        }
        if report.actions.len() > 10 {
            println!("  ... and {} more actions", report.actions.len() - 10);
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    if !args.no_dashboard {
        println!(
            "Dashboard: {}",
            output_dir.join(tidyframe::reporting::DASHBOARD_FILE).display()
        );
    }
    println!("Use --json for machine-readable output");
    if !args.emit_report {
        println!("Use --emit-report to save detailed JSON report");
    }
    println!("{}", "=".repeat(80));
}
