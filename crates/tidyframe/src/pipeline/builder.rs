//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the cleaning workflow.

use crate::cleaner::{DuplicateEliminator, normalize_frame};
use crate::config::{CleaningConfig, ConfigValidationError};
use crate::error::{CleaningError, Result};
use crate::imputers::MissingValueResolver;
use crate::pipeline::outliers::OutlierCapper;
use crate::pipeline::progress::{
    ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::StatisticsCollector;
use crate::types::CleaningOutcome;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The main cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom
/// configuration. A pipeline holds no state between runs and can be reused.
///
/// # Example
///
/// ```rust,ignore
/// use tidyframe::{CleaningConfig, Pipeline};
///
/// let outcome = Pipeline::builder()
///     .config(CleaningConfig::builder().missing_threshold(0.9).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("{} actions applied", outcome.action_log.len());
/// ```
pub struct Pipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Pipeline can be moved to a worker thread
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a DataFrame.
    ///
    /// Stages run in a fixed order: normalize column names, capture the
    /// "before" statistics, resolve missing values, remove duplicates, cap
    /// outliers, capture the "after" statistics.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::EmptyInput`] for a table without rows or
    /// columns. Warning-level conditions do not fail the run; they are
    /// collected in [`CleaningOutcome::warnings`].
    pub fn process(&self, df: DataFrame) -> Result<CleaningOutcome> {
        match self.process_internal(df) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn start_stage(&self, stage: CleaningStage, message: &str) {
        info!("{}", message);
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn process_internal(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let start_time = Instant::now();

        if df.height() == 0 || df.width() == 0 {
            return Err(CleaningError::EmptyInput {
                rows: df.height(),
                columns: df.width(),
            });
        }

        info!(
            "Starting cleaning pipeline on {} rows x {} columns",
            df.height(),
            df.width()
        );

        let mut action_log = Vec::new();
        let mut warnings: Vec<CleaningError> = Vec::new();

        // Step 1: Canonical column names
        self.start_stage(CleaningStage::Normalizing, "Step 1: Normalizing column names...");
        let mut df = df;
        let column_mapping = normalize_frame(&mut df)
            .map_err(|e| CleaningError::stage_failed("normalize", e))?;

        // Step 2: Snapshot before cleaning
        self.start_stage(CleaningStage::Profiling, "Step 2: Capturing initial statistics...");
        let statistics_before = StatisticsCollector::capture(&df, &self.config)
            .map_err(|e| CleaningError::stage_failed("profile", e))?;
        debug!(
            "Before: {} missing cells, {} duplicate rows, {} outliers",
            statistics_before.missing_cell_count,
            statistics_before.duplicate_row_count,
            statistics_before.total_outliers()
        );

        // Step 3: Missing values
        self.start_stage(
            CleaningStage::ResolvingMissing,
            "Step 3: Resolving missing values...",
        );
        let (df, resolve_actions) = MissingValueResolver::resolve(df, &self.config, &mut warnings)
            .map_err(|e| CleaningError::stage_failed("resolve_missing", e))?;
        action_log.extend(resolve_actions);

        // Step 4: Duplicates
        self.start_stage(CleaningStage::Deduplicating, "Step 4: Removing duplicate rows...");
        let (mut df, dedup_action) = DuplicateEliminator::eliminate(df)
            .map_err(|e| CleaningError::stage_failed("deduplicate", e))?;
        if dedup_action.count_affected > 0 {
            action_log.push(dedup_action);
        }

        // Step 5: Outliers
        self.start_stage(CleaningStage::CappingOutliers, "Step 5: Capping outliers...");
        let cap_actions = OutlierCapper::cap_outliers(&mut df, &self.config, &mut warnings)
            .map_err(|e| CleaningError::stage_failed("cap_outliers", e))?;
        action_log.extend(cap_actions);

        // Step 6: Snapshot after cleaning
        self.start_stage(CleaningStage::Summarizing, "Step 6: Capturing final statistics...");
        let statistics_after = StatisticsCollector::capture(&df, &self.config)
            .map_err(|e| CleaningError::stage_failed("summarize", e))?;

        for action in &action_log {
            debug!("{}", action.describe());
        }
        for warning in &warnings {
            warn!("{}", warning);
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Cleaning complete in {}ms: {} actions, {} rows x {} columns",
            duration_ms,
            action_log.len(),
            df.height(),
            df.width()
        );

        Ok(CleaningOutcome {
            cleaned_table: df,
            action_log,
            statistics_before,
            statistics_after,
            column_mapping,
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
            duration_ms,
        })
    }
}

/// Builder for creating a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
