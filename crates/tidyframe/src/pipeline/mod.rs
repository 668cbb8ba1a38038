//! Pipeline module.
//!
//! This module provides the cleaning pipeline and its outlier stage.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::{IqrBounds, OutlierCapper};
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
