//! Configuration types for the cleaning pipeline.
//!
//! All thresholds used by the decision logic live here and are passed into
//! the [`Pipeline`](crate::Pipeline) explicitly, so runs with different
//! settings are fully deterministic.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default missing ratio above which a column is dropped.
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.95;

/// Default multiplier applied to the IQR when computing capping bounds.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// How the outlier capper treats columns whose interquartile range is
/// (close to) zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroIqrPolicy {
    /// Cap against the collapsed bounds: every value different from the
    /// constant quartile is capped to it.
    #[default]
    Cap,
    /// Leave columns whose IQR is at or below `min_iqr` untouched.
    Skip,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a configuration with the
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use tidyframe::config::{CleaningConfig, ZeroIqrPolicy};
///
/// let config = CleaningConfig::builder()
///     .missing_threshold(0.9)
///     .zero_iqr_policy(ZeroIqrPolicy::Skip)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Columns whose missing ratio is strictly above this value are dropped
    /// (0.0 - 1.0).
    /// Default: 0.95
    pub missing_threshold: f64,

    /// Multiplier `k` for the bounds `Q1 - k*IQR` and `Q3 + k*IQR`.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Treatment of columns with a degenerate IQR.
    /// Default: Cap
    pub zero_iqr_policy: ZeroIqrPolicy,

    /// IQR at or below which a column counts as degenerate. Only consulted
    /// by [`ZeroIqrPolicy::Skip`]; `0.0` means "exactly zero".
    /// Default: 0.0
    pub min_iqr: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            zero_iqr_policy: ZeroIqrPolicy::default(),
            min_iqr: 0.0,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CleaningConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| crate::error::CleaningError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "missing_threshold".to_string(),
                value: self.missing_threshold,
            });
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidMultiplier(self.iqr_multiplier));
        }

        if !self.min_iqr.is_finite() || self.min_iqr < 0.0 {
            return Err(ConfigValidationError::InvalidMinIqr(self.min_iqr));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid IQR multiplier: {0} (must be a finite, non-negative number)")]
    InvalidMultiplier(f64),

    #[error("Invalid minimum IQR: {0} (must be a finite, non-negative number)")]
    InvalidMinIqr(f64),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    missing_threshold: Option<f64>,
    iqr_multiplier: Option<f64>,
    zero_iqr_policy: Option<ZeroIqrPolicy>,
    min_iqr: Option<f64>,
}

impl CleaningConfigBuilder {
    /// Start from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: &CleaningConfig) -> Self {
        Self {
            missing_threshold: Some(config.missing_threshold),
            iqr_multiplier: Some(config.iqr_multiplier),
            zero_iqr_policy: Some(config.zero_iqr_policy),
            min_iqr: Some(config.min_iqr),
        }
    }

    /// Set the missing ratio above which columns are dropped.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.95 = 95%)
    pub fn missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = Some(threshold);
        self
    }

    /// Set the IQR multiplier used for the capping bounds.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the zero-IQR policy.
    pub fn zero_iqr_policy(mut self, policy: ZeroIqrPolicy) -> Self {
        self.zero_iqr_policy = Some(policy);
        self
    }

    /// Set the IQR under which a column is considered degenerate.
    pub fn min_iqr(mut self, min_iqr: f64) -> Self {
        self.min_iqr = Some(min_iqr);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            missing_threshold: self.missing_threshold.unwrap_or(DEFAULT_MISSING_THRESHOLD),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(DEFAULT_IQR_MULTIPLIER),
            zero_iqr_policy: self.zero_iqr_policy.unwrap_or_default(),
            min_iqr: self.min_iqr.unwrap_or(0.0),
        };

        config.validate()?;
        Ok(config)
    }
}
