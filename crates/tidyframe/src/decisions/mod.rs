//! Missing-value decisions.
//!
//! Deciding what to do with a column is a pure function of its profile and
//! the configuration; applying the decision is left to
//! [`MissingValueResolver`](crate::imputers::MissingValueResolver).

use crate::config::CleaningConfig;
use crate::types::{ActionDetail, ColumnProfile, ColumnType};
use serde::{Deserialize, Serialize};

/// Why a column is removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// Every cell is missing.
    NoObservedValues,
    /// The missing ratio is above the configured threshold.
    ExceedsThreshold { missing_ratio: f64, threshold: f64 },
}

impl From<DropReason> for ActionDetail {
    fn from(reason: DropReason) -> Self {
        match reason {
            DropReason::NoObservedValues => ActionDetail::NoObservedValues,
            DropReason::ExceedsThreshold {
                missing_ratio,
                threshold,
            } => ActionDetail::MissingThreshold {
                missing_ratio,
                threshold,
            },
        }
    }
}

/// What happens to a column's missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum CleaningDecision {
    Drop { reason: DropReason },
    ImputeMedian,
    ImputeMode,
    /// Nothing is missing.
    Keep,
}

/// Decide how to treat the missing values of one column.
pub fn decide(profile: &ColumnProfile, config: &CleaningConfig) -> CleaningDecision {
    if profile.observed_count == 0 {
        return CleaningDecision::Drop {
            reason: DropReason::NoObservedValues,
        };
    }

    if profile.missing_ratio > config.missing_threshold {
        return CleaningDecision::Drop {
            reason: DropReason::ExceedsThreshold {
                missing_ratio: profile.missing_ratio,
                threshold: config.missing_threshold,
            },
        };
    }

    if profile.missing_ratio > 0.0 {
        return match profile.column_type {
            ColumnType::Numeric => CleaningDecision::ImputeMedian,
            ColumnType::Categorical => CleaningDecision::ImputeMode,
        };
    }

    CleaningDecision::Keep
}
