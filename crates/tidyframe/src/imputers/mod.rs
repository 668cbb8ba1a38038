//! Imputation module for handling missing values.
//!
//! [`MissingValueResolver`] profiles each column, asks
//! [`decide`](crate::decisions::decide) what to do with it and carries the
//! decision out.

mod statistical;

pub use statistical::StatisticalImputer;

use crate::config::CleaningConfig;
use crate::decisions::{CleaningDecision, decide};
use crate::error::CleaningError;
use crate::profiler::DataProfiler;
use crate::types::CleaningAction;
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, warn};

/// Drops or imputes every column that has missing values.
pub struct MissingValueResolver;

impl MissingValueResolver {
    /// Resolve missing values in `df`.
    ///
    /// Returns the table and one action per dropped or imputed column, in
    /// column order. Afterwards no retained column contains a missing cell.
    pub fn resolve(
        mut df: DataFrame,
        config: &CleaningConfig,
        warnings: &mut Vec<CleaningError>,
    ) -> Result<(DataFrame, Vec<CleaningAction>)> {
        let profiles = DataProfiler::profile_columns(&df)?;
        let mut actions = Vec::new();
        let mut to_drop: Vec<PlSmallStr> = Vec::new();

        for profile in &profiles {
            let decision = decide(profile, config);
            debug!(
                "Column '{}' ({}, {:.1}% missing): {:?}",
                profile.name,
                profile.column_type,
                profile.missing_ratio * 100.0,
                decision
            );

            let action = match decision {
                CleaningDecision::Drop { reason } => {
                    to_drop.push(profile.name.as_str().into());
                    Some(CleaningAction::drop(
                        profile.name.as_str(),
                        reason.into(),
                        profile.missing_count,
                    ))
                }
                CleaningDecision::ImputeMedian => {
                    StatisticalImputer::apply_numeric_median(&mut df, &profile.name)?
                }
                CleaningDecision::ImputeMode => {
                    StatisticalImputer::apply_mode_imputation(&mut df, &profile.name)?
                }
                CleaningDecision::Keep => None,
            };

            actions.extend(action);
        }

        if !to_drop.is_empty() {
            let all_dropped = to_drop.len() == df.width();
            df = df.drop_many(to_drop);
            if all_dropped {
                warn!("Every column exceeded the missing-value threshold");
                warnings.push(CleaningError::AllColumnsDropped);
            }
        }

        Ok((df, actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionDetail, ActionKind};
    use crate::utils::missing_count;

    #[test]
    fn test_resolve_drops_and_imputes() {
        let df = df! {
            "empty" => &[None::<f64>, None, None, None],
            "num" => &[Some(1.0f64), None, Some(3.0), Some(5.0)],
            "cat" => &[Some("a"), Some("a"), None, Some("b")],
            "full" => &[1i64, 2, 3, 4],
        }
        .unwrap();
        let mut warnings = Vec::new();

        let (result, actions) =
            MissingValueResolver::resolve(df, &CleaningConfig::default(), &mut warnings).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(result.width(), 3);
        assert!(result.column("empty").is_err());
        for column in result.get_columns() {
            assert_eq!(missing_count(column.as_materialized_series()).unwrap(), 0);
        }

        let kinds: Vec<ActionKind> = actions.iter().map(|a| a.action).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Drop, ActionKind::Impute, ActionKind::Impute]
        );
        assert_eq!(actions[0].detail, ActionDetail::NoObservedValues);
        assert_eq!(actions[1].detail, ActionDetail::Median { value: 3.0 });
    }

    #[test]
    fn test_all_columns_dropped_warns() {
        let df = df! {
            "a" => &[None::<i64>, None],
            "b" => &[None::<&str>, None],
        }
        .unwrap();
        let mut warnings = Vec::new();

        let (result, actions) =
            MissingValueResolver::resolve(df, &CleaningConfig::default(), &mut warnings).unwrap();

        assert_eq!(result.width(), 0);
        assert_eq!(actions.len(), 2);
        assert!(matches!(warnings[0], CleaningError::AllColumnsDropped));
    }

    #[test]
    fn test_clean_table_produces_no_actions() {
        let df = df! {
            "a" => &[1i64, 2],
            "b" => &["x", "y"],
        }
        .unwrap();
        let mut warnings = Vec::new();

        let (result, actions) =
            MissingValueResolver::resolve(df, &CleaningConfig::default(), &mut warnings).unwrap();

        assert!(actions.is_empty());
        assert_eq!(result.shape(), (2, 2));
    }
}
