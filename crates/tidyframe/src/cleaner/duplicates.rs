//! Exact duplicate row removal.

use crate::types::CleaningAction;
use crate::utils::first_occurrence_rows;
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Removes rows that repeat an earlier row across every column.
pub struct DuplicateEliminator;

impl DuplicateEliminator {
    /// Drop duplicate rows, keeping each first occurrence in its original
    /// position.
    ///
    /// Always returns the summarizing action; its count is zero when nothing
    /// was removed.
    pub fn eliminate(df: DataFrame) -> Result<(DataFrame, CleaningAction)> {
        if df.width() == 0 {
            return Ok((df, CleaningAction::deduplicate(0)));
        }

        let keep = first_occurrence_rows(&df)?;
        let removed = df.height() - keep.len();
        if removed == 0 {
            debug!("No duplicate rows found");
            return Ok((df, CleaningAction::deduplicate(0)));
        }

        let deduplicated = df.take(&keep)?;
        debug!("Removed {} duplicate rows", removed);
        Ok((deduplicated, CleaningAction::deduplicate(removed)))
    }
}
