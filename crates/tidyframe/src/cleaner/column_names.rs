//! Column label normalization.
//!
//! Labels become lowercase snake_case identifiers made of `[a-z0-9_]`, and
//! are guaranteed unique within a table.

use crate::types::ColumnRename;
use anyhow::Result;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-]").expect("Invalid regex: separators"));

static INVALID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]").expect("Invalid regex: invalid chars"));

/// Canonical form of a single label, without the uniqueness pass.
///
/// Returns an empty string when nothing survives the character filter.
pub fn canonical_label(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    let separated = SEPARATORS.replace_all(&lowered, "_");
    INVALID_CHARS.replace_all(&separated, "").into_owned()
}

/// Normalize an ordered list of labels.
///
/// Empty results become `column_<index>`. When two labels collide, the first
/// keeps the name and later ones get the smallest free `_<n>` suffix; names
/// produced directly by other labels are never reused as suffixed names.
pub fn normalize_column_names<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let bases: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let base = canonical_label(label.as_ref());
            if base.is_empty() {
                format!("column_{}", i)
            } else {
                base
            }
        })
        .collect();

    let mut taken: HashSet<String> = bases.iter().cloned().collect();
    let mut assigned: HashSet<&str> = HashSet::new();
    let mut names = Vec::with_capacity(bases.len());

    for base in &bases {
        if assigned.insert(base.as_str()) {
            names.push(base.clone());
            continue;
        }

        let mut n = 1usize;
        let candidate = loop {
            let candidate = format!("{}_{}", base, n);
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

/// Rename the columns of `df` in place and return the mapping, one entry per
/// column in order.
pub fn normalize_frame(df: &mut DataFrame) -> Result<Vec<ColumnRename>> {
    let originals: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let normalized = normalize_column_names(&originals);

    df.set_column_names(normalized.iter().map(|s| s.as_str()))?;

    let mapping: Vec<ColumnRename> = originals
        .into_iter()
        .zip(normalized)
        .map(|(original, normalized)| ColumnRename {
            original,
            normalized,
        })
        .collect();

    for rename in mapping.iter().filter(|r| r.is_changed()) {
        debug!("Renamed column '{}' -> '{}'", rename.original, rename.normalized);
    }

    Ok(mapping)
}
