//! Structural cleaning of tables.
//!
//! This module provides:
//! - Column label normalization
//! - Exact duplicate row removal

pub mod column_names;
pub mod duplicates;

pub use column_names::{canonical_label, normalize_column_names, normalize_frame};
pub use duplicates::DuplicateEliminator;
