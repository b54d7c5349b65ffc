//! Row and cell cleaning for the dataset.
//!
//! This module provides functionality for:
//! - Removing exact-duplicate rows
//! - Trimming and title-casing categorical text

pub mod dedup;
pub mod normalizer;

pub use dedup::{DedupOutcome, count_duplicates, remove_duplicates};
pub use normalizer::{NormalizeOutcome, normalize_columns, normalize_series, normalize_text};
