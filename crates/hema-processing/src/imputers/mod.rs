//! Imputation module for handling missing values.
//!
//! Median or mean for numeric columns, mode or a fixed label for
//! categorical columns.

mod statistical;

pub use statistical::{ImputeOutcome, StatisticalImputer};
