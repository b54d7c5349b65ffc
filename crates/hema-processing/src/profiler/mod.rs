//! Column profiling for the cleaning stages.
//!
//! This module provides:
//! - Column classification (numeric, categorical, other)
//! - Coercion of declared numeric columns stored as text
//! - Descriptive statistics for numeric columns

pub mod classifier;
pub mod statistics;

pub use classifier::{
    CoercionOutcome, classify, coerce_numeric, column_kind, columns_of_kind, profile_columns,
};
pub use statistics::{NumericSummary, describe_numeric, quantile};
