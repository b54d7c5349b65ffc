//! Data quality analysis and reporting.
//!
//! The analyzer looks at a single table (missing cells, numeric summaries).
//! The reporter turns the counters of one cleaning run into a
//! [`QualityReport`](crate::types::QualityReport).

mod analyzer;
mod reporter;

pub use analyzer::{DataQualityAnalyzer, DatasetOverview, MissingValueEntry};
pub use reporter::{QualityReporter, StageCounters};
