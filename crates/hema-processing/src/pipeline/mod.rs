//! Pipeline module.
//!
//! This module provides the cleaning pipeline and related components.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{CleaningPipeline, CleaningPipelineBuilder};
pub use outliers::{OutlierDetector, OutlierSummary};
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
