//! Blood Cancer Dataset Cleaning Library
//!
//! Loads the blood-cancer patient CSV, cleans it in a fixed sequence of
//! stages and reports what each stage changed.
//!
//! # Overview
//!
//! The pipeline runs these stages in order:
//!
//! - **Column Classification**: numeric, categorical or other, by storage type
//! - **Deduplication**: exact-duplicate rows removed, first occurrence kept
//! - **Imputation**: median/mean for numeric columns, mode or a fixed label for categorical ones
//! - **Text Normalization**: categorical values trimmed and title-cased
//! - **Outlier Detection**: 1.5×IQR fences counted per numeric column, values untouched
//! - **Quality Reporting**: a [`QualityReport`] summarizing the run
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hema_processing::{CleaningPipeline, DatasetSource, SourceConfig};
//!
//! let dataset = DatasetSource::new(SourceConfig::default()).load()?;
//!
//! let outcome = CleaningPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run_loaded(&dataset)?;
//!
//! println!("Rows: {} -> {}", outcome.report.rows_before, outcome.report.rows_after);
//! println!("Duplicates removed: {}", outcome.report.duplicates_removed);
//! ```
//!
//! # Configuration
//!
//! Use [`CleaningConfig`] to choose imputation methods or disable stages:
//!
//! ```rust,ignore
//! use hema_processing::config::*;
//!
//! let config = CleaningConfig::builder()
//!     .numeric_imputation(NumericImputation::Mean)
//!     .categorical_imputation(CategoricalImputation::Constant)
//!     .fallback_label("Not Recorded")
//!     .flag_outliers(false)
//!     .build()?;
//! ```
//!
//! The raw table is never modified; [`CleaningOutcome`] carries both the raw
//! and the clean table alongside the report.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod source;
pub mod state;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    CategoricalImputation, CleaningConfig, CleaningConfigBuilder, ConfigValidationError,
    NumericImputation, SourceConfig, SourceConfigBuilder,
};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::{
    CleaningPipeline, CleaningPipelineBuilder, CleaningStage, ClosureProgressReporter,
    OutlierDetector, ProgressReporter, ProgressUpdate,
};
pub use quality::{DataQualityAnalyzer, QualityReporter};
pub use reporting::{ExportFormat, Exporter};
pub use source::{DatasetSource, LoadedDataset, SourceCache};
pub use state::{Action, AppState, Page};
pub use types::{
    ActionType, CleaningAction, CleaningOutcome, ColumnKind, ColumnOutliers, ColumnProfile,
    ImputationRecord, QualityReport, SkipReason, SkippedColumn,
};
