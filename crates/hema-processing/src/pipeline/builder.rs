//! Main cleaning pipeline module.
//!
//! This module provides the core `CleaningPipeline` struct and builder for
//! running the cleaning stages over a raw table.

use crate::cleaner::{normalize_columns, remove_duplicates};
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::pipeline::outliers::OutlierDetector;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::classify;
use crate::quality::{QualityReporter, StageCounters};
use crate::source::LoadedDataset;
use crate::imputers::StatisticalImputer;
use crate::types::{
    ActionType, CleaningAction, CleaningOutcome, ColumnKind, SkipReason, SkippedColumn,
};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The dataset cleaning pipeline.
///
/// Stages run in a fixed order: classify, deduplicate, impute, normalize,
/// count outliers, report. Each stage reads the previous table and produces
/// a new one; the caller's table is never modified.
///
/// # Example
///
/// ```rust,ignore
/// use hema_processing::{CleaningConfig, CleaningPipeline};
///
/// let outcome = CleaningPipeline::builder()
///     .config(CleaningConfig::builder().flag_outliers(false).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(&raw)?;
///
/// println!("{} duplicates removed", outcome.report.duplicates_removed);
/// ```
pub struct CleaningPipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    imputer: StatisticalImputer,
    detector: OutlierDetector,
}

// The pipeline can be moved to a worker thread.
static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a raw table.
    ///
    /// Returns the clean table, a copy of the raw table and the quality
    /// report. Missing or empty columns never fail a run; they show up in
    /// [`QualityReport::skipped`](crate::types::QualityReport::skipped).
    pub fn run(&self, raw: &DataFrame) -> Result<CleaningOutcome> {
        self.run_with(raw, StageCounters::default())
    }

    /// Clean a loaded dataset, carrying its numeric coercions into the
    /// report's audit trail.
    pub fn run_loaded(&self, dataset: &LoadedDataset) -> Result<CleaningOutcome> {
        let mut counters = StageCounters::default();

        for column in &dataset.coerced {
            counters.actions.push(CleaningAction::new(
                ActionType::TypeCoerced,
                column.as_str(),
                format!("Converted '{}' to numeric", column),
            ));
        }
        if dataset.cells_invalidated > 0 {
            counters.actions.push(CleaningAction::new(
                ActionType::TypeCoerced,
                "dataset",
                format!(
                    "{} unparseable numeric cells read as missing",
                    dataset.cells_invalidated
                ),
            ));
        }
        for column in &dataset.absent_numeric {
            counters.skipped.push(SkippedColumn::new(
                column.as_str(),
                "coercion",
                SkipReason::ColumnAbsent,
            ));
        }

        self.run_with(&dataset.table, counters)
    }

    fn run_with(&self, raw: &DataFrame, counters: StageCounters) -> Result<CleaningOutcome> {
        match self.run_internal(raw, counters) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Cleaning error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn start_stage(&self, stage: CleaningStage, message: &str) {
        info!("{}...", stage.display_name());
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn finish_stage(&self, stage: CleaningStage, message: impl Into<String>) {
        self.report_progress(ProgressUpdate::new(stage, 1.0, message));
    }

    fn run_internal(&self, raw: &DataFrame, mut counters: StageCounters) -> Result<CleaningOutcome> {
        let start_time = Instant::now();
        info!(
            "Starting cleaning pipeline on {} rows x {} columns",
            raw.height(),
            raw.width()
        );

        // Stage 1: classify columns
        self.start_stage(CleaningStage::Classifying, "Classifying columns...");
        let kinds = classify(raw);
        for (name, kind) in &kinds {
            debug!("  {}: {}", name, kind.as_str());
        }
        let numeric = kinds.iter().filter(|(_, k)| *k == ColumnKind::Numeric).count();
        let categorical = kinds
            .iter()
            .filter(|(_, k)| *k == ColumnKind::Categorical)
            .count();
        self.finish_stage(
            CleaningStage::Classifying,
            format!("{} numeric, {} categorical columns", numeric, categorical),
        );

        // Stage 2: remove duplicates
        let df = if self.config.remove_duplicates {
            self.start_stage(CleaningStage::Deduplicating, "Removing duplicate rows...");
            let outcome = remove_duplicates(raw)?;
            counters.duplicates_removed = outcome.removed;

            if outcome.removed > 0 {
                let pct = (outcome.removed as f64 / raw.height() as f64) * 100.0;
                counters.actions.push(
                    CleaningAction::new(
                        ActionType::DuplicatesRemoved,
                        "dataset",
                        format!("Removed {} duplicate rows", outcome.removed),
                    )
                    .with_details(format!("{:.1}% of rows", pct)),
                );
            }
            self.finish_stage(
                CleaningStage::Deduplicating,
                format!("Removed {} duplicate rows", outcome.removed),
            );
            outcome.table
        } else {
            debug!("Skipping duplicate removal (disabled)");
            raw.clone()
        };

        // Stage 3: impute missing values
        let df = if self.config.impute_missing {
            self.start_stage(CleaningStage::Imputing, "Imputing missing values...");
            let outcome = self.imputer.impute(&df)?;
            let total = outcome.records.len();

            for (i, record) in outcome.records.iter().enumerate() {
                self.report_progress(ProgressUpdate::with_items(
                    CleaningStage::Imputing,
                    format!("Column: {}", record.column),
                    i + 1,
                    total,
                    format!("Filled {} cells in {}", record.cells_filled, record.column),
                ));
                counters.actions.push(
                    CleaningAction::new(
                        ActionType::ValueImputed,
                        record.column.as_str(),
                        format!("Imputed {} missing values", record.cells_filled),
                    )
                    .with_details(format!("{} = {}", record.method, record.value)),
                );
            }

            self.finish_stage(
                CleaningStage::Imputing,
                format!("Filled {} cells in {} columns", outcome.cells_filled(), total),
            );
            counters.skipped.extend(outcome.skipped);
            counters.imputations = outcome.records;
            outcome.table
        } else {
            debug!("Skipping imputation (disabled)");
            df
        };

        // Stage 4: normalize text
        let df = if self.config.normalize_text {
            self.start_stage(CleaningStage::Normalizing, "Normalizing text...");
            let columns = crate::profiler::columns_of_kind(&df, ColumnKind::Categorical);
            let mut table = df;

            for (i, column) in columns.iter().enumerate() {
                let outcome = normalize_columns(&table, std::slice::from_ref(column))?;
                self.report_progress(ProgressUpdate::with_items(
                    CleaningStage::Normalizing,
                    format!("Column: {}", column),
                    i + 1,
                    columns.len(),
                    format!("Normalized {}", column),
                ));

                if outcome.cells_changed > 0 {
                    counters.actions.push(CleaningAction::new(
                        ActionType::TextNormalized,
                        column.as_str(),
                        format!("Trimmed and title-cased {} values", outcome.cells_changed),
                    ));
                }
                counters.normalized_columns.extend(outcome.columns);
                table = outcome.table;
            }

            self.finish_stage(
                CleaningStage::Normalizing,
                format!("Normalized {} columns", columns.len()),
            );
            table
        } else {
            debug!("Skipping text normalization (disabled)");
            df
        };

        // Stage 5: count outliers
        if self.config.flag_outliers {
            self.start_stage(CleaningStage::DetectingOutliers, "Counting outliers...");
            let summary = self.detector.detect(&df)?;

            for column in summary.columns.iter().filter(|c| c.count > 0) {
                counters.actions.push(
                    CleaningAction::new(
                        ActionType::OutliersDetected,
                        column.column.as_str(),
                        format!("{} values outside the IQR fences", column.count),
                    )
                    .with_details(format!(
                        "bounds [{:.3}, {:.3}]",
                        column.lower_bound, column.upper_bound
                    )),
                );
            }

            self.finish_stage(
                CleaningStage::DetectingOutliers,
                format!("Found {} outliers", summary.total()),
            );
            counters.skipped.extend(summary.skipped.iter().cloned());
            counters.outliers = summary;
        } else {
            debug!("Skipping outlier detection (disabled)");
        }

        // Stage 6: build the report
        self.start_stage(CleaningStage::Reporting, "Building quality report...");
        let report = QualityReporter::build(raw, &df, counters, start_time.elapsed());
        self.finish_stage(CleaningStage::Reporting, "Quality report ready");

        info!(
            "Cleaning complete: {} -> {} rows, {} duplicates, {} outliers ({} ms)",
            report.rows_before,
            report.rows_after,
            report.duplicates_removed,
            report.outliers_detected,
            report.duration_ms
        );

        Ok(CleaningOutcome {
            clean: df,
            raw: raw.clone(),
            report,
        })
    }
}

/// Builder for creating a [`CleaningPipeline`] instance.
#[derive(Default)]
pub struct CleaningPipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipelineBuilder: Send);

impl CleaningPipelineBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<CleaningPipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CleaningPipeline {
            imputer: StatisticalImputer::from_config(&config),
            detector: OutlierDetector::new(config.iqr_multiplier),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleaningConfig;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn patients() -> DataFrame {
        df! {
            "Age" => &[Some(30i64), None, Some(30), Some(45), Some(52)],
            "Gender" => &[Some("  male "), Some("Female"), Some("  male "), None, Some("FEMALE")],
            "WBC" => &[Some(6.0f64), Some(7.0), Some(6.0), Some(8.0), Some(90.0)],
        }
        .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = CleaningPipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &CleaningConfig::default());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = CleaningConfig {
            iqr_multiplier: -1.0,
            ..CleaningConfig::default()
        };
        assert!(CleaningPipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_run_full_pipeline() {
        let raw = patients();
        let outcome = CleaningPipeline::builder().build().unwrap().run(&raw).unwrap();

        assert_eq!(outcome.report.duplicates_removed, 1);
        assert_eq!(outcome.report.rows_before, 5);
        assert_eq!(outcome.report.rows_after, 4);
        assert_eq!(outcome.clean.height(), 4);
        assert_eq!(outcome.report.missing_before["Age"], 1);
        assert_eq!(outcome.report.missing_before["Gender"], 1);

        for col in outcome.clean.get_columns() {
            assert_eq!(col.null_count(), 0, "column {} still has missing cells", col.name());
        }

        // The caller's table is left alone
        assert!(outcome.raw.equals_missing(&raw));
        assert_eq!(raw.column("Age").unwrap().null_count(), 1);
    }

    #[test]
    fn test_disabled_stages_pass_through() {
        let config = CleaningConfig::builder()
            .remove_duplicates(false)
            .impute_missing(false)
            .normalize_text(false)
            .flag_outliers(false)
            .build()
            .unwrap();
        let raw = patients();
        let outcome = CleaningPipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .run(&raw)
            .unwrap();

        assert!(outcome.clean.equals_missing(&raw));
        assert_eq!(outcome.report.duplicates_removed, 0);
        assert_eq!(outcome.report.outliers_detected, 0);
        assert!(outcome.report.actions.is_empty());
    }

    #[test]
    fn test_progress_reported_for_every_stage() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        CleaningPipeline::builder()
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap()
            .run(&patients())
            .unwrap();

        let seen = stages.lock().unwrap();
        for stage in [
            CleaningStage::Classifying,
            CleaningStage::Deduplicating,
            CleaningStage::Imputing,
            CleaningStage::Normalizing,
            CleaningStage::DetectingOutliers,
            CleaningStage::Reporting,
        ] {
            assert!(seen.contains(&stage), "missing progress for {:?}", stage);
        }
        assert_eq!(seen.last(), Some(&CleaningStage::Complete));
    }

    #[test]
    fn test_progress_callback_count() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = CleaningPipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(CleaningStage::Imputing, 0.5, "Test"));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_actions_recorded() {
        let outcome = CleaningPipeline::builder()
            .build()
            .unwrap()
            .run(&patients())
            .unwrap();

        let types: Vec<ActionType> = outcome.report.actions.iter().map(|a| a.action_type).collect();
        assert!(types.contains(&ActionType::DuplicatesRemoved));
        assert!(types.contains(&ActionType::ValueImputed));
        assert!(types.contains(&ActionType::TextNormalized));
        assert!(types.contains(&ActionType::OutliersDetected));
    }
}
