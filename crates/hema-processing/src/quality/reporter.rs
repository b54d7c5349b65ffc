//! Assembles the quality report from stage counters.

use crate::pipeline::outliers::OutlierSummary;
use crate::types::{CleaningAction, ImputationRecord, QualityReport, SkippedColumn};
use polars::prelude::DataFrame;
use std::time::Duration;

use super::analyzer::DataQualityAnalyzer;

/// Counters gathered while the stages run.
#[derive(Debug, Clone, Default)]
pub struct StageCounters {
    pub duplicates_removed: usize,
    pub imputations: Vec<ImputationRecord>,
    pub normalized_columns: Vec<String>,
    pub outliers: OutlierSummary,
    pub skipped: Vec<SkippedColumn>,
    pub actions: Vec<CleaningAction>,
}

pub struct QualityReporter;

impl QualityReporter {
    /// Build the report for one run. `raw` is the table as loaded, `clean`
    /// the table after every stage.
    pub fn build(
        raw: &DataFrame,
        clean: &DataFrame,
        counters: StageCounters,
        elapsed: Duration,
    ) -> QualityReport {
        let outliers_detected = counters.outliers.total();

        QualityReport {
            duplicates_removed: counters.duplicates_removed,
            missing_before: DataQualityAnalyzer::missing_counts(raw),
            outliers_detected,
            rows_before: raw.height(),
            rows_after: clean.height(),
            columns_before: raw.width(),
            columns_after: clean.width(),
            outliers_by_column: counters.outliers.columns,
            imputations: counters.imputations,
            normalized_columns: counters.normalized_columns,
            skipped: counters.skipped,
            actions: counters.actions,
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnOutliers;
    use polars::prelude::*;

    #[test]
    fn test_build_report() {
        let raw = df! {
            "Age" => &[Some(30i64), None, Some(30)],
            "Gender" => &["  male ", "Female", "  male "],
        }
        .unwrap();
        let clean = df! {
            "Age" => &[30.0f64, 30.0],
            "Gender" => &["Male", "Female"],
        }
        .unwrap();

        let counters = StageCounters {
            duplicates_removed: 1,
            outliers: OutlierSummary {
                columns: vec![ColumnOutliers {
                    column: "Age".to_string(),
                    q1: 30.0,
                    q3: 30.0,
                    lower_bound: 30.0,
                    upper_bound: 30.0,
                    count: 0,
                }],
                skipped: Vec::new(),
            },
            normalized_columns: vec!["Gender".to_string()],
            ..Default::default()
        };

        let report = QualityReporter::build(&raw, &clean, counters, Duration::from_millis(7));
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.rows_before, 3);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.columns_before, 2);
        assert_eq!(report.missing_before["Age"], 1);
        assert_eq!(report.missing_before["Gender"], 0);
        assert_eq!(report.outliers_detected, 0);
        assert_eq!(report.outliers_by_column.len(), 1);
        assert_eq!(report.duration_ms, 7);
    }
}
