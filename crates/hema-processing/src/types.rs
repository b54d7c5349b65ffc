use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the pipeline treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values: median imputation and outlier counting.
    Numeric,
    /// Text values: mode imputation and text normalization.
    Categorical,
    /// Boolean and temporal values, which no stage touches.
    Other,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    /// Distinct non-missing values.
    pub unique_count: usize,
}

/// Why a stage left a column alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The column was expected but is not in the table.
    ColumnAbsent,
    /// The column has no non-missing values to compute from.
    EmptyColumn,
}

/// A column a stage skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedColumn {
    pub column: String,
    pub stage: String,
    pub reason: SkipReason,
}

impl SkippedColumn {
    pub fn new(column: impl Into<String>, stage: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            column: column.into(),
            stage: stage.into(),
            reason,
        }
    }
}

/// What the imputer wrote into one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    /// "median", "mean", "mode" or "fallback_label".
    pub method: String,
    /// The fill value, rendered as text.
    pub value: String,
    pub cells_filled: usize,
}

/// IQR bounds and the count of values outside them for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
}

/// A single action taken during cleaning.
///
/// Actions form the audit trail shown next to the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningAction {
    pub action_type: ActionType,
    /// Column name or "dataset".
    pub target: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CleaningAction {
    pub fn new(action_type: ActionType, target: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A declared numeric column was converted from text.
    TypeCoerced,
    /// Duplicate rows were removed.
    DuplicatesRemoved,
    /// Missing values were imputed.
    ValueImputed,
    /// Text values were trimmed and title-cased.
    TextNormalized,
    /// Outliers were counted.
    OutliersDetected,
}

impl ActionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TypeCoerced => "Type Coerced",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::ValueImputed => "Value Imputed",
            Self::TextNormalized => "Text Normalized",
            Self::OutliersDetected => "Outliers Detected",
        }
    }
}

/// Result of one cleaning run.
///
/// Produced once by [`QualityReporter`](crate::quality::QualityReporter) and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub duplicates_removed: usize,
    /// Missing cells per column in the raw table.
    pub missing_before: HashMap<String, usize>,
    pub outliers_detected: usize,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub outliers_by_column: Vec<ColumnOutliers>,
    pub imputations: Vec<ImputationRecord>,
    pub normalized_columns: Vec<String>,
    pub skipped: Vec<SkippedColumn>,
    pub actions: Vec<CleaningAction>,
    pub duration_ms: u64,
}

impl QualityReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Total missing cells in the raw table.
    pub fn total_missing_before(&self) -> usize {
        self.missing_before.values().sum()
    }

    /// Percentage of raw rows removed as duplicates.
    pub fn duplicate_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.duplicates_removed as f64 / self.rows_before as f64) * 100.0
        }
    }
}

/// The clean table, an untouched copy of the raw table, and the report.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub clean: DataFrame,
    pub raw: DataFrame,
    pub report: QualityReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> QualityReport {
        QualityReport {
            duplicates_removed: 5,
            missing_before: HashMap::from([("Age".to_string(), 3), ("Gender".to_string(), 2)]),
            outliers_detected: 4,
            rows_before: 100,
            rows_after: 95,
            columns_before: 7,
            columns_after: 7,
            outliers_by_column: Vec::new(),
            imputations: Vec::new(),
            normalized_columns: vec!["Gender".to_string()],
            skipped: Vec::new(),
            actions: Vec::new(),
            duration_ms: 12,
        }
    }

    #[test]
    fn test_report_derived_counts() {
        let report = sample_report();
        assert_eq!(report.rows_removed(), 5);
        assert_eq!(report.total_missing_before(), 5);
        assert!((report.duplicate_percentage() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_percentage_empty_table() {
        let mut report = sample_report();
        report.rows_before = 0;
        report.rows_after = 0;
        assert_eq!(report.duplicate_percentage(), 0.0);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).expect("Should serialize");
        let back: QualityReport = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(report, back);
    }

    #[test]
    fn test_action_serialization() {
        let action = CleaningAction::new(ActionType::ValueImputed, "Age", "Imputed 3 values")
            .with_details("median = 42");
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("value_imputed"));
        assert!(json.contains("median = 42"));
        assert_eq!(ActionType::TextNormalized.display_name(), "Text Normalized");
    }

    #[test]
    fn test_skip_reason_serialization() {
        let skipped = SkippedColumn::new("Platelets", "imputation", SkipReason::EmptyColumn);
        let json = serde_json::to_string(&skipped).unwrap();
        assert!(json.contains("empty_column"));
    }
}
