//! Statistical imputation methods.
//!
//! Numeric columns are filled with their median (or mean), categorical
//! columns with their mode, falling back to a fixed label when a column has
//! nothing to take a mode of.

use crate::config::{CategoricalImputation, CleaningConfig, DEFAULT_FALLBACK_LABEL, NumericImputation};
use crate::error::{Result, ResultExt};
use crate::profiler::statistics::{mean, median};
use crate::profiler::{classify, column_kind};
use crate::types::{ColumnKind, ImputationRecord, SkipReason, SkippedColumn};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, first_seen_mode};
use polars::prelude::*;
use tracing::{debug, warn};

/// Result of imputing a table.
#[derive(Debug, Clone)]
pub struct ImputeOutcome {
    pub table: DataFrame,
    pub records: Vec<ImputationRecord>,
    pub skipped: Vec<SkippedColumn>,
}

impl ImputeOutcome {
    pub fn cells_filled(&self) -> usize {
        self.records.iter().map(|r| r.cells_filled).sum()
    }
}

/// Statistical imputation for filling missing values.
#[derive(Debug, Clone)]
pub struct StatisticalImputer {
    numeric: NumericImputation,
    categorical: CategoricalImputation,
    fallback_label: String,
}

impl Default for StatisticalImputer {
    fn default() -> Self {
        Self {
            numeric: NumericImputation::Median,
            categorical: CategoricalImputation::Mode,
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
        }
    }
}

impl StatisticalImputer {
    pub fn new(
        numeric: NumericImputation,
        categorical: CategoricalImputation,
        fallback_label: impl Into<String>,
    ) -> Self {
        Self {
            numeric,
            categorical,
            fallback_label: fallback_label.into(),
        }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(
            config.numeric_imputation,
            config.categorical_imputation,
            config.fallback_label.clone(),
        )
    }

    /// Fill missing cells in every numeric and categorical column.
    ///
    /// Columns without missing cells are passed through untouched.
    pub fn impute(&self, df: &DataFrame) -> Result<ImputeOutcome> {
        let columns: Vec<String> = classify(df).into_iter().map(|(name, _)| name).collect();
        self.impute_columns(df, &columns)
    }

    /// Fill missing cells in the named columns only.
    pub fn impute_columns(&self, df: &DataFrame, columns: &[String]) -> Result<ImputeOutcome> {
        let mut table = df.clone();
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for name in columns {
            let Ok(col) = df.column(name) else {
                skipped.push(SkippedColumn::new(
                    name.as_str(),
                    "imputation",
                    SkipReason::ColumnAbsent,
                ));
                continue;
            };

            let series = col.as_materialized_series();
            let missing = series.null_count();
            if missing == 0 {
                continue;
            }

            let kind = column_kind(series.dtype());
            let record = match kind {
                ColumnKind::Numeric => self.impute_numeric(&mut table, series, missing)?,
                ColumnKind::Categorical => Some(self.impute_categorical(&mut table, series, missing)?),
                ColumnKind::Other => None,
            };

            match (record, kind) {
                (Some(record), _) => {
                    debug!(
                        "Filled {} cells in '{}' with {} '{}'",
                        record.cells_filled, record.column, record.method, record.value
                    );
                    records.push(record);
                }
                (None, ColumnKind::Numeric) => {
                    warn!("Column '{}' has no values to impute from, skipping", name);
                    skipped.push(SkippedColumn::new(
                        name.as_str(),
                        "imputation",
                        SkipReason::EmptyColumn,
                    ));
                }
                (None, _) => {}
            }
        }

        Ok(ImputeOutcome {
            table,
            records,
            skipped,
        })
    }

    /// Returns `None` when the column has no values to compute a fill from.
    fn impute_numeric(
        &self,
        df: &mut DataFrame,
        series: &Series,
        missing: usize,
    ) -> Result<Option<ImputationRecord>> {
        let name = series.name().to_string();
        let fill_value = match self.numeric {
            NumericImputation::Median => median(series),
            NumericImputation::Mean => mean(series),
        }
        .context(format!("Computing fill value of '{}'", name))?;
        let Some(fill_value) = fill_value else {
            return Ok(None);
        };

        let filled = fill_numeric_nulls(series, fill_value)?;
        df.replace(&name, filled)
            .context(format!("Replacing imputed column '{}'", name))?;

        Ok(Some(ImputationRecord {
            column: name,
            method: self.numeric.as_str().to_string(),
            value: fill_value.to_string(),
            cells_filled: missing,
        }))
    }

    fn impute_categorical(
        &self,
        df: &mut DataFrame,
        series: &Series,
        missing: usize,
    ) -> Result<ImputationRecord> {
        let name = series.name().to_string();

        let mode = match self.categorical {
            CategoricalImputation::Mode => first_seen_mode(series)?,
            CategoricalImputation::Constant => None,
        };
        let (method, value) = match mode {
            Some(mode) => ("mode", mode),
            None => ("fallback_label", self.fallback_label.clone()),
        };

        let filled = fill_string_nulls(series, &value)?;
        df.replace(&name, filled)
            .context(format!("Replacing imputed column '{}'", name))?;

        Ok(ImputationRecord {
            column: name,
            method: method.to_string(),
            value,
            cells_filled: missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    // ==================== numeric tests ====================

    #[test]
    fn test_median_fill_odd_count() {
        let df = df! { "WBC" => &[Some(4.0), None, Some(10.0), Some(6.0)] }.unwrap();
        let outcome = StatisticalImputer::default().impute(&df).unwrap();

        assert_eq!(
            floats(&outcome.table, "WBC"),
            vec![Some(4.0), Some(6.0), Some(10.0), Some(6.0)]
        );
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].method, "median");
        assert_eq!(outcome.records[0].cells_filled, 1);
    }

    #[test]
    fn test_median_fill_even_count_interpolates() {
        let df = df! { "Age" => &[Some(20i64), Some(30), None, Some(40), Some(50)] }.unwrap();
        let outcome = StatisticalImputer::default().impute(&df).unwrap();

        assert_eq!(floats(&outcome.table, "Age")[2], Some(35.0));
        assert_eq!(outcome.records[0].value, "35");
    }

    #[test]
    fn test_mean_fill() {
        let imputer = StatisticalImputer::new(
            NumericImputation::Mean,
            CategoricalImputation::Mode,
            "Unknown",
        );
        let df = df! { "RBC" => &[Some(1.0), Some(2.0), None, Some(6.0)] }.unwrap();
        let outcome = imputer.impute(&df).unwrap();

        assert_eq!(floats(&outcome.table, "RBC")[2], Some(3.0));
        assert_eq!(outcome.records[0].method, "mean");
    }

    #[test]
    fn test_complete_numeric_column_untouched() {
        let df = df! {
            "Age" => &[30i64, 40, 50],
            "Gender" => &[Some("Male"), None, Some("Female")],
        }
        .unwrap();
        let outcome = StatisticalImputer::default().impute(&df).unwrap();

        let age = outcome.table.column("Age").unwrap();
        assert_eq!(age.dtype(), &DataType::Int64);
        assert!(
            age.as_materialized_series()
                .equals(df.column("Age").unwrap().as_materialized_series())
        );
    }

    #[test]
    fn test_fully_missing_numeric_column_skipped() {
        let df = df! { "Platelets" => &[None::<f64>, None, None] }.unwrap();
        let outcome = StatisticalImputer::default().impute(&df).unwrap();

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::EmptyColumn);
        assert_eq!(outcome.table.column("Platelets").unwrap().null_count(), 3);
    }

    // ==================== categorical tests ====================

    #[test]
    fn test_mode_fill() {
        let df = df! {
            "Diagnosis" => &[Some("AML"), None, Some("CLL"), Some("AML"), None],
        }
        .unwrap();
        let outcome = StatisticalImputer::default().impute(&df).unwrap();

        assert_eq!(outcome.table.column("Diagnosis").unwrap().null_count(), 0);
        assert_eq!(strings(&outcome.table, "Diagnosis")[1], Some("AML".to_string()));
        assert_eq!(outcome.records[0].method, "mode");
        assert_eq!(outcome.records[0].cells_filled, 2);
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        let df = df! { "Gender" => &[Some("Female"), Some("Male"), None] }.unwrap();
        let outcome = StatisticalImputer::default().impute(&df).unwrap();
        assert_eq!(strings(&outcome.table, "Gender")[2], Some("Female".to_string()));
    }

    #[test]
    fn test_fully_missing_categorical_uses_label() {
        let df = df! {
            "Notes" => &[None::<&str>, None],
            "Age" => &[1i64, 2],
        }
        .unwrap();
        let outcome = StatisticalImputer::default().impute(&df).unwrap();

        assert_eq!(
            strings(&outcome.table, "Notes"),
            vec![Some("Unknown".to_string()), Some("Unknown".to_string())]
        );
        assert_eq!(outcome.records[0].method, "fallback_label");
    }

    #[test]
    fn test_constant_strategy() {
        let imputer = StatisticalImputer::new(
            NumericImputation::Median,
            CategoricalImputation::Constant,
            "Not Recorded",
        );
        let df = df! { "Gender" => &[Some("Male"), None, Some("Male")] }.unwrap();
        let outcome = imputer.impute(&df).unwrap();

        assert_eq!(strings(&outcome.table, "Gender")[1], Some("Not Recorded".to_string()));
    }

    #[test]
    fn test_absent_column_reported() {
        let df = df! { "Age" => &[Some(1.0), None] }.unwrap();
        let outcome = StatisticalImputer::default()
            .impute_columns(&df, &["Age".to_string(), "Hemoglobin".to_string()])
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped[0].column, "Hemoglobin");
        assert_eq!(outcome.skipped[0].reason, SkipReason::ColumnAbsent);
        assert_eq!(outcome.cells_filled(), 1);
    }

    #[test]
    fn test_other_columns_untouched() {
        let df = df! { "Smoker" => &[Some(true), None] }.unwrap();
        let outcome = StatisticalImputer::default().impute(&df).unwrap();

        assert!(outcome.records.is_empty());
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.table.column("Smoker").unwrap().null_count(), 1);
    }
}
