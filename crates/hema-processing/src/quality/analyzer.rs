use crate::cleaner::count_duplicates;
use crate::profiler::{NumericSummary, describe_numeric};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Missing cells in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueEntry {
    pub column: String,
    pub missing_count: usize,
    /// Share of rows missing, 0 - 100.
    pub missing_percentage: f64,
}

/// Overview of a table before cleaning: missing cells and numeric summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    /// Rows that repeat an earlier row.
    pub duplicates: usize,
    pub missing: Vec<MissingValueEntry>,
    pub numeric: Vec<NumericSummary>,
    /// Distinct diagnoses, when the table has a `Diagnosis` column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnoses: Option<usize>,
}

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Missing cells per column.
    pub fn missing_counts(df: &DataFrame) -> HashMap<String, usize> {
        df.get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect()
    }

    /// Missing-value analysis for every column, most-missing first.
    ///
    /// Columns with equal counts keep their table order.
    pub fn analyze_missing_values(df: &DataFrame) -> Vec<MissingValueEntry> {
        let rows = df.height();
        let mut entries: Vec<MissingValueEntry> = df
            .get_columns()
            .iter()
            .map(|col| {
                let missing_count = col.null_count();
                let missing_percentage = if rows == 0 {
                    0.0
                } else {
                    (missing_count as f64 / rows as f64) * 100.0
                };
                MissingValueEntry {
                    column: col.name().to_string(),
                    missing_count,
                    missing_percentage,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.missing_count.cmp(&a.missing_count));
        entries
    }

    /// Distinct non-missing values of a column, `None` when it is absent.
    pub fn distinct_count(df: &DataFrame, column: &str) -> Result<Option<usize>> {
        let Ok(col) = df.column(column) else {
            return Ok(None);
        };
        Ok(Some(col.as_materialized_series().drop_nulls().n_unique()?))
    }

    pub fn overview(df: &DataFrame) -> Result<DatasetOverview> {
        Ok(DatasetOverview {
            rows: df.height(),
            columns: df.width(),
            duplicates: count_duplicates(df)?,
            missing: Self::analyze_missing_values(df),
            numeric: describe_numeric(df)?,
            diagnoses: Self::distinct_count(df, "Diagnosis")?,
        })
    }
}
