//! IQR outlier counting for numeric columns.
//!
//! Outliers are counted, never removed or capped. The count is advisory and
//! ends up in the quality report.

use crate::error::{Result, ResultExt};
use crate::profiler::column_kind;
use crate::profiler::statistics::float_values;
use crate::types::{ColumnKind, ColumnOutliers, SkipReason, SkippedColumn};
use polars::prelude::*;
use tracing::{debug, warn};

/// Per-column outlier counts for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlierSummary {
    pub columns: Vec<ColumnOutliers>,
    pub skipped: Vec<SkippedColumn>,
}

impl OutlierSummary {
    /// Outliers summed over all columns.
    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.count).sum()
    }
}

/// Counts values outside `[Q1 - k*IQR, Q3 + k*IQR]`.
#[derive(Debug, Clone, Copy)]
pub struct OutlierDetector {
    multiplier: f64,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self { multiplier: 1.5 }
    }
}

impl OutlierDetector {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Bounds and outlier count for one series.
    ///
    /// Missing cells are ignored. Returns `None` when the series has no
    /// non-missing values.
    pub fn column_outliers(&self, series: &Series) -> PolarsResult<Option<ColumnOutliers>> {
        let values = float_values(series)?;

        let (Some(q1), Some(q3)) = (
            values.quantile(0.25, QuantileMethod::Linear)?,
            values.quantile(0.75, QuantileMethod::Linear)?,
        ) else {
            return Ok(None);
        };

        let iqr = q3 - q1;
        let lower_bound = q1 - self.multiplier * iqr;
        let upper_bound = q3 + self.multiplier * iqr;
        let count = values
            .into_iter()
            .filter(|v| v.is_some_and(|v| v < lower_bound || v > upper_bound))
            .count();

        Ok(Some(ColumnOutliers {
            column: series.name().to_string(),
            q1,
            q3,
            lower_bound,
            upper_bound,
            count,
        }))
    }

    /// Count outliers in every numeric column.
    pub fn detect(&self, df: &DataFrame) -> Result<OutlierSummary> {
        let mut summary = OutlierSummary::default();

        for col in df.get_columns() {
            if column_kind(col.dtype()) != ColumnKind::Numeric {
                continue;
            }

            let name = col.name().to_string();
            match self
                .column_outliers(col.as_materialized_series())
                .context(format!("Counting outliers in '{}'", name))?
            {
                Some(outliers) => {
                    debug!(
                        "'{}': {} outliers outside [{:.3}, {:.3}]",
                        name, outliers.count, outliers.lower_bound, outliers.upper_bound
                    );
                    summary.columns.push(outliers);
                }
                None => {
                    warn!("Column '{}' has no values, skipping outlier check", name);
                    summary.skipped.push(SkippedColumn::new(
                        name,
                        "outliers",
                        SkipReason::EmptyColumn,
                    ));
                }
            }
        }

        Ok(summary)
    }
}
