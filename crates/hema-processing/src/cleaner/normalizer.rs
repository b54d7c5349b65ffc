//! Whitespace trimming and title-casing of categorical columns.

use crate::error::{Result, ResultExt};
use crate::types::{ColumnKind, SkipReason, SkippedColumn};
use crate::utils::normalize_text_value;
use polars::prelude::*;
use tracing::debug;

use crate::profiler::column_kind;

/// Result of normalizing text columns.
#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub table: DataFrame,
    /// Columns that were normalized, in column order.
    pub columns: Vec<String>,
    /// Cells whose text changed.
    pub cells_changed: usize,
    pub skipped: Vec<SkippedColumn>,
}

/// Normalize one text series. Missing cells stay missing.
///
/// Returns the new series and how many cells changed.
pub fn normalize_series(series: &Series) -> PolarsResult<(Series, usize)> {
    let text = series.cast(&DataType::String)?;
    let mut changed = 0;

    let values: Vec<Option<String>> = text
        .str()?
        .into_iter()
        .map(|v| {
            v.map(|s| {
                let normalized = normalize_text_value(s);
                if normalized != s {
                    changed += 1;
                }
                normalized
            })
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), changed))
}

/// Trim and title-case the given columns.
///
/// Columns that are absent or not categorical are left alone; absent ones
/// are reported as skipped.
pub fn normalize_columns(df: &DataFrame, columns: &[String]) -> Result<NormalizeOutcome> {
    let mut table = df.clone();
    let mut normalized = Vec::new();
    let mut skipped = Vec::new();
    let mut cells_changed = 0;

    for name in columns {
        let Ok(col) = df.column(name) else {
            skipped.push(SkippedColumn::new(
                name.as_str(),
                "normalization",
                SkipReason::ColumnAbsent,
            ));
            continue;
        };

        if column_kind(col.dtype()) != ColumnKind::Categorical {
            continue;
        }

        let (series, changed) = normalize_series(col.as_materialized_series())
            .context(format!("Normalizing '{}'", name))?;
        table
            .replace(name, series)
            .context(format!("Replacing normalized column '{}'", name))?;

        debug!("Normalized '{}' ({} cells changed)", name, changed);
        cells_changed += changed;
        normalized.push(name.clone());
    }

    Ok(NormalizeOutcome {
        table,
        columns: normalized,
        cells_changed,
        skipped,
    })
}

/// Trim and title-case every categorical column.
pub fn normalize_text(df: &DataFrame) -> Result<NormalizeOutcome> {
    let columns = crate::profiler::columns_of_kind(df, ColumnKind::Categorical);
    normalize_columns(df, &columns)
}
