//! Exact-duplicate row removal.

use crate::error::{Result, ResultExt};
use polars::prelude::*;
use tracing::debug;

/// Table with duplicate rows removed, plus how many went.
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub table: DataFrame,
    pub removed: usize,
}

/// First occurrence of every distinct row, in original row order. A
/// missing cell only equals another missing cell.
fn first_occurrences(df: &DataFrame) -> Result<DataFrame> {
    df.unique_stable(None, UniqueKeepStrategy::First, None)
        .context("Finding distinct rows")
}

/// Number of rows that repeat an earlier row.
pub fn count_duplicates(df: &DataFrame) -> Result<usize> {
    Ok(df.height() - first_occurrences(df)?.height())
}

/// Remove exact-duplicate rows, keeping the first occurrence and the
/// original row order.
pub fn remove_duplicates(df: &DataFrame) -> Result<DedupOutcome> {
    let table = first_occurrences(df)?;
    let removed = df.height() - table.height();

    if removed == 0 {
        debug!("No duplicate rows found");
    } else {
        debug!("Removed {} duplicate rows", removed);
    }

    Ok(DedupOutcome { table, removed })
}
