//! Column classification and declared-numeric coercion.

use crate::error::{Result, ResultExt};
use crate::types::{ColumnKind, ColumnProfile};
use crate::utils::{is_numeric_dtype, is_text_dtype, parse_numeric_string};
use polars::prelude::*;
use tracing::debug;

/// Map a storage type to the kind the cleaning stages act on.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_text_dtype(dtype) {
        ColumnKind::Categorical
    } else {
        ColumnKind::Other
    }
}

/// Classify every column of the table, in column order.
pub fn classify(df: &DataFrame) -> Vec<(String, ColumnKind)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), column_kind(col.dtype())))
        .collect()
}

/// Names of the columns of one kind, in column order.
pub fn columns_of_kind(df: &DataFrame, kind: ColumnKind) -> Vec<String> {
    classify(df)
        .into_iter()
        .filter(|(_, k)| *k == kind)
        .map(|(name, _)| name)
        .collect()
}

/// Build a profile for every column.
pub fn profile_columns(df: &DataFrame) -> Result<Vec<ColumnProfile>> {
    df.get_columns()
        .iter()
        .map(|col| {
            let series = col.as_materialized_series();
            let unique_count = series
                .drop_nulls()
                .n_unique()
                .context(format!("Counting distinct values of '{}'", col.name()))?;

            Ok(ColumnProfile {
                name: col.name().to_string(),
                kind: column_kind(col.dtype()),
                missing_count: series.null_count(),
                unique_count,
            })
        })
        .collect()
}

/// Result of coercing declared numeric columns.
#[derive(Debug, Clone)]
pub struct CoercionOutcome {
    pub table: DataFrame,
    /// Columns converted from text to Float64.
    pub coerced: Vec<String>,
    /// Declared columns the table does not have.
    pub absent: Vec<String>,
    /// Non-missing cells that failed to parse and became missing.
    pub cells_invalidated: usize,
}

/// Convert declared numeric columns stored as text into Float64.
///
/// Cells that do not parse as a finite number become missing. Columns that
/// are already numeric are left as they are, and declared columns that are
/// absent are reported rather than treated as an error.
pub fn coerce_numeric(df: &DataFrame, declared: &[String]) -> Result<CoercionOutcome> {
    let mut table = df.clone();
    let mut coerced = Vec::new();
    let mut absent = Vec::new();
    let mut cells_invalidated = 0;

    for name in declared {
        let Ok(col) = df.column(name) else {
            debug!("Declared numeric column '{}' not present, skipping", name);
            absent.push(name.clone());
            continue;
        };

        let series = col.as_materialized_series();
        let converted = match series.dtype() {
            DataType::String => {
                let text = series.str()?;
                let values: Vec<Option<f64>> = text
                    .into_iter()
                    .map(|v| v.and_then(parse_numeric_string))
                    .collect();

                let before = text.len() - text.null_count();
                let after = values.iter().filter(|v| v.is_some()).count();
                cells_invalidated += before - after;

                Series::new(series.name().clone(), values)
            }
            DataType::Null => series.cast(&DataType::Float64)?,
            _ => continue,
        };

        debug!("Coerced '{}' to Float64", name);
        table
            .replace(name, converted)
            .context(format!("Replacing coerced column '{}'", name))?;
        coerced.push(name.clone());
    }

    Ok(CoercionOutcome {
        table,
        coerced,
        absent,
        cells_invalidated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_column_kind() {
        assert_eq!(column_kind(&DataType::Int64), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::Float32), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::String), ColumnKind::Categorical);
        assert_eq!(column_kind(&DataType::Null), ColumnKind::Categorical);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Other);
        assert_eq!(column_kind(&DataType::Date), ColumnKind::Other);
    }

    #[test]
    fn test_classify_keeps_column_order() {
        let df = df! {
            "Patient_ID" => &["P1", "P2"],
            "Age" => &[34i64, 51],
            "Smoker" => &[true, false],
            "WBC" => &[6.1f64, 9.4],
        }
        .unwrap();

        let kinds = classify(&df);
        assert_eq!(
            kinds,
            vec![
                ("Patient_ID".to_string(), ColumnKind::Categorical),
                ("Age".to_string(), ColumnKind::Numeric),
                ("Smoker".to_string(), ColumnKind::Other),
                ("WBC".to_string(), ColumnKind::Numeric),
            ]
        );
        assert_eq!(columns_of_kind(&df, ColumnKind::Numeric), vec!["Age", "WBC"]);
    }

    #[test]
    fn test_profile_columns_counts_missing_and_unique() {
        let df = df! {
            "Gender" => &[Some("Male"), None, Some("Male"), Some("Female")],
        }
        .unwrap();

        let profiles = profile_columns(&df).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].missing_count, 1);
        assert_eq!(profiles[0].unique_count, 2);
        assert_eq!(profiles[0].kind, ColumnKind::Categorical);
    }

    #[test]
    fn test_coerce_numeric_invalid_cells_become_missing() {
        let df = df! {
            "WBC" => &[Some("6.2"), Some("high"), None, Some("11")],
            "Diagnosis" => &["AML", "CLL", "ALL", "CML"],
        }
        .unwrap();

        let outcome = coerce_numeric(&df, &declared(&["WBC", "Platelets"])).unwrap();

        let wbc = outcome.table.column("WBC").unwrap();
        assert_eq!(wbc.dtype(), &DataType::Float64);
        assert_eq!(wbc.null_count(), 2);
        assert_eq!(outcome.coerced, vec!["WBC"]);
        assert_eq!(outcome.absent, vec!["Platelets"]);
        assert_eq!(outcome.cells_invalidated, 1);
        assert_eq!(
            outcome.table.column("Diagnosis").unwrap().dtype(),
            &DataType::String
        );
    }

    #[test]
    fn test_coerce_numeric_leaves_numeric_columns() {
        let df = df! { "Age" => &[30i64, 40] }.unwrap();
        let outcome = coerce_numeric(&df, &declared(&["Age"])).unwrap();

        assert!(outcome.coerced.is_empty());
        assert_eq!(outcome.table.column("Age").unwrap().dtype(), &DataType::Int64);
    }
}
