//! Descriptive statistics for numeric columns.

use crate::error::{Result, ResultExt};
use crate::types::ColumnKind;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::classifier::column_kind;

/// Non-missing values of a numeric series as Float64, NaN dropped.
pub fn float_values(series: &Series) -> PolarsResult<Float64Chunked> {
    let floats = series.cast(&DataType::Float64)?;
    let ca = floats.f64()?;
    ca.filter(&ca.is_not_nan())
}

/// Quantile by linear interpolation between order statistics, at position
/// `q * (n - 1)`. Missing cells are ignored.
pub fn quantile(series: &Series, q: f64) -> PolarsResult<Option<f64>> {
    float_values(series)?.quantile(q.clamp(0.0, 1.0), QuantileMethod::Linear)
}

pub fn median(series: &Series) -> PolarsResult<Option<f64>> {
    Ok(float_values(series)?.median())
}

pub fn mean(series: &Series) -> PolarsResult<Option<f64>> {
    Ok(float_values(series)?.mean())
}

fn central_sums(values: &[f64], mean: f64) -> (f64, f64, f64) {
    let mut s2 = 0.0;
    let mut s3 = 0.0;
    let mut s4 = 0.0;
    for v in values {
        let d = v - mean;
        s2 += d * d;
        s3 += d * d * d;
        s4 += d * d * d * d;
    }
    (s2, s3, s4)
}

/// Bias-corrected sample skewness (G1). Needs at least three values.
pub fn skewness(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 3 {
        return None;
    }

    let (s2, s3, _) = central_sums(values, mean);
    if s2 == 0.0 {
        return Some(0.0);
    }

    Some(n * (n - 1.0).sqrt() / (n - 2.0) * (s3 / s2.powf(1.5)))
}

/// Bias-corrected excess kurtosis (G2). Needs at least four values.
pub fn kurtosis(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 4 {
        return None;
    }

    let (s2, _, s4) = central_sums(values, mean);
    if s2 == 0.0 {
        return Some(0.0);
    }

    let numerator = n * (n + 1.0) * (n - 1.0) * s4;
    let denominator = (n - 2.0) * (n - 3.0) * s2 * s2;
    let adjustment = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));

    Some(numerator / denominator - adjustment)
}

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    /// Non-missing values.
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

impl NumericSummary {
    /// Summarize a series. Returns `None` when it has no non-missing values.
    pub fn from_series(series: &Series) -> PolarsResult<Option<Self>> {
        let ca = float_values(series)?;

        let (Some(min), Some(max)) = (ca.min(), ca.max()) else {
            return Ok(None);
        };

        let values: Vec<f64> = ca.into_iter().flatten().collect();
        let mean = ca.mean().unwrap_or(min);
        let std = if values.len() < 2 { None } else { ca.std(1) };
        let q = |p: f64| -> PolarsResult<f64> {
            Ok(ca.quantile(p, QuantileMethod::Linear)?.unwrap_or(min))
        };

        Ok(Some(Self {
            column: series.name().to_string(),
            count: values.len(),
            missing: series.len() - values.len(),
            mean,
            std,
            min,
            q1: q(0.25)?,
            median: q(0.5)?,
            q3: q(0.75)?,
            max,
            skewness: skewness(&values, mean),
            kurtosis: kurtosis(&values, mean),
        }))
    }
}

/// Summarize every numeric column that has at least one value.
pub fn describe_numeric(df: &DataFrame) -> Result<Vec<NumericSummary>> {
    let mut summaries = Vec::new();

    for col in df.get_columns() {
        if column_kind(col.dtype()) != ColumnKind::Numeric {
            continue;
        }

        let summary = NumericSummary::from_series(col.as_materialized_series())
            .context(format!("Summarizing '{}'", col.name()))?;
        summaries.extend(summary);
    }

    Ok(summaries)
}
