//! Outlier row removal.

use crate::cleaner::transform::{Outcome, OutlierMethod};
use crate::cleaner::util;
use crate::error::{Result, ScourError};
use polars::prelude::*;

/// Drops rows holding an outlier in any targeted numeric column. Non-numeric
/// targets are ignored with a warning; if none of the targets is numeric the
/// operation fails. Nulls never count as outliers.
pub fn remove_outliers(
    df: &DataFrame,
    columns: &[String],
    method: OutlierMethod,
    threshold: f64,
) -> Result<Outcome> {
    util::ensure_columns_exist(df, columns)?;
    if threshold <= 0.0 {
        return Err(ScourError::InvalidArgument(
            "Outlier threshold must be positive".to_string(),
        ));
    }

    let mut warnings = Vec::new();
    let mut numeric = Vec::new();
    for name in columns {
        if df.column(name.as_str())?.dtype().is_numeric() {
            numeric.push(name.clone());
        } else {
            warnings.push(format!("Column '{name}' is not numeric; skipped"));
        }
    }
    if numeric.is_empty() {
        return Err(ScourError::InvalidArgument(
            "No valid numeric columns found for outlier removal".to_string(),
        ));
    }

    let mut keep = vec![true; df.height()];
    for name in &numeric {
        let s = df.column(name.as_str())?.as_materialized_series();
        let ca = s.cast(&DataType::Float64)?;
        let ca = ca.f64()?;
        let bounds = match method {
            OutlierMethod::Iqr => iqr_bounds(ca, threshold)?,
            OutlierMethod::Zscore => zscore_bounds(ca, threshold),
        };
        let Some((lo, hi)) = bounds else { continue };
        for (row, v) in ca.iter().enumerate() {
            if let Some(v) = v {
                if v < lo || v > hi {
                    keep[row] = false;
                }
            }
        }
    }

    let removed = keep.iter().filter(|k| !**k).count();
    let out = util::filter_rows(df, &keep)?;
    let mut outcome = Outcome::new(out, removed);
    outcome.warnings = warnings;
    Ok(outcome)
}

fn iqr_bounds(ca: &Float64Chunked, threshold: f64) -> Result<Option<(f64, f64)>> {
    let q1 = ca.quantile(0.25, QuantileMethod::Linear)?;
    let q3 = ca.quantile(0.75, QuantileMethod::Linear)?;
    Ok(match (q1, q3) {
        (Some(q1), Some(q3)) => {
            let iqr = q3 - q1;
            Some((q1 - threshold * iqr, q3 + threshold * iqr))
        }
        _ => None,
    })
}

fn zscore_bounds(ca: &Float64Chunked, threshold: f64) -> Option<(f64, f64)> {
    let mean = ca.mean()?;
    let std = ca.std(1)?;
    if std == 0.0 {
        return None;
    }
    Some((mean - threshold * std, mean + threshold * std))
}
