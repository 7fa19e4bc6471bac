//! Small helpers shared by the transform modules.

use crate::error::{Result, ScourError};
use polars::prelude::*;
use std::collections::HashSet;

/// Fails with `InvalidArgument` if any of `cols` is missing from `df`.
pub(crate) fn ensure_columns_exist(df: &DataFrame, cols: &[String]) -> Result<()> {
    let missing: Vec<&str> = cols
        .iter()
        .filter(|c| df.column(c.as_str()).is_err())
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ScourError::InvalidArgument(format!(
            "Columns not found: {missing:?}"
        )))
    }
}

/// All column names, owned.
pub(crate) fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect()
}

/// Names of the string-typed columns.
pub(crate) fn text_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect()
}

/// Names of the numeric columns.
pub(crate) fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_numeric())
        .map(|c| c.name().to_string())
        .collect()
}

/// Keeps the rows where `keep` is true. `keep` must have one entry per row.
pub(crate) fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Per-row null flags for one column.
pub(crate) fn null_mask(s: &Series) -> Vec<bool> {
    s.is_null().into_iter().map(|v| v.unwrap_or(false)).collect()
}

/// Total null count across the named columns.
pub(crate) fn null_count_in(df: &DataFrame, cols: &[String]) -> Result<usize> {
    let mut total = 0;
    for name in cols {
        total += df.column(name.as_str())?.null_count();
    }
    Ok(total)
}

/// Column values widened to `Option<f64>`.
pub(crate) fn to_f64_vec(s: &Series) -> Result<Vec<Option<f64>>> {
    let ca = s.cast(&DataType::Float64)?;
    let ca = ca.f64()?;
    Ok(ca.into_iter().collect())
}

/// String column values, owned. Fails on non-string columns.
pub(crate) fn to_string_vec(s: &Series) -> Result<Vec<Option<String>>> {
    let ca = s.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_owned)).collect())
}

/// One grouping key per row over the given columns. Nulls key as their
/// display form, so rows with matching nulls group together.
pub(crate) fn row_keys(df: &DataFrame, cols: &[String]) -> Result<Vec<String>> {
    let mut keys = vec![String::new(); df.height()];
    for name in cols {
        let s = df.column(name.as_str())?.as_materialized_series();
        for (i, key) in keys.iter_mut().enumerate() {
            key.push_str(&s.get(i)?.to_string());
            key.push('\u{1f}');
        }
    }
    Ok(keys)
}

/// Rows that are exact duplicates of an earlier row, over all columns.
pub(crate) fn duplicate_row_count(df: &DataFrame) -> Result<usize> {
    if df.height() == 0 {
        return Ok(0);
    }
    let keys = row_keys(df, &column_names(df))?;
    let mut seen = HashSet::with_capacity(keys.len());
    Ok(keys.into_iter().filter(|k| !seen.insert(k.clone())).count())
}
