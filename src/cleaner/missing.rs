//! Missing value handling.
//!
//! Every strategy reports `records_affected` as the drop in null count over
//! the targeted columns. Columns a strategy cannot handle are skipped with a
//! warning rather than failing the whole operation.

use crate::cleaner::transform::{FillValue, MissingStrategy, Outcome};
use crate::cleaner::util;
use crate::error::{Result, ScourError};
use polars::prelude::*;
use std::collections::HashMap;

const KNN_NEIGHBOURS: usize = 5;

pub fn handle_missing(
    df: &DataFrame,
    strategy: MissingStrategy,
    columns: Option<&[String]>,
    fill_value: Option<&FillValue>,
) -> Result<Outcome> {
    let cols: Vec<String> = match columns {
        Some(cols) => {
            util::ensure_columns_exist(df, cols)?;
            cols.to_vec()
        }
        None => util::column_names(df),
    };
    if df.height() == 0 || cols.is_empty() {
        return Ok(Outcome::new(df.clone(), 0));
    }

    match strategy {
        MissingStrategy::Drop => drop_rows(df, &cols),
        MissingStrategy::FillMean => fill_statistic(df, &cols, Statistic::Mean),
        MissingStrategy::FillMedian => fill_statistic(df, &cols, Statistic::Median),
        MissingStrategy::FillMode => fill_mode(df, &cols),
        MissingStrategy::FillCustom => {
            let value = fill_value.ok_or_else(|| {
                ScourError::InvalidArgument(
                    "fill_value is required for 'fill_custom' strategy".to_string(),
                )
            })?;
            fill_custom(df, &cols, value)
        }
        MissingStrategy::ForwardFill => fill_directional(df, &cols, FillNullStrategy::Forward(None)),
        MissingStrategy::BackwardFill => {
            fill_directional(df, &cols, FillNullStrategy::Backward(None))
        }
        MissingStrategy::Interpolate => interpolate(df, &cols),
        MissingStrategy::KnnImpute => knn_impute(df, &cols),
    }
}

fn drop_rows(df: &DataFrame, cols: &[String]) -> Result<Outcome> {
    let nulls_before = util::null_count_in(df, cols)?;
    let mut keep = vec![true; df.height()];
    for name in cols {
        let s = df.column(name.as_str())?.as_materialized_series();
        for (row, is_null) in util::null_mask(s).into_iter().enumerate() {
            if is_null {
                keep[row] = false;
            }
        }
    }
    let out = util::filter_rows(df, &keep)?;
    let nulls_after = util::null_count_in(&out, cols)?;
    Ok(Outcome::new(out, nulls_before - nulls_after))
}

enum Statistic {
    Mean,
    Median,
}

fn fill_statistic(df: &DataFrame, cols: &[String], stat: Statistic) -> Result<Outcome> {
    let mut out = df.clone();
    let mut filled = 0;
    let mut warnings = Vec::new();
    for name in cols {
        let s = df.column(name.as_str())?.as_materialized_series();
        if !s.dtype().is_numeric() {
            warnings.push(format!("Column '{name}' is not numeric; skipped"));
            continue;
        }
        let nulls = s.null_count();
        if nulls == 0 {
            continue;
        }
        let ca = s.cast(&DataType::Float64)?;
        let ca = ca.f64()?;
        let value = match stat {
            Statistic::Mean => ca.mean(),
            Statistic::Median => ca.median(),
        };
        let Some(value) = value else {
            warnings.push(format!("Column '{name}' has no values to average; skipped"));
            continue;
        };
        let vals: Vec<Option<f64>> = ca.iter().map(|v| v.or(Some(value))).collect();
        let series = Series::new(name.as_str().into(), vals);
        out.replace(name.as_str(), series)?;
        filled += nulls;
    }
    let mut outcome = Outcome::new(out, filled);
    outcome.warnings = warnings;
    Ok(outcome)
}

fn fill_mode(df: &DataFrame, cols: &[String]) -> Result<Outcome> {
    let mut out = df.clone();
    let mut filled = 0;
    let mut warnings = Vec::new();
    for name in cols {
        let s = df.column(name.as_str())?.as_materialized_series();
        let nulls = s.null_count();
        if nulls == 0 || nulls == s.len() {
            continue;
        }
        let replaced = match s.dtype() {
            DataType::String => {
                let vals = util::to_string_vec(s)?;
                let mode = most_frequent(vals.iter().flatten()).cloned();
                mode.map(|m| {
                    let filled: Vec<Option<String>> = vals
                        .into_iter()
                        .map(|v| v.or_else(|| Some(m.clone())))
                        .collect();
                    Series::new(name.as_str().into(), filled)
                })
            }
            DataType::Boolean => {
                let ca = s.bool()?;
                let vals: Vec<Option<bool>> = ca.iter().collect();
                let mode = most_frequent(vals.iter().flatten()).copied();
                mode.map(|m| {
                    let filled: Vec<Option<bool>> =
                        vals.into_iter().map(|v| v.or(Some(m))).collect();
                    Series::new(name.as_str().into(), filled)
                })
            }
            dtype if dtype.is_numeric() => {
                let vals = util::to_f64_vec(s)?;
                let mode = most_frequent(vals.iter().flatten().map(|v| v.to_bits()));
                mode.map(|bits| {
                    let m = f64::from_bits(bits);
                    let filled: Vec<Option<f64>> = vals.into_iter().map(|v| v.or(Some(m))).collect();
                    Series::new(name.as_str().into(), filled)
                })
            }
            dtype => {
                warnings.push(format!(
                    "Column '{name}' has unsupported type {dtype} for mode fill; skipped"
                ));
                continue;
            }
        };
        if let Some(series) = replaced {
            out.replace(name.as_str(), series)?;
            filled += nulls;
        }
    }
    let mut outcome = Outcome::new(out, filled);
    outcome.warnings = warnings;
    Ok(outcome)
}

/// Most common value among `values`, ties broken by first occurrence.
fn most_frequent<T, I>(values: I) -> Option<T>
where
    T: Clone + std::hash::Hash + Eq,
    I: Iterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (order, v) in values.enumerate() {
        let entry = counts.entry(v).or_insert((0, order));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(v, _)| v)
}

fn fill_custom(df: &DataFrame, cols: &[String], value: &FillValue) -> Result<Outcome> {
    let mut out = df.clone();
    let mut filled = 0;
    let mut warnings = Vec::new();
    for name in cols {
        let s = df.column(name.as_str())?.as_materialized_series();
        let nulls = s.null_count();
        if nulls == 0 {
            continue;
        }
        let series = match (value, s.dtype()) {
            (FillValue::Number(n), dtype) if dtype.is_numeric() => {
                let vals: Vec<Option<f64>> = util::to_f64_vec(s)?
                    .into_iter()
                    .map(|v| v.or(Some(*n)))
                    .collect();
                Series::new(name.as_str().into(), vals)
            }
            (FillValue::Text(t), DataType::String) => {
                let vals: Vec<Option<String>> = util::to_string_vec(s)?
                    .into_iter()
                    .map(|v| v.or_else(|| Some(t.clone())))
                    .collect();
                Series::new(name.as_str().into(), vals)
            }
            (FillValue::Bool(b), DataType::Boolean) => {
                let vals: Vec<Option<bool>> =
                    s.bool()?.iter().map(|v| v.or(Some(*b))).collect();
                Series::new(name.as_str().into(), vals)
            }
            (_, dtype) => {
                warnings.push(format!(
                    "Fill value is incompatible with column '{name}' of type {dtype}; skipped"
                ));
                continue;
            }
        };
        out.replace(name.as_str(), series)?;
        filled += nulls;
    }
    let mut outcome = Outcome::new(out, filled);
    outcome.warnings = warnings;
    Ok(outcome)
}

fn fill_directional(
    df: &DataFrame,
    cols: &[String],
    strategy: FillNullStrategy,
) -> Result<Outcome> {
    let mut out = df.clone();
    let mut filled = 0;
    for name in cols {
        let s = df.column(name.as_str())?.as_materialized_series();
        let before = s.null_count();
        if before == 0 {
            continue;
        }
        let series = s.fill_null(strategy)?;
        filled += before - series.null_count();
        out.replace(name.as_str(), series)?;
    }
    Ok(Outcome::new(out, filled))
}

/// Linear interpolation between known points, scanned front to back. Gaps
/// before the first known value stay null; gaps after the last known value
/// take that value.
fn interpolate(df: &DataFrame, cols: &[String]) -> Result<Outcome> {
    let mut out = df.clone();
    let mut filled = 0;
    let mut warnings = Vec::new();
    for name in cols {
        let s = df.column(name.as_str())?.as_materialized_series();
        if !s.dtype().is_numeric() {
            warnings.push(format!("Column '{name}' is not numeric; skipped"));
            continue;
        }
        let before = s.null_count();
        if before == 0 || before == s.len() {
            continue;
        }
        let mut vals = util::to_f64_vec(s)?;
        interpolate_in_place(&mut vals);
        let after = vals.iter().filter(|v| v.is_none()).count();
        filled += before - after;
        out.replace(name.as_str(), Series::new(name.as_str().into(), vals))?;
    }
    let mut outcome = Outcome::new(out, filled);
    outcome.warnings = warnings;
    Ok(outcome)
}

fn interpolate_in_place(vals: &mut [Option<f64>]) {
    let mut last_known: Option<(usize, f64)> = None;
    for row in 0..vals.len() {
        if let Some(v) = vals[row] {
            if let Some((prev_row, prev)) = last_known {
                let gap = row - prev_row;
                if gap > 1 {
                    let step = (v - prev) / gap as f64;
                    for (offset, slot) in vals[prev_row + 1..row].iter_mut().enumerate() {
                        *slot = Some(prev + step * (offset + 1) as f64);
                    }
                }
            }
            last_known = Some((row, v));
        }
    }
    // Trailing gap extends the last known value.
    if let Some((prev_row, prev)) = last_known {
        for slot in vals[prev_row + 1..].iter_mut() {
            *slot = Some(prev);
        }
    }
}

/// Fills numeric gaps with the mean of the nearest rows, measured over the
/// targeted numeric columns with a distance that ignores mutually missing
/// dimensions.
fn knn_impute(df: &DataFrame, cols: &[String]) -> Result<Outcome> {
    let mut warnings = Vec::new();
    let mut numeric: Vec<String> = Vec::new();
    for name in cols {
        let s = df.column(name.as_str())?;
        if s.dtype().is_numeric() {
            numeric.push(name.clone());
        } else {
            warnings.push(format!("Column '{name}' is not numeric; skipped"));
        }
    }
    if numeric.is_empty() {
        let mut outcome = Outcome::new(df.clone(), 0);
        outcome.warnings = warnings;
        return Ok(outcome);
    }

    let height = df.height();
    let mut matrix: Vec<Vec<Option<f64>>> = Vec::with_capacity(numeric.len());
    for name in &numeric {
        let s = df.column(name.as_str())?.as_materialized_series();
        matrix.push(util::to_f64_vec(s)?);
    }

    let mut out = df.clone();
    let mut filled = 0;
    for (col_idx, name) in numeric.iter().enumerate() {
        if matrix[col_idx].iter().all(|v| v.is_none()) {
            warnings.push(format!("Column '{name}' is entirely missing; skipped"));
            continue;
        }
        let col_mean = column_mean(&matrix[col_idx]);
        let mut vals = matrix[col_idx].clone();
        let mut touched = 0;
        for row in 0..height {
            if vals[row].is_some() {
                continue;
            }
            let mut candidates: Vec<(f64, f64)> = Vec::new();
            for other in 0..height {
                if other == row {
                    continue;
                }
                let Some(value) = matrix[col_idx][other] else {
                    continue;
                };
                if let Some(dist) = nan_distance(&matrix, row, other) {
                    candidates.push((dist, value));
                }
            }
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
            let replacement = if candidates.is_empty() {
                col_mean
            } else {
                let k = candidates.len().min(KNN_NEIGHBOURS);
                let sum: f64 = candidates[..k].iter().map(|(_, v)| v).sum();
                Some(sum / k as f64)
            };
            if let Some(replacement) = replacement {
                vals[row] = Some(replacement);
                touched += 1;
            }
        }
        if touched > 0 {
            out.replace(name.as_str(), Series::new(name.as_str().into(), vals))?;
            filled += touched;
        }
    }
    let mut outcome = Outcome::new(out, filled);
    outcome.warnings = warnings;
    Ok(outcome)
}

fn column_mean(vals: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = vals.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Euclidean distance over the dimensions both rows have, scaled up for the
/// dimensions they do not share. `None` when no dimension is shared.
fn nan_distance(matrix: &[Vec<Option<f64>>], a: usize, b: usize) -> Option<f64> {
    let total = matrix.len();
    let mut shared = 0;
    let mut sum = 0.0;
    for col in matrix {
        if let (Some(x), Some(y)) = (col[a], col[b]) {
            shared += 1;
            sum += (x - y) * (x - y);
        }
    }
    if shared == 0 {
        None
    } else {
        Some((sum * total as f64 / shared as f64).sqrt())
    }
}
