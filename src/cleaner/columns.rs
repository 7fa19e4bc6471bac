//! Structural column operations: rename, reorder, drop.
//!
//! These touch the frame's shape rather than its values, so they report zero
//! records affected, except [`drop_empty_rows`] which counts removed rows.

use crate::cleaner::transform::Outcome;
use crate::cleaner::util;
use crate::error::{Result, ScourError};
use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};

pub fn rename_columns(df: &DataFrame, mapping: &BTreeMap<String, String>) -> Result<Outcome> {
    let names: Vec<String> = mapping.keys().cloned().collect();
    util::ensure_columns_exist(df, &names)?;

    let resulting: Vec<String> = util::column_names(df)
        .into_iter()
        .map(|n| mapping.get(&n).cloned().unwrap_or(n))
        .collect();
    let unique: HashSet<&String> = resulting.iter().collect();
    if unique.len() != resulting.len() {
        return Err(ScourError::InvalidArgument(
            "Renaming would produce duplicate column names".to_string(),
        ));
    }

    let mut out = df.clone();
    for (old, new) in mapping {
        out.rename(old.as_str(), new.as_str().into())?;
    }
    Ok(Outcome::new(out, 0))
}

/// Moves the named columns to the front in the given order; the rest keep
/// their relative order after them.
pub fn reorder_columns(df: &DataFrame, order: &[String]) -> Result<Outcome> {
    util::ensure_columns_exist(df, order)?;
    let requested: HashSet<&String> = order.iter().collect();
    if requested.len() != order.len() {
        return Err(ScourError::InvalidArgument(
            "Column order contains duplicate names".to_string(),
        ));
    }
    let mut selection: Vec<String> = order.to_vec();
    for name in util::column_names(df) {
        if !requested.contains(&name) {
            selection.push(name);
        }
    }
    let out = df.select(selection.iter().map(String::as_str))?;
    Ok(Outcome::new(out, 0))
}

pub fn drop_columns(df: &DataFrame, columns: &[String]) -> Result<Outcome> {
    util::ensure_columns_exist(df, columns)?;
    let mut out = df.clone();
    for name in columns {
        out = out.drop(name.as_str())?;
    }
    Ok(Outcome::new(out, 0))
}

/// Removes rows where every column is null.
pub fn drop_empty_rows(df: &DataFrame) -> Result<Outcome> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(Outcome::new(df.clone(), 0));
    }
    let mut keep = vec![false; df.height()];
    for col in df.get_columns() {
        let s = col.as_materialized_series();
        for (row, is_null) in util::null_mask(s).into_iter().enumerate() {
            if !is_null {
                keep[row] = true;
            }
        }
    }
    let removed = keep.iter().filter(|k| !**k).count();
    let out = util::filter_rows(df, &keep)?;
    Ok(Outcome::new(out, removed))
}
