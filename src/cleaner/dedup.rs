//! Duplicate row removal.

use crate::cleaner::transform::{DedupStrategy, Outcome};
use crate::cleaner::util;
use crate::error::Result;
use polars::prelude::*;
use std::collections::HashMap;

/// Drops duplicate rows, comparing either the given `subset` of columns or
/// every column. `records_affected` is the number of rows removed.
pub fn remove_duplicates(
    df: &DataFrame,
    strategy: DedupStrategy,
    subset: Option<&[String]>,
) -> Result<Outcome> {
    let cols: Vec<String> = match subset {
        Some(cols) => {
            util::ensure_columns_exist(df, cols)?;
            cols.to_vec()
        }
        None => util::column_names(df),
    };
    if df.height() == 0 || cols.is_empty() {
        return Ok(Outcome::new(df.clone(), 0));
    }

    let keys = util::row_keys(df, &cols)?;
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, key) in keys.iter().enumerate() {
        groups.entry(key.as_str()).or_default().push(row);
    }

    let mut keep = vec![false; df.height()];
    for rows in groups.values() {
        match strategy {
            DedupStrategy::First => keep[rows[0]] = true,
            DedupStrategy::Last => keep[rows[rows.len() - 1]] = true,
            DedupStrategy::All => {
                if rows.len() == 1 {
                    keep[rows[0]] = true;
                }
            }
        }
    }

    let removed = keep.iter().filter(|k| !**k).count();
    let out = util::filter_rows(df, &keep)?;
    Ok(Outcome::new(out, removed))
}
