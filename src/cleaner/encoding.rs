//! Mojibake repair for text columns.
//!
//! Fixes the usual UTF-8-read-as-Latin-1 artefacts, then strips characters
//! that are neither printable ASCII nor one of the repaired forms.

use crate::cleaner::transform::Outcome;
use crate::cleaner::util;
use crate::error::Result;
use polars::prelude::*;

/// Longest sequences first, so partial prefixes never shadow a full match.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("â€™", "'"),
    ("â€œ", "\u{201c}"),
    ("â€\u{9d}", "\u{201d}"),
    ("â€“", "\u{2013}"),
    ("â€”", "\u{2014}"),
    ("â€¦", "\u{2026}"),
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã­", "í"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã±", "ñ"),
    ("Â°", "°"),
    ("Â ", " "),
];

/// Targets the given columns, or every text column when `columns` is `None`.
/// `records_affected` counts the cells whose value changed.
pub fn fix_encoding(df: &DataFrame, columns: Option<&[String]>) -> Result<Outcome> {
    let mut warnings = Vec::new();
    let targets: Vec<String> = match columns {
        Some(cols) => {
            util::ensure_columns_exist(df, cols)?;
            let mut text = Vec::new();
            for name in cols {
                if df.column(name.as_str())?.dtype() == &DataType::String {
                    text.push(name.clone());
                } else {
                    warnings.push(format!("Column '{name}' is not text; skipped"));
                }
            }
            text
        }
        None => util::text_column_names(df),
    };

    let mut out = df.clone();
    let mut changed = 0;
    for name in &targets {
        let s = df.column(name.as_str())?.as_materialized_series();
        let vals = util::to_string_vec(s)?;
        let mut col_changed = 0;
        let repaired: Vec<Option<String>> = vals
            .into_iter()
            .map(|v| {
                v.map(|before| {
                    let after = repair(&before);
                    if after != before {
                        col_changed += 1;
                    }
                    after
                })
            })
            .collect();
        if col_changed > 0 {
            out.replace(name.as_str(), Series::new(name.as_str().into(), repaired))?;
            changed += col_changed;
        }
    }
    let mut outcome = Outcome::new(out, changed);
    outcome.warnings = warnings;
    Ok(outcome)
}

fn repair(value: &str) -> String {
    let mut text = value.to_string();
    for (broken, fixed) in REPLACEMENTS {
        if text.contains(broken) {
            text = text.replace(broken, fixed);
        }
    }
    text.chars().filter(|&c| is_kept(c)).collect()
}

fn is_kept(c: char) -> bool {
    if c == '\t' || c == '\n' || (' '..='~').contains(&c) {
        return true;
    }
    REPLACEMENTS
        .iter()
        .any(|(_, fixed)| fixed.chars().any(|f| f == c))
}
