//! Text column cleaning.

use crate::cleaner::transform::{Outcome, TextOp};
use crate::cleaner::util;
use crate::error::Result;
use polars::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

static SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid regex"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static ANY_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Applies `operations` in order to each targeted string column.
/// `records_affected` counts the cells whose value changed.
pub fn clean_text(df: &DataFrame, columns: &[String], operations: &[TextOp]) -> Result<Outcome> {
    util::ensure_columns_exist(df, columns)?;
    let mut out = df.clone();
    let mut changed = 0;
    let mut warnings = Vec::new();
    for name in columns {
        let s = df.column(name.as_str())?.as_materialized_series();
        if s.dtype() != &DataType::String {
            warnings.push(format!("Column '{name}' is not text; skipped"));
            continue;
        }
        let vals = util::to_string_vec(s)?;
        let mut col_changed = 0;
        let cleaned: Vec<Option<String>> = vals
            .into_iter()
            .map(|v| {
                v.map(|before| {
                    let after = apply_ops(&before, operations);
                    if after != before {
                        col_changed += 1;
                    }
                    after
                })
            })
            .collect();
        if col_changed > 0 {
            out.replace(name.as_str(), Series::new(name.as_str().into(), cleaned))?;
            changed += col_changed;
        }
    }
    let mut outcome = Outcome::new(out, changed);
    outcome.warnings = warnings;
    Ok(outcome)
}

fn apply_ops(value: &str, operations: &[TextOp]) -> String {
    let mut text = value.to_string();
    for op in operations {
        text = match op {
            TextOp::RemoveSpecialChars => collapse(&SPECIAL_CHARS.replace_all(&text, "")),
            TextOp::RemoveExtraSpaces => MULTI_SPACE.replace_all(&text, " ").trim().to_string(),
            TextOp::Lowercase => text.to_lowercase(),
            TextOp::Uppercase => text.to_uppercase(),
            TextOp::TitleCase => title_case(&text),
            TextOp::RemoveNumbers => collapse(&DIGITS.replace_all(&text, "")),
            TextOp::RemoveHtmlTags => collapse(&HTML_TAG.replace_all(&text, "")),
            TextOp::NormalizeWhitespace => {
                ANY_WHITESPACE.replace_all(&text, " ").trim().to_string()
            }
        };
    }
    text
}

/// Removal operators leave double spaces behind; collapse them and trim.
fn collapse(text: &str) -> String {
    MULTI_SPACE.replace_all(text, " ").trim().to_string()
}

fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            result.push(ch);
        } else if at_word_start {
            result.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            result.extend(ch.to_lowercase());
        }
    }
    result
}
