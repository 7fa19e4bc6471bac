//! Format standardisation for text columns.

use crate::cleaner::transform::{FormatRule, Outcome};
use crate::cleaner::{convert, util};
use crate::error::{Result, ScourError};
use polars::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// Applies each column's rule to its values. Dates that fail to parse become
/// null; other rules leave values they cannot interpret untouched.
/// `records_affected` counts the cells whose string representation changed.
pub fn standardize_formats(
    df: &DataFrame,
    rules: &BTreeMap<String, FormatRule>,
) -> Result<Outcome> {
    let names: Vec<String> = rules.keys().cloned().collect();
    util::ensure_columns_exist(df, &names)?;

    let mut out = df.clone();
    let mut changed = 0;
    let mut warnings = Vec::new();
    for (name, rule) in rules {
        let s = df.column(name.as_str())?.as_materialized_series();
        if s.dtype() != &DataType::String {
            warnings.push(format!("Column '{name}' is not text; skipped"));
            continue;
        }
        let custom = match rule {
            FormatRule::Regex { pattern, replace } => {
                let re = Regex::new(pattern).map_err(|e| {
                    ScourError::InvalidArgument(format!(
                        "Invalid pattern for column '{name}': {e}"
                    ))
                })?;
                Some((re, replace.clone()))
            }
            _ => None,
        };
        let vals = util::to_string_vec(s)?;
        let mut col_changed = 0;
        let mut bad_emails = 0;
        let formatted: Vec<Option<String>> = vals
            .into_iter()
            .map(|v| {
                let before = v?;
                let after = match rule {
                    FormatRule::Phone => Some(format_phone(&before)),
                    FormatRule::Date => convert::reformat_date(before.trim()),
                    FormatRule::Currency => Some(format_currency(&before)),
                    FormatRule::Email => {
                        let canon = before.trim().to_lowercase();
                        if !EMAIL_SHAPE.is_match(&canon) {
                            bad_emails += 1;
                        }
                        Some(canon)
                    }
                    FormatRule::Regex { .. } => custom.as_ref().map(|(re, replace)| {
                        re.replace_all(&before, replace.as_str()).into_owned()
                    }),
                };
                if after.as_deref() != Some(before.as_str()) {
                    col_changed += 1;
                }
                after
            })
            .collect();
        if bad_emails > 0 {
            warnings.push(format!(
                "Column '{name}': {bad_emails} values do not look like email addresses"
            ));
        }
        if col_changed > 0 {
            out.replace(name.as_str(), Series::new(name.as_str().into(), formatted))?;
            changed += col_changed;
        }
    }
    let mut outcome = Outcome::new(out, changed);
    outcome.warnings = warnings;
    Ok(outcome)
}

/// Ten digits regroup as `(XXX) XXX-XXXX`; an eleventh leading 1 is dropped.
/// Anything else is returned untouched.
fn format_phone(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return value.to_string(),
    };
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

fn format_currency(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',') && !c.is_whitespace())
        .collect();
    match stripped.parse::<f64>() {
        Ok(amount) => format!("{amount:.2}"),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(df: &DataFrame, name: &str, rule: FormatRule) -> Outcome {
        let mut rules = BTreeMap::new();
        rules.insert(name.to_string(), rule);
        standardize_formats(df, &rules).unwrap()
    }

    #[test]
    fn test_phone_numbers_regroup_to_a_canonical_shape() {
        let df = df! { "p" => ["555-123-4567", "1 (555) 987 6543", "n/a"] }.unwrap();
        let out = run(&df, "p", FormatRule::Phone);
        let vals: Vec<Option<&str>> = out.df.column("p").unwrap().as_materialized_series().str().unwrap().iter().collect();
        assert_eq!(
            vals,
            vec![Some("(555) 123-4567"), Some("(555) 987-6543"), Some("n/a")]
        );
        assert_eq!(out.records_affected, 2);
    }

    #[test]
    fn test_unparseable_dates_become_null() {
        let df = df! { "d" => ["01/15/2024", "2024-02-03", "not a date"] }.unwrap();
        let out = run(&df, "d", FormatRule::Date);
        let vals: Vec<Option<&str>> = out.df.column("d").unwrap().as_materialized_series().str().unwrap().iter().collect();
        assert_eq!(vals[0], Some("2024-01-15"));
        assert_eq!(vals[2], None);
        assert_eq!(out.records_affected, 2);
    }

    #[test]
    fn test_currency_strips_symbols_and_fixes_decimals() {
        let df = df! { "c" => ["$1,234.5", "€20", "free"] }.unwrap();
        let out = run(&df, "c", FormatRule::Currency);
        let vals: Vec<Option<&str>> = out.df.column("c").unwrap().as_materialized_series().str().unwrap().iter().collect();
        assert_eq!(vals, vec![Some("1234.50"), Some("20.00"), Some("free")]);
    }

    #[test]
    fn test_email_lowercases_and_flags_bad_shapes() {
        let df = df! { "e" => [" User@Example.COM ", "not-an-email"] }.unwrap();
        let out = run(&df, "e", FormatRule::Email);
        let vals: Vec<Option<&str>> = out.df.column("e").unwrap().as_materialized_series().str().unwrap().iter().collect();
        assert_eq!(vals[0], Some("user@example.com"));
        // Flagged, not removed.
        assert_eq!(vals[1], Some("not-an-email"));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_custom_regex_rules_rewrite_values() {
        let df = df! { "s" => ["id-001", "id-002"] }.unwrap();
        let out = run(
            &df,
            "s",
            FormatRule::Regex {
                pattern: "^id-".to_string(),
                replace: "ID/".to_string(),
            },
        );
        let vals: Vec<Option<&str>> = out.df.column("s").unwrap().as_materialized_series().str().unwrap().iter().collect();
        assert_eq!(vals, vec![Some("ID/001"), Some("ID/002")]);
        assert_eq!(out.records_affected, 2);
    }

    #[test]
    fn test_invalid_regex_is_rejected_up_front() {
        let df = df! { "s" => ["x"] }.unwrap();
        let mut rules = BTreeMap::new();
        rules.insert(
            "s".to_string(),
            FormatRule::Regex {
                pattern: "(".to_string(),
                replace: String::new(),
            },
        );
        assert!(standardize_formats(&df, &rules).is_err());
    }
}
