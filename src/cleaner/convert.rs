//! Column type conversion.
//!
//! Coercion is best effort per value: anything that cannot be coerced becomes
//! null and is tallied into the outcome's `conversion_errors`, one entry per
//! affected column. `records_affected` counts the full column height for every
//! column whose dtype actually changed.

use crate::cleaner::transform::{Outcome, TargetType};
use crate::cleaner::util;
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeMap;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d-%m-%Y", "%B %d, %Y",
    "%d %B %Y",
];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

pub fn convert_types(df: &DataFrame, mapping: &BTreeMap<String, TargetType>) -> Result<Outcome> {
    let names: Vec<String> = mapping.keys().cloned().collect();
    util::ensure_columns_exist(df, &names)?;

    let mut out = df.clone();
    let mut affected = 0;
    let mut errors = Vec::new();
    for (name, target) in mapping {
        let s = df.column(name.as_str())?.as_materialized_series();
        let (series, failures) = convert_column(s, *target)?;
        if failures > 0 {
            errors.push(format!(
                "Column '{name}': {failures} values could not be converted and became null"
            ));
        }
        if series.dtype() != s.dtype() {
            affected += s.len();
            out.replace(name.as_str(), series)?;
        }
    }
    let mut outcome = Outcome::new(out, affected);
    outcome.conversion_errors = errors;
    Ok(outcome)
}

fn convert_column(s: &Series, target: TargetType) -> Result<(Series, usize)> {
    let name: PlSmallStr = s.name().clone();
    match target {
        TargetType::Numeric => {
            let (vals, failures) = parse_numeric(s)?;
            if vals.iter().flatten().all(|v| v.fract() == 0.0) {
                let ints: Vec<Option<i64>> =
                    vals.into_iter().map(|v| v.map(|f| f as i64)).collect();
                Ok((Series::new(name, ints), failures))
            } else {
                Ok((Series::new(name, vals), failures))
            }
        }
        TargetType::Integer => {
            let (vals, mut failures) = parse_numeric(s)?;
            let ints: Vec<Option<i64>> = vals
                .into_iter()
                .map(|v| match v {
                    Some(f) if f.fract() == 0.0 => Some(f as i64),
                    Some(_) => {
                        failures += 1;
                        None
                    }
                    None => None,
                })
                .collect();
            Ok((Series::new(name, ints), failures))
        }
        TargetType::Float => {
            let (vals, failures) = parse_numeric(s)?;
            Ok((Series::new(name, vals), failures))
        }
        TargetType::Text => Ok((s.cast(&DataType::String)?, 0)),
        TargetType::Datetime => convert_datetime(s),
        TargetType::Categorical => Ok((
            s.cast(&DataType::Categorical(None, Default::default()))?,
            0,
        )),
        TargetType::Boolean => convert_boolean(s),
    }
}

/// Values widened to `Option<f64>`, with a count of non-null values that
/// failed to parse (and so became null).
fn parse_numeric(s: &Series) -> Result<(Vec<Option<f64>>, usize)> {
    if s.dtype() == &DataType::String {
        let vals = util::to_string_vec(s)?;
        let mut failures = 0;
        let parsed: Vec<Option<f64>> = vals
            .into_iter()
            .map(|v| {
                let raw = v?;
                let trimmed = raw.trim().replace(',', "");
                if trimmed.is_empty() {
                    return None;
                }
                match trimmed.parse::<f64>() {
                    Ok(f) => Some(f),
                    Err(_) => {
                        failures += 1;
                        None
                    }
                }
            })
            .collect();
        Ok((parsed, failures))
    } else {
        Ok((util::to_f64_vec(s)?, 0))
    }
}

fn convert_datetime(s: &Series) -> Result<(Series, usize)> {
    let name: PlSmallStr = s.name().clone();
    if s.dtype() != &DataType::String {
        return Ok((
            s.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
            0,
        ));
    }
    let vals = util::to_string_vec(s)?;
    let mut failures = 0;
    let millis: Vec<Option<i64>> = vals
        .into_iter()
        .map(|v| {
            let raw = v?;
            match parse_datetime_millis(raw.trim()) {
                Some(ms) => Some(ms),
                None => {
                    failures += 1;
                    None
                }
            }
        })
        .collect();
    let series =
        Series::new(name, millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok((series, failures))
}

pub(crate) fn parse_datetime_millis(value: &str) -> Option<i64> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Parses one date string against the common layouts, returning it
/// reformatted as `%Y-%m-%d`.
pub(crate) fn reformat_date(value: &str) -> Option<String> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.format("%Y-%m-%d").to_string());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn convert_boolean(s: &Series) -> Result<(Series, usize)> {
    let name: PlSmallStr = s.name().clone();
    match s.dtype() {
        DataType::Boolean => Ok((s.clone(), 0)),
        DataType::String => {
            let vals = util::to_string_vec(s)?;
            let mut failures = 0;
            let bools: Vec<Option<bool>> = vals
                .into_iter()
                .map(|v| {
                    let raw = v?;
                    match parse_bool_token(raw.trim()) {
                        Some(b) => Some(b),
                        None => {
                            failures += 1;
                            None
                        }
                    }
                })
                .collect();
            Ok((Series::new(name, bools), failures))
        }
        _ => {
            let vals = util::to_f64_vec(s)?;
            let mut failures = 0;
            let bools: Vec<Option<bool>> = vals
                .into_iter()
                .map(|v| match v {
                    None => None,
                    Some(f) if f == 0.0 => Some(false),
                    Some(f) if f == 1.0 => Some(true),
                    Some(_) => {
                        failures += 1;
                        None
                    }
                })
                .collect();
            Ok((Series::new(name, bools), failures))
        }
    }
}

fn parse_bool_token(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "y" => Some(true),
        "false" | "no" | "0" | "n" => Some(false),
        _ => None,
    }
}

/// Share of non-null values that parse as numbers. Used by the quality pass
/// and auto-clean's type inference; only meaningful on text columns.
pub(crate) fn numeric_share(s: &Series) -> Result<f64> {
    let vals = util::to_string_vec(s)?;
    let mut present = 0usize;
    let mut parseable = 0usize;
    for v in vals.iter().flatten() {
        present += 1;
        let trimmed = v.trim().replace(',', "");
        if !trimmed.is_empty() && trimmed.parse::<f64>().is_ok() {
            parseable += 1;
        }
    }
    if present == 0 {
        Ok(0.0)
    } else {
        Ok(parseable as f64 / present as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_promotes_whole_strings_to_integers() {
        let df = df! { "a" => ["1", "2", "3"] }.unwrap();
        let mut mapping = BTreeMap::new();
        mapping.insert("a".to_string(), TargetType::Numeric);
        let out = convert_types(&df, &mapping).unwrap();
        assert_eq!(out.df.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(out.records_affected, 3);
        assert!(out.conversion_errors.is_empty());
    }

    #[test]
    fn test_numeric_keeps_floats_when_fractions_present() {
        let df = df! { "a" => ["1.5", "2", "2,500.25"] }.unwrap();
        let mut mapping = BTreeMap::new();
        mapping.insert("a".to_string(), TargetType::Numeric);
        let out = convert_types(&df, &mapping).unwrap();
        assert_eq!(out.df.column("a").unwrap().dtype(), &DataType::Float64);
        let vals: Vec<Option<f64>> = out.df.column("a").unwrap().as_materialized_series().f64().unwrap().iter().collect();
        assert_eq!(vals[2], Some(2500.25));
    }

    #[test]
    fn test_unparseable_values_become_null_and_are_reported() {
        let df = df! { "a" => ["1", "oops", "3"] }.unwrap();
        let mut mapping = BTreeMap::new();
        mapping.insert("a".to_string(), TargetType::Integer);
        let out = convert_types(&df, &mapping).unwrap();
        assert_eq!(out.conversion_errors.len(), 1);
        assert!(out.conversion_errors[0].contains("1 values"));
        let col = out.df.column("a").unwrap();
        assert_eq!(col.dtype(), &DataType::Int64);
        assert_eq!(col.null_count(), 1);
        assert_eq!(out.records_affected, 3);
    }

    #[test]
    fn test_unknown_column_is_an_argument_error() {
        let df = df! { "a" => ["1"] }.unwrap();
        let mut mapping = BTreeMap::new();
        mapping.insert("missing".to_string(), TargetType::Float);
        assert!(convert_types(&df, &mapping).is_err());
    }

    #[test]
    fn test_boolean_tokens_parse_case_insensitively() {
        let df = df! { "f" => ["Yes", "no", "TRUE", "0"] }.unwrap();
        let mut mapping = BTreeMap::new();
        mapping.insert("f".to_string(), TargetType::Boolean);
        let out = convert_types(&df, &mapping).unwrap();
        let vals: Vec<Option<bool>> =
            out.df.column("f").unwrap().as_materialized_series().bool().unwrap().iter().collect();
        assert_eq!(vals, vec![Some(true), Some(false), Some(true), Some(false)]);
    }

    #[test]
    fn test_datetime_strings_parse_against_common_layouts() {
        let df = df! { "d" => ["2024-01-02", "01/15/2024"] }.unwrap();
        let mut mapping = BTreeMap::new();
        mapping.insert("d".to_string(), TargetType::Datetime);
        let out = convert_types(&df, &mapping).unwrap();
        assert!(matches!(
            out.df.column("d").unwrap().dtype(),
            DataType::Datetime(_, _)
        ));
        assert!(out.conversion_errors.is_empty());
    }

    #[test]
    fn test_ambiguous_dates_resolve_month_first() {
        assert_eq!(reformat_date("03/04/2024").as_deref(), Some("2024-03-04"));
        // Day-first layouts still parse once the month slot overflows.
        assert_eq!(reformat_date("25/12/2024").as_deref(), Some("2024-12-25"));
    }

    #[test]
    fn test_numeric_share_counts_parseable_text() {
        let s = Series::new("a".into(), vec!["1", "2.5", "x", "4"]);
        assert_eq!(numeric_share(&s).unwrap(), 0.75);
    }
}
