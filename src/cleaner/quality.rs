//! Read-only data quality scoring.
//!
//! The score starts at 100 and is penalised for missing data (up to 30),
//! duplicate rows (up to 20), numeric values stored as text (5 per column),
//! outlier-heavy numeric columns (3 per column) and text hygiene problems
//! (2 per finding). The analyzer never mutates and never fails on an empty
//! frame.

use crate::cleaner::{convert, util};
use crate::error::Result;
use polars::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

const NUMERIC_TEXT_SHARE: f64 = 0.8;
const OUTLIER_SHARE: f64 = 0.05;
const SPECIAL_CHAR_DENSITY: f64 = 0.3;

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub score: f64,
    pub missing_pct: f64,
    pub duplicate_pct: f64,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    pub fn band(&self) -> &'static str {
        if self.score < 60.0 {
            "poor"
        } else if self.score < 80.0 {
            "moderate"
        } else {
            "good"
        }
    }
}

pub fn analyze_quality(df: &DataFrame) -> Result<QualityReport> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(QualityReport {
            score: 0.0,
            missing_pct: 0.0,
            duplicate_pct: 0.0,
            issues: vec!["Dataset is empty".to_string()],
            recommendations: Vec::new(),
        });
    }

    let mut score = 100.0f64;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let total_cells = df.height() * df.width();
    let total_nulls: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
    let missing_pct = total_nulls as f64 / total_cells as f64 * 100.0;
    if missing_pct > 0.0 {
        score -= missing_pct.min(30.0);
        issues.push(format!("Missing data: {missing_pct:.1}% of all values"));
        recommendations.push("Fill or drop missing values".to_string());
    }

    let dup_rows = util::duplicate_row_count(df)?;
    let duplicate_pct = dup_rows as f64 / df.height() as f64 * 100.0;
    if dup_rows > 0 {
        score -= duplicate_pct.min(20.0);
        issues.push(format!(
            "Duplicate rows: {dup_rows} ({duplicate_pct:.1}%)"
        ));
        recommendations.push("Remove duplicate rows".to_string());
    }

    let mut numeric_as_text = Vec::new();
    for name in util::text_column_names(df) {
        let s = df.column(name.as_str())?.as_materialized_series();
        if convert::numeric_share(s)? >= NUMERIC_TEXT_SHARE {
            score -= 5.0;
            issues.push(format!("Column '{name}' stores numeric values as text"));
            numeric_as_text.push(name);
        }
    }
    if !numeric_as_text.is_empty() {
        recommendations.push("Convert numeric-looking text columns to numbers".to_string());
    }

    let mut outlier_cols = 0;
    for name in util::numeric_column_names(df) {
        let s = df.column(name.as_str())?.as_materialized_series();
        if let Some(pct) = outlier_share(s)? {
            if pct > OUTLIER_SHARE {
                score -= 3.0;
                outlier_cols += 1;
                issues.push(format!(
                    "Column '{name}' has {:.1}% outliers",
                    pct * 100.0
                ));
            }
        }
    }
    if outlier_cols > 0 {
        recommendations.push("Review or remove outlier rows".to_string());
    }

    let mut text_findings = 0;
    for name in util::text_column_names(df) {
        let s = df.column(name.as_str())?.as_materialized_series();
        let vals = util::to_string_vec(s)?;
        let present: Vec<&String> = vals.iter().flatten().collect();
        if present.is_empty() {
            continue;
        }
        if present.iter().any(|v| WHITESPACE_RUN.is_match(v)) {
            score -= 2.0;
            text_findings += 1;
            issues.push(format!("Column '{name}' has runs of extra whitespace"));
        }
        let (special, total): (usize, usize) = present.iter().fold((0, 0), |(sp, tot), v| {
            let sp = sp
                + v.chars()
                    .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
                    .count();
            (sp, tot + v.chars().count())
        });
        if total > 0 && special as f64 / total as f64 > SPECIAL_CHAR_DENSITY {
            score -= 2.0;
            text_findings += 1;
            issues.push(format!(
                "Column '{name}' is dense with special characters"
            ));
        }
    }
    if text_findings > 0 {
        recommendations.push("Clean text columns".to_string());
    }

    let score = score.max(0.0);
    let mut report = QualityReport {
        score,
        missing_pct,
        duplicate_pct,
        issues,
        recommendations,
    };
    let lead = match report.band() {
        "poor" => "Data quality is poor - consider comprehensive cleaning",
        "moderate" => "Data quality is moderate - targeted cleaning recommended",
        _ => "Data quality is good - minor cleanup only",
    };
    report.recommendations.insert(0, lead.to_string());
    Ok(report)
}

/// Fraction of non-null values outside the 1.5 IQR fences, or `None` when
/// the column has no values to measure.
fn outlier_share(s: &Series) -> Result<Option<f64>> {
    let ca = s.cast(&DataType::Float64)?;
    let ca = ca.f64()?;
    let q1 = ca.quantile(0.25, QuantileMethod::Linear)?;
    let q3 = ca.quantile(0.75, QuantileMethod::Linear)?;
    let (Some(q1), Some(q3)) = (q1, q3) else {
        return Ok(None);
    };
    let iqr = q3 - q1;
    let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let mut present = 0usize;
    let mut out = 0usize;
    for v in ca.iter().flatten() {
        present += 1;
        if v < lo || v > hi {
            out += 1;
        }
    }
    if present == 0 {
        Ok(None)
    } else {
        Ok(Some(out as f64 / present as f64))
    }
}
