//! The fixed auto-clean pipeline.
//!
//! Seven detection-driven steps, each applied through the session so every
//! mutation lands in the undo/redo ledger as its own entry. Steps whose
//! trigger condition is absent are skipped entirely, keeping the audit trail
//! free of no-op records.

use crate::cleaner::session::CleaningSession;
use crate::cleaner::transform::{
    DedupStrategy, MissingStrategy, OutlierMethod, TargetType, TextOp, Transform,
};
use crate::cleaner::{convert, util};
use crate::error::ScourError;
use crate::report::ErrorReport;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Null fraction above which a column is dropped outright.
const DROP_COLUMN_THRESHOLD: f64 = 0.8;
const DROP_COLUMN_THRESHOLD_AGGRESSIVE: f64 = 0.5;
/// IQR fence multiplier for the aggressive outlier pass.
const OUTLIER_THRESHOLD: f64 = 2.0;
/// Share of parseable values above which a text column is converted.
const NUMERIC_INFERENCE_SHARE: f64 = 0.8;

#[derive(Debug, Clone, Serialize)]
pub struct AutoCleanReport {
    pub aggressive: bool,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub operations_performed: Vec<String>,
    pub issues_fixed: Vec<String>,
}

/// Runs the pipeline against the session's current dataset.
///
/// # Errors
///
/// Any step failing surfaces the session reporter's structured description;
/// steps already applied stay in the ledger and can be undone individually.
pub fn auto_clean(
    session: &mut CleaningSession,
    aggressive: bool,
) -> std::result::Result<AutoCleanReport, ErrorReport> {
    let rows_before = session.data().height();
    let columns_before = session.data().width();
    let mut report = AutoCleanReport {
        aggressive,
        rows_before,
        rows_after: rows_before,
        columns_before,
        columns_after: columns_before,
        operations_performed: Vec::new(),
        issues_fixed: Vec::new(),
    };
    info!(aggressive, rows = rows_before, columns = columns_before, "auto-clean started");

    // 1. Encoding repair across all text columns.
    if !util::text_column_names(session.data()).is_empty() {
        let applied = session.apply(&Transform::FixEncodingIssues { columns: None })?;
        record_step(
            &mut report,
            &applied.record.description,
            applied.record.records_affected,
            format!("Fixed encoding issues in {} values", applied.record.records_affected),
        );
    }

    // 2. Fully-null columns, then fully-null rows.
    let dead_columns = fully_null_columns(session.data());
    if !dead_columns.is_empty() {
        let n = dead_columns.len();
        let applied = session.apply(&Transform::DropColumns {
            columns: dead_columns,
        })?;
        record_step(
            &mut report,
            &applied.record.description,
            n,
            format!("Removed {n} empty columns"),
        );
    }
    if has_fully_null_row(session.data()) {
        let applied = session.apply(&Transform::DropEmptyRows)?;
        record_step(
            &mut report,
            &applied.record.description,
            applied.record.records_affected,
            format!("Removed {} empty rows", applied.record.records_affected),
        );
    }

    // 3. Deduplicate when duplicates exist.
    let duplicates = match util::duplicate_row_count(session.data()) {
        Ok(n) => n,
        Err(e) => return Err(session.reporter().describe(&e, "remove_duplicates")),
    };
    if duplicates > 0 {
        let applied = session.apply(&Transform::RemoveDuplicates {
            strategy: DedupStrategy::First,
            subset: None,
        })?;
        record_step(
            &mut report,
            &applied.record.description,
            applied.record.records_affected,
            format!("Removed {} duplicate rows", applied.record.records_affected),
        );
    }

    // 4. Text cleanup.
    let text_columns = util::text_column_names(session.data());
    if !text_columns.is_empty() {
        let mut operations = vec![TextOp::RemoveExtraSpaces, TextOp::NormalizeWhitespace];
        if aggressive {
            operations.push(TextOp::RemoveSpecialChars);
            operations.push(TextOp::Lowercase);
        }
        let applied = session.apply(&Transform::CleanText {
            columns: text_columns,
            operations,
        })?;
        record_step(
            &mut report,
            &applied.record.description,
            applied.record.records_affected,
            format!("Cleaned {} text values", applied.record.records_affected),
        );
    }

    // 5. Null-heavy columns dropped, remaining gaps filled.
    let threshold = if aggressive {
        DROP_COLUMN_THRESHOLD_AGGRESSIVE
    } else {
        DROP_COLUMN_THRESHOLD
    };
    let sparse = sparse_columns(session.data(), threshold);
    if !sparse.is_empty() {
        let n = sparse.len();
        let applied = session.apply(&Transform::DropColumns { columns: sparse })?;
        record_step(
            &mut report,
            &applied.record.description,
            n,
            format!("Removed {n} mostly-empty columns"),
        );
    }
    let numeric_with_nulls = columns_with_nulls(session.data(), true);
    if !numeric_with_nulls.is_empty() {
        let applied = session.apply(&Transform::HandleMissingValues {
            strategy: MissingStrategy::FillMedian,
            columns: Some(numeric_with_nulls),
            fill_value: None,
        })?;
        record_step(
            &mut report,
            &applied.record.description,
            applied.record.records_affected,
            format!("Filled {} missing numeric values", applied.record.records_affected),
        );
    }
    let text_with_nulls = columns_with_nulls(session.data(), false);
    if !text_with_nulls.is_empty() {
        let applied = session.apply(&Transform::HandleMissingValues {
            strategy: MissingStrategy::FillMode,
            columns: Some(text_with_nulls),
            fill_value: None,
        })?;
        record_step(
            &mut report,
            &applied.record.description,
            applied.record.records_affected,
            format!("Filled {} missing text values", applied.record.records_affected),
        );
    }

    // 6. Aggressive outlier removal.
    if aggressive {
        let numeric = util::numeric_column_names(session.data());
        if !numeric.is_empty() {
            let applied = session.apply(&Transform::RemoveOutliers {
                columns: numeric,
                method: OutlierMethod::Iqr,
                threshold: OUTLIER_THRESHOLD,
            })?;
            record_step(
                &mut report,
                &applied.record.description,
                applied.record.records_affected,
                format!("Removed {} outlier rows", applied.record.records_affected),
            );
        }
    }

    // 7. Numeric type inference over text columns.
    let mut mapping = BTreeMap::new();
    for name in util::text_column_names(session.data()) {
        let share = {
            let df = session.data();
            let col = match df.column(name.as_str()) {
                Ok(c) => c,
                Err(e) => {
                    let e = ScourError::from(e);
                    return Err(session.reporter().describe(&e, "convert_data_types"));
                }
            };
            match convert::numeric_share(col.as_materialized_series()) {
                Ok(share) => share,
                Err(e) => return Err(session.reporter().describe(&e, "convert_data_types")),
            }
        };
        if share > NUMERIC_INFERENCE_SHARE {
            mapping.insert(name, TargetType::Numeric);
        }
    }
    if !mapping.is_empty() {
        let n = mapping.len();
        let applied = session.apply(&Transform::ConvertDataTypes { mapping })?;
        record_step(
            &mut report,
            &applied.record.description,
            n,
            format!("Converted {n} text columns to numeric types"),
        );
    }

    report.rows_after = session.data().height();
    report.columns_after = session.data().width();
    info!(
        rows = report.rows_after,
        columns = report.columns_after,
        operations = report.operations_performed.len(),
        "auto-clean finished"
    );
    Ok(report)
}

fn record_step(report: &mut AutoCleanReport, description: &str, affected: usize, issue: String) {
    report.operations_performed.push(description.to_string());
    if affected > 0 {
        report.issues_fixed.push(issue);
    }
}

fn fully_null_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| df.height() > 0 && c.null_count() == df.height())
        .map(|c| c.name().to_string())
        .collect()
}

fn sparse_columns(df: &DataFrame, threshold: f64) -> Vec<String> {
    if df.height() == 0 {
        return Vec::new();
    }
    df.get_columns()
        .iter()
        .filter(|c| c.null_count() as f64 / df.height() as f64 > threshold)
        .map(|c| c.name().to_string())
        .collect()
}

/// Columns of the requested family (numeric or text) that still hold nulls.
fn columns_with_nulls(df: &DataFrame, numeric: bool) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| {
            let family = if numeric {
                c.dtype().is_numeric()
            } else {
                c.dtype() == &DataType::String
            };
            family && c.null_count() > 0
        })
        .map(|c| c.name().to_string())
        .collect()
}

fn has_fully_null_row(df: &DataFrame) -> bool {
    if df.height() == 0 || df.width() == 0 {
        return false;
    }
    let mut has_value = vec![false; df.height()];
    for col in df.get_columns() {
        let s = col.as_materialized_series();
        for (row, is_null) in util::null_mask(s).into_iter().enumerate() {
            if !is_null {
                has_value[row] = true;
            }
        }
    }
    has_value.iter().any(|v| !*v)
}
