//! The closed set of cleaning operations.
//!
//! Every mutation of a session's data goes through [`Transform::apply`], which
//! returns an [`Outcome`] carrying the new frame, the affected-record count and
//! any per-column warnings. Transforms never mutate their input frame.

use crate::cleaner::{columns, convert, dedup, encoding, formats, missing, outliers, text, util};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Which of a group of identical rows survive deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Keep the first occurrence.
    First,
    /// Keep the last occurrence.
    Last,
    /// Drop every row that appears more than once.
    All,
}

impl DedupStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            DedupStrategy::First => "first",
            DedupStrategy::Last => "last",
            DedupStrategy::All => "all",
        }
    }
}

/// How missing values are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Drop rows with a null in any targeted column.
    Drop,
    /// Numeric columns only.
    FillMean,
    /// Numeric columns only.
    FillMedian,
    /// Most frequent value per column.
    FillMode,
    /// Caller-supplied constant.
    FillCustom,
    ForwardFill,
    BackwardFill,
    /// Linear interpolation on numeric columns.
    Interpolate,
    /// Nearest-neighbour mean over the numeric columns.
    KnnImpute,
}

impl MissingStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            MissingStrategy::Drop => "drop",
            MissingStrategy::FillMean => "fill_mean",
            MissingStrategy::FillMedian => "fill_median",
            MissingStrategy::FillMode => "fill_mode",
            MissingStrategy::FillCustom => "fill_custom",
            MissingStrategy::ForwardFill => "forward_fill",
            MissingStrategy::BackwardFill => "backward_fill",
            MissingStrategy::Interpolate => "interpolate",
            MissingStrategy::KnnImpute => "knn_impute",
        }
    }
}

/// Constant used by [`MissingStrategy::FillCustom`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Text cleaning steps, applied in the order given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOp {
    RemoveSpecialChars,
    RemoveExtraSpaces,
    Lowercase,
    Uppercase,
    TitleCase,
    RemoveNumbers,
    RemoveHtmlTags,
    NormalizeWhitespace,
}

impl TextOp {
    pub fn as_str(self) -> &'static str {
        match self {
            TextOp::RemoveSpecialChars => "remove_special_chars",
            TextOp::RemoveExtraSpaces => "remove_extra_spaces",
            TextOp::Lowercase => "lowercase",
            TextOp::Uppercase => "uppercase",
            TextOp::TitleCase => "title_case",
            TextOp::RemoveNumbers => "remove_numbers",
            TextOp::RemoveHtmlTags => "remove_html_tags",
            TextOp::NormalizeWhitespace => "normalize_whitespace",
        }
    }
}

/// Target dtypes for [`Transform::ConvertTypes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Best-effort numeric: integer when every value is whole, float otherwise.
    Numeric,
    Integer,
    Float,
    Text,
    Datetime,
    Categorical,
    Boolean,
}

/// Outlier detection methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    Iqr,
    Zscore,
}

impl OutlierMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            OutlierMethod::Iqr => "iqr",
            OutlierMethod::Zscore => "zscore",
        }
    }
}

/// Per-column normalisation rules for [`Transform::StandardizeFormats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormatRule {
    /// Digits regrouped as `(XXX) XXX-XXXX`; unparseable values kept as-is.
    Phone,
    /// Parsed against a list of common layouts, reformatted as `%Y-%m-%d`.
    Date,
    /// Currency symbols and separators stripped, two decimal places kept.
    Currency,
    /// Lowercased and trimmed.
    Email,
    /// Custom find/replace over the column.
    Regex { pattern: String, replace: String },
}

impl FormatRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatRule::Phone => "phone",
            FormatRule::Date => "date",
            FormatRule::Currency => "currency",
            FormatRule::Email => "email",
            FormatRule::Regex { .. } => "regex",
        }
    }
}

/// A single cleaning operation with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    RemoveDuplicates {
        strategy: DedupStrategy,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subset: Option<Vec<String>>,
    },
    HandleMissingValues {
        strategy: MissingStrategy,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_value: Option<FillValue>,
    },
    CleanText {
        columns: Vec<String>,
        operations: Vec<TextOp>,
    },
    ConvertDataTypes {
        mapping: BTreeMap<String, TargetType>,
    },
    RenameColumns {
        mapping: BTreeMap<String, String>,
    },
    ReorderColumns {
        order: Vec<String>,
    },
    RemoveOutliers {
        columns: Vec<String>,
        method: OutlierMethod,
        threshold: f64,
    },
    StandardizeFormats {
        rules: BTreeMap<String, FormatRule>,
    },
    FixEncodingIssues {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<Vec<String>>,
    },
    DropColumns {
        columns: Vec<String>,
    },
    DropEmptyRows,
}

/// Result of applying one transform.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub df: DataFrame,
    /// Rows or cells touched, per the operation's own definition.
    pub records_affected: usize,
    /// Columns skipped and other non-fatal notes.
    pub warnings: Vec<String>,
    /// Per-column conversion failures. Only [`Transform::ConvertDataTypes`]
    /// populates this.
    pub conversion_errors: Vec<String>,
}

impl Outcome {
    pub(crate) fn new(df: DataFrame, records_affected: usize) -> Self {
        Outcome {
            df,
            records_affected,
            warnings: Vec::new(),
            conversion_errors: Vec::new(),
        }
    }
}

impl Transform {
    /// Stable identifier used in the audit ledger.
    pub fn kind(&self) -> &'static str {
        match self {
            Transform::RemoveDuplicates { .. } => "remove_duplicates",
            Transform::HandleMissingValues { .. } => "handle_missing_values",
            Transform::CleanText { .. } => "clean_text",
            Transform::ConvertDataTypes { .. } => "convert_data_types",
            Transform::RenameColumns { .. } => "rename_columns",
            Transform::ReorderColumns { .. } => "reorder_columns",
            Transform::RemoveOutliers { .. } => "remove_outliers",
            Transform::StandardizeFormats { .. } => "standardize_formats",
            Transform::FixEncodingIssues { .. } => "fix_encoding_issues",
            Transform::DropColumns { .. } => "drop_columns",
            Transform::DropEmptyRows => "drop_empty_rows",
        }
    }

    /// Columns this transform touches, with defaults resolved against `df`.
    pub fn target_columns(&self, df: &DataFrame) -> Vec<String> {
        match self {
            Transform::RemoveDuplicates { subset, .. } => {
                subset.clone().unwrap_or_else(|| util::column_names(df))
            }
            Transform::HandleMissingValues { columns, .. } => {
                columns.clone().unwrap_or_else(|| util::column_names(df))
            }
            Transform::CleanText { columns, .. } => columns.clone(),
            Transform::ConvertDataTypes { mapping } => mapping.keys().cloned().collect(),
            Transform::RenameColumns { mapping } => mapping.keys().cloned().collect(),
            Transform::ReorderColumns { order } => order.clone(),
            Transform::RemoveOutliers { columns, .. } => columns.clone(),
            Transform::StandardizeFormats { rules } => rules.keys().cloned().collect(),
            Transform::FixEncodingIssues { columns } => columns
                .clone()
                .unwrap_or_else(|| util::text_column_names(df)),
            Transform::DropColumns { columns } => columns.clone(),
            Transform::DropEmptyRows => Vec::new(),
        }
    }

    /// The transform's parameters as a loose map, for the audit ledger.
    pub fn parameters(&self) -> HashMap<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map
                .into_iter()
                .filter(|(key, _)| key != "kind")
                .collect(),
            _ => HashMap::new(),
        }
    }

    /// Human-readable summary, phrased against the outcome.
    pub fn describe(&self, outcome: &Outcome) -> String {
        let n = outcome.records_affected;
        match self {
            Transform::RemoveDuplicates { strategy, .. } => format!(
                "Removed {n} duplicate records using '{}' strategy",
                strategy.as_str()
            ),
            Transform::HandleMissingValues { strategy, .. } => format!(
                "Handled {n} missing values using '{}' strategy",
                strategy.as_str()
            ),
            Transform::CleanText { operations, .. } => {
                let ops: Vec<&str> = operations.iter().map(|op| op.as_str()).collect();
                format!("Applied text cleaning operations: {}", ops.join(", "))
            }
            Transform::ConvertDataTypes { mapping } => {
                format!("Converted data types for {} columns", mapping.len())
            }
            Transform::RenameColumns { mapping } => {
                format!("Renamed {} columns", mapping.len())
            }
            Transform::ReorderColumns { .. } => "Reordered columns".to_string(),
            Transform::RemoveOutliers { method, .. } => {
                format!("Removed {n} outliers using {} method", method.as_str())
            }
            Transform::StandardizeFormats { rules } => {
                format!("Standardized formats for {} columns", rules.len())
            }
            Transform::FixEncodingIssues { .. } => {
                format!("Fixed encoding issues affecting {n} values")
            }
            Transform::DropColumns { columns } => {
                format!("Dropped {} columns", columns.len())
            }
            Transform::DropEmptyRows => format!("Removed {n} empty rows"),
        }
    }

    /// Runs the transform against `df` and returns the outcome. The input
    /// frame is never modified; errors leave no partial state behind.
    pub fn apply(&self, df: &DataFrame) -> Result<Outcome> {
        match self {
            Transform::RemoveDuplicates { strategy, subset } => {
                dedup::remove_duplicates(df, *strategy, subset.as_deref())
            }
            Transform::HandleMissingValues {
                strategy,
                columns,
                fill_value,
            } => missing::handle_missing(df, *strategy, columns.as_deref(), fill_value.as_ref()),
            Transform::CleanText {
                columns,
                operations,
            } => text::clean_text(df, columns, operations),
            Transform::ConvertDataTypes { mapping } => convert::convert_types(df, mapping),
            Transform::RenameColumns { mapping } => columns::rename_columns(df, mapping),
            Transform::ReorderColumns { order } => columns::reorder_columns(df, order),
            Transform::RemoveOutliers {
                columns,
                method,
                threshold,
            } => outliers::remove_outliers(df, columns, *method, *threshold),
            Transform::StandardizeFormats { rules } => formats::standardize_formats(df, rules),
            Transform::FixEncodingIssues { columns } => {
                encoding::fix_encoding(df, columns.as_deref())
            }
            Transform::DropColumns { columns } => columns::drop_columns(df, columns),
            Transform::DropEmptyRows => columns::drop_empty_rows(df),
        }
    }
}
