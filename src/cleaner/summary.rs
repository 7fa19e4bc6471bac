//! Read-only session summary for the export layer.

use crate::cleaner::history::CleaningHistory;
use crate::cleaner::quality::QualityReport;
use crate::cleaner::util;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Snapshot of the session's current state: shape, schema, hygiene
/// percentages and history availability. Everything here is derived; holding
/// a summary does not pin the frame it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct DataSummary {
    pub session_id: Uuid,
    pub rows: usize,
    pub columns: usize,
    pub dtypes: BTreeMap<String, String>,
    pub missing_pct: f64,
    pub duplicate_pct: f64,
    pub quality_score: f64,
    pub operations_applied: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub recent_operations: Vec<String>,
}

const RECENT_OPERATIONS: usize = 5;

impl DataSummary {
    pub(crate) fn build(
        session_id: Uuid,
        df: &DataFrame,
        quality: &QualityReport,
        history: &CleaningHistory,
    ) -> Result<Self> {
        let dtypes: BTreeMap<String, String> = df
            .schema()
            .iter()
            .map(|(name, dtype)| (name.to_string(), dtype.to_string()))
            .collect();
        let total_cells = df.height() * df.width();
        let total_nulls: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
        let missing_pct = if total_cells == 0 {
            0.0
        } else {
            total_nulls as f64 / total_cells as f64 * 100.0
        };
        let duplicate_pct = if df.height() == 0 {
            0.0
        } else {
            util::duplicate_row_count(df)? as f64 / df.height() as f64 * 100.0
        };
        let recent_operations: Vec<String> = history
            .operations()
            .iter()
            .rev()
            .take(RECENT_OPERATIONS)
            .map(|op| op.description.clone())
            .collect();
        Ok(DataSummary {
            session_id,
            rows: df.height(),
            columns: df.width(),
            dtypes,
            missing_pct,
            duplicate_pct,
            quality_score: quality.score,
            operations_applied: history.len().saturating_sub(1),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
            recent_operations,
        })
    }
}
