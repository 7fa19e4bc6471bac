//! The cleaning session: owner of the dataset, its history and the error
//! reporting collaborator.
//!
//! All mutation goes through [`CleaningSession::apply`], which runs a
//! [`Transform`], appends the record and snapshot to the ledger and hands
//! back the applied record. Failures are returned already shaped for the
//! caller by the session's [`ErrorReporter`] — no raw engine error crosses
//! this boundary. The session is single-owner and not safe for concurrent
//! mutation; callers serialize access.

use crate::cleaner::history::{CleaningHistory, OperationRecord, DEFAULT_MAX_RETAINED};
use crate::cleaner::quality::{analyze_quality, QualityReport};
use crate::cleaner::summary::DataSummary;
use crate::cleaner::transform::Transform;
use crate::error::Result;
use crate::report::{DefaultReporter, ErrorReport, ErrorReporter};
use chrono::Utc;
use polars::prelude::DataFrame;
use tracing::info;
use uuid::Uuid;

/// A successfully applied transform: the ledger record plus the non-fatal
/// notes the operation collected along the way.
#[derive(Debug, Clone)]
pub struct Applied {
    pub record: OperationRecord,
    pub warnings: Vec<String>,
    pub conversion_errors: Vec<String>,
}

pub struct CleaningSession {
    id: Uuid,
    history: CleaningHistory,
    reporter: Box<dyn ErrorReporter>,
}

impl CleaningSession {
    pub fn new(df: DataFrame) -> Self {
        Self::with_reporter(df, Box::new(DefaultReporter))
    }

    pub fn with_reporter(df: DataFrame, reporter: Box<dyn ErrorReporter>) -> Self {
        Self::with_capacity(df, DEFAULT_MAX_RETAINED, reporter)
    }

    pub fn with_capacity(
        df: DataFrame,
        max_retained: usize,
        reporter: Box<dyn ErrorReporter>,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, rows = df.height(), columns = df.width(), "session started");
        Self {
            id,
            history: CleaningHistory::new(df, max_retained),
            reporter,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current dataset state.
    pub fn data(&self) -> &DataFrame {
        self.history.current()
    }

    /// Runs `transform` against the current state and records the result.
    ///
    /// # Errors
    ///
    /// Returns the reporter's structured description of the failure; the
    /// dataset and ledger are left untouched.
    pub fn apply(&mut self, transform: &Transform) -> std::result::Result<Applied, ErrorReport> {
        self.try_apply(transform)
            .map_err(|e| self.reporter.describe(&e, transform.kind()))
    }

    fn try_apply(&mut self, transform: &Transform) -> Result<Applied> {
        let target_columns = transform.target_columns(self.history.current());
        let outcome = transform.apply(self.history.current())?;
        let record = OperationRecord {
            kind: transform.kind().to_owned(),
            parameters: transform.parameters(),
            target_columns,
            description: transform.describe(&outcome),
            applied: true,
            records_affected: outcome.records_affected,
            timestamp: Utc::now(),
        };
        info!(
            session = %self.id,
            operation = %record.kind,
            records_affected = record.records_affected,
            "{}", record.description
        );
        for warning in &outcome.warnings {
            tracing::warn!(session = %self.id, operation = %record.kind, "{warning}");
        }
        self.history.append(record.clone(), outcome.df);
        Ok(Applied {
            record,
            warnings: outcome.warnings,
            conversion_errors: outcome.conversion_errors,
        })
    }

    /// Steps back one operation.
    pub fn undo(&mut self) -> std::result::Result<&DataFrame, ErrorReport> {
        if let Err(e) = self.history.undo().map(|_| ()) {
            return Err(self.reporter.describe(&e, "undo"));
        }
        Ok(self.history.current())
    }

    /// Steps forward one operation.
    pub fn redo(&mut self) -> std::result::Result<&DataFrame, ErrorReport> {
        if let Err(e) = self.history.redo().map(|_| ()) {
            return Err(self.reporter.describe(&e, "redo"));
        }
        Ok(self.history.current())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Discards all history and returns to the dataset captured at
    /// construction. The ledger is replaced wholesale with a fresh
    /// `initial_state` entry.
    pub fn reset(&mut self) -> &DataFrame {
        let original = self.history.original().clone();
        let max_retained = self.history.max_retained();
        info!(session = %self.id, "session reset to original dataset");
        self.history = CleaningHistory::new(original, max_retained);
        self.history.current()
    }

    /// The audit trail, oldest first, including the initial state entry.
    pub fn operations(&self) -> &[OperationRecord] {
        self.history.operations()
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &CleaningHistory {
        &self.history
    }

    pub(crate) fn reporter(&self) -> &dyn ErrorReporter {
        self.reporter.as_ref()
    }

    /// Quality report over the current dataset state.
    pub fn quality(&self) -> Result<QualityReport> {
        analyze_quality(self.history.current())
    }

    /// Read-only summary of the session for the export layer.
    pub fn summary(&self) -> Result<DataSummary> {
        let quality = self.quality()?;
        DataSummary::build(self.id, self.history.current(), &quality, &self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::transform::{DedupStrategy, MissingStrategy};
    use polars::prelude::*;

    fn scenario_frame() -> DataFrame {
        df! {
            "id" => [1i64, 2, 2, 3],
            "val" => [None, Some("b"), Some("b"), Some("c")],
        }
        .unwrap()
    }

    #[test]
    fn test_apply_undo_redo_reset_walk_the_ledger() {
        let mut session = CleaningSession::new(scenario_frame());
        assert_eq!(session.data().height(), 4);

        let applied = session
            .apply(&Transform::RemoveDuplicates {
                strategy: DedupStrategy::First,
                subset: None,
            })
            .unwrap();
        assert_eq!(applied.record.records_affected, 1);
        assert_eq!(session.data().height(), 3);

        session
            .apply(&Transform::HandleMissingValues {
                strategy: MissingStrategy::Drop,
                columns: Some(vec!["val".to_string()]),
                fill_value: None,
            })
            .unwrap();
        assert_eq!(session.data().height(), 2);

        session.undo().unwrap();
        assert_eq!(session.data().height(), 3);
        session.redo().unwrap();
        assert_eq!(session.data().height(), 2);

        session.reset();
        assert_eq!(session.data().height(), 4);
        assert_eq!(session.operations().len(), 1);
        // The fresh ledger still allows stepping back to the original.
        assert!(session.can_undo());
        assert_eq!(session.undo().unwrap().height(), 4);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_failures_come_back_shaped_by_the_reporter() {
        let mut session = CleaningSession::new(scenario_frame());
        let report = session
            .apply(&Transform::DropColumns {
                columns: vec!["ghost".to_string()],
            })
            .unwrap_err();
        assert_eq!(report.operation, "drop_columns");
        assert!(!report.retryable);
        // The failed apply left no trace in the ledger.
        assert_eq!(session.operations().len(), 1);
        assert_eq!(session.data().height(), 4);
    }

    #[test]
    fn test_undo_past_the_original_is_a_state_error() {
        let mut session = CleaningSession::new(scenario_frame());
        // One step back from the initial entry serves the original dataset.
        assert_eq!(session.undo().unwrap().height(), 4);
        let report = session.undo().unwrap_err();
        assert_eq!(report.operation, "undo");
    }

    #[test]
    fn test_audit_trail_carries_parameters_and_descriptions() {
        let mut session = CleaningSession::new(scenario_frame());
        session
            .apply(&Transform::RemoveDuplicates {
                strategy: DedupStrategy::Last,
                subset: Some(vec!["id".to_string()]),
            })
            .unwrap();
        let ops = session.operations();
        assert_eq!(ops[0].kind, "initial_state");
        assert_eq!(ops[1].kind, "remove_duplicates");
        assert!(ops[1].description.contains("'last' strategy"));
        assert_eq!(ops[1].target_columns, vec!["id".to_string()]);
    }

    #[test]
    fn test_summary_reflects_the_current_state() {
        let mut session = CleaningSession::new(scenario_frame());
        session
            .apply(&Transform::RemoveDuplicates {
                strategy: DedupStrategy::First,
                subset: None,
            })
            .unwrap();
        let summary = session.summary().unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.operations_applied, 1);
        assert!(summary.can_undo);
        assert!(!summary.can_redo);
        assert_eq!(summary.session_id, session.id());

        // The summary is the export payload; it must serialize whole.
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json["session_id"],
            serde_json::json!(session.id().to_string())
        );
        assert_eq!(json["rows"], serde_json::json!(3));
    }

    #[test]
    fn test_undo_can_reach_the_original_until_eviction() {
        let mut session = CleaningSession::new(scenario_frame());
        session
            .apply(&Transform::RemoveDuplicates {
                strategy: DedupStrategy::First,
                subset: None,
            })
            .unwrap();
        // Back past the initial entry to the pre-history original, then stop.
        session.undo().unwrap();
        assert_eq!(session.data().height(), 4);
        assert!(session.can_undo());
        session.undo().unwrap();
        assert_eq!(session.data().height(), 4);
        assert!(!session.can_undo());
        assert!(session.undo().is_err());
    }
}
