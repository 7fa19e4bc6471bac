//! Operation records and the undo/redo ledger.
//!
//! The ledger is a linear, append-only pairing of [`OperationRecord`]s with
//! post-operation `DataFrame` snapshots plus a cursor. Appending while the
//! cursor sits before the end truncates the redo branch first — branching is
//! not supported. Retention is bounded: once more than `max_retained`
//! operations exist, the oldest record/snapshot pair is evicted and the
//! oldest retained snapshot becomes the effective floor for undo. Undo below
//! that floor fails rather than silently clamping.

use crate::error::{Result, ScourError};
use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::HashMap;

/// Default snapshot retention bound. Long sessions trade the ability to undo
/// arbitrarily far back for bounded memory.
pub const DEFAULT_MAX_RETAINED: usize = 20;

/// Immutable description of one applied transformation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationRecord {
    /// Stable operation name, e.g. `"remove_duplicates"`.
    pub kind: String,
    /// The operation's parameter payload, serialized for the audit trail.
    pub parameters: HashMap<String, serde_json::Value>,
    /// Columns the operation targeted, in request order.
    pub target_columns: Vec<String>,
    /// Human-readable summary for rendering in the UI.
    pub description: String,
    pub applied: bool,
    /// Rows or cells whose value changed, defined per operation.
    pub records_affected: usize,
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    /// Synthetic record wrapping the unmodified input dataset.
    pub fn initial_state() -> Self {
        Self {
            kind: "initial_state".to_owned(),
            parameters: HashMap::new(),
            target_columns: Vec::new(),
            description: "Initial dataset state".to_owned(),
            applied: true,
            records_affected: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Linear undo/redo ledger with bounded snapshot retention.
#[derive(Debug, Clone)]
pub struct CleaningHistory {
    operations: Vec<OperationRecord>,
    snapshots: Vec<DataFrame>,
    /// Points one past the currently active operation; `0` means "before
    /// everything", i.e. the original input.
    cursor: usize,
    max_retained: usize,
    /// How many record/snapshot pairs have been evicted off the front.
    evicted: usize,
    /// The input dataset captured at session start. Served when the cursor
    /// is at 0 and never mutated by any transform.
    original: DataFrame,
}

impl CleaningHistory {
    /// Creates a ledger seeded with a single `initial_state` entry wrapping
    /// `original`.
    pub fn new(original: DataFrame, max_retained: usize) -> Self {
        let snapshot = original.clone();
        let mut history = Self {
            operations: Vec::new(),
            snapshots: Vec::new(),
            cursor: 0,
            max_retained: max_retained.max(1),
            evicted: 0,
            original,
        };
        history.append(OperationRecord::initial_state(), snapshot);
        history
    }

    /// Appends an operation and its post-operation snapshot.
    ///
    /// Discards the redo branch if the cursor is not at the end, then
    /// enforces the retention bound by evicting the oldest pair.
    pub fn append(&mut self, op: OperationRecord, snapshot: DataFrame) {
        if self.cursor < self.operations.len() {
            self.operations.truncate(self.cursor);
            self.snapshots.truncate(self.cursor);
        }

        self.operations.push(op);
        self.snapshots.push(snapshot);
        self.cursor = self.operations.len();

        if self.operations.len() > self.max_retained {
            self.operations.remove(0);
            self.snapshots.remove(0);
            self.cursor -= 1;
            self.evicted += 1;
        }
    }

    /// Lowest cursor position undo may reach. Position 0 (the pre-history
    /// original) is only reachable while nothing has been evicted.
    fn undo_floor(&self) -> usize {
        usize::from(self.evicted > 0)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > self.undo_floor()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.operations.len()
    }

    /// Steps the cursor back one operation and returns the dataset state it
    /// now points at.
    ///
    /// # Errors
    ///
    /// `InvalidState` when the cursor is already at the undo floor; the
    /// ledger is left unchanged.
    pub fn undo(&mut self) -> Result<&DataFrame> {
        if !self.can_undo() {
            return Err(ScourError::InvalidState(
                "No operations to undo".to_owned(),
            ));
        }
        self.cursor -= 1;
        Ok(self.current())
    }

    /// Steps the cursor forward one operation.
    ///
    /// # Errors
    ///
    /// `InvalidState` when the cursor is already at the newest operation.
    pub fn redo(&mut self) -> Result<&DataFrame> {
        if !self.can_redo() {
            return Err(ScourError::InvalidState(
                "No operations to redo".to_owned(),
            ));
        }
        self.cursor += 1;
        Ok(self.current())
    }

    /// The dataset state the cursor currently points at.
    pub fn current(&self) -> &DataFrame {
        if self.cursor > 0 {
            &self.snapshots[self.cursor - 1]
        } else {
            &self.original
        }
    }

    /// The record the cursor currently points at, if any.
    pub fn current_operation(&self) -> Option<&OperationRecord> {
        if self.cursor > 0 {
            self.operations.get(self.cursor - 1)
        } else {
            None
        }
    }

    pub fn operations(&self) -> &[OperationRecord] {
        &self.operations
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_retained(&self) -> usize {
        self.max_retained
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The original input dataset captured at construction.
    pub fn original(&self) -> &DataFrame {
        &self.original
    }
}
