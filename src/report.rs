//! Structured, user-facing error descriptions.
//!
//! The cleaning session never lets a raw error cross its boundary. Every
//! failure is handed to an [`ErrorReporter`] collaborator, injected at
//! session construction, which turns it into an [`ErrorReport`]: a category,
//! a plain-language message, a suggested action and a retryability flag that
//! the UI layer can render directly.
//!
//! The reporter is a trait so host applications can substitute their own
//! wording or routing; [`DefaultReporter`] covers the CLI and tests.

use crate::error::ScourError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Broad failure category, used by the UI to pick an icon/severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller supplied bad parameters (unknown column, bad enum value).
    Validation,
    /// Undo/redo attempted with no history in that direction.
    State,
    /// File system failure.
    Io,
    /// Anything that went wrong inside the data processing itself.
    Data,
}

/// User-facing description of one failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub category: ErrorCategory,
    pub message: String,
    pub suggested_action: String,
    pub retryable: bool,
    /// The operation that was being attempted, e.g. `"remove_outliers"`.
    pub operation: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (during {})", self.message, self.operation)
    }
}

impl std::error::Error for ErrorReport {}

/// Collaborator that turns engine errors into user-facing reports.
pub trait ErrorReporter {
    fn describe(&self, error: &ScourError, operation: &str) -> ErrorReport;
}

/// Default reporter: maps each error variant to a category and a generic
/// suggested action, and logs the failure.
#[derive(Debug, Default)]
pub struct DefaultReporter;

impl ErrorReporter for DefaultReporter {
    fn describe(&self, error: &ScourError, operation: &str) -> ErrorReport {
        let (category, suggested_action, retryable) = match error {
            ScourError::InvalidArgument(_) => (
                ErrorCategory::Validation,
                "Verify that the referenced columns exist in the dataset and \
                 that the operation parameters are valid."
                    .to_owned(),
                false,
            ),
            ScourError::InvalidState(_) => (
                ErrorCategory::State,
                "There is no further history in that direction. Apply an \
                 operation before undoing, or undo before redoing."
                    .to_owned(),
                false,
            ),
            ScourError::Io(_) => (
                ErrorCategory::Io,
                "Check that the file path is correct and that you have \
                 permission to access it."
                    .to_owned(),
                true,
            ),
            ScourError::DataProcessing(_) => (
                ErrorCategory::Data,
                "Check the data format and try a different processing approach."
                    .to_owned(),
                true,
            ),
        };

        let report = ErrorReport {
            category,
            message: error.to_string(),
            suggested_action,
            retryable,
            operation: operation.to_owned(),
            timestamp: Utc::now(),
        };

        tracing::error!(operation, category = ?report.category, "{}", report.message);
        report
    }
}
