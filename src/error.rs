//! Centralized error handling for the scour cleaning engine.
//!
//! The engine distinguishes between failures that abort an operation and
//! failures that are demoted to best-effort reporting:
//!
//! - [`ScourError::InvalidArgument`] — unknown column names, malformed enum
//!   values, missing required parameters. Surfaced synchronously, never
//!   retried, and the dataset/history are left untouched.
//! - [`ScourError::InvalidState`] — undo/redo called with no history in that
//!   direction. No mutation occurs.
//! - Unsupported column types (e.g. mean-fill on a text column) and
//!   per-value conversion failures are *not* errors: they are collected into
//!   the operation outcome as warnings / conversion-error entries and the
//!   operation continues for the remaining columns and values.
//!
//! `From` impls let the `?` operator lift I/O and polars failures into
//! [`ScourError`] without boilerplate.

use std::fmt;

/// Main error type for scour operations.
#[derive(Debug)]
pub enum ScourError {
    /// A parameter references an unknown column or carries an invalid value.
    InvalidArgument(String),

    /// Undo/redo requested with no available history in that direction.
    InvalidState(String),

    /// I/O errors (file operations).
    Io(std::io::Error),

    /// Data processing errors (polars, parsing).
    DataProcessing(String),
}

impl fmt::Display for ScourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
        }
    }
}

impl std::error::Error for ScourError {}

impl From<std::io::Error> for ScourError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<polars::error::PolarsError> for ScourError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<ScourError> for String {
    fn from(err: ScourError) -> Self {
        err.to_string()
    }
}

/// Result type alias for scour operations.
pub type Result<T> = std::result::Result<T, ScourError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScourError::InvalidArgument("Columns not found: [\"age\"]".to_owned());
        assert_eq!(
            err.to_string(),
            "Invalid argument: Columns not found: [\"age\"]"
        );
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = ScourError::InvalidState("No operations to undo".to_owned());
        let s: String = err.into();
        assert_eq!(s, "Invalid state: No operations to undo");
    }

    #[test]
    fn test_polars_error_lifts_to_data_processing() {
        let err: ScourError = polars::error::PolarsError::NoData("empty frame".into()).into();
        assert!(matches!(err, ScourError::DataProcessing(_)));
    }
}
