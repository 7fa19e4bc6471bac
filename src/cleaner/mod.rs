//! The data-cleaning engine.
//!
//! A [`session::CleaningSession`] owns the working `DataFrame`, the original
//! input captured at construction, and a [`history::CleaningHistory`] ledger
//! of every applied [`transform::Transform`] paired with a post-operation
//! snapshot. Transforms are pure (`DataFrame` in, new `DataFrame` +
//! records-affected out); the session is the only thing that mutates state,
//! and it does so atomically — a failed transform leaves both the frame and
//! the ledger untouched.

pub mod autoclean;
pub mod columns;
pub mod convert;
pub mod dedup;
pub mod encoding;
pub mod formats;
pub mod history;
pub mod missing;
pub mod outliers;
pub mod quality;
pub mod session;
pub mod summary;
pub mod text;
pub mod transform;
pub(crate) mod util;

pub use autoclean::{auto_clean, AutoCleanReport};
pub use history::{CleaningHistory, OperationRecord};
pub use quality::{analyze_quality, QualityReport};
pub use session::{Applied, CleaningSession};
pub use summary::DataSummary;
pub use transform::{Outcome, Transform};

#[cfg(test)]
mod tests;
