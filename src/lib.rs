//! # Scour - Tabular Data Cleaning Engine
//!
//! Scour cleans scraped or loaded tabular datasets: deduplication, missing
//! value handling, text normalisation, type coercion, outlier removal, format
//! standardisation and encoding repair — every mutation recorded in a bounded
//! undo/redo ledger.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scour::cleaner::{CleaningSession, Transform};
//! use scour::cleaner::transform::DedupStrategy;
//!
//! # fn example() -> anyhow::Result<()> {
//! let df = scour::io::load_df("data.csv".as_ref())?;
//! let mut session = CleaningSession::new(df);
//!
//! let applied = session
//!     .apply(&Transform::RemoveDuplicates {
//!         strategy: DedupStrategy::First,
//!         subset: None,
//!     })
//!     .map_err(|e| anyhow::anyhow!(e.message))?;
//! println!("{}", applied.record.description);
//!
//! // Changed your mind?
//! session.undo().map_err(|e| anyhow::anyhow!(e.message))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`cleaner`]: the engine — sessions, transforms, history, quality
//!   analysis and the auto-clean pipeline
//! - [`io`]: dataset loading and saving (CSV, Parquet, JSON)
//! - [`report`]: structured, user-facing error descriptions
//! - [`error`]: the crate error type
//! - [`logging`]: tracing setup with rolling file output

pub mod cleaner;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;

pub use cleaner::{CleaningSession, Transform};
pub use error::{Result, ScourError};
