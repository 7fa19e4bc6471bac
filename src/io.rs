//! Dataset ingestion and export.
//!
//! The engine only ever sees a `DataFrame`; this module is the hand-off at
//! the file boundary. Formats are picked by extension, failures surface as
//! [`ScourError`] like every other engine entry point, and loading finishes
//! with a best-effort upgrade of string columns that are really datetimes
//! (scraped exports almost always ship timestamps as text).

use crate::cleaner::util;
use crate::error::{Result, ScourError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// On-disk formats the engine ingests and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Parquet,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "parquet" => Ok(FileFormat::Parquet),
            "json" => Ok(FileFormat::Json),
            _ => Err(ScourError::InvalidArgument(format!(
                "Unsupported file extension: '{ext}'"
            ))),
        }
    }
}

/// Loads a dataset from `path`, picking the reader by extension.
///
/// # Errors
///
/// `InvalidArgument` for an unrecognized extension; `Io` / `DataProcessing`
/// when the file cannot be opened or parsed.
pub fn load_df(path: &Path) -> Result<DataFrame> {
    let df = match FileFormat::from_path(path)? {
        FileFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10_000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        FileFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
        FileFormat::Json => JsonReader::new(File::open(path)?).finish()?,
    };
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "dataset loaded"
    );
    Ok(upgrade_temporal_columns(df))
}

/// Minimum share of a column's non-null values that must cast as datetimes
/// before the column is upgraded.
const TEMPORAL_PARSE_SHARE: f64 = 0.5;

fn upgrade_temporal_columns(mut df: DataFrame) -> DataFrame {
    for name in util::text_column_names(&df) {
        let Ok(col) = df.column(name.as_str()) else {
            continue;
        };
        let s = col.as_materialized_series();
        let non_null = s.len() - s.null_count();
        if non_null == 0 {
            continue;
        }
        let Ok(casted) = s.cast(&DataType::Datetime(TimeUnit::Milliseconds, None)) else {
            continue;
        };
        let parsed = s.len() - casted.null_count();
        if parsed as f64 / non_null as f64 >= TEMPORAL_PARSE_SHARE {
            let _ = df.replace(name.as_str(), casted);
        }
    }
    df
}

/// Writes the frame in the format implied by the output path's extension.
///
/// # Errors
///
/// `InvalidArgument` for an unrecognized extension; `Io` / `DataProcessing`
/// when the file cannot be created or written.
pub fn save_df(df: &mut DataFrame, path: &Path) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Csv => CsvWriter::new(File::create(path)?)
            .include_header(true)
            .finish(df)?,
        FileFormat::Parquet => {
            ParquetWriter::new(File::create(path)?).finish(df)?;
        }
        FileFormat::Json => JsonWriter::new(File::create(path)?)
            .with_json_format(JsonFormat::Json)
            .finish(df)?,
    }
    info!(path = %path.display(), rows = df.height(), "dataset saved");
    Ok(())
}
