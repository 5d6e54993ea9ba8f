//! Local destination for database exports
//!
//! A Database→File transfer reads rows through the database service and
//! hands them to an [`ExportSink`]. [`CsvFileSink`] writes them as a
//! delimited file with a header row.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::Row;
use crate::models::preview::cell_text;

/// Error type for export sinks
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error with {path}: {message}")]
    Io { path: String, message: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid delimiter {0:?}: must be a single-byte character")]
    InvalidDelimiter(char),
}

/// Result type for export sinks
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for exported rows
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Write `rows` under a header of `columns`, returning the number of
    /// records written
    async fn write(
        &self,
        path: &str,
        delimiter: char,
        columns: &[String],
        rows: &[Row],
    ) -> SinkResult<usize>;
}

/// Writes exports as delimited text files
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFileSink;

impl CsvFileSink {
    pub fn new() -> Self {
        Self
    }
}

/// Encode rows as delimited text with a header line
pub fn encode_delimited(delimiter: char, columns: &[String], rows: &[Row]) -> SinkResult<Vec<u8>> {
    if !delimiter.is_ascii() {
        return Err(SinkError::InvalidDelimiter(delimiter));
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|e| SinkError::Csv(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row.iter().map(cell_text))
            .map_err(|e| SinkError::Csv(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| SinkError::Csv(e.to_string()))
}

#[async_trait]
impl ExportSink for CsvFileSink {
    async fn write(
        &self,
        path: &str,
        delimiter: char,
        columns: &[String],
        rows: &[Row],
    ) -> SinkResult<usize> {
        let bytes = encode_delimited(delimiter, columns, rows)?;
        let io_error = |e: std::io::Error| SinkError::Io {
            path: path.to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            debug!(dir = %parent.display(), "Creating output directory");
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        tokio::fs::write(path, &bytes).await.map_err(io_error)?;
        info!(path, records = rows.len(), bytes = bytes.len(), "Export written");

        Ok(rows.len())
    }
}
