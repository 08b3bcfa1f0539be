//! Output writers for metric rows and flattened traces.
//!
//! This module handles writing data to disk in various formats:
//! - CSV (metrics, flattened span rows, column selections)
//! - Snappy-compressed Parquet (metrics)

pub mod csv;
pub mod parquet;

use crate::parser::Row;
use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main types and functions
pub use self::csv::{read_csv_rows, select_columns, write_rows, CsvMetricsSink, CsvRowWriter};
pub use self::parquet::ParquetMetricsSink;

/// Destination for finished metric rows
///
/// **Public** - implemented by the CSV and Parquet writers
pub trait MetricsSink {
    /// Encode a batch of rows
    fn write_metrics(&mut self, rows: &[Row]) -> Result<(), OutputError>;
}

/// Check an output path and create its parent directories
///
/// # Errors
/// * `OutputError::InvalidPath` - empty path, directory, or parent cannot be created
pub fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
