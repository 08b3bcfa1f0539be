//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//! The interval accumulator carries its own `InvalidInterval` error so the
//! core stays free of any other dependency.

use crate::intervals::InvalidInterval;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while reading trace stores and span timestamps
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Failed to parse {field} time {value:?}: {source}")]
    Timestamp {
        field: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Errors that can occur during metric extraction
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Invalid span: {0}")]
    Span(#[from] ParseError),

    #[error(transparent)]
    Interval(#[from] InvalidInterval<DateTime<Utc>>),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet encoding failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Failed to parse integer column {column} value {value:?} as an int64")]
    IntegerColumn { column: String, value: String },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// Errors that can occur while loading configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid metric names: {0}")]
    Invalid(String),
}
