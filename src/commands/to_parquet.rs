//! `toparquet` command implementation.

use crate::output::{read_csv_rows, MetricsSink, ParquetMetricsSink};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Transcode a metrics CSV into Snappy-compressed Parquet
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable CSV
/// * Non-integer values in INT64 columns
/// * Output path without a Parquet extension
pub fn execute_to_parquet(input_csv: &Path, output: &Path) -> Result<()> {
    let rows = read_csv_rows(input_csv)
        .with_context(|| format!("Failed to read metrics CSV {}", input_csv.display()))?;

    ParquetMetricsSink::new(output)
        .write_metrics(&rows)
        .with_context(|| format!("Failed to write Parquet file {}", output.display()))?;

    info!("✓ {} rows written to: {}", rows.len(), output.display());
    Ok(())
}
