//! `summary` command implementation.
//!
//! Runs the whole pipeline in memory (decode, flatten, extract) and prints
//! the headline timing columns as CSV.

use super::metrics::load_metric_names;
use crate::aggregator::MetricExtractor;
use crate::output::select_columns;
use crate::parser::read_trace_rows;
use crate::utils::config::{SUMMARY_COLUMNS, SUMMARY_FILENAME_COLUMN};
use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the summary command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct SummaryArgs {
    /// Trace store files to summarize
    pub trace_files: Vec<PathBuf>,

    /// Column used to tag rows with their trace file
    pub filename_column: String,

    /// Optional JSON override of the metric name table
    pub names: Option<PathBuf>,
}

impl Default for SummaryArgs {
    fn default() -> Self {
        Self {
            trace_files: Vec::new(),
            filename_column: SUMMARY_FILENAME_COLUMN.to_string(),
            names: None,
        }
    }
}

/// Execute the summary command, writing CSV to `out`
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Trace files that cannot be decoded
/// * A summary column that no metric row carries
pub fn execute_summary<W: Write>(args: &SummaryArgs, out: W) -> Result<()> {
    let names = load_metric_names(args.names.as_deref())?;

    info!("Step 1/3: Reading {} trace files...", args.trace_files.len());
    let rows = read_trace_rows(&args.trace_files, &args.filename_column)
        .context("Failed to read trace files")?;

    info!("Step 2/3: Computing metrics...");
    let extractor = MetricExtractor::new(&names, args.filename_column.as_str());
    let metric_rows = extractor.extract("summary", rows);

    info!("Step 3/3: Writing summary...");
    select_columns(SUMMARY_COLUMNS, &metric_rows, out).context("Failed to write summary")?;

    Ok(())
}
