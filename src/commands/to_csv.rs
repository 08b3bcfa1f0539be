//! `tocsv` command implementation.
//!
//! The tocsv command:
//! 1. Scans every trace file for the set of annotation names
//! 2. Streams one CSV row per span, files in the order given

use crate::output::{prepare_output_path, CsvRowWriter};
use crate::parser::{detect_annotation_names, read_trace_store, span_row, walk_traces, Trace};
use crate::utils::error::OutputError;
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the tocsv command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ToCsvArgs {
    /// Trace store files to flatten
    pub trace_files: Vec<PathBuf>,

    /// Output CSV path
    pub output_csv: PathBuf,

    /// Column that records the source trace file
    pub filename_column: String,
}

/// Flatten trace files into a single CSV of span rows
///
/// **Public** - main entry point called from main.rs
///
/// Rows are written while each store is walked, so only one decoded
/// store is held in memory at a time.
///
/// # Errors
/// * Trace files that cannot be decoded
/// * CSV write errors
pub fn execute_to_csv(args: &ToCsvArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/2: Detecting annotation names...");
    let mut columns = detect_annotation_names(&args.trace_files)
        .context("Failed to scan trace files for annotation names")?;
    columns.push(args.filename_column.clone());
    debug!("CSV columns: {:?}", columns);

    info!("Step 2/2: Writing span rows...");
    let path = &args.output_csv;
    prepare_output_path(path).context("Invalid CSV output path")?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut table = CsvRowWriter::new(BufWriter::new(file), &columns)
        .context("Failed to write CSV header")?;

    for file in &args.trace_files {
        let store = read_trace_store(file)
            .with_context(|| format!("Failed to read trace file {}", file.display()))?;
        let filename = file.to_string_lossy();

        walk_traces(&store.traces, &mut |trace: &Trace| -> Result<(), OutputError> {
            table.write_row(&span_row(trace, &args.filename_column, &filename))
        })
        .with_context(|| format!("Failed to write spans of {}", file.display()))?;
        debug!("{} spans written after {}", table.written(), file.display());
    }

    let written = table.finish().context("Failed to flush span CSV")?;

    info!(
        "✓ {} spans written to {} in {:.2}s",
        written,
        path.display(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
