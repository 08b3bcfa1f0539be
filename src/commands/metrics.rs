//! `metrics` command implementation.
//!
//! The metrics command:
//! 1. Loads the metric name table
//! 2. Reads span rows from a CSV produced by `tocsv`
//! 3. Extracts one metric row per top-level span
//! 4. Hands the rows to a CSV or Parquet sink

use crate::aggregator::{MetricExtractor, MetricNames};
use crate::output::{
    prepare_output_path, read_csv_rows, CsvMetricsSink, MetricsSink, ParquetMetricsSink,
};
use crate::utils::config::DEFAULT_FILENAME_COLUMN;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Encoding of the metrics output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

/// Arguments for the metrics command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct MetricsArgs {
    /// CSV of span rows
    pub input_csv: PathBuf,

    /// Column where the trace filename was recorded
    pub filename_column: String,

    /// Optional JSON override of the metric name table
    pub names: Option<PathBuf>,

    /// Output path; CSV goes to stdout when omitted
    pub output: Option<PathBuf>,

    /// Output encoding
    pub format: OutputFormat,
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self {
            input_csv: PathBuf::new(),
            filename_column: DEFAULT_FILENAME_COLUMN.to_string(),
            names: None,
            output: None,
            format: OutputFormat::Csv,
        }
    }
}

/// Validate metrics arguments before doing any work
///
/// **Public** - called before execution
pub fn validate_metrics_args(args: &MetricsArgs) -> Result<()> {
    if args.input_csv.as_os_str().is_empty() {
        bail!("An input CSV is required (--csv)");
    }

    if args.filename_column.is_empty() {
        bail!("Filename column cannot be empty");
    }

    if args.format == OutputFormat::Parquet && args.output.is_none() {
        bail!("Parquet output needs an output path (--output)");
    }

    Ok(())
}

/// Load the metric name table, falling back to the built-in one
///
/// **Public** - shared with the summary command
pub fn load_metric_names(path: Option<&Path>) -> Result<MetricNames> {
    match path {
        Some(path) => {
            info!("Loading metric names from: {}", path.display());
            MetricNames::load(path)
                .with_context(|| format!("Failed to load metric names from {}", path.display()))
        }
        None => Ok(MetricNames::default()),
    }
}

/// Read span rows from `input_csv`, extract metrics, and write them to `sink`
///
/// **Public** - reused by the benchmark post-processing step
///
/// # Errors
/// * CSV read failures (row-level faults are only logged)
/// * Sink write failures
pub fn metrics(
    input_csv: &Path,
    filename_column: &str,
    names: &MetricNames,
    sink: &mut dyn MetricsSink,
) -> Result<()> {
    let rows = read_csv_rows(input_csv)
        .with_context(|| format!("Failed to read span CSV {}", input_csv.display()))?;
    debug!("Read {} span rows", rows.len());

    let extractor = MetricExtractor::new(names, filename_column);
    let metric_rows = extractor.extract(&input_csv.to_string_lossy(), rows);
    info!("Extracted {} metric rows", metric_rows.len());

    sink.write_metrics(&metric_rows)
        .context("Failed to write metrics")?;
    Ok(())
}

/// Execute the metrics command
///
/// **Public** - main entry point called from main.rs
pub fn execute_metrics(args: &MetricsArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/2: Loading metric names...");
    let names = load_metric_names(args.names.as_deref())?;

    info!("Step 2/2: Computing metrics from {}...", args.input_csv.display());
    match (&args.format, &args.output) {
        (OutputFormat::Parquet, Some(path)) => {
            let mut sink = ParquetMetricsSink::new(path);
            metrics(&args.input_csv, &args.filename_column, &names, &mut sink)?;
            info!("✓ Metrics written to: {}", path.display());
        }
        (OutputFormat::Csv, Some(path)) => {
            prepare_output_path(path).context("Invalid metrics output path")?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut sink = CsvMetricsSink::new(BufWriter::new(file));
            metrics(&args.input_csv, &args.filename_column, &names, &mut sink)?;
            info!("✓ Metrics written to: {}", path.display());
        }
        (OutputFormat::Csv, None) => {
            let mut sink = CsvMetricsSink::new(std::io::stdout().lock());
            metrics(&args.input_csv, &args.filename_column, &names, &mut sink)?;
        }
        (OutputFormat::Parquet, None) => {
            bail!("Parquet output needs an output path (--output)");
        }
    }

    debug!("Metrics completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
