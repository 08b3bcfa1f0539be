//! Trace Tool CLI
//!
//! Turns Pulumi CLI trace files into CSV tables and per-run timing metrics.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use trace_tool::commands::{
    compute_metrics, execute_metrics, execute_summary, execute_to_csv, execute_to_parquet,
    extract_logs, remove_logs, tracing_dir, validate_metrics_args, MetricsArgs, OutputFormat,
    SummaryArgs, ToCsvArgs,
};
use trace_tool::utils::config::{
    DEFAULT_FILENAME_COLUMN, SUMMARY_FILENAME_COLUMN, TRACING_DIR_ENV_VAR,
};

/// Trace Tool - metrics from Pulumi traces
#[derive(Parser, Debug)]
#[command(name = "trace-tool")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Flatten trace files into a CSV with one row per span
    #[command(name = "tocsv")]
    ToCsv {
        /// Path where to write the CSV output file
        #[arg(long)]
        csv: PathBuf,

        /// Column name to write the trace filename to
        #[arg(long, default_value = DEFAULT_FILENAME_COLUMN)]
        filename_column: String,

        /// Trace files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Aggregate a span CSV into per-run metrics
    Metrics {
        /// CSV file with span rows
        #[arg(long)]
        csv: PathBuf,

        /// Column name where the trace filename was recorded
        #[arg(long, default_value = DEFAULT_FILENAME_COLUMN)]
        filename_column: String,

        /// JSON file overriding the metric name table
        #[arg(long)]
        names: Option<PathBuf>,

        /// Output path (CSV goes to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// Print headline timings for trace files as CSV
    Summary {
        /// Column name used to tag rows with their trace file
        #[arg(long, default_value = SUMMARY_FILENAME_COLUMN)]
        filename_column: String,

        /// JSON file overriding the metric name table
        #[arg(long)]
        names: Option<PathBuf>,

        /// Trace files to summarize
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Drop engine log spans from a trace file
    #[command(name = "removelogs")]
    RemoveLogs {
        /// Path to the trace file
        #[arg(long)]
        from: PathBuf,

        /// Path where to write the filtered trace file
        #[arg(long)]
        to: Option<PathBuf>,
    },

    /// Print engine log messages recorded in trace files
    #[command(name = "extractlogs")]
    ExtractLogs {
        /// Trace files to read
        files: Vec<PathBuf>,
    },

    /// Transcode a metrics CSV into Parquet
    #[command(name = "toparquet")]
    ToParquet {
        /// Metrics CSV to read
        #[arg(long)]
        csv: PathBuf,

        /// Parquet file to write (.parquet.snappy)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compute metrics for every trace file in a benchmark tracing directory
    ComputeMetrics {
        /// Tracing directory, defaults to $PULUMI_TRACING_DIR
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::ToCsv {
            csv,
            filename_column,
            files,
        } => {
            execute_to_csv(&ToCsvArgs {
                trace_files: files,
                output_csv: csv,
                filename_column,
            })?;
        }

        Commands::Metrics {
            csv,
            filename_column,
            names,
            output,
            format,
        } => {
            let args = MetricsArgs {
                input_csv: csv,
                filename_column,
                names,
                output,
                format,
            };

            // Validate args first
            validate_metrics_args(&args)?;
            execute_metrics(&args)?;
        }

        Commands::Summary {
            filename_column,
            names,
            files,
        } => {
            let args = SummaryArgs {
                trace_files: files,
                filename_column,
                names,
            };
            execute_summary(&args, std::io::stdout().lock())?;
        }

        Commands::RemoveLogs { from, to } => {
            remove_logs(&from, to.as_deref())?;
        }

        Commands::ExtractLogs { files } => {
            extract_logs(&files, std::io::stdout().lock())?;
        }

        Commands::ToParquet { csv, output } => {
            execute_to_parquet(&csv, &output)?;
        }

        Commands::ComputeMetrics { dir } => match dir.or_else(tracing_dir) {
            Some(dir) => compute_metrics(&dir)?,
            None => info!("{} is not set, tracing is disabled", TRACING_DIR_ENV_VAR),
        },
    }

    Ok(())
}
