//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod benchmark;
pub mod logs;
pub mod metrics;
pub mod summary;
pub mod to_csv;
pub mod to_parquet;

// Re-export main command functions
pub use benchmark::{compute_metrics, tracing_dir, Benchmark};
pub use logs::{extract_logs, remove_logs};
pub use metrics::{execute_metrics, validate_metrics_args, MetricsArgs, OutputFormat};
pub use summary::{execute_summary, SummaryArgs};
pub use to_csv::{execute_to_csv, ToCsvArgs};
pub use to_parquet::execute_to_parquet;
