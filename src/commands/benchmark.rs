//! Helpers for tagging and post-processing benchmark traces.
//!
//! Benchmark drivers run `pulumi` with `--tracing` pointed at a shared
//! directory and with `PULUMI_TRACING_*` variables that tag every span.
//! Afterwards `compute_metrics` turns the directory of trace files into a
//! single Parquet metrics file.

use super::metrics::metrics;
use super::to_csv::{execute_to_csv, ToCsvArgs};
use crate::aggregator::MetricNames;
use crate::output::ParquetMetricsSink;
use crate::utils::config::{
    BENCHMARK_METRICS_PARQUET, BENCHMARK_TRACES_CSV, DEFAULT_MEMSTATS_POLL_INTERVAL,
    SUMMARY_FILENAME_COLUMN, TRACE_FILE_EXTENSION, TRACING_DIR_ENV_VAR,
};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Metadata about a benchmark run under `pulumi --tracing`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Benchmark {
    /// Name of the benchmark, normally its folder name
    pub name: String,

    /// Primary provider under test, such as `aws`
    pub provider: String,

    /// Runtime set in Pulumi.yaml
    pub runtime: String,

    /// Main programming language
    pub language: String,

    /// Repository the benchmark lives in, such as `pulumi/templates`
    pub repository: String,

    /// How often to sample memory stats; zero disables sampling
    pub memstats_poll_interval: Duration,
}

impl Benchmark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: String::new(),
            runtime: String::new(),
            language: String::new(),
            repository: String::new(),
            memstats_poll_interval: DEFAULT_MEMSTATS_POLL_INTERVAL,
        }
    }

    /// `KEY=VALUE` pairs that make `pulumi --tracing` tag its spans
    ///
    /// Empty when tracing is disabled.
    pub fn env(&self, tracing_dir: Option<&Path>) -> Vec<String> {
        if tracing_dir.is_none() {
            return Vec::new();
        }

        let tags = [
            ("PULUMI_TRACING_TAG_BENCHMARK_NAME", &self.name),
            ("PULUMI_TRACING_TAG_REPO", &self.repository),
            ("PULUMI_TRACING_TAG_BENCHMARK_PROVIDER", &self.provider),
            ("PULUMI_TRACING_TAG_BENCHMARK_RUNTIME", &self.runtime),
            ("PULUMI_TRACING_TAG_BENCHMARK_LANGUAGE", &self.language),
        ];

        let mut env: Vec<String> = tags
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}={value}"))
            .collect();

        if !self.memstats_poll_interval.is_zero() {
            env.push(format!(
                "PULUMI_TRACING_MEMSTATS_POLL_INTERVAL={}ms",
                self.memstats_poll_interval.as_millis()
            ));
        }

        env
    }

    /// `--tracing` arguments for one `pulumi` invocation
    ///
    /// `command` tells steps apart, e.g. `pulumi-preview`. Empty when
    /// tracing is disabled.
    pub fn command_args(&self, tracing_dir: Option<&Path>, command: &str) -> Vec<String> {
        match tracing_dir {
            Some(dir) => {
                let trace_file = dir.join(format!("{}-{}{}", self.name, command, TRACE_FILE_EXTENSION));
                vec![
                    "--tracing".to_string(),
                    format!("file:{}", trace_file.display()),
                ]
            }
            None => Vec::new(),
        }
    }
}

/// Directory named by `PULUMI_TRACING_DIR`, `None` when unset or empty
pub fn tracing_dir() -> Option<PathBuf> {
    std::env::var_os(TRACING_DIR_ENV_VAR)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

/// Trace files directly inside `dir`, sorted by name
pub fn find_trace_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .path();
        let is_trace = path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(TRACE_FILE_EXTENSION))
            .unwrap_or(false);
        if is_trace && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Turn every trace file in `dir` into `dir/metrics.parquet.snappy`
///
/// **Public** - main entry point for `compute-metrics`
///
/// Writes the intermediate span table to `dir/traces.csv`.
pub fn compute_metrics(dir: &Path) -> Result<()> {
    info!("Computing benchmark metrics in: {}", dir.display());

    let trace_files = find_trace_files(dir)?;
    debug!("Found {} trace files", trace_files.len());

    let traces_csv = dir.join(BENCHMARK_TRACES_CSV);
    execute_to_csv(&ToCsvArgs {
        trace_files,
        output_csv: traces_csv.clone(),
        filename_column: SUMMARY_FILENAME_COLUMN.to_string(),
    })
    .context("compute-metrics failed to flatten traces")?;

    let mut sink = ParquetMetricsSink::new(dir.join(BENCHMARK_METRICS_PARQUET));
    metrics(
        &traces_csv,
        SUMMARY_FILENAME_COLUMN,
        &MetricNames::default(),
        &mut sink,
    )
    .context("compute-metrics failed to extract metrics")?;

    Ok(())
}
