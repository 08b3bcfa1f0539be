//! Derive per-run timing metrics from span rows.
//!
//! Rows are grouped by the trace file they came from. Each file gets one
//! overlap-aware accumulator per metric column, a precompute pass that
//! feeds spans into them, and an emit pass that turns every top-level
//! `pulumi` span into a metric row.
//!
//! Malformed rows never abort a run: they are logged with their contents
//! and skipped.

use super::names::{
    MetricNames, BENCHMARK_NAME, BENCHMARK_PHASE, BENCHMARK_START, PULUMI_API, PULUMI_PROCESS,
    TIME_ENGINE_MS, TIME_PULUMI_API_MS, TIME_TO_ENGINE_MS,
};
use crate::intervals::IntervalAccumulator;
use crate::parser::span_time::{ms, span_duration, span_interval, span_start};
use crate::parser::Row;
use crate::utils::config::{
    API_KEY, ENGINE_SPAN_NAME, NAME_KEY, ROOT_SPAN_NAME, SPAN_START_KEY, TRACE_FILE_EXTENSION,
};
use crate::utils::error::MetricsError;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::Path;

/// Timing state collected for one trace file
///
/// **Private** - filled by the precompute pass, read by the emit pass
struct FileTimings {
    /// Metric column -> union of the spans mapped to it
    accumulators: BTreeMap<String, IntervalAccumulator<DateTime<Utc>>>,

    /// Raw (not overlap-corrected) sum of spans with an `api` tag
    api_overhead: Duration,

    /// Last seen API endpoint
    api_endpoint: String,

    /// Start and duration of the engine span
    engine: Option<(DateTime<Utc>, Duration)>,
}

impl FileTimings {
    fn new(names: &MetricNames) -> Self {
        Self {
            accumulators: names
                .accumulator_columns()
                .into_iter()
                .map(|column| (column.to_string(), IntervalAccumulator::new()))
                .collect(),
            api_overhead: Duration::zero(),
            api_endpoint: String::new(),
            engine: None,
        }
    }
}

/// Turns span rows into metric rows
///
/// **Public** - main entry point for metrics calculation
pub struct MetricExtractor<'a> {
    names: &'a MetricNames,
    inverse_aliases: HashMap<&'a str, &'a str>,
    filename_column: String,
}

impl<'a> MetricExtractor<'a> {
    pub fn new(names: &'a MetricNames, filename_column: impl Into<String>) -> Self {
        Self {
            names,
            inverse_aliases: names.inverse_aliases(),
            filename_column: filename_column.into(),
        }
    }

    /// Compute metric rows for every trace file present in `rows`
    ///
    /// # Arguments
    /// * `source` - Where the rows came from, for warnings
    /// * `rows` - Span rows tagged with the filename column
    ///
    /// # Returns
    /// One metric row per top-level span, files in sorted order
    pub fn extract(&self, source: &str, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let files = self.group_by_file(rows);
        info!("Computing metrics for {} trace files", files.len());

        files
            .iter()
            .flat_map(|(file, rows)| self.extract_file(source, file, rows))
            .collect()
    }

    /// Compute metric rows for the rows of a single trace file
    pub fn extract_file(&self, source: &str, file: &str, rows: &[Row]) -> Vec<Row> {
        debug!("Computing metrics for {} ({} rows)", file, rows.len());

        let mut timings = FileTimings::new(self.names);
        let precompute_source = format!("{source}#precompute");
        for row in rows {
            tolerate_fault(&precompute_source, row, self.precompute_row(&mut timings, row));
        }

        rows.iter()
            .filter_map(|row| tolerate_fault(source, row, self.emit_row(file, &timings, row)))
            .flatten()
            .collect()
    }

    /// Rows with an empty filename are dropped
    fn group_by_file(&self, rows: impl IntoIterator<Item = Row>) -> BTreeMap<String, Vec<Row>> {
        let mut files: BTreeMap<String, Vec<Row>> = BTreeMap::new();
        for row in rows {
            let Some(file) = row.get(&self.filename_column).filter(|f| !f.is_empty()) else {
                continue;
            };
            files.entry(file.clone()).or_default().push(row);
        }
        files
    }

    fn precompute_row(&self, timings: &mut FileTimings, row: &Row) -> Result<(), MetricsError> {
        let name = row.get(NAME_KEY).map(String::as_str).unwrap_or_default();

        if let Some(column) = self.names.accumulators.get(name) {
            let interval = span_interval(row)?;
            if let Some(acc) = timings.accumulators.get_mut(column) {
                acc.insert(interval)?;
            }
        }

        if name == ENGINE_SPAN_NAME {
            let start = span_start(row)?;
            let duration = span_duration(row)?;
            timings.engine = Some((start, duration));
        }

        if let Some(api) = row.get(API_KEY).filter(|api| !api.is_empty()) {
            let duration = span_duration(row)?;
            timings.api_endpoint = api.clone();
            timings.api_overhead = timings.api_overhead + duration;
        }

        Ok(())
    }

    fn emit_row(
        &self,
        file: &str,
        timings: &FileTimings,
        row: &Row,
    ) -> Result<Option<Row>, MetricsError> {
        if row.get(NAME_KEY).map(String::as_str) != Some(ROOT_SPAN_NAME) {
            return Ok(None);
        }

        let root_start = span_start(row)?;
        let mut metrics = Row::new();

        metrics.insert(
            BENCHMARK_START.to_string(),
            row.get(SPAN_START_KEY).cloned().unwrap_or_default(),
        );

        // this is coming from `pulumi` CLI process, not a plugin
        metrics.insert(PULUMI_PROCESS.to_string(), ROOT_SPAN_NAME.to_string());

        for (key, value) in row {
            if let Some(column) = self.inverse_aliases.get(key.as_str()) {
                metrics.insert(column.to_string(), value.clone());
            }
        }

        let benchmark_name = metrics.get(BENCHMARK_NAME).cloned().unwrap_or_default();
        metrics.insert(
            BENCHMARK_PHASE.to_string(),
            benchmark_phase(file, &benchmark_name),
        );

        let engine_duration = timings.engine.map(|(_, d)| d).unwrap_or_else(Duration::zero);
        metrics.insert(TIME_ENGINE_MS.to_string(), ms(engine_duration));
        metrics.insert(PULUMI_API.to_string(), timings.api_endpoint.clone());
        metrics.insert(TIME_PULUMI_API_MS.to_string(), ms(timings.api_overhead));

        for (column, acc) in &timings.accumulators {
            metrics.insert(column.clone(), ms(acc.total_duration()));
        }

        let time_to_engine = match timings.engine {
            Some((engine_start, _)) => ms(engine_start.signed_duration_since(root_start)),
            None => String::new(),
        };
        metrics.insert(TIME_TO_ENGINE_MS.to_string(), time_to_engine);

        Ok(Some(metrics))
    }
}

/// Infer the benchmark phase from a trace file name
///
/// `aws-go-s3-folder-pulumi-update-initial.trace` with benchmark
/// `aws-go-s3-folder` gives `pulumi-update-initial`; anything that does not
/// follow the `<benchmark>-<phase>.trace` pattern gives an empty phase.
pub fn benchmark_phase(file: &str, benchmark_name: &str) -> String {
    let base = Path::new(file)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    base.strip_prefix(&format!("{benchmark_name}-"))
        .and_then(|rest| rest.strip_suffix(TRACE_FILE_EXTENSION))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Log a failed row instead of propagating the error
fn tolerate_fault<T>(source: &str, row: &Row, result: Result<T, MetricsError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                "ignoring failure to parse a row from {}\n  Error: {}\n  Data:\n{}",
                source,
                e,
                pretty_print_row("    ", row)
            );
            None
        }
    }
}

/// Format a row for logs: keys sorted and right-aligned, empty values omitted
///
/// ```text
///         Name: api/startUpdate
///          api: https://api.pulumi.com
///     filename: azure-classic-csharp-pulumi-destroy.trace
/// ```
pub fn pretty_print_row(indent: &str, row: &Row) -> String {
    let width = row.keys().map(String::len).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in row.iter().filter(|(_, v)| !v.is_empty()) {
        let _ = writeln!(out, "{indent}{key:>width$}: {value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_benchmark_phase() {
        assert_eq!(
            benchmark_phase(
                "/tmp/aws-go-s3-folder-pulumi-update-initial.trace",
                "aws-go-s3-folder"
            ),
            "pulumi-update-initial"
        );
        assert_eq!(benchmark_phase("other-pulumi-preview.trace", "aws"), "");
        assert_eq!(benchmark_phase("aws-preview.csv", "aws"), "");
    }

    #[test]
    fn test_pretty_print_row() {
        let r = row(&[("Name", "api/startUpdate"), ("api", "https://x"), ("retry", "")]);
        assert_eq!(
            pretty_print_row("  ", &r),
            "   Name: api/startUpdate\n    api: https://x\n"
        );
    }

    #[test]
    fn test_overlapping_spans_counted_once() {
        let names = MetricNames::default();
        let extractor = MetricExtractor::new(&names, "tracefile");
        let rows = vec![
            row(&[
                ("Name", "pulumi"),
                ("tracefile", "a.trace"),
                ("Span.Start", "2022-01-01T00:00:00Z"),
                ("Span.End", "2022-01-01T00:00:10Z"),
            ]),
            row(&[
                ("Name", "/pulumirpc.ResourceMonitor/RegisterResource"),
                ("tracefile", "a.trace"),
                ("Span.Start", "2022-01-01T00:00:01Z"),
                ("Span.End", "2022-01-01T00:00:04Z"),
            ]),
            row(&[
                ("Name", "/pulumirpc.ResourceMonitor/RegisterResource"),
                ("tracefile", "a.trace"),
                ("Span.Start", "2022-01-01T00:00:02Z"),
                ("Span.End", "2022-01-01T00:00:05Z"),
            ]),
        ];

        let metrics = extractor.extract("test.csv", rows);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0]["time_register_resource_ms"], "4000");
        assert_eq!(metrics[0]["time_total_ms"], "10000");
        assert_eq!(metrics[0]["time_to_engine_ms"], "");
        assert_eq!(metrics[0]["time_engine_ms"], "0");
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let names = MetricNames::default();
        let extractor = MetricExtractor::new(&names, "tracefile");
        let rows = vec![
            row(&[
                ("Name", "pulumi"),
                ("tracefile", "a.trace"),
                ("Span.Start", "2022-01-01T00:00:00Z"),
                ("Span.End", "2022-01-01T00:00:03Z"),
            ]),
            // end before start
            row(&[
                ("Name", "api/patchCheckpoint"),
                ("tracefile", "a.trace"),
                ("Span.Start", "2022-01-01T00:00:02Z"),
                ("Span.End", "2022-01-01T00:00:01Z"),
            ]),
        ];

        let metrics = extractor.extract("test.csv", rows);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0]["time_patch_checkpoint_ms"], "0");
    }

    #[test]
    fn test_bad_end_leaves_no_partial_state() {
        let names = MetricNames::default();
        let extractor = MetricExtractor::new(&names, "tracefile");
        let rows = vec![
            row(&[
                ("Name", "pulumi"),
                ("tracefile", "a.trace"),
                ("Span.Start", "2022-01-01T00:00:00Z"),
                ("Span.End", "2022-01-01T00:00:10Z"),
            ]),
            row(&[
                ("Name", "api/startUpdate"),
                ("api", "https://x"),
                ("tracefile", "a.trace"),
                ("Span.Start", "2022-01-01T00:00:01Z"),
                ("Span.End", "garbage"),
            ]),
            row(&[
                ("Name", "pulumi-plan"),
                ("tracefile", "a.trace"),
                ("Span.Start", "2022-01-01T00:00:02Z"),
                ("Span.End", "garbage"),
            ]),
        ];

        let metrics = extractor.extract("test.csv", rows);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0]["pulumi_api"], "");
        assert_eq!(metrics[0]["time_pulumi_api_ms"], "0");
        assert_eq!(metrics[0]["time_to_engine_ms"], "");
        assert_eq!(metrics[0]["time_engine_ms"], "0");
        assert_eq!(metrics[0]["time_total_ms"], "10000");
    }
}
