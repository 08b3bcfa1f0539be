//! Configuration and constants for the CLI.

use std::time::Duration;

/// Default column that records which trace file a row came from
pub const DEFAULT_FILENAME_COLUMN: &str = "tracefile";

/// Filename column used by the summary and benchmark pipelines
pub const SUMMARY_FILENAME_COLUMN: &str = "filename";

// Span annotation keys written by the tracer
pub const NAME_KEY: &str = "Name";
pub const SPAN_START_KEY: &str = "Span.Start";
pub const SPAN_END_KEY: &str = "Span.End";
pub const API_KEY: &str = "api";
pub const LOG_MSG_KEY: &str = "Msg";
pub const LOG_TIME_KEY: &str = "Time";

// Span names with special meaning for metric extraction
pub const ROOT_SPAN_NAME: &str = "pulumi";
pub const ENGINE_SPAN_NAME: &str = "pulumi-plan";
pub const ENGINE_LOG_SPAN_NAME: &str = "/pulumirpc.Engine/Log";

/// Extension of trace store files
pub const TRACE_FILE_EXTENSION: &str = ".trace";

/// Env variable naming the directory where benchmark traces are written.
/// Tracing is treated as disabled when it is unset or empty.
pub const TRACING_DIR_ENV_VAR: &str = "PULUMI_TRACING_DIR";

/// Default memory stats sampling interval for benchmarks
pub const DEFAULT_MEMSTATS_POLL_INTERVAL: Duration = Duration::from_millis(100);

// Files produced by the benchmark post-processing step
pub const BENCHMARK_TRACES_CSV: &str = "traces.csv";
pub const BENCHMARK_METRICS_PARQUET: &str = "metrics.parquet.snappy";

/// Accepted extensions for Parquet output
pub const PARQUET_EXTENSIONS: &[&str] = &[".parquet.snappy", ".parquet"];

/// Columns printed by the summary command, in order
pub const SUMMARY_COLUMNS: &[&str] = &[
    "benchmark_name",
    "benchmark_phase",
    "time_total_ms",
    "time_pulumi_api_ms",
    "time_to_engine_ms",
    "time_language_runtime_run_ms",
    "time_patch_checkpoint_ms",
    "time_get_required_plugins_ms",
    "time_register_resource_ms",
    "time_resource_provider_configure_ms",
];

/// Parquet columns stored as optional UTF-8 strings
pub const PARQUET_STRING_COLUMNS: &[&str] = &[
    "benchmark_language",
    "benchmark_name",
    "benchmark_phase",
    "benchmark_provider",
    "benchmark_repo",
    "benchmark_runtime",
    "benchmark_start",
    "pulumi_api",
    "pulumi_commandline",
    "pulumi_process",
    "pulumi_version",
    "runner_arch",
    "runner_os",
];

/// Parquet columns stored as optional INT64
pub const PARQUET_INT64_COLUMNS: &[&str] = &[
    "mem_frees",
    "mem_heap_alloc_max",
    "mem_heap_idle_max",
    "mem_heap_inuse_max",
    "mem_heap_objects_max",
    "mem_heap_released_max",
    "mem_heap_sys_max",
    "mem_mallocs",
    "mem_num_gc",
    "mem_pause_total_ns",
    "mem_stack_in_use_max",
    "mem_stack_sys_max",
    "mem_sys_max",
    "mem_total_alloc",
    "runner_num_cpu",
    "time_engine_ms",
    "time_get_required_plugins_ms",
    "time_language_runtime_run_ms",
    "time_log_overhead_ms",
    "time_patch_checkpoint_ms",
    "time_pulumi_api_ms",
    "time_register_resource_ms",
    "time_resource_provider_configure_ms",
    "time_resource_provider_create_ms",
    "time_to_engine_ms",
    "time_total_ms",
];
