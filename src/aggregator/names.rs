//! Metric column names and the category-name tables.
//!
//! `MetricNames` is built once per command (from the built-in tables or a
//! JSON override) and handed to the extractor by reference; nothing
//! mutates it afterwards.

use crate::utils::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

pub const BENCHMARK_NAME: &str = "benchmark_name";
pub const BENCHMARK_START: &str = "benchmark_start";

/// Phases include things like pulumi-update-initial as defined by ProgramTest.
pub const BENCHMARK_PHASE: &str = "benchmark_phase";

/// Process such as `pulumi` or `pulumi-resource-aws` the data is coming from.
pub const PULUMI_PROCESS: &str = "pulumi_process";
pub const PULUMI_API: &str = "pulumi_api";

pub const TIME_TOTAL_MS: &str = "time_total_ms";
pub const TIME_LOG_OVERHEAD_MS: &str = "time_log_overhead_ms";
pub const TIME_PULUMI_API_MS: &str = "time_pulumi_api_ms";
pub const TIME_TO_ENGINE_MS: &str = "time_to_engine_ms";
pub const TIME_PATCH_CHECKPOINT_MS: &str = "time_patch_checkpoint_ms";
pub const TIME_LANGUAGE_RUNTIME_RUN_MS: &str = "time_language_runtime_run_ms";
pub const TIME_GET_REQUIRED_PLUGINS_MS: &str = "time_get_required_plugins_ms";
pub const TIME_REGISTER_RESOURCE_MS: &str = "time_register_resource_ms";
pub const TIME_RESOURCE_PROVIDER_CONFIGURE_MS: &str = "time_resource_provider_configure_ms";
pub const TIME_RESOURCE_PROVIDER_CREATE_MS: &str = "time_resource_provider_create_ms";

/// Duration of the span marked `pulumi-plan`. This span seems to cover
/// plan and/or update operations.
pub const TIME_ENGINE_MS: &str = "time_engine_ms";

/// Name tables used by metric extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricNames {
    /// Canonical output column -> source columns it may appear as
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Span name -> output column summing its overlap-free duration
    #[serde(default = "default_accumulators")]
    pub accumulators: BTreeMap<String, String>,
}

impl Default for MetricNames {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            accumulators: default_accumulators(),
        }
    }
}

impl MetricNames {
    /// Load name tables from a JSON file
    ///
    /// Missing tables fall back to the built-in ones.
    ///
    /// # Errors
    /// * `ConfigError::Io` / `ConfigError::Json` - unreadable file
    /// * `ConfigError::Invalid` - an alias claimed by two columns
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading metric names from: {}", path.display());

        let contents = std::fs::read_to_string(path)?;
        let names: MetricNames = serde_json::from_str(&contents)?;
        names.validate()?;

        Ok(names)
    }

    /// Check that every source alias maps to exactly one column
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (column, aliases) in &self.aliases {
            for alias in aliases {
                if let Some(other) = seen.insert(alias.as_str(), column.as_str()) {
                    if other != column.as_str() {
                        return Err(ConfigError::Invalid(format!(
                            "alias {alias:?} is claimed by both {other:?} and {column:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Source column -> canonical column
    pub fn inverse_aliases(&self) -> HashMap<&str, &str> {
        self.aliases
            .iter()
            .flat_map(|(column, aliases)| {
                aliases
                    .iter()
                    .map(move |alias| (alias.as_str(), column.as_str()))
            })
            .collect()
    }

    /// Distinct accumulator output columns, sorted
    pub fn accumulator_columns(&self) -> BTreeSet<&str> {
        self.accumulators.values().map(String::as_str).collect()
    }
}

// Maps canonical column names as they should appear in the metrics output
// to the names they may carry in trace rows.
fn default_aliases() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        (BENCHMARK_NAME, &["benchmark_name"]),
        ("benchmark_provider", &["benchmark_provider", "benchmark_cloud"]),
        ("benchmark_repo", &["repo"]),
        ("benchmark_runtime", &["benchmark_runtime"]),
        ("benchmark_language", &["benchmark_language"]),
        ("mem_frees", &["MemStats.Frees"]),
        ("mem_heap_alloc_max", &["MemStats.HeapAlloc.Max"]),
        ("mem_heap_idle_max", &["MemStats.HeapIdle.Max"]),
        ("mem_heap_inuse_max", &["MemStats.HeapInuse.Max"]),
        ("mem_heap_objects_max", &["MemStats.HeapObjects.Max"]),
        ("mem_heap_released_max", &["MemStats.HeapReleased.Max"]),
        ("mem_heap_sys_max", &["MemStats.HeapSys.Max"]),
        ("mem_mallocs", &["MemStats.Mallocs"]),
        ("mem_num_gc", &["MemStats.NumGC"]),
        ("mem_pause_total_ns", &["MemStats.PauseTotalNs"]),
        ("mem_stack_in_use_max", &["MemStats.StackInuse.Max"]),
        ("mem_stack_sys_max", &["MemStats.StackSys.Max"]),
        ("mem_sys_max", &["MemStats.Sys.Max"]),
        ("mem_total_alloc", &["MemStats.TotalAlloc"]),
        ("pulumi_version", &["pulumi_version"]),
        ("pulumi_commandline", &["os.Args"]),
        ("runner_arch", &["runtime.GOARCH"]),
        ("runner_num_cpu", &["runtime.NumCPU"]),
        ("runner_os", &["runtime.GOOS"]),
    ];

    table
        .iter()
        .map(|(column, aliases)| {
            (
                column.to_string(),
                aliases.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

fn default_accumulators() -> BTreeMap<String, String> {
    [
        ("pulumi", TIME_TOTAL_MS),
        ("/pulumirpc.Engine/Log", TIME_LOG_OVERHEAD_MS),
        ("api/patchCheckpoint", TIME_PATCH_CHECKPOINT_MS),
        ("/pulumirpc.LanguageRuntime/Run", TIME_LANGUAGE_RUNTIME_RUN_MS),
        ("/pulumirpc.LanguageRuntime/GetRequiredPlugins", TIME_GET_REQUIRED_PLUGINS_MS),
        ("/pulumirpc.ResourceMonitor/RegisterResource", TIME_REGISTER_RESOURCE_MS),
        ("/pulumirpc.ResourceProvider/Configure", TIME_RESOURCE_PROVIDER_CONFIGURE_MS),
        ("/pulumirpc.ResourceProvider/Create", TIME_RESOURCE_PROVIDER_CREATE_MS),
    ]
    .into_iter()
    .map(|(span, column)| (span.to_string(), column.to_string()))
    .collect()
}
