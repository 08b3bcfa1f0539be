//! Aggregation of span rows into per-run metrics.
//!
//! This module transforms flattened trace rows into:
//! - Overlap-free durations per span category
//! - Engine and API timings
//! - Benchmark labels copied from aliased annotations

pub mod metrics;
pub mod names;

// Re-export main types and functions
pub use metrics::{benchmark_phase, pretty_print_row, MetricExtractor};
pub use names::MetricNames;
