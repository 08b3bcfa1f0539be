//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Decoding and encoding trace store files
//! - Walking span trees
//! - Flattening spans into table rows
//! - Parsing span timestamps

pub mod rows;
pub mod schema;
pub mod span_time;
pub mod trace_store;

// Re-export main types
pub use rows::{detect_annotation_names, read_trace_rows, span_row, trace_rows, Row};
pub use schema::{Annotation, Span, SpanId, Trace, TraceStore};
pub use span_time::{ms, span_duration, span_end, span_interval, span_start};
pub use trace_store::{
    is_engine_log, read_trace_store, remove_engine_logs, walk_traces, walk_traces_from_file,
    write_trace_store,
};
