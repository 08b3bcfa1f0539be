//! Trace Tool
//!
//! Flattening, filtering and metric extraction for Pulumi CLI trace files.
//!
//! This crate provides the core implementation for the
//! `trace-tool` CLI. At its heart is an overlap-aware interval accumulator
//! that reports the wall-clock time covered by a set of possibly
//! overlapping spans.
//!
//! ## Getting Started
//!
//! ```bash
//! trace-tool tocsv --csv traces.csv *.trace
//! trace-tool metrics --csv traces.csv
//! trace-tool summary *.trace
//! ```

pub mod aggregator;
pub mod commands;
pub mod intervals;
pub mod output;
pub mod parser;
pub mod utils;
