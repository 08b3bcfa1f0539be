//! Flattening span annotations into table rows.
//!
//! Every span becomes one row keyed by annotation name, plus a column
//! recording which trace file it came from.

use super::schema::Trace;
use super::trace_store::{read_trace_store, walk_traces, walk_traces_from_file};
use crate::utils::error::ParseError;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::path::Path;

/// One span (or one metric record) as `column -> value`
pub type Row = BTreeMap<String, String>;

/// Sorted union of annotation keys over every span in the files
pub fn detect_annotation_names<P: AsRef<Path>>(trace_files: &[P]) -> Result<Vec<String>, ParseError> {
    let mut names = BTreeSet::new();

    for file in trace_files {
        walk_traces_from_file(file, &mut |trace: &Trace| -> Result<(), ParseError> {
            for annotation in &trace.span.annotations {
                if !names.contains(&annotation.key) {
                    names.insert(annotation.key.clone());
                }
            }
            Ok(())
        })?;
    }

    debug!("Detected {} annotation names", names.len());
    Ok(names.into_iter().collect())
}

/// One span's annotations plus the filename column
pub fn span_row(trace: &Trace, filename_column: &str, filename: &str) -> Row {
    let mut row = trace.span.string_map();
    row.insert(filename_column.to_string(), filename.to_string());
    row
}

/// Flatten a forest into rows, tagging each with `filename`
pub fn trace_rows(traces: &[Trace], filename_column: &str, filename: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let walked = walk_traces(traces, &mut |trace: &Trace| -> Result<(), Infallible> {
        rows.push(span_row(trace, filename_column, filename));
        Ok(())
    });
    if let Err(never) = walked {
        match never {}
    }
    rows
}

/// Decode trace files straight into rows
///
/// **Public** - in-memory counterpart of `tocsv` used by summary
pub fn read_trace_rows<P: AsRef<Path>>(
    trace_files: &[P],
    filename_column: &str,
) -> Result<Vec<Row>, ParseError> {
    let mut rows = Vec::new();
    for file in trace_files {
        let path = file.as_ref();
        let store = read_trace_store(path)?;
        rows.extend(trace_rows(
            &store.traces,
            filename_column,
            &path.to_string_lossy(),
        ));
    }
    Ok(rows)
}
