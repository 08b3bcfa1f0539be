//! Reading, writing and walking trace store files.

use super::schema::{Trace, TraceStore};
use crate::utils::config::ENGINE_LOG_SPAN_NAME;
use crate::utils::error::ParseError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read a trace store from disk
///
/// **Public** - main entry point for decoding
///
/// # Errors
/// * `ParseError::Io` - file cannot be opened
/// * `ParseError::JsonError` - contents are not a trace store
pub fn read_trace_store(path: impl AsRef<Path>) -> Result<TraceStore, ParseError> {
    let path = path.as_ref();
    debug!("Reading trace store: {}", path.display());

    let file = File::open(path)?;
    let store: TraceStore = serde_json::from_reader(BufReader::new(file))?;

    debug!(
        "Loaded {} root traces ({} spans) from {}",
        store.traces.len(),
        store.traces.iter().map(Trace::span_count).sum::<usize>(),
        path.display()
    );

    Ok(store)
}

/// Write a trace store to disk
///
/// **Public** - used by removelogs
pub fn write_trace_store(path: impl AsRef<Path>, store: &TraceStore) -> Result<(), ParseError> {
    let path = path.as_ref();
    info!("Writing trace store to: {}", path.display());

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, store)?;
    writer.flush()?;

    Ok(())
}

/// Visit every trace depth-first, parents before children
///
/// Stops at the first error returned by `on_trace`.
pub fn walk_traces<E>(
    traces: &[Trace],
    on_trace: &mut impl FnMut(&Trace) -> Result<(), E>,
) -> Result<(), E> {
    for trace in traces {
        on_trace(trace)?;
        walk_traces(&trace.sub, on_trace)?;
    }
    Ok(())
}

/// Read a store and walk all of its traces
pub fn walk_traces_from_file<E>(
    path: impl AsRef<Path>,
    on_trace: &mut impl FnMut(&Trace) -> Result<(), E>,
) -> Result<(), E>
where
    E: From<ParseError>,
{
    let store = read_trace_store(path)?;
    walk_traces(&store.traces, on_trace)
}

/// True for spans recording an engine log message
pub fn is_engine_log(trace: &Trace) -> bool {
    trace.span.name() == Some(ENGINE_LOG_SPAN_NAME)
}

/// Drop every engine log span from a forest
///
/// Children of a dropped span are kept and take its place under the
/// dropped span's parent.
pub fn remove_engine_logs(traces: Vec<Trace>) -> Vec<Trace> {
    let mut kept = Vec::with_capacity(traces.len());
    for mut trace in traces {
        let sub = remove_engine_logs(std::mem::take(&mut trace.sub));
        if is_engine_log(&trace) {
            kept.extend(sub);
        } else {
            trace.sub = sub;
            kept.push(trace);
        }
    }
    kept
}
