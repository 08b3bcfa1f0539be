//! `removelogs` and `extractlogs` command implementations.
//!
//! Both operate on engine log spans (`/pulumirpc.Engine/Log`), which carry
//! the engine's diagnostic output and tend to dominate large traces.

use crate::parser::{
    is_engine_log, read_trace_store, remove_engine_logs, walk_traces, write_trace_store, Trace,
    TraceStore,
};
use crate::utils::config::{LOG_MSG_KEY, LOG_TIME_KEY};
use anyhow::{Context, Result};
use log::{debug, info};
use std::io::Write;
use std::path::Path;

/// Strip engine log spans from a trace store
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `input` - Trace store to read
/// * `output` - Where to write the filtered store; `None` only validates the input
pub fn remove_logs(input: &Path, output: Option<&Path>) -> Result<()> {
    let store = read_trace_store(input)
        .with_context(|| format!("Failed to read trace file {}", input.display()))?;

    let Some(output) = output else {
        info!("No output path given, {} decoded successfully", input.display());
        return Ok(());
    };

    let before: usize = store.traces.iter().map(Trace::span_count).sum();
    let filtered = TraceStore {
        traces: remove_engine_logs(store.traces),
    };
    let after: usize = filtered.traces.iter().map(Trace::span_count).sum();
    debug!("Removed {} engine log spans", before - after);

    write_trace_store(output, &filtered)
        .with_context(|| format!("Failed to write trace file {}", output.display()))?;

    info!("✓ Filtered trace written to: {}", output.display());
    Ok(())
}

/// One engine log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Last `Time` annotation of the span
    pub time: String,

    /// All `Msg` annotations, concatenated in order
    pub msg: String,
}

impl LogLine {
    fn from_trace(trace: &Trace) -> Self {
        let mut line = LogLine {
            time: String::new(),
            msg: String::new(),
        };
        for annotation in &trace.span.annotations {
            if annotation.key == LOG_MSG_KEY {
                line.msg.push_str(&annotation.value);
            }
            if annotation.key == LOG_TIME_KEY {
                line.time = annotation.value.clone();
            }
        }
        line
    }
}

/// Collect the engine log lines of a trace forest, in pre-order
pub fn collect_log_lines(traces: &[Trace]) -> Vec<LogLine> {
    let mut lines = Vec::new();
    let walked = walk_traces(traces, &mut |trace: &Trace| -> Result<(), std::convert::Infallible> {
        if is_engine_log(trace) {
            lines.push(LogLine::from_trace(trace));
        }
        Ok(())
    });
    if let Err(never) = walked {
        match never {}
    }
    lines
}

/// Print `<file>\t<time>\t<msg>` for every engine log span in each file
///
/// **Public** - main entry point called from main.rs
pub fn extract_logs<P: AsRef<Path>, W: Write>(trace_files: &[P], mut out: W) -> Result<()> {
    for file in trace_files {
        let file = file.as_ref();
        let store = read_trace_store(file)
            .with_context(|| format!("Failed to read trace file {}", file.display()))?;

        for line in collect_log_lines(&store.traces) {
            writeln!(out, "{}\t{}\t{}", file.display(), line.time, line.msg)
                .context("Failed to write log line")?;
        }
    }
    out.flush().context("Failed to flush log output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Annotation, Span, SpanId};
    use pretty_assertions::assert_eq;

    fn log_span(annotations: Vec<Annotation>) -> Trace {
        let mut all = vec![Annotation::new("Name", "/pulumirpc.Engine/Log")];
        all.extend(annotations);
        Trace::new(Span {
            id: SpanId::default(),
            annotations: all,
        })
    }

    #[test]
    fn test_log_line_concatenates_messages() {
        let trace = log_span(vec![
            Annotation::new("Time", "t1"),
            Annotation::new("Msg", "hello "),
            Annotation::new("Time", "t2"),
            Annotation::new("Msg", "world"),
        ]);

        assert_eq!(
            collect_log_lines(&[trace]),
            vec![LogLine {
                time: "t2".to_string(),
                msg: "hello world".to_string(),
            }]
        );
    }

    #[test]
    fn test_non_log_spans_ignored() {
        let mut root = Trace::new(Span {
            id: SpanId::default(),
            annotations: vec![Annotation::new("Name", "pulumi")],
        });
        root.sub.push(log_span(vec![Annotation::new("Msg", "nested")]));

        let lines = collect_log_lines(&[root]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].msg, "nested");
        assert_eq!(lines[0].time, "");
    }
}
