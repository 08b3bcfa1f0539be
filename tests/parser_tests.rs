use std::path::PathBuf;
use trace_tool::parser::{
    detect_annotation_names, is_engine_log, read_trace_store, remove_engine_logs, span_interval,
    trace_rows, walk_traces, walk_traces_from_file, write_trace_store, Trace, TraceStore,
};
use trace_tool::utils::ParseError;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/aws-go-pulumi-update-initial.trace")
}

#[test]
fn test_read_fixture() {
    let store = read_trace_store(fixture()).unwrap();
    assert_eq!(store.traces.len(), 1);
    assert_eq!(store.traces[0].span_count(), 7);
    assert_eq!(store.traces[0].span.name(), Some("pulumi"));
    assert_eq!(store.traces[0].sub[0].span.id.parent, 1);
}

#[test]
fn test_walk_is_pre_order() {
    let store = read_trace_store(fixture()).unwrap();
    let mut ids = Vec::new();
    walk_traces(&store.traces, &mut |t: &Trace| -> Result<(), ParseError> {
        ids.push(t.span.id.span);
        Ok(())
    })
    .unwrap();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_walk_stops_at_first_error() {
    let mut visited = 0;
    let result = walk_traces_from_file(fixture(), &mut |t: &Trace| {
        visited += 1;
        if is_engine_log(t) {
            return Err(ParseError::MissingField("stop".to_string()));
        }
        Ok(())
    });
    assert!(result.is_err());
    assert_eq!(visited, 5);
}

#[test]
fn test_detect_annotation_names_sorted() {
    let names = detect_annotation_names(&[fixture()]).unwrap();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(names.contains(&"MemStats.NumGC".to_string()));
    assert!(names.contains(&"api".to_string()));
    assert_eq!(names.iter().filter(|n| *n == "Msg").count(), 1);
}

#[test]
fn test_rows_parse_as_intervals() {
    let store = read_trace_store(fixture()).unwrap();
    let rows = trace_rows(&store.traces, "file", "fixture.trace");
    for row in &rows {
        assert_eq!(row["file"], "fixture.trace");
        assert!(span_interval(row).unwrap().is_valid());
    }
}

#[test]
fn test_store_round_trip_without_logs() {
    let store = read_trace_store(fixture()).unwrap();
    let filtered = TraceStore {
        traces: remove_engine_logs(store.traces),
    };

    let temp = tempfile::NamedTempFile::new().unwrap();
    write_trace_store(temp.path(), &filtered).unwrap();
    let reread = read_trace_store(temp.path()).unwrap();

    assert_eq!(reread, filtered);
    assert_eq!(reread.traces[0].span_count(), 6);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = read_trace_store("/nonexistent/trace.trace").unwrap_err();
    assert!(matches!(err, ParseError::Io(_)));
}
