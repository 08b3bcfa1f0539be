//! CSV reading and writing.

use super::MetricsSink;
use crate::parser::Row;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

/// Writes metric rows as CSV
///
/// The header is the sorted union of every row's columns; cells a row
/// lacks are left empty.
pub struct CsvMetricsSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvMetricsSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricsSink for CsvMetricsSink<W> {
    fn write_metrics(&mut self, rows: &[Row]) -> Result<(), OutputError> {
        let columns: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        let columns: Vec<&str> = columns.into_iter().collect();

        debug!("Writing {} metric rows with {} columns", rows.len(), columns.len());
        write_rows(&mut self.writer, &columns, rows)
    }
}

/// Incremental CSV writer with a fixed column order
///
/// The header goes out on construction; rows can then be written one at a
/// time so callers never need the whole table in memory.
pub struct CsvRowWriter<W: Write> {
    writer: ::csv::Writer<W>,
    columns: Vec<String>,
    written: usize,
}

impl<W: Write> CsvRowWriter<W> {
    /// Start a table and write its header
    pub fn new<S: AsRef<str>>(writer: W, columns: &[S]) -> Result<Self, OutputError> {
        let mut writer = ::csv::Writer::from_writer(writer);
        writer.write_record(columns.iter().map(|c| c.as_ref()))?;
        Ok(Self {
            writer,
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            written: 0,
        })
    }

    /// Write one record, empty cells for missing columns
    pub fn write_row(&mut self, row: &Row) -> Result<(), OutputError> {
        self.writer.write_record(
            self.columns
                .iter()
                .map(|c| row.get(c).map(String::as_str).unwrap_or_default()),
        )?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered records to the underlying writer
    pub fn finish(mut self) -> Result<usize, OutputError> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

/// Write a header and one record per row, in `columns` order
pub fn write_rows<W: Write, S: AsRef<str>>(
    writer: W,
    columns: &[S],
    rows: &[Row],
) -> Result<(), OutputError> {
    let mut table = CsvRowWriter::new(writer, columns)?;
    for row in rows {
        table.write_row(row)?;
    }
    table.finish()?;
    Ok(())
}

/// Read a CSV file into rows keyed by its header
pub fn read_csv_rows(path: impl AsRef<Path>) -> Result<Vec<Row>, ::csv::Error> {
    let path = path.as_ref();
    info!("Reading CSV: {}", path.display());

    let mut reader = ::csv::Reader::from_path(path)?;
    let header = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            header
                .iter()
                .zip(record.iter())
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write only `columns` of `rows`, in that order
///
/// Nothing is written when there are no rows.
///
/// # Errors
/// * `OutputError::UnknownColumn` - a column absent from every row
pub fn select_columns<W: Write>(
    columns: &[&str],
    rows: &[Row],
    writer: W,
) -> Result<(), OutputError> {
    if rows.is_empty() {
        return Ok(());
    }

    if let Some(missing) = columns
        .iter()
        .find(|c| !rows.iter().any(|row| row.contains_key(**c)))
    {
        return Err(OutputError::UnknownColumn(missing.to_string()));
    }

    write_rows(writer, columns, rows)
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
    fn test_sink_writes_union_header() {
        let rows = vec![row(&[("b", "1"), ("a", "x,y")]), row(&[("c", "3")])];
        let mut sink = CsvMetricsSink::new(Vec::new());
        sink.write_metrics(&rows).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "a,b,c\n\"x,y\",1,\n,,3\n");
    }

    #[test]
    fn test_row_writer_streams_records() {
        let mut out = Vec::new();
        let mut table = CsvRowWriter::new(&mut out, &["Name", "tracefile"]).unwrap();
        table.write_row(&row(&[("Name", "pulumi"), ("extra", "x")])).unwrap();
        table.write_row(&row(&[("tracefile", "a.trace")])).unwrap();
        assert_eq!(table.written(), 2);
        assert_eq!(table.finish().unwrap(), 2);

        assert_eq!(String::from_utf8(out).unwrap(), "Name,tracefile\npulumi,\n,a.trace\n");
    }

    #[test]
    fn test_select_columns_orders_output() {
        let rows = vec![row(&[("a", "1"), ("b", "2"), ("c", "3")])];
        let mut out = Vec::new();
        select_columns(&["c", "a"], &rows, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "c,a\n3,1\n");
    }

    #[test]
    fn test_select_unknown_column() {
        let rows = vec![row(&[("a", "1")])];
        let err = select_columns(&["a", "zzz"], &rows, Vec::new()).unwrap_err();
        assert!(matches!(err, OutputError::UnknownColumn(c) if c == "zzz"));
    }

    #[test]
    fn test_select_no_rows_writes_nothing() {
        let mut out = Vec::new();
        select_columns(&["a"], &[], &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_read_csv_rows() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "Name,Span.Start\npulumi,2022-01-01T00:00:00Z\n").unwrap();

        let rows = read_csv_rows(temp.path()).unwrap();
        assert_eq!(rows, vec![row(&[("Name", "pulumi"), ("Span.Start", "2022-01-01T00:00:00Z")])]);
    }
}
