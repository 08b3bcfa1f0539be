//! Transcodes metrics into Parquet so that they can be queried as an
//! external table.
//!
//! The schema is fixed: a set of optional UTF-8 columns followed by a set
//! of optional INT64 columns. Every column is validated and encoded in
//! memory before the file is created, so a bad value never leaves a
//! truncated file behind.

use super::{prepare_output_path, MetricsSink};
use crate::parser::Row;
use crate::utils::config::{PARQUET_EXTENSIONS, PARQUET_INT64_COLUMNS, PARQUET_STRING_COLUMNS};
use crate::utils::error::OutputError;
use ::parquet::basic::Compression;
use ::parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
use ::parquet::file::properties::WriterProperties;
use ::parquet::file::writer::SerializedFileWriter;
use ::parquet::schema::parser::parse_message_type;
use log::{debug, info};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

/// Encoded values of one column plus its definition levels
///
/// A definition level of 0 marks a null, 1 a present value.
enum ColumnData {
    Utf8 {
        values: Vec<ByteArray>,
        def_levels: Vec<i16>,
    },
    Int64 {
        values: Vec<i64>,
        def_levels: Vec<i16>,
    },
}

/// Writes metric rows to a Snappy-compressed Parquet file
pub struct ParquetMetricsSink {
    path: PathBuf,
    string_columns: Vec<String>,
    int64_columns: Vec<String>,
}

impl ParquetMetricsSink {
    /// Sink with the standard metrics schema
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_columns(path, PARQUET_STRING_COLUMNS, PARQUET_INT64_COLUMNS)
    }

    /// Sink with a custom schema
    pub fn with_columns(
        path: impl Into<PathBuf>,
        string_columns: &[&str],
        int64_columns: &[&str],
    ) -> Self {
        Self {
            path: path.into(),
            string_columns: string_columns.iter().map(|c| c.to_string()).collect(),
            int64_columns: int64_columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Parquet message type describing the schema
    fn message_type(&self) -> String {
        let mut message = String::from("message metrics {\n");
        for column in &self.string_columns {
            message.push_str(&format!("  OPTIONAL BYTE_ARRAY {column} (UTF8);\n"));
        }
        for column in &self.int64_columns {
            message.push_str(&format!("  OPTIONAL INT64 {column};\n"));
        }
        message.push('}');
        message
    }

    /// Encode every column, failing on the first non-integer INT64 value
    fn encode_columns(&self, rows: &[Row]) -> Result<Vec<ColumnData>, OutputError> {
        let mut columns = Vec::with_capacity(self.string_columns.len() + self.int64_columns.len());

        for column in &self.string_columns {
            let mut values = Vec::new();
            let mut def_levels = Vec::with_capacity(rows.len());
            for row in rows {
                match row.get(column) {
                    Some(value) => {
                        values.push(ByteArray::from(value.as_str()));
                        def_levels.push(1);
                    }
                    None => def_levels.push(0),
                }
            }
            columns.push(ColumnData::Utf8 { values, def_levels });
        }

        for column in &self.int64_columns {
            let mut values = Vec::new();
            let mut def_levels = Vec::with_capacity(rows.len());
            for row in rows {
                match row.get(column).filter(|v| !v.is_empty()) {
                    Some(value) => {
                        let parsed = value.parse::<i64>().map_err(|_| OutputError::IntegerColumn {
                            column: column.clone(),
                            value: value.clone(),
                        })?;
                        values.push(parsed);
                        def_levels.push(1);
                    }
                    None => def_levels.push(0),
                }
            }
            columns.push(ColumnData::Int64 { values, def_levels });
        }

        Ok(columns)
    }

    fn validate_extension(&self) -> Result<(), OutputError> {
        let name = self.path.to_string_lossy();
        if PARQUET_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            Ok(())
        } else {
            Err(OutputError::InvalidPath(format!(
                "Parquet file path should have the .parquet.snappy extension: {}",
                self.path.display()
            )))
        }
    }
}

impl MetricsSink for ParquetMetricsSink {
    fn write_metrics(&mut self, rows: &[Row]) -> Result<(), OutputError> {
        info!("Writing {} metric rows to: {}", rows.len(), self.path.display());

        self.validate_extension()?;
        prepare_output_path(&self.path)?;

        let encoded = self.encode_columns(rows)?;
        let schema = Arc::new(parse_message_type(&self.message_type())?);
        let props = Arc::new(
            WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build(),
        );

        let file = File::create(&self.path)?;
        let mut writer = SerializedFileWriter::new(file, schema, props)?;

        // Empty input still yields a valid file with the schema and no row groups
        if !rows.is_empty() {
            let mut row_group = writer.next_row_group()?;
            let mut pending = encoded.iter();

            while let Some(mut column) = row_group.next_column()? {
                match pending.next() {
                    Some(ColumnData::Utf8 { values, def_levels }) => {
                        column
                            .typed::<ByteArrayType>()
                            .write_batch(values, Some(def_levels.as_slice()), None)?;
                    }
                    Some(ColumnData::Int64 { values, def_levels }) => {
                        column
                            .typed::<Int64Type>()
                            .write_batch(values, Some(def_levels.as_slice()), None)?;
                    }
                    None => {}
                }
                column.close()?;
            }

            row_group.close()?;
        }

        writer.close()?;
        debug!("Parquet file closed: {}", self.path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::parquet::file::reader::{FileReader, SerializedFileReader};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_message_type() {
        let sink = ParquetMetricsSink::with_columns("m.parquet", &["name"], &["time_ms"]);
        assert_eq!(
            sink.message_type(),
            "message metrics {\n  OPTIONAL BYTE_ARRAY name (UTF8);\n  OPTIONAL INT64 time_ms;\n}"
        );
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.parquet.snappy");
        let rows = vec![
            row(&[("benchmark_name", "aws-go"), ("time_total_ms", "1200")]),
            row(&[("benchmark_name", "aws-py"), ("time_total_ms", "")]),
        ];

        ParquetMetricsSink::new(&path).write_metrics(&rows).unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        let metadata = reader.metadata().file_metadata();
        assert_eq!(metadata.num_rows(), 2);
        assert_eq!(
            metadata.schema_descr().num_columns(),
            PARQUET_STRING_COLUMNS.len() + PARQUET_INT64_COLUMNS.len()
        );
    }

    #[test]
    fn test_non_integer_value_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.parquet.snappy");
        let rows = vec![row(&[("time_total_ms", "12.5")])];

        let err = ParquetMetricsSink::new(&path).write_metrics(&rows).unwrap_err();
        assert!(matches!(err, OutputError::IntegerColumn { ref column, .. } if column == "time_total_ms"));
        assert!(!path.exists());
    }

    #[test]
    fn test_wrong_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ParquetMetricsSink::new(dir.path().join("metrics.csv"));
        assert!(matches!(
            sink.write_metrics(&[]),
            Err(OutputError::InvalidPath(_))
        ));
    }
}
