//! Tests for output module

use super::*;
use crate::config::{FileFormat, ParquetOptions};
use crate::encode::BatchEncoder;
use crate::progress::ExportProgress;
use crate::schema::{infer_from_rows, ColumnDef, ExportSchema, PhysicalType};
use crate::source::Row;
use crate::value::Value;
use chrono::{DateTime, FixedOffset};
use parquet::basic::Compression;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

fn people() -> Vec<Row> {
    vec![
        Row::record([
            ("name", Value::from("Alice")),
            ("age", Value::Int(30)),
            ("tags", Value::List(vec![Value::from("a"), Value::from("b")])),
        ]),
        Row::record([
            ("name", Value::from("Bob")),
            ("age", Value::Null),
            ("tags", Value::List(vec![])),
        ]),
    ]
}

fn encode(rows: &[Row]) -> (Arc<ExportSchema>, arrow::record_batch::RecordBatch) {
    let schema = Arc::new(infer_from_rows(rows).unwrap());
    let batch = BatchEncoder::new(Arc::clone(&schema), rows.len())
        .encode(rows)
        .unwrap();
    (schema, batch)
}

// ============================================================================
// Writer Config Tests
// ============================================================================

#[test]
fn test_parquet_config_default() {
    let config = ParquetWriterConfig::default();
    assert_eq!(config.compression(), Compression::SNAPPY);
    assert_eq!(config.row_group_size(), 1024 * 1024);
}

#[test]
fn test_parquet_config_from_options() {
    let options = ParquetOptions {
        compression: "ZSTD".to_string(),
        ..ParquetOptions::default()
    };
    let config = ParquetWriterConfig::from_options(&options).unwrap();
    assert!(matches!(config.compression(), Compression::ZSTD(_)));

    let options = ParquetOptions {
        compression: "lz4-raw-ish".to_string(),
        ..ParquetOptions::default()
    };
    assert!(ParquetWriterConfig::from_options(&options).is_err());
}

// ============================================================================
// File Sink Tests
// ============================================================================

#[test]
fn test_file_sink_arrow_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/people.arrow");
    let progress = ExportProgress::new();
    let rows = people();
    let (schema, batch) = encode(&rows);

    let mut sink = FileSink::new(&path, FileFormat::Arrow);
    assert!(sink.accept(&batch, &progress).unwrap().is_some());
    sink.finish(&schema, &progress).unwrap();
    assert_eq!(sink.rows_written(), 2);

    let read = read_arrow_file(&path).unwrap();
    assert_eq!(read.len(), 2);
    assert_eq!(read[0].get("name"), Some(&Value::from("Alice")));
    assert_eq!(read[0].get("age"), Some(&Value::Int(30)));
    assert_eq!(
        read[0].get("tags"),
        Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
    );
    assert_eq!(read[1].get("age"), Some(&Value::Null));
    assert_eq!(read[1].get("tags"), Some(&Value::List(vec![])));
}

#[test]
fn test_file_sink_parquet_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.parquet");
    let progress = ExportProgress::new();
    let rows = people();
    let (schema, batch) = encode(&rows);

    let mut sink = FileSink::new(&path, FileFormat::Parquet)
        .with_parquet_config(ParquetWriterConfig::new().with_compression(Compression::UNCOMPRESSED));
    sink.accept(&batch, &progress).unwrap();
    sink.finish(&schema, &progress).unwrap();

    let read = read_parquet_file(&path).unwrap();
    assert_eq!(read.len(), 2);
    assert_eq!(read[1].get("name"), Some(&Value::from("Bob")));
}

#[test]
fn test_file_sink_without_rows_writes_schema_only_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.arrow");
    let progress = ExportProgress::new();
    let schema = ExportSchema::new(vec![ColumnDef::new("id", PhysicalType::Int64)]).unwrap();

    let mut sink = FileSink::new(&path, FileFormat::Arrow);
    sink.finish(&schema, &progress).unwrap();

    assert!(path.exists());
    assert!(read_arrow_file(&path).unwrap().is_empty());
}

#[test]
fn test_file_sink_release_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.arrow");
    let progress = ExportProgress::new();
    let (_, batch) = encode(&people());

    let mut sink = FileSink::new(&path, FileFormat::Arrow);
    sink.accept(&batch, &progress).unwrap();
    sink.release();
    sink.release();
    drop(sink);

    assert_eq!(read_arrow_file(&path).unwrap().len(), 2);
}

#[test]
fn test_read_missing_file() {
    let err = read_arrow_file("/nonexistent/export.arrow").unwrap_err();
    assert!(matches!(err, crate::error::Error::FileNotFound { .. }));
}

// ============================================================================
// Stream Sink Tests
// ============================================================================

#[test]
fn test_stream_sink_chunks_are_self_contained() {
    let progress = ExportProgress::new();
    let rows = people();
    let (schema, batch) = encode(&rows);

    let mut sink = StreamSink::new();
    let chunk = sink.accept(&batch, &progress).unwrap().unwrap();
    assert!(sink.finish(&schema, &progress).unwrap().is_none());

    let decoded = decode_stream_chunk(&chunk).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].get("name"), Some(&Value::from("Alice")));
    assert!(!sink.flush_partial_on_cancel());
}

#[test]
fn test_stream_sink_empty_export_emits_schema_chunk() {
    let progress = ExportProgress::new();
    let schema = ExportSchema::new(vec![ColumnDef::new("id", PhysicalType::Int64)]).unwrap();

    let mut sink = StreamSink::new();
    let chunk = sink.finish(&schema, &progress).unwrap().unwrap();

    let reader = arrow::ipc::reader::StreamReader::try_new(std::io::Cursor::new(chunk.to_vec()), None)
        .unwrap();
    assert_eq!(reader.schema().field(0).name(), "id");
    assert!(decode_stream_chunk(&chunk).unwrap().is_empty());
}

// ============================================================================
// Decode Tests
// ============================================================================

#[test]
fn test_decode_timestamp_as_utc() {
    let instant: DateTime<FixedOffset> = "2024-03-01T12:00:00+02:00".parse().unwrap();
    let rows = vec![Row::record([("at", Value::DateTime(instant))])];
    let (_, batch) = encode(&rows);

    let decoded = batch_to_rows(&batch).unwrap();
    let Some(Value::DateTime(at)) = decoded[0].get("at") else {
        panic!("expected a date-time");
    };
    assert_eq!(at.offset().local_minus_utc(), 0);
    assert_eq!(at.timestamp_millis(), instant.timestamp_millis());
}

#[test]
fn test_decode_degraded_column_is_text() {
    let rows = vec![
        Row::record([("v", Value::List(vec![Value::List(vec![Value::List(vec![Value::Int(1)])])]))]),
    ];
    let (schema, batch) = encode(&rows);
    assert_eq!(schema.to_string(), "v:list<utf8>");

    let decoded = batch_to_rows(&batch).unwrap();
    assert_eq!(
        decoded[0].get("v"),
        Some(&Value::List(vec![Value::from("[[1]]")]))
    );
}
