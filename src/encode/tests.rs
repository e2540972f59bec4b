//! Batch encoder tests

use super::*;
use crate::error::Error;
use crate::schema::{infer_from_rows, ColumnDef, ExportSchema, PhysicalType};
use crate::source::Row;
use crate::value::{IsoDuration, Value};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{Int64Type, TimestampMillisecondType};
use arrow::ipc::reader::StreamReader;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::sync::Arc;

fn schema(columns: Vec<ColumnDef>) -> Arc<ExportSchema> {
    Arc::new(ExportSchema::new(columns).unwrap())
}

fn int_list(items: Vec<Option<i64>>) -> Value {
    Value::List(items.into_iter().map(Value::from).collect())
}

#[test]
fn test_scenario_single_row_batches() {
    let rows = vec![
        Row::record([("id", Value::Int(1)), ("city", Value::from("Milan"))]),
        Row::record([("id", Value::Int(2)), ("city", Value::from("Rome"))]),
    ];
    let schema = Arc::new(infer_from_rows(&rows[..1]).unwrap());
    assert_eq!(schema.to_string(), "id:int64, city:utf8");

    let mut encoder = BatchEncoder::new(Arc::clone(&schema), 1);
    let first = encoder.encode(&rows[..1]).unwrap();
    let second = encoder.encode(&rows[1..]).unwrap();

    assert_eq!(first.num_rows(), 1);
    assert_eq!(second.num_rows(), 1);
    assert_eq!(first.column(0).as_primitive::<Int64Type>().value(0), 1);
    assert_eq!(second.column(1).as_string::<i32>().value(0), "Rome");
}

#[test]
fn test_scenario_mixed_column_stringified() {
    let rows = vec![
        Row::record([("v", Value::Int(1))]),
        Row::record([("v", Value::from("x"))]),
    ];
    let schema = Arc::new(infer_from_rows(&rows).unwrap());
    let batch = BatchEncoder::new(schema, 2).encode(&rows).unwrap();

    let column = batch.column(0).as_string::<i32>();
    assert_eq!(column.value(0), "1");
    assert_eq!(column.value(1), "x");
}

#[test]
fn test_missing_and_extra_columns() {
    let schema = schema(vec![
        ColumnDef::new("a", PhysicalType::Int64),
        ColumnDef::new("b", PhysicalType::Utf8),
    ]);
    let rows = vec![Row::record([("a", Value::Int(1)), ("zzz", Value::Bool(true))])];
    let batch = BatchEncoder::new(schema, 1).encode(&rows).unwrap();

    assert_eq!(batch.num_columns(), 2);
    assert!(batch.column(1).is_null(0));
}

#[test]
fn test_type_mismatch_is_encoding_error() {
    let schema = schema(vec![ColumnDef::new("n", PhysicalType::Int64)]);
    let mut encoder = BatchEncoder::new(schema, 2);

    let err = encoder
        .encode(&[
            Row::record([("n", Value::Int(1))]),
            Row::record([("n", Value::Float(1.5))]),
        ])
        .unwrap_err();
    assert!(err.is_encoding());
    assert!(matches!(err, Error::Encoding { ref column, .. } if column == "n"));

    // builders were discarded, so the next batch starts clean
    let batch = encoder.encode(&[Row::record([("n", Value::Int(7))])]).unwrap();
    assert_eq!(batch.num_rows(), 1);
    assert_eq!(batch.column(0).as_primitive::<Int64Type>().value(0), 7);
}

#[test]
fn test_utf8_column_canonical_text() {
    let schema = schema(vec![ColumnDef::new("v", PhysicalType::Utf8)]);
    let rows = vec![
        Row::record([("v", Value::map([("foo", Value::from("bar"))]))]),
        Row::record([("v", Value::Duration(IsoDuration::new(5, 1, 43_200, 0)))]),
        Row::record([("v", Value::Bool(false))]),
        Row::record([("v", Value::Null)]),
    ];
    let batch = BatchEncoder::new(schema, 4).encode(&rows).unwrap();
    let column = batch.column(0).as_string::<i32>();

    assert_eq!(column.value(0), r#"{"foo":"bar"}"#);
    assert_eq!(column.value(1), "P5M1DT12H");
    assert_eq!(column.value(2), "false");
    assert!(column.is_null(3));
}

#[test]
fn test_timestamps_as_epoch_millis() {
    let schema = schema(vec![ColumnDef::new("t", PhysicalType::TimestampMillis)]);
    let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let rows = vec![
        Row::record([("t", Value::Date(date))]),
        Row::record([("t", Value::LocalDateTime(date.and_hms_opt(0, 0, 1).unwrap()))]),
    ];
    let batch = BatchEncoder::new(schema, 2).encode(&rows).unwrap();
    let column = batch.column(0).as_primitive::<TimestampMillisecondType>();

    assert_eq!(column.value(0), 1_577_923_200_000);
    assert_eq!(column.value(1), 1_577_923_201_000);
}

#[test]
fn test_timestamp_column_rejects_string() {
    let schema = schema(vec![ColumnDef::new("t", PhysicalType::TimestampMillis)]);
    let result = BatchEncoder::new(schema, 1).encode(&[Row::record([("t", Value::from("soon"))])]);
    assert!(result.unwrap_err().is_encoding());
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_list_depth_one_with_interior_nulls() {
    let schema = schema(vec![ColumnDef::new(
        "l",
        PhysicalType::list_of(PhysicalType::Int64),
    )]);
    let rows = vec![
        Row::record([("l", int_list(vec![Some(1), None, Some(3)]))]),
        Row::record([("l", Value::Null)]),
        Row::record([("l", Value::List(vec![]))]),
    ];
    let batch = BatchEncoder::new(schema, 3).encode(&rows).unwrap();
    let lists = batch.column(0).as_list::<i32>();

    let first = lists.value(0);
    let first = first.as_primitive::<Int64Type>();
    assert_eq!(first.len(), 3);
    assert_eq!(first.value(0), 1);
    assert!(first.is_null(1));
    assert_eq!(first.value(2), 3);

    // a null list stays null, an empty list stays empty
    assert!(lists.is_null(1));
    assert!(lists.is_valid(2));
    assert_eq!(lists.value(2).len(), 0);
}

#[test]
fn test_list_depth_two() {
    let schema = schema(vec![ColumnDef::new(
        "l",
        PhysicalType::list_of(PhysicalType::list_of(PhysicalType::Int64)),
    )]);
    let value = Value::List(vec![
        int_list(vec![Some(1), Some(2)]),
        Value::Null,
        int_list(vec![None]),
    ]);
    let batch = BatchEncoder::new(schema, 1)
        .encode(&[Row::record([("l", value)])])
        .unwrap();

    let outer = batch.column(0).as_list::<i32>().value(0);
    let outer = outer.as_list::<i32>();
    assert_eq!(outer.len(), 3);
    assert_eq!(outer.value(0).as_primitive::<Int64Type>().values().to_vec(), vec![1, 2]);
    assert!(outer.is_null(1));
    assert!(outer.value(2).is_null(0));
}

#[test]
fn test_depth_three_falls_back_to_text() {
    let value = Value::List(vec![Value::List(vec![int_list(vec![Some(0)])])]);
    let rows = vec![Row::record([("l", value)])];
    let schema = Arc::new(infer_from_rows(&rows).unwrap());
    assert_eq!(
        schema.column("l").unwrap().physical_type,
        PhysicalType::list_of(PhysicalType::Utf8)
    );

    let batch = BatchEncoder::new(schema, 1).encode(&rows).unwrap();
    let inner = batch.column(0).as_list::<i32>().value(0);
    assert_eq!(inner.as_string::<i32>().value(0), "[[0]]");
}

#[test]
fn test_mixed_list_elements_as_text() {
    let value = Value::List(vec![
        Value::Int(1),
        Value::from("2"),
        Value::Bool(true),
        Value::Null,
    ]);
    let rows = vec![Row::record([("l", value)])];
    let schema = Arc::new(infer_from_rows(&rows).unwrap());
    let batch = BatchEncoder::new(schema, 1).encode(&rows).unwrap();

    let items = batch.column(0).as_list::<i32>().value(0);
    let items = items.as_string::<i32>();
    assert_eq!(items.value(0), "1");
    assert_eq!(items.value(1), "2");
    assert_eq!(items.value(2), "true");
    assert!(items.is_null(3));
}

// ============================================================================
// IPC
// ============================================================================

#[test]
fn test_stream_chunk_is_self_contained() {
    let schema = schema(vec![ColumnDef::new("a", PhysicalType::Int64)]);
    let batch = BatchEncoder::new(Arc::clone(&schema), 1)
        .encode(&[Row::record([("a", Value::Int(5))])])
        .unwrap();

    let chunk = encode_stream_chunk(&batch).unwrap();
    let reader = StreamReader::try_new(Cursor::new(chunk.to_vec()), None).unwrap();
    assert_eq!(reader.schema(), schema.arrow_schema());
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    assert_eq!(batches, vec![batch]);
}

#[test]
fn test_schema_chunk_has_no_batches() {
    let schema = schema(vec![ColumnDef::new("a", PhysicalType::Utf8)]);
    let chunk = encode_schema_chunk(&schema.arrow_schema()).unwrap();
    let reader = StreamReader::try_new(Cursor::new(chunk.to_vec()), None).unwrap();
    assert_eq!(reader.count(), 0);
}
