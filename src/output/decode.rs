//! Reading exported data back into rows
//!
//! Timestamps decode as UTC date-times, lists as lists, structs as maps and
//! everything textual as strings. Degraded `utf8` columns stay strings; their
//! content can be re-parsed as JSON by the caller.

use crate::error::{Error, Result};
use crate::source::{Row, RowKind};
use crate::value::Value;
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::ipc::reader::{FileReader, StreamReader};
use arrow::record_batch::RecordBatch;
use base64::Engine;
use chrono::{DateTime, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Read every row of an Arrow IPC file
pub fn read_arrow_file(path: impl AsRef<Path>) -> Result<Vec<Row>> {
    let file = open(path.as_ref())?;
    let reader = FileReader::try_new(BufReader::new(file), None)?;
    let mut rows = Vec::new();
    for batch in reader {
        rows.extend(batch_to_rows(&batch?)?);
    }
    Ok(rows)
}

/// Read every row of a Parquet file
pub fn read_parquet_file(path: impl AsRef<Path>) -> Result<Vec<Row>> {
    let file = open(path.as_ref())?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut rows = Vec::new();
    for batch in reader {
        rows.extend(batch_to_rows(&batch?)?);
    }
    Ok(rows)
}

/// Decode one self-contained IPC stream chunk
pub fn decode_stream_chunk(chunk: &[u8]) -> Result<Vec<Row>> {
    let reader = StreamReader::try_new(Cursor::new(chunk), None)?;
    let mut rows = Vec::new();
    for batch in reader {
        rows.extend(batch_to_rows(&batch?)?);
    }
    Ok(rows)
}

fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(File::open(path)?)
}

/// Convert a RecordBatch to rows
pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<Row>> {
    let schema = batch.schema();
    let mut rows = Vec::with_capacity(batch.num_rows());

    for row_idx in 0..batch.num_rows() {
        let mut row = Row::new(RowKind::Record);
        for (col_idx, field) in schema.fields().iter().enumerate() {
            let value = array_value(batch.column(col_idx).as_ref(), row_idx)?;
            row.insert(field.name().clone(), value);
        }
        rows.push(row);
    }

    Ok(rows)
}

fn downcast_error(data_type: &DataType) -> Error {
    Error::output(format!("Failed to downcast array of type {data_type}"))
}

/// Convert a single array element to a value
fn array_value(array: &dyn Array, row: usize) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }

    let data_type = array.data_type();
    macro_rules! primitive {
        ($ty:ty) => {
            array
                .as_primitive_opt::<$ty>()
                .ok_or_else(|| downcast_error(data_type))?
                .value(row)
        };
    }

    let value = match data_type {
        DataType::Null => Value::Null,
        DataType::Boolean => Value::Bool(
            array
                .as_boolean_opt()
                .ok_or_else(|| downcast_error(data_type))?
                .value(row),
        ),
        DataType::Int8 => Value::Int(i64::from(primitive!(Int8Type))),
        DataType::Int16 => Value::Int(i64::from(primitive!(Int16Type))),
        DataType::Int32 => Value::Int(i64::from(primitive!(Int32Type))),
        DataType::Int64 => Value::Int(primitive!(Int64Type)),
        DataType::UInt8 => Value::Int(i64::from(primitive!(UInt8Type))),
        DataType::UInt16 => Value::Int(i64::from(primitive!(UInt16Type))),
        DataType::UInt32 => Value::Int(i64::from(primitive!(UInt32Type))),
        DataType::UInt64 => {
            // UInt64 might overflow i64, so convert to string if needed
            let val = primitive!(UInt64Type);
            i64::try_from(val).map_or_else(|_| Value::String(val.to_string()), Value::Int)
        }
        DataType::Float32 => Value::Float(f64::from(primitive!(Float32Type))),
        DataType::Float64 => Value::Float(primitive!(Float64Type)),
        DataType::Utf8 => Value::String(
            array
                .as_string_opt::<i32>()
                .ok_or_else(|| downcast_error(data_type))?
                .value(row)
                .to_string(),
        ),
        DataType::LargeUtf8 => Value::String(
            array
                .as_string_opt::<i64>()
                .ok_or_else(|| downcast_error(data_type))?
                .value(row)
                .to_string(),
        ),
        DataType::Binary => Value::String(
            base64::engine::general_purpose::STANDARD.encode(
                array
                    .as_binary_opt::<i32>()
                    .ok_or_else(|| downcast_error(data_type))?
                    .value(row),
            ),
        ),
        DataType::Timestamp(unit, _) => {
            let micros = match unit {
                TimeUnit::Second => primitive!(TimestampSecondType).saturating_mul(1_000_000),
                TimeUnit::Millisecond => primitive!(TimestampMillisecondType).saturating_mul(1_000),
                TimeUnit::Microsecond => primitive!(TimestampMicrosecondType),
                TimeUnit::Nanosecond => primitive!(TimestampNanosecondType) / 1_000,
            };
            utc_datetime(micros)?
        }
        DataType::Date32 => {
            let days = primitive!(Date32Type);
            // 719_163 days from 0001-01-01 to 1970-01-01
            NaiveDate::from_num_days_from_ce_opt(days + 719_163)
                .map(Value::Date)
                .ok_or_else(|| Error::output(format!("Date out of range: {days}")))?
        }
        DataType::Date64 => utc_datetime(primitive!(Date64Type).saturating_mul(1_000))?,
        DataType::List(_) => {
            let list = array
                .as_list_opt::<i32>()
                .ok_or_else(|| downcast_error(data_type))?
                .value(row);
            list_values(list.as_ref())?
        }
        DataType::LargeList(_) => {
            let list = array
                .as_list_opt::<i64>()
                .ok_or_else(|| downcast_error(data_type))?
                .value(row);
            list_values(list.as_ref())?
        }
        DataType::Struct(fields) => {
            let structs = array
                .as_struct_opt()
                .ok_or_else(|| downcast_error(data_type))?;
            let mut map = std::collections::BTreeMap::new();
            for (i, field) in fields.iter().enumerate() {
                map.insert(
                    field.name().clone(),
                    array_value(structs.column(i).as_ref(), row)?,
                );
            }
            Value::Map(map)
        }
        other => {
            return Err(Error::output(format!(
                "Unsupported Arrow type for decoding: {other}"
            )))
        }
    };
    Ok(value)
}

fn list_values(values: &dyn Array) -> Result<Value> {
    (0..values.len())
        .map(|i| array_value(values, i))
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

fn utc_datetime(micros: i64) -> Result<Value> {
    let secs = micros.div_euclid(1_000_000);
    let nsecs = u32::try_from(micros.rem_euclid(1_000_000) * 1_000).unwrap_or(0);
    DateTime::from_timestamp(secs, nsecs)
        .map(|dt| Value::DateTime(dt.fixed_offset()))
        .ok_or_else(|| Error::output(format!("Timestamp out of range: {micros}")))
}
