//! Value placement into Arrow builders

use crate::error::{Error, Result};
use crate::schema::PhysicalType;
use crate::value::{type_name, Value};
use arrow::array::{
    ArrayBuilder, BooleanBuilder, Float64Builder, Int64Builder, ListBuilder, StringBuilder,
    TimestampMillisecondBuilder,
};

/// Append one value to a builder of the given physical type
///
/// Lists recurse into their child builder with the element type. Nulls
/// become typed nulls at every level.
pub fn append(
    builder: &mut dyn ArrayBuilder,
    ty: &PhysicalType,
    value: &Value,
    column: &str,
) -> Result<()> {
    match ty {
        PhysicalType::Bool => {
            let b = downcast::<BooleanBuilder>(builder, column)?;
            match value {
                Value::Null => b.append_null(),
                Value::Bool(v) => b.append_value(*v),
                other => return Err(mismatch(column, ty, other)),
            }
        }
        PhysicalType::Int64 => {
            let b = downcast::<Int64Builder>(builder, column)?;
            match value {
                Value::Null => b.append_null(),
                Value::Int(v) => b.append_value(*v),
                other => return Err(mismatch(column, ty, other)),
            }
        }
        PhysicalType::Float64 => {
            let b = downcast::<Float64Builder>(builder, column)?;
            match value {
                Value::Null => b.append_null(),
                Value::Float(v) => b.append_value(*v),
                other => return Err(mismatch(column, ty, other)),
            }
        }
        PhysicalType::Utf8 => {
            let b = downcast::<StringBuilder>(builder, column)?;
            match value {
                Value::Null => b.append_null(),
                Value::String(s) => b.append_value(s),
                other => b.append_value(other.to_text()),
            }
        }
        PhysicalType::TimestampMillis => {
            let b = downcast::<TimestampMillisecondBuilder>(builder, column)?;
            match value {
                Value::Null => b.append_null(),
                other => match epoch_millis(other) {
                    Some(ms) => b.append_value(ms),
                    None => return Err(mismatch(column, ty, other)),
                },
            }
        }
        PhysicalType::List(inner) => {
            let b = downcast::<ListBuilder<Box<dyn ArrayBuilder>>>(builder, column)?;
            match value {
                Value::Null => b.append(false),
                Value::List(items) => {
                    for item in items {
                        append(b.values().as_mut(), inner, item, column)?;
                    }
                    b.append(true);
                }
                other => return Err(mismatch(column, ty, other)),
            }
        }
    }
    Ok(())
}

/// Milliseconds since the Unix epoch for timestamp-shaped values
///
/// Local date-times and dates are interpreted as UTC.
pub fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::DateTime(dt) => Some(dt.timestamp_millis()),
        Value::LocalDateTime(dt) => Some(dt.and_utc().timestamp_millis()),
        Value::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis()),
        _ => None,
    }
}

fn mismatch(column: &str, ty: &PhysicalType, value: &Value) -> Error {
    Error::encoding(column, ty, type_name(value))
}

fn downcast<'a, B: ArrayBuilder>(
    builder: &'a mut dyn ArrayBuilder,
    column: &str,
) -> Result<&'a mut B> {
    builder.as_any_mut().downcast_mut::<B>().ok_or_else(|| {
        Error::Other(format!(
            "Builder for column '{column}' is not a {}",
            std::any::type_name::<B>()
        ))
    })
}
