//! Logical (observed runtime) types

use super::types::Value;
use std::fmt;

/// Logical type of a runtime value, as reported by store metadata or
/// observed while scanning rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalType {
    Boolean,
    Integer,
    Float,
    String,
    DateTime,
    LocalDateTime,
    Date,
    LocalTime,
    Duration,
    Point,
    Map,
    Node,
    Relationship,
    /// List whose non-null elements share one logical type
    List(Box<LogicalType>),
    /// Unknown or mixed
    Any,
}

impl LogicalType {
    /// Logical type of a value, `None` for null
    pub fn of(value: &Value) -> Option<LogicalType> {
        let ty = match value {
            Value::Null => return None,
            Value::Bool(_) => LogicalType::Boolean,
            Value::Int(_) => LogicalType::Integer,
            Value::Float(_) => LogicalType::Float,
            Value::String(_) => LogicalType::String,
            Value::DateTime(_) => LogicalType::DateTime,
            Value::LocalDateTime(_) => LogicalType::LocalDateTime,
            Value::Date(_) => LogicalType::Date,
            Value::LocalTime(_) => LogicalType::LocalTime,
            Value::Duration(_) => LogicalType::Duration,
            Value::Point(_) => LogicalType::Point,
            Value::Map(_) => LogicalType::Map,
            Value::Node(_) => LogicalType::Node,
            Value::Relationship(_) => LogicalType::Relationship,
            Value::List(items) => LogicalType::List(Box::new(Self::element_type(items))),
        };
        Some(ty)
    }

    /// Common logical type of the non-null elements of a list
    fn element_type(items: &[Value]) -> LogicalType {
        let mut types = items.iter().filter_map(LogicalType::of);
        let Some(first) = types.next() else {
            return LogicalType::Any;
        };
        if types.all(|t| t == first) {
            first
        } else {
            LogicalType::Any
        }
    }

    /// Create a list type
    pub fn list_of(inner: LogicalType) -> Self {
        LogicalType::List(Box::new(inner))
    }

    /// Check if this is a list type
    pub fn is_list(&self) -> bool {
        matches!(self, LogicalType::List(_))
    }

    /// Parse a metadata type name such as `INTEGER` or `LIST OF STRING`
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_uppercase();
        if let Some(inner) = name.strip_prefix("LIST OF ") {
            return Self::parse(inner).map(Self::list_of);
        }
        let ty = match name.replace(' ', "_").as_str() {
            "BOOLEAN" => LogicalType::Boolean,
            "INTEGER" | "LONG" => LogicalType::Integer,
            "FLOAT" | "DOUBLE" => LogicalType::Float,
            "STRING" => LogicalType::String,
            "DATE_TIME" | "DATETIME" => LogicalType::DateTime,
            "LOCAL_DATE_TIME" | "LOCALDATETIME" => LogicalType::LocalDateTime,
            "DATE" => LogicalType::Date,
            "LOCAL_TIME" | "LOCALTIME" => LogicalType::LocalTime,
            "DURATION" => LogicalType::Duration,
            "POINT" => LogicalType::Point,
            "MAP" => LogicalType::Map,
            "NODE" => LogicalType::Node,
            "RELATIONSHIP" => LogicalType::Relationship,
            "LIST" => LogicalType::list_of(LogicalType::Any),
            "ANY" => LogicalType::Any,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Boolean => write!(f, "BOOLEAN"),
            LogicalType::Integer => write!(f, "INTEGER"),
            LogicalType::Float => write!(f, "FLOAT"),
            LogicalType::String => write!(f, "STRING"),
            LogicalType::DateTime => write!(f, "DATE_TIME"),
            LogicalType::LocalDateTime => write!(f, "LOCAL_DATE_TIME"),
            LogicalType::Date => write!(f, "DATE"),
            LogicalType::LocalTime => write!(f, "LOCAL_TIME"),
            LogicalType::Duration => write!(f, "DURATION"),
            LogicalType::Point => write!(f, "POINT"),
            LogicalType::Map => write!(f, "MAP"),
            LogicalType::Node => write!(f, "NODE"),
            LogicalType::Relationship => write!(f, "RELATIONSHIP"),
            LogicalType::List(inner) => write!(f, "LIST OF {inner}"),
            LogicalType::Any => write!(f, "ANY"),
        }
    }
}

/// Name of a value's logical type, `NULL` for null
pub fn type_name(value: &Value) -> String {
    LogicalType::of(value).map_or_else(|| "NULL".to_string(), |t| t.to_string())
}
