//! Schema types

use crate::error::{Error, Result};
use crate::value::LogicalType;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Identity of a node or relationship
pub const ID_COLUMN: &str = "<id>";
/// Node labels
pub const LABELS_COLUMN: &str = "labels";
/// Relationship type
pub const TYPE_COLUMN: &str = "<type>";
/// Relationship start node identity
pub const SOURCE_ID_COLUMN: &str = "<source.id>";
/// Relationship end node identity
pub const TARGET_ID_COLUMN: &str = "<target.id>";

/// Reserved column names in schema order
pub const RESERVED_COLUMNS: [&str; 5] = [
    ID_COLUMN,
    LABELS_COLUMN,
    TYPE_COLUMN,
    SOURCE_ID_COLUMN,
    TARGET_ID_COLUMN,
];

/// Check if a column name is reserved for entity identity
pub fn is_reserved(name: &str) -> bool {
    RESERVED_COLUMNS.contains(&name)
}

/// Child field name of list columns
pub const LIST_ITEM_FIELD: &str = "item";

/// Physical column type in the encoded output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Bool,
    Int64,
    Float64,
    Utf8,
    /// Milliseconds since the Unix epoch, UTC
    TimestampMillis,
    List(Box<PhysicalType>),
}

impl PhysicalType {
    /// Create a list type
    pub fn list_of(inner: PhysicalType) -> Self {
        PhysicalType::List(Box::new(inner))
    }

    /// Fixed mapping for a single observed logical type
    pub fn from_logical(logical: &LogicalType) -> Self {
        match logical {
            LogicalType::Integer => PhysicalType::Int64,
            LogicalType::Float => PhysicalType::Float64,
            LogicalType::Boolean => PhysicalType::Bool,
            LogicalType::String => PhysicalType::Utf8,
            LogicalType::DateTime | LogicalType::LocalDateTime | LogicalType::Date => {
                PhysicalType::TimestampMillis
            }
            LogicalType::LocalTime
            | LogicalType::Duration
            | LogicalType::Point
            | LogicalType::Map
            | LogicalType::Node
            | LogicalType::Relationship
            | LogicalType::Any => PhysicalType::Utf8,
            LogicalType::List(inner) => match inner.as_ref() {
                // Lists nest at most two levels deep
                LogicalType::List(grand) if grand.is_list() => {
                    PhysicalType::list_of(PhysicalType::Utf8)
                }
                other => PhysicalType::list_of(Self::from_logical(other)),
            },
        }
    }

    /// Resolve the set of logical types observed for one column
    ///
    /// No observed type (only nulls) and conflicting types both fall back
    /// to `utf8`.
    pub fn resolve(observed: &BTreeSet<LogicalType>) -> Self {
        let mut types = observed.iter();
        match (types.next(), types.next()) {
            (Some(single), None) => Self::from_logical(single),
            _ => PhysicalType::Utf8,
        }
    }

    /// Arrow data type
    pub fn to_arrow(&self) -> DataType {
        match self {
            PhysicalType::Bool => DataType::Boolean,
            PhysicalType::Int64 => DataType::Int64,
            PhysicalType::Float64 => DataType::Float64,
            PhysicalType::Utf8 => DataType::Utf8,
            PhysicalType::TimestampMillis => DataType::Timestamp(TimeUnit::Millisecond, None),
            PhysicalType::List(inner) => {
                DataType::List(Arc::new(Field::new(LIST_ITEM_FIELD, inner.to_arrow(), true)))
            }
        }
    }

    /// Map an Arrow data type back, if it is one this crate produces
    pub fn from_arrow(data_type: &DataType) -> Option<Self> {
        let ty = match data_type {
            DataType::Boolean => PhysicalType::Bool,
            DataType::Int64 => PhysicalType::Int64,
            DataType::Float64 => PhysicalType::Float64,
            DataType::Utf8 => PhysicalType::Utf8,
            DataType::Timestamp(TimeUnit::Millisecond, _) => PhysicalType::TimestampMillis,
            DataType::List(field) => PhysicalType::list_of(Self::from_arrow(field.data_type())?),
            _ => return None,
        };
        Some(ty)
    }

    /// Nesting depth of list types (0 for scalars)
    pub fn depth(&self) -> usize {
        match self {
            PhysicalType::List(inner) => 1 + inner.depth(),
            _ => 0,
        }
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalType::Bool => write!(f, "bool"),
            PhysicalType::Int64 => write!(f, "int64"),
            PhysicalType::Float64 => write!(f, "float64"),
            PhysicalType::Utf8 => write!(f, "utf8"),
            PhysicalType::TimestampMillis => write!(f, "timestampMillis"),
            PhysicalType::List(inner) => write!(f, "list<{inner}>"),
        }
    }
}

impl Serialize for PhysicalType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub physical_type: PhysicalType,
}

impl ColumnDef {
    /// Create a column definition
    pub fn new(name: impl Into<String>, physical_type: PhysicalType) -> Self {
        Self {
            name: name.into(),
            physical_type,
        }
    }

    /// Arrow field (always nullable)
    pub fn to_field(&self) -> Field {
        Field::new(&self.name, self.physical_type.to_arrow(), true)
    }
}

/// Ordered column list of one export, immutable once built
#[derive(Debug, Clone, Serialize)]
pub struct ExportSchema {
    columns: Vec<ColumnDef>,
    #[serde(skip)]
    arrow: SchemaRef,
}

impl PartialEq for ExportSchema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl ExportSchema {
    /// Build a schema, rejecting duplicate column names
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
        }
        let fields: Vec<Field> = columns.iter().map(ColumnDef::to_field).collect();
        Ok(Self {
            columns,
            arrow: Arc::new(Schema::new(fields)),
        })
    }

    /// Schema with no columns
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            arrow: Arc::new(Schema::empty()),
        }
    }

    /// Column definitions in order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Arrow schema
    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::clone(&self.arrow)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Display for ExportSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{}:{}", c.name, c.physical_type))
            .collect();
        write!(f, "{}", columns.join(", "))
    }
}
