//! Schema inference module
//!
//! Computes the ordered, typed column list of an export.
//!
//! # Strategies
//!
//! - **Metadata sampling**: columns from a store's cached per-label and
//!   per-relationship-type property types, without reading rows
//! - **Row scanning**: columns from the values of every produced row
//!
//! A column observed with several logical types becomes `utf8`; integers
//! and floats are not unified.

mod cell;
mod inference;
mod types;

pub use cell::SchemaCell;
pub use inference::{infer_from_metadata, infer_from_rows, SchemaInferrer};
pub use types::{
    is_reserved, ColumnDef, ExportSchema, PhysicalType, ID_COLUMN, LABELS_COLUMN,
    LIST_ITEM_FIELD, RESERVED_COLUMNS, SOURCE_ID_COLUMN, TARGET_ID_COLUMN, TYPE_COLUMN,
};
