//! Row value domain
//!
//! Provides the closed set of values exported rows can carry, their logical
//! types and their canonical text/JSON forms.

mod json;
mod logical;
mod types;

pub use logical::{type_name, LogicalType};
pub use types::{Crs, IsoDuration, Node, Point, Relationship, Value};
