//! Node and relationship to row conversion

use super::types::{Row, RowKind};
use crate::config::SchemaSelection;
use crate::schema::{
    is_reserved, ID_COLUMN, LABELS_COLUMN, SOURCE_ID_COLUMN, TARGET_ID_COLUMN, TYPE_COLUMN,
};
use crate::value::{Node, Relationship, Value};
use std::collections::BTreeMap;

/// Convert a node: `<id>`, `labels`, then its selected properties
///
/// Properties named like any reserved column are dropped, whether or not the
/// node row carries that column.
pub fn node_row(node: Node, selection: &SchemaSelection) -> Row {
    let mut row = Row::new(RowKind::Node);
    row.insert(ID_COLUMN, Value::Int(node.id));
    row.insert(
        LABELS_COLUMN,
        Value::List(node.labels.into_iter().map(Value::String).collect()),
    );
    append_properties(&mut row, node.properties, selection);
    row
}

/// Convert a relationship: `<id>`, `<type>`, `<source.id>`, `<target.id>`,
/// then its selected properties
pub fn relationship_row(rel: Relationship, selection: &SchemaSelection) -> Row {
    let mut row = Row::new(RowKind::Relationship);
    row.insert(ID_COLUMN, Value::Int(rel.id));
    row.insert(TYPE_COLUMN, Value::String(rel.rel_type));
    row.insert(SOURCE_ID_COLUMN, Value::Int(rel.start));
    row.insert(TARGET_ID_COLUMN, Value::Int(rel.end));
    append_properties(&mut row, rel.properties, selection);
    row
}

fn append_properties(row: &mut Row, properties: BTreeMap<String, Value>, selection: &SchemaSelection) {
    for (key, value) in properties {
        if !is_reserved(&key) && selection.includes_property(&key) {
            row.insert(key, value);
        }
    }
}
