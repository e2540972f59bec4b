//! Schema inference from store metadata or scanned rows

use super::types::{
    is_reserved, ColumnDef, ExportSchema, PhysicalType, ID_COLUMN, LABELS_COLUMN,
    SOURCE_ID_COLUMN, TARGET_ID_COLUMN, TYPE_COLUMN,
};
use crate::error::Result;
use crate::source::{MetadataRequest, Row};
use crate::value::{LogicalType, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Accumulates observed logical types per column
///
/// Columns keep first-appearance order.
#[derive(Debug, Default)]
pub struct SchemaInferrer {
    order: Vec<String>,
    observed: HashMap<String, BTreeSet<LogicalType>>,
}

impl SchemaInferrer {
    /// Create an empty inferrer
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a single value; nulls register the column without a type
    pub fn observe(&mut self, column: &str, value: &Value) {
        if !self.observed.contains_key(column) {
            self.order.push(column.to_string());
        }
        let types = self.observed.entry(column.to_string()).or_default();
        if let Some(ty) = LogicalType::of(value) {
            types.insert(ty);
        }
    }

    /// Observe every value of a row
    pub fn observe_row(&mut self, row: &Row) {
        for (name, value) in row.iter() {
            self.observe(name, value);
        }
    }

    /// Resolve observed types into a schema
    pub fn finish(self) -> Result<ExportSchema> {
        let Self {
            order,
            mut observed,
        } = self;
        let columns = order
            .into_iter()
            .map(|name| {
                let types = observed.remove(&name).unwrap_or_default();
                let physical = PhysicalType::resolve(&types);
                ColumnDef::new(name, physical)
            })
            .collect();
        ExportSchema::new(columns)
    }
}

/// Infer a schema by scanning a set of rows
pub fn infer_from_rows(rows: &[Row]) -> Result<ExportSchema> {
    let mut inferrer = SchemaInferrer::new();
    for row in rows {
        inferrer.observe_row(row);
    }
    let schema = inferrer.finish()?;
    tracing::debug!(rows = rows.len(), schema = %schema, "Inferred schema from rows");
    Ok(schema)
}

/// Infer a schema from cached store metadata without reading rows
///
/// Reserved columns come first, then attribute columns sorted by name.
pub fn infer_from_metadata(request: &MetadataRequest) -> Result<ExportSchema> {
    let metadata = &request.metadata;
    let selection = &request.selection;

    let mut columns = Vec::new();
    if metadata.has_nodes() || metadata.has_relationships() {
        columns.push(ColumnDef::new(ID_COLUMN, PhysicalType::Int64));
    }
    if metadata.has_nodes() {
        columns.push(ColumnDef::new(
            LABELS_COLUMN,
            PhysicalType::list_of(PhysicalType::Utf8),
        ));
    }
    if metadata.has_relationships() {
        columns.push(ColumnDef::new(TYPE_COLUMN, PhysicalType::Utf8));
        columns.push(ColumnDef::new(SOURCE_ID_COLUMN, PhysicalType::Int64));
        columns.push(ColumnDef::new(TARGET_ID_COLUMN, PhysicalType::Int64));
    }

    let mut attributes: BTreeMap<&str, BTreeSet<LogicalType>> = BTreeMap::new();
    let node_props = metadata
        .labels
        .iter()
        .filter(|(label, _)| selection.includes_label(label));
    let rel_props = metadata
        .relationship_types
        .iter()
        .filter(|(rel_type, _)| selection.includes_relationship_type(rel_type));
    for (_, props) in node_props.chain(rel_props) {
        for (key, types) in props {
            if is_reserved(key) || !selection.includes_property(key) {
                continue;
            }
            attributes
                .entry(key.as_str())
                .or_default()
                .extend(types.iter().cloned());
        }
    }

    columns.extend(
        attributes
            .iter()
            .map(|(name, types)| ColumnDef::new(*name, PhysicalType::resolve(types))),
    );

    let schema = ExportSchema::new(columns)?;
    tracing::debug!(schema = %schema, "Inferred schema from metadata");
    Ok(schema)
}
