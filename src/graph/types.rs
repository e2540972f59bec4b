//! Graph type metadata

use crate::value::{LogicalType, Node, Relationship};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Property name to the set of logical types observed for it
pub type PropertyTypes = BTreeMap<String, BTreeSet<LogicalType>>;

/// Cached per-label and per-relationship-type property type information
///
/// Computed once per store and shared read-only by all exports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMetadata {
    /// Label to property types
    pub labels: BTreeMap<String, PropertyTypes>,
    /// Relationship type to property types
    pub relationship_types: BTreeMap<String, PropertyTypes>,
    /// Number of nodes recorded
    pub node_count: u64,
    /// Number of relationships recorded
    pub relationship_count: u64,
}

impl TypeMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the properties of a node under each of its labels
    pub fn record_node(&mut self, node: &Node) {
        self.node_count += 1;
        for label in &node.labels {
            let props = self.labels.entry(label.clone()).or_default();
            record_properties(props, &node.properties);
        }
    }

    /// Record the properties of a relationship under its type
    pub fn record_relationship(&mut self, rel: &Relationship) {
        self.relationship_count += 1;
        let props = self
            .relationship_types
            .entry(rel.rel_type.clone())
            .or_default();
        record_properties(props, &rel.properties);
    }

    /// Check if any node was recorded
    pub fn has_nodes(&self) -> bool {
        self.node_count > 0
    }

    /// Check if any relationship was recorded
    pub fn has_relationships(&self) -> bool {
        self.relationship_count > 0
    }

    /// Build metadata for an explicit collection of entities
    pub fn from_entities(nodes: &[Node], relationships: &[Relationship]) -> Self {
        let mut metadata = Self::new();
        for node in nodes {
            metadata.record_node(node);
        }
        for rel in relationships {
            metadata.record_relationship(rel);
        }
        metadata
    }

    /// Render as a serializable summary (type names as strings)
    pub fn summary(&self) -> MetadataSummary {
        MetadataSummary {
            labels: summarize(&self.labels),
            relationship_types: summarize(&self.relationship_types),
        }
    }
}

fn record_properties(
    props: &mut PropertyTypes,
    properties: &BTreeMap<String, crate::value::Value>,
) {
    for (key, value) in properties {
        let types = props.entry(key.clone()).or_default();
        // Null carries no type, but the property is still known
        if let Some(ty) = LogicalType::of(value) {
            types.insert(ty);
        }
    }
}

fn summarize(
    entries: &BTreeMap<String, PropertyTypes>,
) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
    entries
        .iter()
        .map(|(name, props)| {
            let props = props
                .iter()
                .map(|(key, types)| (key.clone(), types.iter().map(ToString::to_string).collect()))
                .collect();
            (name.clone(), props)
        })
        .collect()
}

/// Serializable view of [`TypeMetadata`]
#[derive(Debug, Clone, Serialize)]
pub struct MetadataSummary {
    pub labels: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub relationship_types: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}
