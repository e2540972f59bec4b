//! Explicit entity collection source

use super::entity::{node_row, relationship_row};
use super::types::{MetadataRequest, RowIter, RowSource, SchemaHint};
use crate::config::SchemaSelection;
use crate::error::Result;
use crate::graph::TypeMetadata;
use crate::value::{Node, Relationship};
use std::sync::Arc;

/// A caller-supplied set of nodes and relationships
///
/// Rows are produced exactly like [`super::GraphSnapshotSource`]; the type
/// metadata is computed from the supplied entities themselves.
pub struct EntitySetSource {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    selection: SchemaSelection,
}

impl EntitySetSource {
    /// Create a source over the given entities
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Self {
        Self {
            nodes,
            relationships,
            selection: SchemaSelection::default(),
        }
    }

    /// Restrict the exported labels, relationship types and properties
    #[must_use]
    pub fn with_selection(mut self, selection: SchemaSelection) -> Self {
        self.selection = selection;
        self
    }
}

impl RowSource for EntitySetSource {
    fn name(&self) -> &str {
        "entities"
    }

    fn describe_for_schema(&self) -> Result<SchemaHint> {
        let metadata = TypeMetadata::from_entities(&self.nodes, &self.relationships);
        Ok(SchemaHint::Metadata(MetadataRequest {
            metadata: Arc::new(metadata),
            selection: self.selection.clone(),
        }))
    }

    fn produce(self: Box<Self>) -> Result<RowIter> {
        let node_selection = Arc::new(self.selection);
        let rel_selection = Arc::clone(&node_selection);
        let nodes = self.nodes.into_iter().filter_map(move |n| {
            node_selection
                .selects_node(&n)
                .then(|| Ok(node_row(n, &node_selection)))
        });
        let rels = self.relationships.into_iter().filter_map(move |r| {
            rel_selection
                .selects_relationship(&r)
                .then(|| Ok(relationship_row(r, &rel_selection)))
        });
        Ok(Box::new(nodes.chain(rels)))
    }
}
