//! Whole-graph snapshot source

use super::entity::{node_row, relationship_row};
use super::types::{MetadataRequest, RowIter, RowSource, SchemaHint};
use crate::config::SchemaSelection;
use crate::error::Result;
use crate::graph::GraphStore;
use std::sync::Arc;

/// Every node, then every relationship, of a graph store
pub struct GraphSnapshotSource {
    store: Arc<dyn GraphStore>,
    selection: SchemaSelection,
}

impl GraphSnapshotSource {
    /// Create a snapshot source over a store
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
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

impl RowSource for GraphSnapshotSource {
    fn name(&self) -> &str {
        "graph"
    }

    fn describe_for_schema(&self) -> Result<SchemaHint> {
        Ok(SchemaHint::Metadata(MetadataRequest {
            metadata: self.store.type_metadata()?,
            selection: self.selection.clone(),
        }))
    }

    fn produce(self: Box<Self>) -> Result<RowIter> {
        let node_selection = Arc::new(self.selection);
        let rel_selection = Arc::clone(&node_selection);
        let nodes = self.store.nodes()?.filter_map(move |n| match n {
            Ok(node) if node_selection.selects_node(&node) => {
                Some(Ok(node_row(node, &node_selection)))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        });
        let rels = self.store.relationships()?.filter_map(move |r| match r {
            Ok(rel) if rel_selection.selects_relationship(&rel) => {
                Some(Ok(relationship_row(rel, &rel_selection)))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        });
        Ok(Box::new(nodes.chain(rels)))
    }
}
