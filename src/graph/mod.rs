//! Graph store module
//!
//! The read-only view of a graph database host that snapshot exports pull
//! nodes, relationships and cached type metadata from.

mod memory;
mod store;
mod types;

pub use memory::{decode_property, InMemoryGraph, InMemoryGraphBuilder};
pub use store::{EntityIter, GraphStore};
pub use types::{MetadataSummary, PropertyTypes, TypeMetadata};

#[cfg(test)]
mod tests;
