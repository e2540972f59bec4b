//! Graph store abstraction

use super::types::TypeMetadata;
use crate::error::Result;
use crate::value::{Node, Relationship};
use std::sync::Arc;

/// Owned iterator over graph entities
pub type EntityIter<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

/// Read access to a graph database host
///
/// Iterators are owned so that a background export worker can drive them
/// after the caller has returned.
pub trait GraphStore: Send + Sync {
    /// Iterate every node in the store
    fn nodes(&self) -> Result<EntityIter<Node>>;

    /// Iterate every relationship in the store
    fn relationships(&self) -> Result<EntityIter<Relationship>>;

    /// Cached type metadata, computed at most once per store
    fn type_metadata(&self) -> Result<Arc<TypeMetadata>>;
}
