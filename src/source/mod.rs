//! Row source module
//!
//! Sources turn graph entities or tabular results into [`Row`]s.
//!
//! # Variants
//!
//! - [`GraphSnapshotSource`]: every node then every relationship of a store
//! - [`EntitySetSource`]: the same conversion over an explicit collection
//! - [`TabularSource`]: an existing row cursor, passed through verbatim
//!
//! SQL results are available through `crate::database::DuckDbSource`.

mod entities;
mod entity;
mod guard;
mod snapshot;
mod tabular;
mod types;

pub use entities::EntitySetSource;
pub use entity::{node_row, relationship_row};
pub use guard::GuardedRows;
pub use snapshot::GraphSnapshotSource;
pub use tabular::TabularSource;
pub use types::{MetadataRequest, Row, RowIter, RowKind, RowSource, SchemaHint};
