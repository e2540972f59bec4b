//! In-memory graph store
//!
//! Graphs can be assembled with [`InMemoryGraphBuilder`] or loaded from a
//! JSON document of the form:
//!
//! ```json
//! {
//!   "nodes": [{"id": 1, "labels": ["User"], "properties": {"name": "Adam"}}],
//!   "relationships": [{"id": 0, "type": "KNOWS", "start": 1, "end": 2}]
//! }
//! ```
//!
//! Property values are plain JSON. Temporal, duration and point values are
//! written as single-key tagged objects: `{"$date": "2020-01-01"}`,
//! `{"$datetime": "..."}`, `{"$localdatetime": "..."}`, `{"$time": "..."}`,
//! `{"$duration": {"months": 5, "days": 1, "seconds": 43200}}` and
//! `{"$point": {"crs": "wgs-84", "longitude": 12.1, "latitude": 56.0}}`.

use super::store::{EntityIter, GraphStore};
use super::types::TypeMetadata;
use crate::error::{Error, Result};
use crate::value::{Crs, IsoDuration, Node, Point, Relationship, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Graph held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    nodes: Arc<Vec<Node>>,
    relationships: Arc<Vec<Relationship>>,
    metadata: OnceCell<Arc<TypeMetadata>>,
}

impl InMemoryGraph {
    /// Start building a graph
    pub fn builder() -> InMemoryGraphBuilder {
        InMemoryGraphBuilder::default()
    }

    /// Load a graph from a JSON document
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let doc: GraphDocument = serde_json::from_value(value.clone())?;
        doc.into_graph()
    }

    /// Load a graph from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let doc: GraphDocument = serde_json::from_str(&content)?;
        doc.into_graph()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    fn compute_metadata(&self) -> TypeMetadata {
        tracing::debug!(
            nodes = self.nodes.len(),
            relationships = self.relationships.len(),
            "Computing graph type metadata"
        );
        TypeMetadata::from_entities(&self.nodes, &self.relationships)
    }
}

impl GraphStore for InMemoryGraph {
    fn nodes(&self) -> Result<EntityIter<Node>> {
        let nodes = Arc::clone(&self.nodes);
        Ok(Box::new((0..nodes.len()).map(move |i| Ok(nodes[i].clone()))))
    }

    fn relationships(&self) -> Result<EntityIter<Relationship>> {
        let rels = Arc::clone(&self.relationships);
        Ok(Box::new((0..rels.len()).map(move |i| Ok(rels[i].clone()))))
    }

    fn type_metadata(&self) -> Result<Arc<TypeMetadata>> {
        let metadata = self
            .metadata
            .get_or_init(|| Arc::new(self.compute_metadata()));
        Ok(Arc::clone(metadata))
    }
}

/// Builder for [`InMemoryGraph`]
#[derive(Debug, Default)]
pub struct InMemoryGraphBuilder {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
}

impl InMemoryGraphBuilder {
    /// Add a node
    #[must_use]
    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a relationship
    #[must_use]
    pub fn relationship(mut self, rel: Relationship) -> Self {
        self.relationships.push(rel);
        self
    }

    /// Validate identities and endpoints, then build the graph
    pub fn build(self) -> Result<InMemoryGraph> {
        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id) {
                return Err(Error::graph(format!("Duplicate node id {}", node.id)));
            }
        }

        let mut rel_ids = HashSet::with_capacity(self.relationships.len());
        for rel in &self.relationships {
            if !rel_ids.insert(rel.id) {
                return Err(Error::graph(format!("Duplicate relationship id {}", rel.id)));
            }
            for endpoint in [rel.start, rel.end] {
                if !node_ids.contains(&endpoint) {
                    return Err(Error::graph(format!(
                        "Relationship {} references unknown node {endpoint}",
                        rel.id
                    )));
                }
            }
        }

        Ok(InMemoryGraph {
            nodes: Arc::new(self.nodes),
            relationships: Arc::new(self.relationships),
            metadata: OnceCell::new(),
        })
    }
}

// ============================================================================
// JSON document
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    relationships: Vec<RelationshipRecord>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: i64,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RelationshipRecord {
    id: i64,
    #[serde(rename = "type")]
    rel_type: String,
    start: i64,
    end: i64,
    #[serde(default)]
    properties: serde_json::Map<String, serde_json::Value>,
}

impl GraphDocument {
    fn into_graph(self) -> Result<InMemoryGraph> {
        let mut builder = InMemoryGraph::builder();
        for record in self.nodes {
            builder = builder.node(Node {
                id: record.id,
                labels: record.labels,
                properties: decode_properties(record.properties)?,
            });
        }
        for record in self.relationships {
            builder = builder.relationship(Relationship {
                id: record.id,
                rel_type: record.rel_type,
                start: record.start,
                end: record.end,
                properties: decode_properties(record.properties)?,
            });
        }
        builder.build()
    }
}

fn decode_properties(
    properties: serde_json::Map<String, serde_json::Value>,
) -> Result<BTreeMap<String, Value>> {
    properties
        .into_iter()
        .map(|(key, value)| {
            let decoded = decode_property(&value)
                .map_err(|e| Error::graph(format!("Property '{key}': {e}")))?;
            Ok((key, decoded))
        })
        .collect()
}

/// Decode a JSON property value, honoring tagged temporal/point objects
pub fn decode_property(value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .map(decode_property)
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        serde_json::Value::Object(map) if map.len() == 1 => {
            let Some((tag, inner)) = map.iter().next() else {
                return Ok(Value::from_json(value));
            };
            match tag.as_str() {
                "$date" => parse_with(inner, |s| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Value::Date).ok()
                }),
                "$datetime" => parse_with(inner, |s| {
                    DateTime::parse_from_rfc3339(s).map(Value::DateTime).ok()
                }),
                "$localdatetime" => parse_with(inner, |s| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                        .map(Value::LocalDateTime)
                        .ok()
                }),
                "$time" => parse_with(inner, |s| {
                    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                        .map(Value::LocalTime)
                        .ok()
                }),
                "$duration" => decode_duration(inner),
                "$point" => decode_point(inner),
                _ => decode_map(map),
            }
        }
        serde_json::Value::Object(map) => decode_map(map),
        other => Ok(Value::from_json(other)),
    }
}

fn decode_map(map: &serde_json::Map<String, serde_json::Value>) -> Result<Value> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), decode_property(v)?)))
        .collect::<Result<BTreeMap<_, _>>>()
        .map(Value::Map)
}

fn parse_with(
    value: &serde_json::Value,
    parse: impl FnOnce(&str) -> Option<Value>,
) -> Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| Error::graph(format!("Expected a string, got {value}")))?;
    parse(text).ok_or_else(|| Error::graph(format!("Invalid temporal value '{text}'")))
}

fn decode_duration(value: &serde_json::Value) -> Result<Value> {
    let field = |name: &str| value.get(name).and_then(serde_json::Value::as_i64).unwrap_or(0);
    let nanos = i32::try_from(field("nanos"))
        .map_err(|_| Error::graph("Duration nanos out of range"))?;
    Ok(Value::Duration(IsoDuration::new(
        field("months"),
        field("days"),
        field("seconds"),
        nanos,
    )))
}

fn decode_point(value: &serde_json::Value) -> Result<Value> {
    let coord = |name: &str| value.get(name).and_then(serde_json::Value::as_f64);

    if let (Some(lon), Some(lat)) = (coord("longitude"), coord("latitude")) {
        return Ok(Value::Point(Point::wgs84(lon, lat, coord("height"))));
    }

    let (Some(x), Some(y)) = (coord("x"), coord("y")) else {
        return Err(Error::graph(format!("Invalid point {value}")));
    };
    let z = coord("z");
    let crs = match value.get("crs").and_then(serde_json::Value::as_str) {
        Some(name) => {
            Crs::from_name(name).ok_or_else(|| Error::graph(format!("Unknown CRS '{name}'")))?
        }
        None if z.is_some() => Crs::Cartesian3D,
        None => Crs::Cartesian,
    };
    Ok(Value::Point(Point { crs, x, y, z }))
}
