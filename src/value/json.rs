//! Canonical text and JSON forms of values
//!
//! Complex values placed into `utf8` columns are serialized through these
//! functions, so decoding a degraded column and re-parsing its JSON yields
//! the original structure.

use super::types::{Node, Point, Relationship, Value};
use chrono::SecondsFormat;
use serde_json::{json, Map, Number};

/// Format for local date-times
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl Value {
    /// Convert to a JSON value
    ///
    /// Temporal values and durations become ISO-8601 strings, points and
    /// entities become objects.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map_or_else(|| serde_json::Value::String(f.to_string()), serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::LocalDateTime(dt) => {
                serde_json::Value::String(dt.format(LOCAL_DATE_TIME_FORMAT).to_string())
            }
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::LocalTime(t) => serde_json::Value::String(t.format("%H:%M:%S%.f").to_string()),
            Value::Duration(d) => serde_json::Value::String(d.to_string()),
            Value::Point(p) => point_to_json(p),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Node(node) => node_to_json(node),
            Value::Relationship(rel) => relationship_to_json(rel),
        }
    }

    /// Canonical text form: strings verbatim, temporals as ISO-8601,
    /// everything else as compact JSON
    pub fn to_text(&self) -> String {
        match self.to_json() {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }
    }

    /// Convert from a JSON value
    ///
    /// Integers that fit in i64 become `Int`, other numbers `Float`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn point_to_json(point: &Point) -> serde_json::Value {
    let mut obj = Map::new();
    obj.insert("crs".to_string(), json!(point.crs.name()));
    if point.crs.is_geographic() {
        obj.insert("longitude".to_string(), json!(point.x));
        obj.insert("latitude".to_string(), json!(point.y));
        if let Some(z) = point.z {
            obj.insert("height".to_string(), json!(z));
        }
    } else {
        obj.insert("x".to_string(), json!(point.x));
        obj.insert("y".to_string(), json!(point.y));
        if let Some(z) = point.z {
            obj.insert("z".to_string(), json!(z));
        }
    }
    serde_json::Value::Object(obj)
}

fn properties_to_json(
    properties: &std::collections::BTreeMap<String, Value>,
) -> serde_json::Value {
    serde_json::Value::Object(
        properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

fn node_to_json(node: &Node) -> serde_json::Value {
    json!({
        "id": node.id,
        "type": "node",
        "labels": node.labels,
        "properties": properties_to_json(&node.properties),
    })
}

fn relationship_to_json(rel: &Relationship) -> serde_json::Value {
    json!({
        "id": rel.id,
        "type": "relationship",
        "label": rel.rel_type,
        "start": rel.start,
        "end": rel.end,
        "properties": properties_to_json(&rel.properties),
    })
}
