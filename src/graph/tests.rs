//! Graph store tests

use super::*;
use crate::value::{Crs, LogicalType, Node, Relationship, Value};
use chrono::NaiveDate;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

fn sample_graph() -> InMemoryGraph {
    InMemoryGraph::builder()
        .node(Node::new(0, &["User"]).with_property("name", "Adam").with_property("age", 42))
        .node(Node::new(1, &["User"]).with_property("name", "Jim").with_property("age", "old"))
        .node(Node::new(2, &["City"]).with_property("name", "Milan"))
        .relationship(Relationship::new(0, "KNOWS", 0, 1).with_property("since", 1993))
        .build()
        .unwrap()
}

#[test]
fn test_builder_iterates_in_insertion_order() {
    let graph = sample_graph();
    let ids: Vec<i64> = graph.nodes().unwrap().map(|n| n.unwrap().id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(graph.relationships().unwrap().count(), 1);
}

#[test]
fn test_builder_rejects_dangling_relationship() {
    let result = InMemoryGraph::builder()
        .node(Node::new(0, &["User"]))
        .relationship(Relationship::new(0, "KNOWS", 0, 9))
        .build();
    assert!(result.is_err());
}

#[test]
fn test_builder_rejects_duplicate_node() {
    let result = InMemoryGraph::builder()
        .node(Node::new(0, &["User"]))
        .node(Node::new(0, &["City"]))
        .build();
    assert!(result.is_err());
}

#[test]
fn test_type_metadata_collects_types() {
    let graph = sample_graph();
    let metadata = graph.type_metadata().unwrap();

    let user = &metadata.labels["User"];
    let age = BTreeSet::from([LogicalType::Integer, LogicalType::String]);
    assert_eq!(user["age"], age);
    assert_eq!(user["name"], BTreeSet::from([LogicalType::String]));
    assert_eq!(
        metadata.relationship_types["KNOWS"]["since"],
        BTreeSet::from([LogicalType::Integer])
    );
}

#[test]
fn test_type_metadata_is_cached() {
    let graph = sample_graph();
    let first = graph.type_metadata().unwrap();
    let second = graph.type_metadata().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_from_json_document() {
    let doc = json!({
        "nodes": [
            {"id": 1, "labels": ["User"], "properties": {
                "born": {"$date": "2015-05-18"},
                "home": {"$point": {"longitude": 12.5, "latitude": 56.0}},
                "tags": ["a", "b"]
            }},
            {"id": 2, "labels": ["User"]}
        ],
        "relationships": [
            {"id": 7, "type": "KNOWS", "start": 1, "end": 2, "properties": {"since": 1993}}
        ]
    });

    let graph = InMemoryGraph::from_json(&doc).unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.relationship_count(), 1);

    let first = graph.nodes().unwrap().next().unwrap().unwrap();
    assert_eq!(
        first.properties["born"],
        Value::Date(NaiveDate::from_ymd_opt(2015, 5, 18).unwrap())
    );
    match &first.properties["home"] {
        Value::Point(p) => assert_eq!(p.crs, Crs::Wgs84),
        other => panic!("expected point, got {other:?}"),
    }
    assert_eq!(first.properties["tags"], Value::from(vec!["a", "b"]));
}

#[test]
fn test_decode_property_rejects_bad_date() {
    assert!(decode_property(&json!({"$date": "not a date"})).is_err());
}

#[test]
fn test_decode_property_plain_map() {
    let value = decode_property(&json!({"a": 1, "b": {"c": true}})).unwrap();
    assert_eq!(
        value,
        Value::map([
            ("a", Value::Int(1)),
            ("b", Value::map([("c", Value::Bool(true))])),
        ])
    );
}

#[test]
fn test_from_file_missing() {
    let err = InMemoryGraph::from_file("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("File not found"));
}
