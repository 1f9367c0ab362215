//! Record builders shared by the integration tests.

#![allow(dead_code)]
use gaffer_bridge::RawRecord;
use serde_json::{json, Map, Value};

pub type JsonRecord = RawRecord<Map<String, Value>>;

/// Interpret a JSON literal as a raw record.
pub fn record(value: Value) -> JsonRecord {
    RawRecord::from_json(value).expect("record literal must be an object or pair")
}

/// Unwrap a JSON object literal.
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object literal, got {other}"),
    }
}

/// A typical entity record.
pub fn entity_record(group: &str, vertex: Value) -> Value {
    json!({
        "type": "entity",
        "group": group,
        "vertex": vertex,
        "properties": {"count": 1, "label": "x"}
    })
}

/// A typical edge record with the given `directed` field.
pub fn edge_record(directed: Value) -> Value {
    json!({
        "type": "edge",
        "group": "Test",
        "source": "source",
        "destination": "dest",
        "directed": directed,
        "properties": {"count": 1}
    })
}
