//! Conversion of raw records into typed elements.
//!
//! A record either carries a `json` key holding a self-describing Gaffer JSON
//! document, or a `type` tag naming one of `entity`, `edge`, `entity_seed`,
//! `edge_seed` plus the fields for that variant.

use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::element::{
    gaffer_json, DirectedType, Edge, EdgeSeed, Element, Entity, EntitySeed, MatchedVertex,
    Properties,
};
use crate::record::{LookupError, RawRecord, RecordMap};

/// Key holding a pre-serialised element.
pub const JSON_KEY: &str = "json";
/// Key holding the record tag.
pub const TYPE_KEY: &str = "type";

/// Errors raised while turning a record into an element.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A field the variant needs is absent.
    #[error("missing field '{0}'")]
    MissingField(String),

    /// A field is present but has the wrong shape.
    #[error("field '{field}' is invalid: expected {expected}")]
    InvalidField {
        /// Offending field.
        field: String,
        /// Description of the accepted shape.
        expected: String,
    },

    /// The `type` tag names no known variant.
    #[error("unknown record type '{0}'")]
    UnknownType(String),

    /// The record has neither a `type` tag nor a `json` key.
    #[error("record has neither a 'type' nor a 'json' key")]
    Untagged,

    /// The `json` payload could not be parsed.
    #[error("invalid json payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The record itself could not be read.
    #[error("record lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

impl ConversionError {
    pub(crate) fn invalid(field: &str, expected: impl Into<String>) -> Self {
        ConversionError::InvalidField {
            field: field.to_string(),
            expected: expected.into(),
        }
    }
}

/// Convert one raw record into an element.
///
/// A pair is unwrapped to its first element before anything else is read.
pub fn convert_record<M: RecordMap>(record: &RawRecord<M>) -> Result<Element, ConversionError> {
    let map = record.working();

    if let Some(payload) = map.get(JSON_KEY)? {
        trace!(pair = record.is_pair(), "decoding json payload");
        return decode_json_payload(payload);
    }

    let tag = match map.get(TYPE_KEY)? {
        Some(Value::String(tag)) => tag,
        Some(Value::Null) | None => return Err(ConversionError::Untagged),
        Some(_) => return Err(ConversionError::invalid(TYPE_KEY, "a string tag")),
    };
    trace!(tag = %tag, pair = record.is_pair(), "converting record");

    match tag.as_str() {
        "entity" => convert_entity(map).map(Element::Entity),
        "edge" => convert_edge(map).map(Element::Edge),
        "entity_seed" => Ok(Element::EntitySeed(EntitySeed::new(required(map, "vertex")?))),
        "edge_seed" => convert_edge_seed(map).map(Element::EdgeSeed),
        _ => Err(ConversionError::UnknownType(tag)),
    }
}

/// Decode a `json` payload: text is parsed first, anything else is decoded as is.
pub fn decode_json_payload(payload: Value) -> Result<Element, ConversionError> {
    let document = match payload {
        Value::String(text) => serde_json::from_str(&text)?,
        other => other,
    };
    gaffer_json::decode(document)
}

fn convert_entity(map: &impl RecordMap) -> Result<Entity, ConversionError> {
    Ok(Entity {
        group: required_string(map, "group")?,
        vertex: required(map, "vertex")?,
        properties: properties(map, "properties")?,
    })
}

fn convert_edge(map: &impl RecordMap) -> Result<Edge, ConversionError> {
    Ok(Edge {
        group: required_string(map, "group")?,
        source: required(map, "source")?,
        destination: required(map, "destination")?,
        directed: directedness(map.get("directed")?.as_ref()),
        properties: properties(map, "properties")?,
        matched_vertex: matched_vertex(map, "matched_vertex")?,
    })
}

fn convert_edge_seed(map: &impl RecordMap) -> Result<EdgeSeed, ConversionError> {
    let directed_type = match map.get("directed_type")? {
        Some(Value::String(name)) => name.parse::<DirectedType>().map_err(|_| {
            ConversionError::invalid("directed_type", "DIRECTED, UNDIRECTED or EITHER")
        })?,
        Some(Value::Null) | None => {
            DirectedType::from_directed(directedness(map.get("directed")?.as_ref()))
        }
        Some(_) => return Err(ConversionError::invalid("directed_type", "a string")),
    };

    Ok(EdgeSeed {
        source: required(map, "source")?,
        destination: required(map, "destination")?,
        directed_type,
        matched_vertex: matched_vertex(map, "matched_vertex")?,
    })
}

/// Normalise a directedness field: zero and `false` are undirected, anything
/// else (including absence) is directed.
pub fn directedness(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map_or(true, |n| n != 0.0),
        _ => true,
    }
}

/// A present `null` is a value; only an absent key is missing.
pub(crate) fn required(map: &impl RecordMap, field: &str) -> Result<Value, ConversionError> {
    map.get(field)?
        .ok_or_else(|| ConversionError::MissingField(field.to_string()))
}

pub(crate) fn required_string(
    map: &impl RecordMap,
    field: &str,
) -> Result<String, ConversionError> {
    match required(map, field)? {
        Value::String(text) => Ok(text),
        _ => Err(ConversionError::invalid(field, "a string")),
    }
}

pub(crate) fn properties(
    map: &impl RecordMap,
    field: &str,
) -> Result<Properties, ConversionError> {
    match map.get(field)? {
        Some(Value::Object(entries)) => Ok(entries.into_iter().collect()),
        Some(Value::Null) | None => Ok(Properties::new()),
        Some(_) => Err(ConversionError::invalid(
            field,
            "a mapping of property names to values",
        )),
    }
}

pub(crate) fn matched_vertex(
    map: &impl RecordMap,
    field: &str,
) -> Result<Option<MatchedVertex>, ConversionError> {
    match map.get(field)? {
        Some(Value::String(name)) => name
            .parse()
            .map(Some)
            .map_err(|_| ConversionError::invalid(field, "SOURCE or DESTINATION")),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ConversionError::invalid(field, "a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn record(value: Value) -> RawRecord<Map<String, Value>> {
        RawRecord::from_json(value).expect("object or pair")
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let err = convert_record(&record(json!({"type": "vertex"}))).unwrap_err();
        assert!(matches!(err, ConversionError::UnknownType(tag) if tag == "vertex"));
    }

    #[test]
    fn test_untagged_record_is_an_error() {
        let err = convert_record(&record(json!({"group": "g"}))).unwrap_err();
        assert!(matches!(err, ConversionError::Untagged));
    }

    #[test]
    fn test_missing_vertex_names_the_field() {
        let err = convert_record(&record(json!({"type": "entity", "group": "g"}))).unwrap_err();
        assert_eq!(err.to_string(), "missing field 'vertex'");
    }

    #[test]
    fn test_directedness_matches_zero_comparison() {
        assert!(!directedness(Some(&json!(0))));
        assert!(!directedness(Some(&json!(0.0))));
        assert!(!directedness(Some(&json!(false))));
        assert!(directedness(Some(&json!(1))));
        assert!(directedness(Some(&json!("0"))));
        assert!(directedness(Some(&Value::Null)));
        assert!(directedness(None));
    }

    #[test]
    fn test_entity_seed_reads_unwrapped_record() {
        let element =
            convert_record(&record(json!([{"type": "entity_seed", "vertex": "v1"}, null])))
                .unwrap();
        assert_eq!(element, Element::EntitySeed(EntitySeed::new("v1")));
    }

    #[test]
    fn test_edge_seed_reads_record_fields() {
        let element = convert_record(&record(json!({
            "type": "edge_seed",
            "source": "a",
            "destination": "b",
            "directed": 0,
            "matched_vertex": "DESTINATION"
        })))
        .unwrap();

        assert_eq!(
            element,
            Element::EdgeSeed(
                EdgeSeed::new("a", "b", DirectedType::Undirected)
                    .with_matched_vertex(MatchedVertex::Destination)
            )
        );
    }

    #[test]
    fn test_edge_seed_prefers_explicit_directed_type() {
        let element = convert_record(&record(json!({
            "type": "edge_seed",
            "source": 1,
            "destination": 2,
            "directed": 0,
            "directed_type": "either"
        })))
        .unwrap();

        match element {
            Element::EdgeSeed(seed) => assert_eq!(seed.directed_type, DirectedType::Either),
            other => panic!("expected edge seed, got {other:?}"),
        }
    }

    #[test]
    fn test_non_object_properties_rejected() {
        let err = convert_record(&record(json!({
            "type": "entity", "group": "g", "vertex": "v", "properties": [1, 2]
        })))
        .unwrap_err();
        assert!(matches!(
            err,
            ConversionError::InvalidField { field, .. } if field == "properties"
        ));
    }

    #[test]
    fn test_present_null_vertex_is_kept() {
        let raw = json!({"type": "entity", "group": "g", "vertex": null});
        let element = convert_record(&record(raw)).unwrap();
        assert_eq!(element, Element::Entity(Entity::new("g", Value::Null)));

        let err = convert_record(&record(json!({"type": "entity", "group": null, "vertex": 1})))
            .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidField { field, .. } if field == "group"));
    }

    #[test]
    fn test_bad_json_payload() {
        let err = convert_record(&record(json!({"json": "{not json"}))).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidJson(_)));
    }
}
