//! Class-tagged Gaffer JSON encoding of elements and seeds.

use serde_json::{json, Map, Value};

use super::{DirectedType, Edge, EdgeSeed, Element, Entity, EntitySeed};
use crate::convert::{self, ConversionError};

/// Key naming the class of a Gaffer JSON document.
pub const CLASS_KEY: &str = "class";
/// Class of an entity.
pub const ENTITY_CLASS: &str = "uk.gov.gchq.gaffer.data.element.Entity";
/// Class of an edge.
pub const EDGE_CLASS: &str = "uk.gov.gchq.gaffer.data.element.Edge";
/// Class of an entity seed.
pub const ENTITY_SEED_CLASS: &str = "uk.gov.gchq.gaffer.operation.data.EntitySeed";
/// Class of an edge seed.
pub const EDGE_SEED_CLASS: &str = "uk.gov.gchq.gaffer.operation.data.EdgeSeed";

/// Encode an element as Gaffer JSON.
pub fn encode(element: &Element) -> Value {
    match element {
        Element::Entity(entity) => json!({
            "class": ENTITY_CLASS,
            "group": entity.group,
            "vertex": entity.vertex,
            "properties": entity.properties,
        }),
        Element::Edge(edge) => {
            let mut doc = json!({
                "class": EDGE_CLASS,
                "group": edge.group,
                "source": edge.source,
                "destination": edge.destination,
                "directed": edge.directed,
                "properties": edge.properties,
            });
            if let (Some(matched), Value::Object(map)) = (edge.matched_vertex, &mut doc) {
                map.insert("matchedVertex".to_string(), json!(matched));
            }
            doc
        }
        Element::EntitySeed(seed) => json!({
            "class": ENTITY_SEED_CLASS,
            "vertex": seed.vertex,
        }),
        Element::EdgeSeed(seed) => {
            let mut doc = json!({
                "class": EDGE_SEED_CLASS,
                "source": seed.source,
                "destination": seed.destination,
                "directedType": seed.directed_type,
            });
            if let (Some(matched), Value::Object(map)) = (seed.matched_vertex, &mut doc) {
                map.insert("matchedVertex".to_string(), json!(matched));
            }
            doc
        }
        Element::Json(value) => value.clone(),
    }
}

/// Decode a Gaffer JSON document.
///
/// Documents naming one of the four element classes become the matching
/// variant; anything else is kept as [`Element::Json`].
pub fn decode(document: Value) -> Result<Element, ConversionError> {
    let Value::Object(map) = document else {
        return Ok(Element::Json(document));
    };
    let class = map.get(CLASS_KEY).and_then(Value::as_str).map(str::to_owned);

    match class.as_deref() {
        Some(ENTITY_CLASS) => Ok(Element::Entity(Entity {
            group: convert::required_string(&map, "group")?,
            vertex: convert::required(&map, "vertex")?,
            properties: convert::properties(&map, "properties")?,
        })),
        Some(EDGE_CLASS) => Ok(Element::Edge(decode_edge(&map)?)),
        Some(ENTITY_SEED_CLASS) => Ok(Element::EntitySeed(EntitySeed {
            vertex: convert::required(&map, "vertex")?,
        })),
        Some(EDGE_SEED_CLASS) => Ok(Element::EdgeSeed(decode_edge_seed(&map)?)),
        _ => Ok(Element::Json(Value::Object(map))),
    }
}

fn decode_edge(map: &Map<String, Value>) -> Result<Edge, ConversionError> {
    Ok(Edge {
        group: convert::required_string(map, "group")?,
        source: convert::required(map, "source")?,
        destination: convert::required(map, "destination")?,
        directed: convert::directedness(map.get("directed")),
        properties: convert::properties(map, "properties")?,
        matched_vertex: convert::matched_vertex(map, "matchedVertex")?,
    })
}

fn decode_edge_seed(map: &Map<String, Value>) -> Result<EdgeSeed, ConversionError> {
    let directed_type = match map.get("directedType") {
        Some(Value::String(name)) => name.parse::<DirectedType>().map_err(|_| {
            ConversionError::invalid("directedType", "DIRECTED, UNDIRECTED or EITHER")
        })?,
        Some(Value::Null) | None => DirectedType::Either,
        Some(_) => return Err(ConversionError::invalid("directedType", "a string")),
    };

    Ok(EdgeSeed {
        source: convert::required(map, "source")?,
        destination: convert::required(map, "destination")?,
        directed_type,
        matched_vertex: convert::matched_vertex(map, "matchedVertex")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MatchedVertex;

    #[test]
    fn test_edge_document_shape() {
        let edge = Edge::new("knows", "a", "b", false)
            .with_property("weight", 0.5)
            .with_matched_vertex(MatchedVertex::Destination);

        assert_eq!(
            encode(&Element::Edge(edge)),
            json!({
                "class": EDGE_CLASS,
                "group": "knows",
                "source": "a",
                "destination": "b",
                "directed": false,
                "properties": {"weight": 0.5},
                "matchedVertex": "DESTINATION"
            })
        );
    }

    #[test]
    fn test_unknown_class_is_kept_as_json() {
        let doc = json!({"class": "uk.gov.gchq.gaffer.user.User", "userId": "u1"});
        assert_eq!(decode(doc.clone()).unwrap(), Element::Json(doc));
        assert_eq!(decode(json!([1, 2, 3])).unwrap(), Element::Json(json!([1, 2, 3])));
    }

    #[test]
    fn test_edge_seed_defaults_to_either() {
        let doc = json!({"class": EDGE_SEED_CLASS, "source": 1, "destination": 2});
        let seed = decode(doc).unwrap();
        assert_eq!(seed, Element::EdgeSeed(EdgeSeed::new(1, 2, DirectedType::Either)));
    }

    #[test]
    fn test_recognised_class_with_missing_field_fails() {
        let err = decode(json!({"class": ENTITY_CLASS, "group": "g"})).unwrap_err();
        assert!(matches!(err, ConversionError::MissingField(field) if field == "vertex"));
    }

    #[test]
    fn test_null_vertex_survives_encoding() {
        let entity = Element::Entity(Entity::new("g", Value::Null));
        let doc = encode(&entity);
        assert_eq!(doc["vertex"], Value::Null);
        assert_eq!(decode(doc).unwrap(), entity);
    }
}
