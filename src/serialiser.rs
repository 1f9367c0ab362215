//! Element serialisers producing the record shapes the engine emits.
//!
//! [`JsonElementSerialiser`] wraps Gaffer JSON text under a `json` key;
//! [`MapElementSerialiser`] writes the tagged map read by
//! [`convert_record`](crate::convert::convert_record).

use serde_json::{Map, Value};
use thiserror::Error;

use crate::convert::{JSON_KEY, TYPE_KEY};
use crate::element::Element;

/// Errors raised while serialising an element.
#[derive(Debug, Error)]
pub enum SerialiserError {
    /// The element has no representation in this record shape.
    #[error("{kind} elements cannot be written as a tagged record")]
    Unrepresentable {
        /// Kind of the rejected element.
        kind: &'static str,
    },

    /// JSON encoding failed.
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turns an element into a raw record.
pub trait ElementSerialiser {
    /// Serialise one element.
    fn serialise(&self, element: &Element) -> Result<Map<String, Value>, SerialiserError>;
}

/// Writes `{"json": "<gaffer json>"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonElementSerialiser;

impl ElementSerialiser for JsonElementSerialiser {
    fn serialise(&self, element: &Element) -> Result<Map<String, Value>, SerialiserError> {
        let text = serde_json::to_string(&element.to_gaffer_json())?;
        let mut record = Map::new();
        record.insert(JSON_KEY.to_string(), Value::String(text));
        Ok(record)
    }
}

/// Writes the tagged map, with `directed` as `1` or `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapElementSerialiser;

impl ElementSerialiser for MapElementSerialiser {
    fn serialise(&self, element: &Element) -> Result<Map<String, Value>, SerialiserError> {
        let mut record = Map::new();
        record.insert(TYPE_KEY.to_string(), Value::from(element.kind()));

        match element {
            Element::Entity(entity) => {
                record.insert("group".to_string(), Value::from(entity.group.as_str()));
                record.insert("vertex".to_string(), entity.vertex.clone());
                record.insert("properties".to_string(), properties(&entity.properties));
            }
            Element::Edge(edge) => {
                record.insert("group".to_string(), Value::from(edge.group.as_str()));
                record.insert("source".to_string(), edge.source.clone());
                record.insert("destination".to_string(), edge.destination.clone());
                record.insert("directed".to_string(), Value::from(u8::from(edge.directed)));
                record.insert("properties".to_string(), properties(&edge.properties));
                if let Some(matched) = edge.matched_vertex {
                    record.insert("matched_vertex".to_string(), Value::from(matched.as_str()));
                }
            }
            Element::EntitySeed(seed) => {
                record.insert("vertex".to_string(), seed.vertex.clone());
            }
            Element::EdgeSeed(seed) => {
                record.insert("source".to_string(), seed.source.clone());
                record.insert("destination".to_string(), seed.destination.clone());
                record.insert(
                    "directed_type".to_string(),
                    Value::from(seed.directed_type.as_str()),
                );
                if let Some(matched) = seed.matched_vertex {
                    record.insert("matched_vertex".to_string(), Value::from(matched.as_str()));
                }
            }
            Element::Json(_) => {
                return Err(SerialiserError::Unrepresentable {
                    kind: element.kind(),
                })
            }
        }
        Ok(record)
    }
}

fn properties(properties: &crate::element::Properties) -> Value {
    Value::Object(
        properties
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    )
}
