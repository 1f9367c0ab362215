//! Graph elements and seeds produced by record conversion.
//!
//! Entities and edges carry a group and a flat property map; seeds are the
//! lightweight references used to start or constrain a query.

pub mod gaffer_json;
mod types;

pub use types::{
    DirectedType, Edge, EdgeSeed, Element, Entity, EntitySeed, MatchedVertex, Properties,
};

use serde_json::Value;

use crate::convert::ConversionError;

impl Element {
    /// Encode as class-tagged Gaffer JSON.
    pub fn to_gaffer_json(&self) -> Value {
        gaffer_json::encode(self)
    }

    /// Decode class-tagged Gaffer JSON; unknown documents become [`Element::Json`].
    pub fn from_gaffer_json(document: Value) -> Result<Self, ConversionError> {
        gaffer_json::decode(document)
    }
}
