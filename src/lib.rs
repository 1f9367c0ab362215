//! # Gaffer element bridge
//!
//! Converts raw element records handed across a graph-engine bridge into
//! typed graph elements.
//!
//! ## Pieces
//!
//! 1. **Records**: native mappings and foreign map-like objects behind one
//!    [`RecordMap`] capability, optionally wrapped in a pair.
//! 2. **Conversion**: [`convert_record`] dispatches on the `type` tag, or
//!    decodes a pre-serialised `json` payload.
//! 3. **Iteration**: [`ElementIterator`] pulls records from a
//!    [`RecordSource`] lazily and releases it exactly once.
//! 4. **User**: the [`User`] principal and its JSON projection.
//!
//! ## Usage Example
//!
//! ```
//! use gaffer_bridge::{ElementIterator, RawRecord, VecSource};
//! use serde_json::json;
//!
//! let record = RawRecord::from_json(json!({
//!     "type": "entity",
//!     "group": "person",
//!     "vertex": "alice",
//!     "properties": {"age": 30}
//! }))
//! .unwrap();
//!
//! let elements = ElementIterator::new(VecSource::new(vec![record]))
//!     .scoped(|iter| iter.collect::<Result<Vec<_>, _>>())
//!     .unwrap();
//! assert_eq!(elements[0].group(), Some("person"));
//! assert_eq!(elements[0].properties().map(|p| &p["age"]), Some(&json!(30)));
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod convert;  // Tagged record -> element
pub mod element;  // Entities, edges, seeds and Gaffer JSON
pub mod iter;     // Lazy element iteration over a record source
pub mod record;   // Raw record capability and adapters
pub mod serialiser; // Element -> raw record
pub mod source;   // In-memory and JSON-lines sources
pub mod user;     // User principal
/// Python bindings for exposing the bridge to a Python runtime.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

// Re-exports for convenience
pub use convert::{convert_record, ConversionError};
pub use element::{
    DirectedType, Edge, EdgeSeed, Element, Entity, EntitySeed, MatchedVertex, Properties,
};
pub use iter::{ElementIterator, IteratorConfig, RecordSource, SourceError};
pub use record::{ForeignMap, ForeignValue, KeyedLookup, LookupError, RawRecord, RecordMap};
pub use serialiser::{
    ElementSerialiser, JsonElementSerialiser, MapElementSerialiser, SerialiserError,
};
pub use source::{JsonLinesSource, VecSource};
pub use user::User;

use thiserror::Error;

/// Errors surfaced while iterating elements.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A record could not be converted.
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// The record source failed.
    #[error("record source failed: {0}")]
    Source(#[from] SourceError),
}
