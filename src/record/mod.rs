//! Raw records as they arrive from the engine bridge.
//!
//! Records come in two structural flavours: native mappings, and foreign
//! map-like objects that only expose a key set plus indexed lookup. Both are
//! presented to conversion through the single [`RecordMap`] capability so the
//! conversion routine has one code path. Either flavour may additionally be
//! wrapped in a pair whose second element is an ignorable companion (an
//! artifact of column-oriented row formats).

mod foreign;

pub use foreign::{ForeignMap, ForeignValue, KeyedLookup};

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// A record could not be read, typically because the runtime owning a
/// foreign map failed to answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct LookupError(pub String);

impl LookupError {
    /// Wrap any displayable failure.
    pub fn new(reason: impl fmt::Display) -> Self {
        LookupError(reason.to_string())
    }
}

/// Read-only field access over a raw record.
///
/// Native maps never fail; foreign maps report lookup failures instead of
/// hiding them as absent keys.
pub trait RecordMap {
    /// Value stored under `key`, if any. A present `null` is `Some(Value::Null)`.
    fn get(&self, key: &str) -> Result<Option<Value>, LookupError>;

    /// All keys present in the record.
    fn keys(&self) -> Result<Vec<String>, LookupError>;

    /// Whether `key` is present.
    fn contains_key(&self, key: &str) -> Result<bool, LookupError> {
        Ok(self.get(key)?.is_some())
    }
}

impl RecordMap for Map<String, Value> {
    fn get(&self, key: &str) -> Result<Option<Value>, LookupError> {
        Ok(Map::get(self, key).cloned())
    }

    fn keys(&self) -> Result<Vec<String>, LookupError> {
        Ok(Map::keys(self).cloned().collect())
    }

    fn contains_key(&self, key: &str) -> Result<bool, LookupError> {
        Ok(Map::contains_key(self, key))
    }
}

impl RecordMap for HashMap<String, Value> {
    fn get(&self, key: &str) -> Result<Option<Value>, LookupError> {
        Ok(HashMap::get(self, key).cloned())
    }

    fn keys(&self) -> Result<Vec<String>, LookupError> {
        Ok(HashMap::keys(self).cloned().collect())
    }

    fn contains_key(&self, key: &str) -> Result<bool, LookupError> {
        Ok(HashMap::contains_key(self, key))
    }
}

impl<M: RecordMap + ?Sized> RecordMap for &M {
    fn get(&self, key: &str) -> Result<Option<Value>, LookupError> {
        (**self).get(key)
    }

    fn keys(&self) -> Result<Vec<String>, LookupError> {
        (**self).keys()
    }

    fn contains_key(&self, key: &str) -> Result<bool, LookupError> {
        (**self).contains_key(key)
    }
}

impl<M: RecordMap + ?Sized> RecordMap for Box<M> {
    fn get(&self, key: &str) -> Result<Option<Value>, LookupError> {
        (**self).get(key)
    }

    fn keys(&self) -> Result<Vec<String>, LookupError> {
        (**self).keys()
    }

    fn contains_key(&self, key: &str) -> Result<bool, LookupError> {
        (**self).contains_key(key)
    }
}

/// A raw record, either bare or wrapped in a pair with a discarded companion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord<M> {
    /// A bare record.
    Map(M),
    /// A record plus a companion value that conversion never reads.
    Pair(M, Value),
}

impl<M: RecordMap> RawRecord<M> {
    /// The record conversion operates on.
    pub fn working(&self) -> &M {
        match self {
            RawRecord::Map(map) | RawRecord::Pair(map, _) => map,
        }
    }

    /// Consume the wrapper, dropping any companion.
    pub fn into_working(self) -> M {
        match self {
            RawRecord::Map(map) | RawRecord::Pair(map, _) => map,
        }
    }

    /// Whether this record arrived wrapped in a pair.
    pub fn is_pair(&self) -> bool {
        matches!(self, RawRecord::Pair(..))
    }
}

impl<M: RecordMap> From<M> for RawRecord<M> {
    fn from(map: M) -> Self {
        RawRecord::Map(map)
    }
}

impl RawRecord<Map<String, Value>> {
    /// Interpret a JSON value as a raw record.
    ///
    /// An object is a bare record; a two-element array whose first element is
    /// an object is a pair. Anything else is returned unchanged as the error.
    pub fn from_json(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(RawRecord::Map(map)),
            Value::Array(items) => match <[Value; 2]>::try_from(items) {
                Ok([Value::Object(map), companion]) => Ok(RawRecord::Pair(map, companion)),
                Ok(pair) => Err(Value::Array(pair.into())),
                Err(items) => Err(Value::Array(items)),
            },
            other => Err(other),
        }
    }
}
