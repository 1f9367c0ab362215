use serde_json::{Map, Value};

use super::{LookupError, RecordMap};

/// A value read out of a foreign map-like object.
pub enum ForeignValue<'a> {
    /// A plain value, `null` included.
    Value(Value),
    /// A nested foreign map, flattened on demand.
    Map(Box<dyn KeyedLookup + 'a>),
}

impl std::fmt::Debug for ForeignValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForeignValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ForeignValue::Map(_) => f.write_str("Map(..)"),
        }
    }
}

/// Map-like object owned by a foreign runtime.
///
/// Only a key set and per-key lookup are available; there is no way to take
/// the whole mapping at once. Either call may fail when the owning runtime
/// does.
pub trait KeyedLookup {
    /// Keys currently held by the object.
    fn key_set(&self) -> Result<Vec<String>, LookupError>;

    /// Value stored under `key`; `None` only when the key is absent.
    fn lookup(&self, key: &str) -> Result<Option<ForeignValue<'_>>, LookupError>;
}

/// Adapter presenting a [`KeyedLookup`] object as a [`RecordMap`].
///
/// Nested foreign maps are copied out key by key into JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignMap<T>(pub T);

impl<T: KeyedLookup> ForeignMap<T> {
    /// Wrap a foreign object.
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Copy every entry out into a native map.
    pub fn to_native(&self) -> Result<Map<String, Value>, LookupError> {
        flatten(&self.0)
    }
}

impl<T: KeyedLookup> RecordMap for ForeignMap<T> {
    fn get(&self, key: &str) -> Result<Option<Value>, LookupError> {
        self.0.lookup(key)?.map(materialise).transpose()
    }

    fn keys(&self) -> Result<Vec<String>, LookupError> {
        self.0.key_set()
    }
}

fn materialise(value: ForeignValue<'_>) -> Result<Value, LookupError> {
    match value {
        ForeignValue::Value(value) => Ok(value),
        ForeignValue::Map(nested) => flatten(nested.as_ref()).map(Value::Object),
    }
}

fn flatten(source: &(impl KeyedLookup + ?Sized)) -> Result<Map<String, Value>, LookupError> {
    let mut out = Map::new();
    for key in source.key_set()? {
        // A key listed by the key set but gone by lookup time is skipped.
        if let Some(value) = source.lookup(&key)? {
            out.insert(key, materialise(value)?);
        }
    }
    Ok(out)
}

impl<T: KeyedLookup + ?Sized> KeyedLookup for &T {
    fn key_set(&self) -> Result<Vec<String>, LookupError> {
        (**self).key_set()
    }

    fn lookup(&self, key: &str) -> Result<Option<ForeignValue<'_>>, LookupError> {
        (**self).lookup(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    /// Stand-in for a map proxied from another runtime.
    #[derive(Default)]
    struct ProxyMap {
        scalars: BTreeMap<String, Value>,
        nested: BTreeMap<String, ProxyMap>,
        broken: Option<String>,
    }

    impl KeyedLookup for ProxyMap {
        fn key_set(&self) -> Result<Vec<String>, LookupError> {
            let mut keys: Vec<String> =
                self.scalars.keys().chain(self.nested.keys()).cloned().collect();
            keys.extend(self.broken.clone());
            Ok(keys)
        }

        fn lookup(&self, key: &str) -> Result<Option<ForeignValue<'_>>, LookupError> {
            if self.broken.as_deref() == Some(key) {
                return Err(LookupError::new(format!("gateway closed while reading '{key}'")));
            }
            if let Some(value) = self.scalars.get(key) {
                return Ok(Some(ForeignValue::Value(value.clone())));
            }
            Ok(self
                .nested
                .get(key)
                .map(|nested| ForeignValue::Map(Box::new(nested))))
        }
    }

    #[test]
    fn test_nested_maps_are_flattened() {
        let properties = ProxyMap {
            scalars: BTreeMap::from([("count".to_string(), json!(3))]),
            ..ProxyMap::default()
        };
        let record = ForeignMap::new(ProxyMap {
            scalars: BTreeMap::from([("type".to_string(), json!("entity"))]),
            nested: BTreeMap::from([("properties".to_string(), properties)]),
            ..ProxyMap::default()
        });

        assert_eq!(record.get("type"), Ok(Some(json!("entity"))));
        assert_eq!(record.get("properties"), Ok(Some(json!({"count": 3}))));
        assert_eq!(record.get("missing"), Ok(None));
        assert_eq!(
            record.to_native().map(Value::Object),
            Ok(json!({"type": "entity", "properties": {"count": 3}}))
        );
    }

    #[test]
    fn test_null_entries_are_kept() {
        let record = ForeignMap::new(ProxyMap {
            scalars: BTreeMap::from([
                ("count".to_string(), Value::Null),
                ("label".to_string(), json!("x")),
            ]),
            ..ProxyMap::default()
        });

        assert_eq!(record.get("count"), Ok(Some(Value::Null)));
        assert_eq!(
            record.to_native().map(Value::Object),
            Ok(json!({"count": null, "label": "x"}))
        );
    }

    #[test]
    fn test_failed_lookup_is_reported() {
        let properties = ProxyMap {
            broken: Some("count".to_string()),
            ..ProxyMap::default()
        };
        let record = ForeignMap::new(ProxyMap {
            nested: BTreeMap::from([("properties".to_string(), properties)]),
            ..ProxyMap::default()
        });

        let err = record.get("properties").unwrap_err();
        assert_eq!(err.to_string(), "gateway closed while reading 'count'");
        assert!(record.to_native().is_err());
    }
}
