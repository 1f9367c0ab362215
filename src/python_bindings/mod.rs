//! Python bindings that expose the element bridge via PyO3.
//!
//! The Python side holds a Java iterator (proxied over a JVM gateway) whose
//! items are dicts, Java maps exposing `keySet()`/`get()`, or 2-tuples from
//! an RDD. Elements come back as Gaffer JSON text.
use pyo3::exceptions::{
    PyIndexError, PyRuntimeError, PyStopIteration, PyTypeError, PyValueError,
};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyModule, PyTuple};
use serde_json::{Map, Number, Value};

use crate::convert::convert_record;
use crate::iter::{ElementIterator, IteratorConfig, RecordSource, SourceError};
use crate::record::{ForeignMap, ForeignValue, KeyedLookup, LookupError, RawRecord};
use crate::user::User;

/// Python-facing iterator over a Java-side record iterator.
#[pyclass(name = "ElementIterator")]
#[derive(Debug)]
pub struct PyElementIterator {
    inner: ElementIterator<JavaIteratorSource>,
}

#[pymethods]
impl PyElementIterator {
    #[new]
    #[pyo3(signature = (java_iterator, skip_unconvertible = false))]
    /// Wrap a Java iterator exposing `hasNext()` and `next()`.
    pub fn new(java_iterator: Py<PyAny>, skip_unconvertible: bool) -> Self {
        let config = IteratorConfig::default().with_skip_unconvertible(skip_unconvertible);
        let source = JavaIteratorSource {
            iterator: java_iterator,
        };
        Self {
            inner: ElementIterator::with_config(source, config),
        }
    }

    fn __iter__(slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf
    }

    fn __next__(&mut self) -> PyResult<Option<String>> {
        self.inner
            .next_element()
            .map(|element| element.map(|element| element.to_gaffer_json().to_string()))
            .map_err(|err| PyRuntimeError::new_err(err.to_string()))
    }

    /// Next element as Gaffer JSON; raises `StopIteration` at the end.
    pub fn next(&mut self) -> PyResult<String> {
        self.__next__()?
            .ok_or_else(|| PyStopIteration::new_err("no more elements"))
    }

    /// Whether the Java iterator has another record.
    pub fn has_next(&mut self) -> PyResult<bool> {
        self.inner
            .has_next()
            .map_err(|err| PyRuntimeError::new_err(err.to_string()))
    }

    /// Release the Java iterator.
    pub fn close(&mut self) -> PyResult<()> {
        self.inner
            .close()
            .map_err(|err| PyRuntimeError::new_err(err.to_string()))
    }
}

/// Convert a single record (dict, Java map, or 2-tuple) into Gaffer JSON.
#[pyfunction]
pub fn convert_element(record: &Bound<'_, PyAny>) -> PyResult<String> {
    let raw = to_raw_record(record)?;
    convert_record(&raw)
        .map(|element| element.to_gaffer_json().to_string())
        .map_err(|err| PyValueError::new_err(err.to_string()))
}

/// JSON projection of a user, omitting absent fields.
#[pyfunction]
#[pyo3(signature = (user_id = None, data_auths = None))]
pub fn user_json(user_id: Option<String>, data_auths: Option<Vec<String>>) -> String {
    Value::Object(User::new(user_id, data_auths).to_json()).to_string()
}

#[derive(Debug)]
struct JavaIteratorSource {
    iterator: Py<PyAny>,
}

impl RecordSource for JavaIteratorSource {
    type Record = Map<String, Value>;

    fn has_next(&mut self) -> Result<bool, SourceError> {
        Python::with_gil(|py| {
            self.iterator
                .bind(py)
                .call_method0("hasNext")?
                .extract::<bool>()
        })
        .map_err(foreign)
    }

    fn take_next(&mut self) -> Result<RawRecord<Self::Record>, SourceError> {
        Python::with_gil(|py| match self.iterator.bind(py).call_method0("next") {
            Ok(item) => to_raw_record(&item).map_err(foreign),
            Err(err)
                if err.is_instance_of::<PyIndexError>(py)
                    || err.is_instance_of::<PyStopIteration>(py) =>
            {
                Err(SourceError::Exhausted)
            }
            Err(err) => Err(foreign(err)),
        })
    }

    fn close(&mut self) -> Result<(), SourceError> {
        Python::with_gil(|py| {
            let iterator = self.iterator.bind(py);
            if iterator.hasattr("close")? {
                iterator.call_method0("close")?;
            }
            Ok(())
        })
        .map_err(foreign)
    }
}

fn foreign(err: PyErr) -> SourceError {
    SourceError::Foreign(err.to_string())
}

/// A Java map reached through the gateway.
struct JavaMap<'py>(Bound<'py, PyAny>);

impl KeyedLookup for JavaMap<'_> {
    fn key_set(&self) -> Result<Vec<String>, LookupError> {
        self.0
            .call_method0("keySet")
            .and_then(|keys| {
                keys.try_iter()?
                    .map(|key| Ok(key?.to_string()))
                    .collect::<PyResult<Vec<String>>>()
            })
            .map_err(LookupError::new)
    }

    fn lookup(&self, key: &str) -> Result<Option<ForeignValue<'_>>, LookupError> {
        let value = self.0.call_method1("get", (key,)).map_err(LookupError::new)?;
        if value.is_none() {
            // Java `get` answers null for both an absent key and a null entry.
            let present = self
                .0
                .call_method1("containsKey", (key,))
                .and_then(|found| found.extract::<bool>())
                .map_err(LookupError::new)?;
            return Ok(present.then_some(ForeignValue::Value(Value::Null)));
        }
        if is_java_map(&value) {
            return Ok(Some(ForeignValue::Map(Box::new(JavaMap(value)))));
        }
        to_value(&value)
            .map(|value| Some(ForeignValue::Value(value)))
            .map_err(|err| LookupError::new(format!("unsupported value under '{key}': {err}")))
    }
}

fn is_java_map(obj: &Bound<'_, PyAny>) -> bool {
    !obj.is_instance_of::<PyDict>() && obj.hasattr("keySet").unwrap_or(false)
}

fn to_raw_record(obj: &Bound<'_, PyAny>) -> PyResult<RawRecord<Map<String, Value>>> {
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        if tuple.len() == 2 {
            // The companion (a NullWritable from the RDD) is never read.
            let first = tuple.get_item(0)?;
            return Ok(RawRecord::Pair(to_record_map(&first)?, Value::Null));
        }
    }
    Ok(RawRecord::Map(to_record_map(obj)?))
}

fn to_record_map(obj: &Bound<'_, PyAny>) -> PyResult<Map<String, Value>> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        return dict_to_map(dict);
    }
    if is_java_map(obj) {
        return java_map_to_native(obj);
    }
    Err(PyTypeError::new_err(
        "record must be a dict, a Java map or a 2-tuple",
    ))
}

fn java_map_to_native(obj: &Bound<'_, PyAny>) -> PyResult<Map<String, Value>> {
    ForeignMap::new(JavaMap(obj.clone()))
        .to_native()
        .map_err(|err| PyRuntimeError::new_err(format!("failed to read java map: {err}")))
}

fn dict_to_map(dict: &Bound<'_, PyDict>) -> PyResult<Map<String, Value>> {
    let mut map = Map::new();
    for (key, value) in dict.iter() {
        map.insert(key.str()?.to_string(), to_value(&value)?);
    }
    Ok(map)
}

fn to_value(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::Null);
    }
    if let Ok(flag) = obj.downcast::<PyBool>() {
        return Ok(Value::Bool(flag.is_true()));
    }
    if obj.is_instance_of::<PyInt>() {
        if let Ok(n) = obj.extract::<i64>() {
            return Ok(Value::from(n));
        }
        if let Ok(n) = obj.extract::<u64>() {
            return Ok(Value::from(n));
        }
        return Ok(Value::String(obj.str()?.to_string()));
    }
    if let Ok(float) = obj.downcast::<PyFloat>() {
        return Ok(Number::from_f64(float.value()).map_or(Value::Null, Value::Number));
    }
    if let Ok(text) = obj.extract::<String>() {
        return Ok(Value::String(text));
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        return dict_to_map(dict).map(Value::Object);
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        return list
            .iter()
            .map(|item| to_value(&item))
            .collect::<PyResult<Vec<_>>>()
            .map(Value::Array);
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        return tuple
            .iter()
            .map(|item| to_value(&item))
            .collect::<PyResult<Vec<_>>>()
            .map(Value::Array);
    }
    if is_java_map(obj) {
        return java_map_to_native(obj).map(Value::Object);
    }
    Err(PyTypeError::new_err(format!(
        "unsupported value of type {}",
        obj.get_type().name()?
    )))
}

/// Create Python module.
#[pymodule]
pub fn gaffer_bridge(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyElementIterator>()?;
    m.add_function(wrap_pyfunction!(convert_element, m)?)?;
    m.add_function(wrap_pyfunction!(user_json, m)?)?;
    Ok(())
}
