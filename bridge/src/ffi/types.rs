//! Type conversion utilities for the FFI boundary
//!
//! Python objects map onto [`HostInput`] on the way in and [`HostValue`]
//! maps onto Python objects on the way out.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};
use pyo3::IntoPyObjectExt;

use crate::core::config::{ConverterConfig, MAX_SAFE_DIGITS};
use crate::models::{HostInput, HostValue};
use crate::reader;

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract an optional field from a Python dict.
///
/// # Errors
/// Returns error only if type conversion fails (not if field is missing)
///
/// # Example
/// ```ignore
/// let sentinel: Option<String> = extract_optional(&py_dict, "unknown_sentinel")?;
/// ```
fn extract_optional<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    for<'py> T: pyo3::FromPyObject<'py, 'py, Error = PyErr>,
{
    match dict.get_item(key)? {
        Some(value) if value.is_none() => Ok(None),
        Some(value) => Ok(Some(value.extract()?)),
        None => Ok(None),
    }
}

/// Extract a field with a default value if missing.
///
/// # Example
/// ```ignore
/// let digits: usize = extract_with_default(&py_dict, "max_safe_digits", 18)?;
/// ```
fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    for<'py> T: pyo3::FromPyObject<'py, 'py, Error = PyErr>,
{
    Ok(extract_optional(dict, key)?.unwrap_or(default))
}

pub(crate) fn value_error(message: impl std::fmt::Display) -> PyErr {
    PyErr::new::<PyValueError, _>(message.to_string())
}

// ========================================================================
// Configuration Parsers
// ========================================================================

/// Convert Python dict to ConverterConfig
///
/// # Errors
///
/// Returns ValueError if:
/// - A field has the wrong type
/// - An unknown field is present
/// - Values are out of range
pub fn parse_converter_config(py_config: &Bound<'_, PyDict>) -> PyResult<ConverterConfig> {
    for key in py_config.keys() {
        let key: String = key.extract()?;
        if !matches!(
            key.as_str(),
            "max_safe_digits" | "unknown_sentinel" | "default_partition" | "max_depth"
        ) {
            return Err(value_error(format!("Unknown config field '{}'", key)));
        }
    }

    let defaults = ConverterConfig::default();
    let config = ConverterConfig {
        max_safe_digits: extract_with_default(py_config, "max_safe_digits", MAX_SAFE_DIGITS)?,
        unknown_sentinel: extract_with_default(py_config, "unknown_sentinel", defaults.unknown_sentinel)?,
        default_partition: extract_with_default(py_config, "default_partition", defaults.default_partition)?,
        max_depth: extract_with_default(py_config, "max_depth", defaults.max_depth)?,
    };
    config.validate().map_err(value_error)?;
    Ok(config)
}

// ========================================================================
// Python → Host
// ========================================================================

/// Convert a Python object to a host input value
///
/// `bool` is checked before `int` since Python booleans are integers.
/// Integers that do not fit an i64 are read as big integers. Lists, tuples
/// and dicts nested deeper than `max_depth` (including self-referencing
/// ones) raise ValueError.
pub fn py_to_host_input(obj: &Bound<'_, PyAny>, max_depth: usize) -> PyResult<HostInput> {
    if obj.is_none() {
        return Ok(HostInput::Null);
    }
    if obj.is_instance_of::<PyBool>() {
        return Ok(HostInput::Bool(obj.extract()?));
    }
    if obj.is_instance_of::<PyInt>() {
        if let Ok(n) = obj.extract::<i64>() {
            return Ok(HostInput::from(n));
        }
        let text = obj.str()?.to_string();
        let big = reader::read(&text).map_err(value_error)?;
        return Ok(HostInput::Foreign(big));
    }
    if obj.is_instance_of::<PyFloat>() {
        let f: f64 = obj.extract()?;
        if !f.is_finite() {
            return Err(value_error(format!("Cannot convert non-finite float {}", f)));
        }
        return Ok(HostInput::from(f));
    }
    if obj.is_instance_of::<PyString>() {
        return Ok(HostInput::String(obj.extract()?));
    }
    let is_sequence = obj.is_instance_of::<PyList>() || obj.is_instance_of::<PyTuple>();
    if (is_sequence || obj.is_instance_of::<PyDict>()) && max_depth == 0 {
        return Err(value_error("Nesting exceeds the configured max_depth"));
    }
    if is_sequence {
        let items = obj
            .try_iter()?
            .map(|item| py_to_host_input(&item?, max_depth - 1))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(HostInput::Array(items));
    }
    if let Ok(dict) = obj.cast::<PyDict>() {
        let mut pairs = Vec::with_capacity(dict.len());
        for (key, value) in dict.iter() {
            let key: String = key
                .extract()
                .map_err(|_| value_error("Object keys must be strings"))?;
            pairs.push((key, py_to_host_input(&value, max_depth - 1)?));
        }
        return Ok(HostInput::Object(pairs));
    }
    Err(value_error(format!(
        "Cannot convert Python type '{}'",
        obj.get_type().name()?
    )))
}

// ========================================================================
// Host → Python
// ========================================================================

/// Convert a host value to a Python object
pub fn host_to_py(py: Python<'_>, value: &HostValue) -> PyResult<Py<PyAny>> {
    match value {
        HostValue::Null => Ok(py.None()),
        HostValue::Bool(b) => b.into_py_any(py),
        HostValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into_py_any(py)
            } else if let Some(u) = n.as_u64() {
                u.into_py_any(py)
            } else {
                n.as_f64().unwrap_or(f64::NAN).into_py_any(py)
            }
        }
        HostValue::String(s) => s.into_py_any(py),
        HostValue::Array(items) => {
            let items = items
                .iter()
                .map(|item| host_to_py(py, item))
                .collect::<PyResult<Vec<_>>>()?;
            PyList::new(py, items)?.into_py_any(py)
        }
        HostValue::Object(map) => {
            let dict = PyDict::new(py);
            for (key, item) in map {
                dict.set_item(key, host_to_py(py, item)?)?;
            }
            dict.into_py_any(py)
        }
    }
}
