//! PyO3 wrapper for Converter

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{host_to_py, parse_converter_config, py_to_host_input, value_error};
use crate::convert::Converter as RustConverter;

/// Python wrapper for the conversion service
///
/// # Example (from Python)
///
/// ```python
/// from ednbridge_core import Converter
///
/// conv = Converter({"unknown_sentinel": "?"})
/// conv.read('{:foo 99 :bar #{1}}')        # {':foo': 99, ':bar': [1]}
/// conv.to_edn({":foo": [1, 2]})           # '{":foo" [1 2]}'
/// conv.tx_payload_edn([{":user/name": "ahab"}])
/// ```
#[pyclass(name = "Converter")]
pub struct PyConverter {
    inner: RustConverter,
}

#[pymethods]
impl PyConverter {
    /// Create a converter, optionally from a config dict
    ///
    /// # Errors
    ///
    /// Raises ValueError if the config has unknown fields or out-of-range values
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let inner = match config {
            Some(dict) => RustConverter::with_config(parse_converter_config(dict)?).map_err(value_error)?,
            None => RustConverter::new(),
        };
        Ok(Self { inner })
    }

    /// Read literal text and convert it to Python values
    fn read(&self, py: Python<'_>, text: &str) -> PyResult<Py<PyAny>> {
        let host = self.inner.read_to_host(text).map_err(value_error)?;
        host_to_py(py, &host)
    }

    /// Convert a Python value to the engine and render it as literal text
    fn to_edn(&self, obj: &Bound<'_, PyAny>) -> PyResult<String> {
        let input = py_to_host_input(obj, self.inner.config().max_depth)?;
        let value = self.inner.to_foreign(&input).map_err(value_error)?;
        Ok(value.to_edn())
    }

    /// Build a transaction payload and render it as literal text
    fn tx_payload_edn(&self, payload: &Bound<'_, PyAny>) -> PyResult<String> {
        let depth = self.inner.config().max_depth.saturating_sub(1);
        let items = payload
            .try_iter()?
            .map(|item| py_to_host_input(&item?, depth))
            .collect::<PyResult<Vec<_>>>()?;
        let tx = self.inner.tx_payload(&items).map_err(value_error)?;
        Ok(tx.to_edn())
    }

    /// Current settings as a dict
    fn config(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let json = serde_json::to_value(self.inner.config()).map_err(value_error)?;
        host_to_py(py, &json)
    }
}
