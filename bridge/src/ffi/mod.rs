//! Python host binding (feature `pyo3`)

pub mod converter;
pub mod types;
