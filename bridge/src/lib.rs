//! EDN Bridge Core - value marshalling between an EDN database engine and host JSON
//!
//! Converts the engine's immutable values (keywords, symbols, persistent and
//! host-built collections, big integers, datoms) into JSON-shaped host
//! values, and host literals back into engine values and transaction
//! payloads.
//!
//! # Architecture
//!
//! - **models**: Foreign value tree, host input/output values, literal printing
//! - **reader**: Textual reader for the engine's literal notation
//! - **classify**: Runtime class name → semantic kind table
//! - **convert**: ForeignToHost, HostToForeign and transaction payloads
//! - **core**: Converter configuration and temp id allocation
//! - **session**: Transact/query/pull/entity/datoms over an async peer
//!
//! # Critical Invariants
//!
//! 1. Conversion is pure; the same input always converts to the same output
//! 2. Unknown foreign types degrade to a sentinel and never abort a result
//! 3. Integers wider than 18 digits cross to the host as strings
//! 4. Malformed literals and ambiguous payload shapes are hard errors
//! 5. Nesting beyond `max_depth` is a read error, never a stack overflow

// Module declarations
pub mod classify;
pub mod convert;
pub mod core;
pub mod models;
pub mod reader;
pub mod session;

// Re-exports for convenience
pub use classify::{ForeignKind, TypeClassifier};
pub use convert::{
    payload_shape, ConversionReport, Converter, Diagnostic, DiagnosticKind, PayloadError,
    PayloadShape,
};
pub use crate::core::{
    ConfigError, ConverterConfig, TempIdAllocator, DEFAULT_MAX_DEPTH, MAX_SAFE_DIGITS,
};
pub use models::{
    BigInt, Datom, ForeignValue, HostInput, HostValue, Keyword, MapRepr, SeqRepr, SetRepr, Symbol,
    TempId,
};
pub use reader::{ReadError, TextualReader};
pub use session::{Datoms, Entity, Peer, PeerError, Session, SessionError, TxInput, TxResult};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn ednbridge_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::converter::PyConverter>()?;
    Ok(())
}
