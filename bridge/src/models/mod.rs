//! Value models on both sides of the boundary

pub mod host;
mod print;
pub mod value;

// Re-exports
pub use host::{HostInput, HostValue};
pub use value::{BigInt, Datom, ForeignValue, Keyword, MapRepr, SeqRepr, SetRepr, Symbol, TempId};
