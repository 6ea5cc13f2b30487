//! Configuration and temp id allocation

pub mod config;
pub mod tempid;

pub use config::{ConfigError, ConverterConfig, DEFAULT_MAX_DEPTH, MAX_SAFE_DIGITS};
pub use tempid::TempIdAllocator;
