//! Converter configuration
//!
//! Loaded from JSON (CLI), from a Python dict (ffi), or built in code.
//! Every field has a default, so an empty object is a valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Keyword;

/// Largest digit count a host number can carry without losing precision
pub const MAX_SAFE_DIGITS: usize = 18;

/// Default nesting limit for reading and converting, matching serde_json's
/// own recursion limit for host JSON
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("max_safe_digits must be between 1 and {max}, got {actual}")]
    InvalidDigitLimit { actual: usize, max: usize },

    #[error("max_depth must be at least 1")]
    InvalidDepthLimit,

    #[error("default_partition '{0}' is not a keyword")]
    InvalidPartition(String),
}

/// Conversion settings
///
/// # Fields
///
/// * `max_safe_digits` - Integers with more digits than this become strings
/// * `unknown_sentinel` - Host value emitted for unrecognized foreign types
/// * `default_partition` - Partition keyword used for allocated temp ids
/// * `max_depth` - Deepest collection nesting the reader accepts and the
///   converter descends into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub max_safe_digits: usize,
    pub unknown_sentinel: String,
    pub default_partition: String,
    pub max_depth: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_safe_digits: MAX_SAFE_DIGITS,
            unknown_sentinel: "n/a".to_string(),
            default_partition: ":db.part/user".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConverterConfig {
    /// Parse and validate a JSON configuration
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::ConverterConfig;
    ///
    /// let config = ConverterConfig::from_json_str(r#"{"unknown_sentinel": "?"}"#).unwrap();
    /// assert_eq!(config.unknown_sentinel, "?");
    /// assert_eq!(config.max_safe_digits, 18);
    ///
    /// assert!(ConverterConfig::from_json_str(r#"{"max_safe_digits": 40}"#).is_err());
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ConverterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_safe_digits == 0 || self.max_safe_digits > MAX_SAFE_DIGITS {
            return Err(ConfigError::InvalidDigitLimit {
                actual: self.max_safe_digits,
                max: MAX_SAFE_DIGITS,
            });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidDepthLimit);
        }
        self.partition()?;
        Ok(())
    }

    /// Parsed partition keyword
    pub fn partition(&self) -> Result<Keyword, ConfigError> {
        Keyword::parse(&self.default_partition)
            .ok_or_else(|| ConfigError::InvalidPartition(self.default_partition.clone()))
    }
}
