//! Value conversion across the boundary
//!
//! Two pure tree transforms:
//!
//! - **ForeignToHost** ([`Converter::to_host`]): engine values into
//!   JSON-shaped host values, degrading unknown leaves to a sentinel
//! - **HostToForeign** ([`Converter::to_foreign`], [`Converter::tx_payload`]):
//!   host literals into engine values, letting the reader decide numeric and
//!   nil typing
//!
//! # Critical Invariants
//!
//! - Conversion never mutates its input and holds no state between calls
//! - An unknown leaf never aborts conversion of its siblings
//! - Malformed literals and ambiguous payload shapes fail immediately

mod payload;
mod report;
mod to_foreign;
mod to_host;

pub use payload::{payload_shape, PayloadError, PayloadShape};
pub use report::{ConversionReport, Diagnostic, DiagnosticKind};

use crate::classify::TypeClassifier;
use crate::core::config::{ConfigError, ConverterConfig};
use crate::models::{ForeignValue, HostValue};
use crate::reader::{ReadError, TextualReader};

/// Stateless conversion service
///
/// Cheap to clone and safe to share between threads; pass it to whatever
/// needs to convert instead of reaching for a global.
///
/// # Example
/// ```
/// use ednbridge_core::{Converter, HostInput};
/// use serde_json::json;
///
/// let converter = Converter::new();
/// let value = converter.read(r#"["foo" 1 :bar]"#).unwrap();
/// assert_eq!(converter.to_host(&value), json!(["foo", 1, ":bar"]));
///
/// let back = converter.to_foreign(&HostInput::from(json!({":foo": {":bar": [1, 2, 3]}}))).unwrap();
/// assert_eq!(back.to_string(), "{:foo={:bar=[1, 2, 3]}}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    classifier: TypeClassifier,
    config: ConverterConfig,
    reader: TextualReader,
}

impl Converter {
    /// Converter with the standard classifier and default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Converter with validated settings
    pub fn with_config(config: ConverterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            reader: TextualReader::with_depth_limit(config.max_depth),
            config,
            ..Self::default()
        })
    }

    /// Replace the classifier (e.g. one with extra registered classes)
    pub fn with_classifier(mut self, classifier: TypeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier(&self) -> &TypeClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Read one literal form
    pub fn read(&self, text: &str) -> Result<ForeignValue, ReadError> {
        self.reader.read(text)
    }

    /// Read every top-level form in the text
    pub fn read_all(&self, text: &str) -> Result<Vec<ForeignValue>, ReadError> {
        self.reader.read_all(text)
    }

    /// Read one literal form and convert it to a host value
    pub fn read_to_host(&self, text: &str) -> Result<HostValue, ReadError> {
        Ok(self.to_host(&self.read(text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync + Clone>() {}

    #[test]
    fn test_converter_is_shareable() {
        assert_send_sync::<Converter>();
    }

    #[test]
    fn test_with_config_validates() {
        let config = ConverterConfig {
            max_safe_digits: 30,
            ..Default::default()
        };
        assert!(Converter::with_config(config).is_err());
        assert!(Converter::with_config(ConverterConfig::default()).is_ok());
    }

    #[test]
    fn test_reader_follows_depth_limit() {
        let config = ConverterConfig {
            max_depth: 2,
            ..Default::default()
        };
        let converter = Converter::with_config(config).unwrap();
        assert!(converter.read("[[1]]").is_ok());
        assert_eq!(
            converter.read("[[[1]]]"),
            Err(ReadError::DepthLimitExceeded { offset: 2 })
        );
    }

    #[test]
    fn test_read_all_applies_depth_limit() {
        let config = ConverterConfig {
            max_depth: 1,
            ..Default::default()
        };
        let converter = Converter::with_config(config).unwrap();
        assert_eq!(converter.read_all("[1] :a [2]").unwrap().len(), 3);
        assert!(matches!(
            converter.read_all("[1] [[2]]"),
            Err(ReadError::DepthLimitExceeded { offset: 5 })
        ));
    }

    #[test]
    fn test_read_to_host() {
        let converter = Converter::new();
        assert_eq!(converter.read_to_host("[22 nil]").unwrap(), serde_json::json!([22, null]));
        assert!(converter.read_to_host("{:a").is_err());
    }
}
