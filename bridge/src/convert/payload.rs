//! Transaction payloads
//!
//! A payload is either a list of operation tuples
//! (`[":db/add", "tempid", ":user/name", "ahab"]`) or a list of entity maps
//! (`{":user/name": "ahab"}`). The shape is decided once from the first
//! element and every element must then have it; nothing is flattened or
//! merged across elements.
//!
//! Keyword positions (tuple operation and attribute, entity map keys) turn
//! keyword-syntax strings into keywords, so keyword strings produced by
//! ForeignToHost come back as the keywords they were.

use thiserror::Error;

use super::Converter;
use crate::models::{ForeignValue, HostInput, Keyword};
use crate::reader::ReadError;

/// Errors raised while building a transaction payload
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PayloadError {
    #[error("Payload element {index}: expected {expected}, found {found}")]
    ShapeMismatch {
        index: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Malformed literal in payload: {0}")]
    MalformedLiteral(#[from] ReadError),
}

/// Outer payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `[op ref attr value ...]` per element
    OperationTuples,
    /// One attribute map per entity
    EntityMaps,
}

/// Detect the payload shape from its first element
///
/// Returns `None` for an empty payload.
///
/// # Example
/// ```
/// use ednbridge_core::{payload_shape, HostInput, PayloadShape};
/// use serde_json::json;
///
/// let tuples = vec![HostInput::from(json!([":db/add", "u", ":user/name", "ahab"]))];
/// assert_eq!(payload_shape(&tuples).unwrap(), Some(PayloadShape::OperationTuples));
///
/// let maps = vec![HostInput::from(json!({":user/name": "ahab"}))];
/// assert_eq!(payload_shape(&maps).unwrap(), Some(PayloadShape::EntityMaps));
///
/// assert!(payload_shape(&[HostInput::from("ahab")]).is_err());
/// ```
pub fn payload_shape(payload: &[HostInput]) -> Result<Option<PayloadShape>, PayloadError> {
    let Some(first) = payload.first() else {
        return Ok(None);
    };
    match first {
        HostInput::Array(_) | HostInput::Foreign(ForeignValue::Seq(..)) => {
            Ok(Some(PayloadShape::OperationTuples))
        }
        HostInput::Object(_) | HostInput::Foreign(ForeignValue::Map(..)) => {
            Ok(Some(PayloadShape::EntityMaps))
        }
        other => Err(PayloadError::ShapeMismatch {
            index: 0,
            expected: "operation tuple or entity map",
            found: describe(other),
        }),
    }
}

impl Converter {
    /// Build the foreign transaction payload
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if any element differs from the first element's
    ///   shape, a tuple has fewer than two entries, or a tuple operation is
    ///   not a keyword
    /// - `MalformedLiteral` if a number or nil fails to read
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::{Converter, HostInput};
    /// use serde_json::json;
    ///
    /// let converter = Converter::new();
    /// let payload = vec![HostInput::from(json!([":db/add", "ahab", ":user/age", 61]))];
    /// let tx = converter.tx_payload(&payload).unwrap();
    /// assert_eq!(tx.to_edn(), r#"[[:db/add "ahab" :user/age 61]]"#);
    /// ```
    pub fn tx_payload(&self, payload: &[HostInput]) -> Result<ForeignValue, PayloadError> {
        let Some(shape) = payload_shape(payload)? else {
            return Ok(ForeignValue::array_list(Vec::new()));
        };
        let elements = payload
            .iter()
            .enumerate()
            .map(|(index, element)| match shape {
                PayloadShape::OperationTuples => self.operation_tuple(index, element),
                PayloadShape::EntityMaps => self.entity_element(index, element),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ForeignValue::array_list(elements))
    }

    /// Entity reference: numbers, temp-id strings, or lookup refs
    /// `[attr value]` whose attribute is keywordized
    pub fn to_reference(&self, input: &HostInput) -> Result<ForeignValue, ReadError> {
        match input {
            HostInput::Array(items) if items.len() == 2 => Ok(ForeignValue::array_list(vec![
                self.keyword_position(&items[0])?,
                self.to_foreign(&items[1])?,
            ])),
            other => self.to_foreign(other),
        }
    }

    fn operation_tuple(&self, index: usize, element: &HostInput) -> Result<ForeignValue, PayloadError> {
        match element {
            HostInput::Array(items) if items.len() >= 2 => {
                let mut out = Vec::with_capacity(items.len());
                out.push(operation(index, &items[0])?);
                out.push(self.to_reference(&items[1])?);
                for (position, item) in items.iter().enumerate().skip(2) {
                    out.push(if position == 2 {
                        self.keyword_position(item)?
                    } else {
                        self.to_foreign(item)?
                    });
                }
                Ok(ForeignValue::array_list(out))
            }
            HostInput::Foreign(value @ ForeignValue::Seq(_, items))
                if items.len() >= 2 && matches!(items[0], ForeignValue::Keyword(_)) =>
            {
                Ok(value.clone())
            }
            other => Err(PayloadError::ShapeMismatch {
                index,
                expected: "operation tuple of at least two entries starting with a keyword",
                found: describe(other),
            }),
        }
    }

    fn entity_element(&self, index: usize, element: &HostInput) -> Result<ForeignValue, PayloadError> {
        match element {
            HostInput::Object(pairs) => Ok(self.entity_map(pairs)?),
            HostInput::Foreign(value @ ForeignValue::Map(..)) => Ok(value.clone()),
            other => Err(PayloadError::ShapeMismatch {
                index,
                expected: "entity map",
                found: describe(other),
            }),
        }
    }

    fn entity_map(&self, pairs: &[(String, HostInput)]) -> Result<ForeignValue, ReadError> {
        let mut kvs = Vec::with_capacity(pairs.len() * 2);
        for (key, value) in pairs {
            kvs.push(ForeignValue::keyword_or_string(key));
            kvs.push(self.entity_value(value)?);
        }
        Ok(ForeignValue::java_map_from_kvs(kvs))
    }

    /// Component entities nest as maps, possibly inside arrays
    fn entity_value(&self, value: &HostInput) -> Result<ForeignValue, ReadError> {
        match value {
            HostInput::Object(pairs) => self.entity_map(pairs),
            HostInput::Array(items) if items.iter().any(|i| matches!(i, HostInput::Object(_))) => {
                Ok(ForeignValue::array_list(
                    items
                        .iter()
                        .map(|item| self.entity_value(item))
                        .collect::<Result<_, _>>()?,
                ))
            }
            other => self.to_foreign(other),
        }
    }

    fn keyword_position(&self, input: &HostInput) -> Result<ForeignValue, ReadError> {
        match input {
            HostInput::String(s) => Ok(ForeignValue::keyword_or_string(s)),
            other => self.to_foreign(other),
        }
    }
}

/// Operation position: a keyword or keyword-syntax string, nothing else
fn operation(index: usize, input: &HostInput) -> Result<ForeignValue, PayloadError> {
    let keyword = match input {
        HostInput::String(s) => Keyword::parse(s),
        HostInput::Foreign(ForeignValue::Keyword(kw)) => Some(kw.clone()),
        _ => None,
    };
    keyword
        .map(ForeignValue::Keyword)
        .ok_or_else(|| PayloadError::ShapeMismatch {
            index,
            expected: "operation keyword",
            found: describe(input),
        })
}

fn describe(input: &HostInput) -> String {
    match input {
        HostInput::String(s) => format!("string {:?}", s),
        HostInput::Array(items) => format!("array of {} entries", items.len()),
        HostInput::Foreign(value) => format!("foreign {}", value.class_name().unwrap_or("nil")),
        other => other.shape_name().to_string(),
    }
}
