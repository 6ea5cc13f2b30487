//! HostToForeign
//!
//! Nil and numbers go through the reader so the engine's own grammar picks
//! the representation (`1` reads as a long, `1.0` as a double, anything past
//! a long as a big integer). Collections become host-built engine
//! collections, and already-foreign values pass through untouched.

use super::Converter;
use crate::models::{ForeignValue, HostInput};
use crate::reader::ReadError;

impl Converter {
    /// Convert a host value to a foreign value
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::{Converter, ForeignValue, HostInput};
    ///
    /// let converter = Converter::new();
    /// assert_eq!(converter.to_foreign(&HostInput::Null).unwrap(), ForeignValue::Nil);
    /// assert_eq!(converter.to_foreign(&HostInput::from(7i64)).unwrap(), ForeignValue::Long(7));
    ///
    /// let list = converter
    ///     .to_foreign(&HostInput::Array(vec![2.5f64.into(), "x".into()]))
    ///     .unwrap();
    /// assert_eq!(list.class_name(), Some("java.util.ArrayList"));
    /// assert_eq!(list.to_string(), "[2.5, x]");
    /// ```
    pub fn to_foreign(&self, input: &HostInput) -> Result<ForeignValue, ReadError> {
        match input {
            HostInput::Null => self.read("nil"),
            HostInput::Bool(b) => Ok(ForeignValue::Boolean(*b)),
            HostInput::Number(n) => self.read(&n.to_string()),
            HostInput::String(s) => Ok(ForeignValue::String(s.clone())),
            HostInput::Array(items) => Ok(ForeignValue::array_list(
                items
                    .iter()
                    .map(|item| self.to_foreign(item))
                    .collect::<Result<_, _>>()?,
            )),
            HostInput::Object(pairs) => {
                let mut kvs = Vec::with_capacity(pairs.len() * 2);
                for (key, value) in pairs {
                    kvs.push(ForeignValue::String(key.clone()));
                    kvs.push(self.to_foreign(value)?);
                }
                Ok(ForeignValue::java_map_from_kvs(kvs))
            }
            HostInput::Foreign(value) => Ok(value.clone()),
        }
    }
}
