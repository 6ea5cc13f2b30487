//! Host value model
//!
//! Host values are plain JSON-shaped data owned by the application:
//! null, boolean, number, string, ordered array and insertion-ordered
//! string-keyed object. Outbound values use `serde_json::Value` directly.
//!
//! Inbound values additionally need to carry already-foreign values
//! (literals the caller read ahead of time, temp ids), which a JSON value
//! cannot hold. [`HostInput`] is that inbound shape.

use serde_json::Number;

use super::value::ForeignValue;

/// Host-native value delivered to application code
pub type HostValue = serde_json::Value;

/// Host-native value supplied by application code for payload or query
/// argument construction
#[derive(Debug, Clone, PartialEq)]
pub enum HostInput {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<HostInput>),
    /// Insertion-ordered object entries
    Object(Vec<(String, HostInput)>),
    /// Already-foreign value, passed through unchanged
    Foreign(ForeignValue),
}

impl HostInput {
    /// Build an object from `(key, value)` pairs, keeping their order
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::HostInput;
    ///
    /// let user = HostInput::object([(":user/username", "ahab".into()), (":user/age", 61i64.into())]);
    /// assert_eq!(user.shape_name(), "object");
    /// ```
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, HostInput)>,
    {
        HostInput::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short shape description used in error messages
    pub fn shape_name(&self) -> &'static str {
        match self {
            HostInput::Null => "null",
            HostInput::Bool(_) => "boolean",
            HostInput::Number(_) => "number",
            HostInput::String(_) => "string",
            HostInput::Array(_) => "array",
            HostInput::Object(_) => "object",
            HostInput::Foreign(_) => "foreign value",
        }
    }
}

impl From<HostValue> for HostInput {
    fn from(value: HostValue) -> Self {
        match value {
            HostValue::Null => HostInput::Null,
            HostValue::Bool(b) => HostInput::Bool(b),
            HostValue::Number(n) => HostInput::Number(n),
            HostValue::String(s) => HostInput::String(s),
            HostValue::Array(items) => HostInput::Array(items.into_iter().map(Into::into).collect()),
            HostValue::Object(map) => {
                HostInput::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&HostValue> for HostInput {
    fn from(value: &HostValue) -> Self {
        value.clone().into()
    }
}

impl From<ForeignValue> for HostInput {
    fn from(value: ForeignValue) -> Self {
        HostInput::Foreign(value)
    }
}

impl From<&str> for HostInput {
    fn from(s: &str) -> Self {
        HostInput::String(s.to_owned())
    }
}

impl From<String> for HostInput {
    fn from(s: String) -> Self {
        HostInput::String(s)
    }
}

impl From<i64> for HostInput {
    fn from(n: i64) -> Self {
        HostInput::Number(n.into())
    }
}

/// Non-finite floats become null, as they do in `serde_json`
impl From<f64> for HostInput {
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(HostInput::Null, HostInput::Number)
    }
}

impl From<bool> for HostInput {
    fn from(b: bool) -> Self {
        HostInput::Bool(b)
    }
}

impl From<Vec<HostInput>> for HostInput {
    fn from(items: Vec<HostInput>) -> Self {
        HostInput::Array(items)
    }
}
