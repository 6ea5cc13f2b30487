//! Type classification
//!
//! Assigns every foreign value one semantic kind by looking up the runtime
//! class name it reports. The engine exposes several unrelated concrete
//! classes for what is conceptually one kind (two set classes, three map
//! classes), so classification is a table lookup rather than a match on the
//! concrete representation.
//!
//! Unknown classes are a recoverable condition: they classify as
//! [`ForeignKind::Unknown`] and conversion degrades locally.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::ForeignValue;

/// Semantic kind of a foreign value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForeignKind {
    Nil,
    Bool,
    Long,
    Double,
    String,
    Keyword,
    Symbol,
    Vector,
    Set,
    Map,
    /// Change-log entry
    Record,
    Unknown,
}

/// Runtime classes the engine is known to produce
const STANDARD_CLASSES: &[(&str, ForeignKind)] = &[
    ("java.lang.Boolean", ForeignKind::Bool),
    ("java.lang.Long", ForeignKind::Long),
    ("clojure.lang.BigInt", ForeignKind::Long),
    ("java.lang.Double", ForeignKind::Double),
    ("java.lang.String", ForeignKind::String),
    ("clojure.lang.Keyword", ForeignKind::Keyword),
    ("clojure.lang.Symbol", ForeignKind::Symbol),
    ("clojure.lang.PersistentVector", ForeignKind::Vector),
    ("clojure.lang.PersistentList", ForeignKind::Vector),
    ("java.util.ArrayList", ForeignKind::Vector),
    ("clojure.lang.PersistentHashSet", ForeignKind::Set),
    ("java.util.HashSet", ForeignKind::Set),
    ("clojure.lang.PersistentArrayMap", ForeignKind::Map),
    ("clojure.lang.PersistentHashMap", ForeignKind::Map),
    ("java.util.HashMap", ForeignKind::Map),
    ("datomic.db.Datum", ForeignKind::Record),
];

/// Class-name → kind dispatch table
///
/// # Example
/// ```
/// use ednbridge_core::{reader, ForeignKind, TypeClassifier};
///
/// let classifier = TypeClassifier::new();
/// assert_eq!(classifier.classify(&reader::read("#{1 2}").unwrap()), ForeignKind::Set);
/// assert_eq!(classifier.classify(&reader::read("nil").unwrap()), ForeignKind::Nil);
/// assert_eq!(
///     classifier.classify(&reader::read(r#"#inst "2020-01-01T00:00:00Z""#).unwrap()),
///     ForeignKind::Unknown
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    table: HashMap<String, ForeignKind>,
}

impl TypeClassifier {
    /// Classifier for the standard engine classes
    pub fn new() -> Self {
        Self {
            table: STANDARD_CLASSES
                .iter()
                .map(|(class, kind)| (class.to_string(), *kind))
                .collect(),
        }
    }

    /// Register (or re-map) a runtime class
    pub fn with_class(mut self, class: impl Into<String>, kind: ForeignKind) -> Self {
        self.table.insert(class.into(), kind);
        self
    }

    /// Classify by runtime-reported class name
    pub fn classify(&self, value: &ForeignValue) -> ForeignKind {
        match value.class_name() {
            None => ForeignKind::Nil,
            Some(class) => self.kind_of(class),
        }
    }

    /// Kind registered for a class name
    pub fn kind_of(&self, class: &str) -> ForeignKind {
        self.table.get(class).copied().unwrap_or(ForeignKind::Unknown)
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}
