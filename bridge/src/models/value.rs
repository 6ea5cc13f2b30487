//! Foreign value model
//!
//! Owned copy of the engine's immutable data representation. Values arriving
//! from the engine are copied into this tree at the boundary, so nothing
//! downstream ever touches the engine runtime again.
//!
//! Each variant is a *concrete representation*, not a semantic kind: the
//! engine has two unrelated set classes, three map classes and three
//! sequential classes, and each reports its own runtime class name. Mapping
//! representations onto kinds is the job of [`crate::classify`].
//!
//! # Critical Invariants
//!
//! - Values are immutable once built; no operation mutates a tree in place
//! - Equality follows the engine: sequential values compare element-wise
//!   regardless of representation, sets and maps compare order-free
//! - `Long` and `BigInt` holding the same integer are equal
//! - `Hash` agrees with equality, so sets and maps are hashed order-free

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Interned symbolic identifier with a leading `:` sigil (e.g. `:user/name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword {
    namespace: Option<String>,
    name: String,
}

impl Keyword {
    /// Create a keyword without a namespace
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::Keyword;
    ///
    /// assert_eq!(Keyword::new("foo").to_string(), ":foo");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Create a namespaced keyword
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Parse keyword text including its sigil
    ///
    /// Returns `None` when the text is not keyword syntax.
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::Keyword;
    ///
    /// let kw = Keyword::parse(":db/add").unwrap();
    /// assert_eq!(kw.namespace(), Some("db"));
    /// assert_eq!(kw.name(), "add");
    /// assert!(Keyword::parse("db/add").is_none());
    /// assert!(Keyword::parse("::auto").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix(':')?;
        let (namespace, name) = split_identifier(body, true)?;
        Some(Self {
            namespace: namespace.map(str::to_owned),
            name: name.to_owned(),
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, ":{}/{}", ns, self.name),
            None => write!(f, ":{}", self.name),
        }
    }
}

/// Identifier token without a sigil (e.g. `?e`, `$`, `senior?`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    namespace: Option<String>,
    name: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Parse symbol text
    ///
    /// Returns `None` when the text is not symbol syntax.
    pub fn parse(text: &str) -> Option<Self> {
        let (namespace, name) = split_identifier(text, false)?;
        Some(Self {
            namespace: namespace.map(str::to_owned),
            name: name.to_owned(),
        })
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Characters allowed anywhere inside a symbol or keyword body
pub(crate) fn is_constituent(c: char) -> bool {
    c.is_alphanumeric() || "*+!-_?<>=.$%&#:'/".contains(c)
}

fn is_valid_part(part: &str, keyword: bool) -> bool {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if matches!(first, ':' | '#' | '\'' | '/') || !is_constituent(first) {
        return false;
    }
    if !keyword {
        if first.is_ascii_digit() {
            return false;
        }
        // "+1" and "-.5" read as numbers, never as symbols
        if matches!(first, '+' | '-' | '.') && part[1..].starts_with(|c: char| c.is_ascii_digit()) {
            return false;
        }
    }
    chars.all(|c| is_constituent(c) && c != '/')
}

/// Split `ns/name` into its parts, validating both
fn split_identifier(text: &str, keyword: bool) -> Option<(Option<&str>, &str)> {
    if text == "/" && !keyword {
        return Some((None, text));
    }
    match text.split_once('/') {
        Some((ns, name)) => {
            (is_valid_part(ns, keyword) && (is_valid_part(name, keyword) || name == "/"))
                .then_some((Some(ns), name))
        }
        None => is_valid_part(text, keyword).then_some((None, text)),
    }
}

// ============================================================================
// Numbers
// ============================================================================

/// Arbitrary-precision integer kept as normalized decimal text
///
/// The engine produces these for integer literals suffixed `N` and for
/// integers that overflow a long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    digits: String,
}

impl BigInt {
    /// Parse decimal integer text (optional sign, ASCII digits)
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::BigInt;
    ///
    /// let n = BigInt::parse("-000123").unwrap();
    /// assert_eq!(n.to_string(), "-123");
    /// assert_eq!(n.digits(), "123");
    /// assert!(BigInt::parse("12a").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, body) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = body.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Some(Self {
            negative: negative && digits != "0",
            digits: digits.to_owned(),
        })
    }

    /// Decimal digits without the sign
    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Narrow to a long when the value fits
    pub fn to_i64(&self) -> Option<i64> {
        self.to_string().parse().ok()
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        Self {
            negative: value < 0,
            digits: value.unsigned_abs().to_string(),
        }
    }
}

impl std::fmt::Display for BigInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            write!(f, "-{}", self.digits)
        } else {
            f.write_str(&self.digits)
        }
    }
}

// ============================================================================
// Concrete collection representations
// ============================================================================

/// Concrete sequential representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqRepr {
    /// Reader output for `[...]`
    Vector,
    /// Reader output for `(...)`
    List,
    /// Host-built list handed to the engine
    ArrayList,
}

/// Concrete set representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetRepr {
    /// Reader output for `#{...}`
    PersistentHashSet,
    /// Engine-side mutable set (entity cardinality-many values, query results)
    HashSet,
}

/// Concrete map representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapRepr {
    /// Reader output for map literals with at most 8 entries
    ArrayMap,
    /// Reader output for larger map literals
    HashMap,
    /// Host-built map handed to the engine
    JavaMap,
}

/// Map literals above this many entries read as `PersistentHashMap`
pub const ARRAY_MAP_THRESHOLD: usize = 8;

// ============================================================================
// Engine records
// ============================================================================

/// Change-log entry: the engine's atomic fact tuple
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct Datom {
    pub e: ForeignValue,
    pub a: ForeignValue,
    pub v: ForeignValue,
    pub tx: ForeignValue,
    pub added: bool,
}

/// Placeholder entity id, resolved to a real id after commit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TempId {
    partition: Keyword,
    idx: Option<i64>,
}

impl TempId {
    /// Temp id with an explicit index (e.g. `-1000001`)
    pub fn new(partition: Keyword, idx: i64) -> Self {
        Self {
            partition,
            idx: Some(idx),
        }
    }

    /// Temp id the engine numbers itself on commit
    pub fn fresh(partition: Keyword) -> Self {
        Self {
            partition,
            idx: None,
        }
    }

    pub fn partition(&self) -> &Keyword {
        &self.partition
    }

    pub fn idx(&self) -> Option<i64> {
        self.idx
    }
}

// ============================================================================
// ForeignValue
// ============================================================================

/// A value in the engine's data model
#[derive(Debug, Clone)]
pub enum ForeignValue {
    Nil,
    Boolean(bool),
    Long(i64),
    BigInt(BigInt),
    Double(f64),
    /// Arbitrary-precision decimal, kept as its literal text (no `M` suffix)
    BigDecimal(String),
    String(String),
    Char(char),
    Keyword(Keyword),
    Symbol(Symbol),
    Seq(SeqRepr, Vec<ForeignValue>),
    Set(SetRepr, Vec<ForeignValue>),
    Map(MapRepr, Vec<(ForeignValue, ForeignValue)>),
    Datom(Box<Datom>),
    TempId(TempId),
    Uuid(Uuid),
    /// Instant, kept as its RFC 3339 literal text
    Inst(String),
}

impl ForeignValue {
    /// Runtime class name reported by the engine, `None` for nil
    pub fn class_name(&self) -> Option<&'static str> {
        let name = match self {
            ForeignValue::Nil => return None,
            ForeignValue::Boolean(_) => "java.lang.Boolean",
            ForeignValue::Long(_) => "java.lang.Long",
            ForeignValue::BigInt(_) => "clojure.lang.BigInt",
            ForeignValue::Double(_) => "java.lang.Double",
            ForeignValue::BigDecimal(_) => "java.math.BigDecimal",
            ForeignValue::String(_) => "java.lang.String",
            ForeignValue::Char(_) => "java.lang.Character",
            ForeignValue::Keyword(_) => "clojure.lang.Keyword",
            ForeignValue::Symbol(_) => "clojure.lang.Symbol",
            ForeignValue::Seq(SeqRepr::Vector, _) => "clojure.lang.PersistentVector",
            ForeignValue::Seq(SeqRepr::List, _) => "clojure.lang.PersistentList",
            ForeignValue::Seq(SeqRepr::ArrayList, _) => "java.util.ArrayList",
            ForeignValue::Set(SetRepr::PersistentHashSet, _) => "clojure.lang.PersistentHashSet",
            ForeignValue::Set(SetRepr::HashSet, _) => "java.util.HashSet",
            ForeignValue::Map(MapRepr::ArrayMap, _) => "clojure.lang.PersistentArrayMap",
            ForeignValue::Map(MapRepr::HashMap, _) => "clojure.lang.PersistentHashMap",
            ForeignValue::Map(MapRepr::JavaMap, _) => "java.util.HashMap",
            ForeignValue::Datom(_) => "datomic.db.Datum",
            ForeignValue::TempId(_) => "datomic.db.DbId",
            ForeignValue::Uuid(_) => "java.util.UUID",
            ForeignValue::Inst(_) => "java.util.Date",
        };
        Some(name)
    }

    // ------------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------------

    /// Keyword value from its textual form, or a plain string when the text
    /// is not keyword syntax
    pub fn keyword_or_string(text: &str) -> Self {
        match Keyword::parse(text) {
            Some(kw) => ForeignValue::Keyword(kw),
            None => ForeignValue::String(text.to_owned()),
        }
    }

    pub fn keyword(name: impl Into<String>) -> Self {
        ForeignValue::Keyword(Keyword::new(name))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        ForeignValue::Symbol(Symbol::new(name))
    }

    pub fn vector(items: Vec<ForeignValue>) -> Self {
        ForeignValue::Seq(SeqRepr::Vector, items)
    }

    pub fn list(items: Vec<ForeignValue>) -> Self {
        ForeignValue::Seq(SeqRepr::List, items)
    }

    pub fn array_list(items: Vec<ForeignValue>) -> Self {
        ForeignValue::Seq(SeqRepr::ArrayList, items)
    }

    pub fn set(items: Vec<ForeignValue>) -> Self {
        ForeignValue::Set(SetRepr::PersistentHashSet, items)
    }

    pub fn hash_set(items: Vec<ForeignValue>) -> Self {
        ForeignValue::Set(SetRepr::HashSet, items)
    }

    /// Persistent map, picking the representation by entry count as the
    /// engine's reader does
    pub fn map(entries: Vec<(ForeignValue, ForeignValue)>) -> Self {
        let repr = if entries.len() <= ARRAY_MAP_THRESHOLD {
            MapRepr::ArrayMap
        } else {
            MapRepr::HashMap
        };
        ForeignValue::Map(repr, entries)
    }

    /// Host-built associative structure from an alternating key/value sequence
    ///
    /// A trailing unpaired key is dropped; callers always flatten whole pairs.
    pub fn java_map_from_kvs(kvs: Vec<ForeignValue>) -> Self {
        let mut entries = Vec::with_capacity(kvs.len() / 2);
        let mut iter = kvs.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            entries.push((key, value));
        }
        ForeignValue::Map(MapRepr::JavaMap, entries)
    }

    pub fn datom(e: ForeignValue, a: ForeignValue, v: ForeignValue, tx: ForeignValue, added: bool) -> Self {
        ForeignValue::Datom(Box::new(Datom { e, a, v, tx, added }))
    }

    // ------------------------------------------------------------------------
    // Capability accessors (used by conversion after classification)
    // ------------------------------------------------------------------------

    pub fn is_nil(&self) -> bool {
        matches!(self, ForeignValue::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ForeignValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ForeignValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Raw decimal digits (with sign) of an integer value
    pub fn integer_text(&self) -> Option<String> {
        match self {
            ForeignValue::Long(n) => Some(n.to_string()),
            ForeignValue::BigInt(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Enumerable elements of a sequential or set value
    pub fn elements(&self) -> Option<&[ForeignValue]> {
        match self {
            ForeignValue::Seq(_, items) | ForeignValue::Set(_, items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Entries of a map value, in enumeration order
    pub fn entries(&self) -> Option<&[(ForeignValue, ForeignValue)]> {
        match self {
            ForeignValue::Map(_, entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    pub fn as_datom(&self) -> Option<&Datom> {
        match self {
            ForeignValue::Datom(datom) => Some(datom.as_ref()),
            _ => None,
        }
    }

    /// Look up a map entry by key (engine equality)
    pub fn get(&self, key: &ForeignValue) -> Option<&ForeignValue> {
        self.entries()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl PartialEq for ForeignValue {
    fn eq(&self, other: &Self) -> bool {
        use ForeignValue::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Long(a), BigInt(b)) | (BigInt(b), Long(a)) => b.to_i64() == Some(*a),
            (BigInt(a), BigInt(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (BigDecimal(a), BigDecimal(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (Keyword(a), Keyword(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (Seq(_, a), Seq(_, b)) => a == b,
            (Set(_, a), Set(_, b)) => same_elements(a, b),
            (Map(_, a), Map(_, b)) => same_elements(a, b),
            (Datom(a), Datom(b)) => a == b,
            (TempId(a), TempId(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Inst(a), Inst(b)) => a == b,
            _ => false,
        }
    }
}

impl Hash for ForeignValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use ForeignValue::*;
        match self {
            Nil => state.write_u8(0),
            Boolean(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            Long(n) => {
                state.write_u8(2);
                n.hash(state);
            }
            // A BigInt that fits a long must hash like that long
            BigInt(n) => match n.to_i64() {
                Some(small) => {
                    state.write_u8(2);
                    small.hash(state);
                }
                None => {
                    state.write_u8(3);
                    n.hash(state);
                }
            },
            Double(d) => {
                state.write_u8(4);
                // 0.0 == -0.0
                let bits = if *d == 0.0 { 0 } else { d.to_bits() };
                bits.hash(state);
            }
            BigDecimal(s) => {
                state.write_u8(5);
                s.hash(state);
            }
            String(s) => {
                state.write_u8(6);
                s.hash(state);
            }
            Char(c) => {
                state.write_u8(7);
                c.hash(state);
            }
            Keyword(kw) => {
                state.write_u8(8);
                kw.hash(state);
            }
            Symbol(sym) => {
                state.write_u8(9);
                sym.hash(state);
            }
            Seq(_, items) => {
                state.write_u8(10);
                items.hash(state);
            }
            Set(_, items) => {
                state.write_u8(11);
                unordered_hash(items, state);
            }
            Map(_, entries) => {
                state.write_u8(12);
                unordered_hash(entries, state);
            }
            Datom(datom) => {
                state.write_u8(13);
                datom.hash(state);
            }
            TempId(id) => {
                state.write_u8(14);
                id.hash(state);
            }
            Uuid(uuid) => {
                state.write_u8(15);
                uuid.hash(state);
            }
            Inst(text) => {
                state.write_u8(16);
                text.hash(state);
            }
        }
    }
}

/// Standalone hash of one value
pub(crate) fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Commutative combination of element hashes
fn unordered_hash<T: Hash, H: Hasher>(items: &[T], state: &mut H) {
    state.write_usize(items.len());
    let combined = items
        .iter()
        .fold(0u64, |acc, item| acc.wrapping_add(hash_one(item)));
    state.write_u64(combined);
}

/// Order-free multiset comparison
///
/// Elements of `b` are bucketed by hash so each element of `a` is only
/// compared against candidates with the same hash.
fn same_elements<T: PartialEq + Hash>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut buckets: HashMap<u64, Vec<&T>> = HashMap::with_capacity(b.len());
    for y in b {
        buckets.entry(hash_one(y)).or_default().push(y);
    }
    a.iter().all(|x| {
        let Some(bucket) = buckets.get_mut(&hash_one(x)) else {
            return false;
        };
        match bucket.iter().position(|y| x == *y) {
            Some(i) => {
                bucket.swap_remove(i);
                true
            }
            None => false,
        }
    })
}

impl From<Keyword> for ForeignValue {
    fn from(kw: Keyword) -> Self {
        ForeignValue::Keyword(kw)
    }
}

impl From<TempId> for ForeignValue {
    fn from(id: TempId) -> Self {
        ForeignValue::TempId(id)
    }
}

impl From<&str> for ForeignValue {
    fn from(s: &str) -> Self {
        ForeignValue::String(s.to_owned())
    }
}

impl From<i64> for ForeignValue {
    fn from(n: i64) -> Self {
        ForeignValue::Long(n)
    }
}

impl From<bool> for ForeignValue {
    fn from(b: bool) -> Self {
        ForeignValue::Boolean(b)
    }
}
