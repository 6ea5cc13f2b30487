//! ForeignToHost
//!
//! Classification first, then an exhaustive match on the kind. The
//! concrete representation is only consulted through capability accessors,
//! so a value whose class maps to a kind it cannot serve degrades to the
//! sentinel like any other unknown leaf.

use serde_json::{Map, Number};
use tracing::{debug, warn};

use super::report::{ConversionReport, DiagnosticKind};
use super::Converter;
use crate::classify::ForeignKind;
use crate::models::{Datom, ForeignValue, HostValue};

impl Converter {
    /// Convert a foreign value to a host value
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::{reader, Converter};
    /// use serde_json::json;
    ///
    /// let converter = Converter::new();
    /// let value = reader::read("{:foo 99 :bar {:baz 88}}").unwrap();
    /// assert_eq!(converter.to_host(&value), json!({":foo": 99, ":bar": {":baz": 88}}));
    ///
    /// let wide = reader::read("1234567890123456789").unwrap();
    /// assert_eq!(converter.to_host(&wide), json!("1234567890123456789"));
    /// ```
    pub fn to_host(&self, value: &ForeignValue) -> HostValue {
        self.to_host_with_report(value).0
    }

    /// Convert and collect every degradation, widening and key collision
    pub fn to_host_with_report(&self, value: &ForeignValue) -> (HostValue, ConversionReport) {
        let mut walker = Walker {
            converter: self,
            path: String::from("$"),
            depth: 0,
            report: ConversionReport::default(),
        };
        let host = walker.convert(value);
        (host, walker.report)
    }
}

/// Recursive walk carrying the current path for diagnostics
struct Walker<'a> {
    converter: &'a Converter,
    path: String,
    /// Collections entered above the current value
    depth: usize,
    report: ConversionReport,
}

impl Walker<'_> {
    fn convert(&mut self, value: &ForeignValue) -> HostValue {
        match self.converter.classifier().classify(value) {
            ForeignKind::Nil => HostValue::Null,
            ForeignKind::Set | ForeignKind::Vector => match value.elements() {
                Some(items) => self.descend(|w| w.convert_items(items)),
                None => self.unknown(value),
            },
            ForeignKind::Map => match value.entries() {
                Some(entries) => self.descend(|w| w.convert_entries(entries)),
                None => self.unknown(value),
            },
            ForeignKind::Keyword | ForeignKind::Symbol => HostValue::String(value.to_string()),
            ForeignKind::String => match value {
                ForeignValue::String(s) => HostValue::String(s.clone()),
                other => HostValue::String(other.to_string()),
            },
            ForeignKind::Long => match value.integer_text() {
                Some(text) => self.integer(text),
                None => self.unknown(value),
            },
            ForeignKind::Double => match value.as_f64() {
                Some(d) => match Number::from_f64(d) {
                    Some(n) => HostValue::Number(n),
                    None => self.non_finite(value),
                },
                None => self.unknown(value),
            },
            ForeignKind::Bool => match value.as_bool() {
                Some(b) => HostValue::Bool(b),
                None => self.unknown(value),
            },
            ForeignKind::Record => match value.as_datom() {
                Some(datom) => self.descend(|w| w.convert_datom(datom)),
                None => self.unknown(value),
            },
            ForeignKind::Unknown => self.unknown(value),
        }
    }

    /// Convert a collection's members, or degrade the collection once the
    /// depth limit is reached
    fn descend(&mut self, members: impl FnOnce(&mut Self) -> HostValue) -> HostValue {
        let limit = self.converter.config().max_depth;
        if self.depth >= limit {
            warn!(path = %self.path, limit, "Nesting exceeds the depth limit; emitting sentinel");
            self.report
                .push(self.path.clone(), DiagnosticKind::DepthLimitExceeded { limit });
            return self.sentinel();
        }
        self.depth += 1;
        let host = members(self);
        self.depth -= 1;
        host
    }

    fn child(&mut self, segment: &str, value: &ForeignValue) -> HostValue {
        let len = self.path.len();
        self.path.push_str(segment);
        let host = self.convert(value);
        self.path.truncate(len);
        host
    }

    fn convert_items(&mut self, items: &[ForeignValue]) -> HostValue {
        HostValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| self.child(&format!("[{}]", i), item))
                .collect(),
        )
    }

    fn convert_entries(&mut self, entries: &[(ForeignValue, ForeignValue)]) -> HostValue {
        let mut object = Map::with_capacity(entries.len());
        for (i, (key, value)) in entries.iter().enumerate() {
            let key = object_key(self.child(&format!("{{{}}}", i), key));
            let value = self.child(&format!(".{}", key), value);
            if object.insert(key.clone(), value).is_some() {
                warn!(path = %self.path, key = %key, "Map keys collide after string coercion; keeping last entry");
                self.report
                    .push(self.path.clone(), DiagnosticKind::KeyCollision { key });
            }
        }
        HostValue::Object(object)
    }

    fn convert_datom(&mut self, datom: &Datom) -> HostValue {
        let added = ForeignValue::Boolean(datom.added);
        let fields = [&datom.e, &datom.a, &datom.v, &datom.tx, &added];
        HostValue::Array(
            fields
                .iter()
                .enumerate()
                .map(|(i, field)| self.child(&format!("[{}]", i), field))
                .collect(),
        )
    }

    /// Integers wider than the configured digit count travel as strings
    fn integer(&mut self, text: String) -> HostValue {
        let digits = text.trim_start_matches('-').len();
        if digits > self.converter.config().max_safe_digits {
            debug!(path = %self.path, digits, "Widening integer to string");
            self.report
                .push(self.path.clone(), DiagnosticKind::PrecisionWidened { digits });
            return HostValue::String(text);
        }
        match text.parse::<i64>() {
            Ok(n) => HostValue::Number(n.into()),
            Err(_) => HostValue::String(text),
        }
    }

    fn unknown(&mut self, value: &ForeignValue) -> HostValue {
        let class = value.class_name().unwrap_or("nil");
        warn!(path = %self.path, class, "Unrecognized foreign type; emitting sentinel");
        self.report.push(
            self.path.clone(),
            DiagnosticKind::UnrecognizedType {
                class: class.to_string(),
            },
        );
        self.sentinel()
    }

    fn non_finite(&mut self, value: &ForeignValue) -> HostValue {
        let text = value.to_string();
        warn!(path = %self.path, value = %text, "Non-finite double has no host form; emitting sentinel");
        self.report
            .push(self.path.clone(), DiagnosticKind::NonFiniteNumber { value: text });
        self.sentinel()
    }

    fn sentinel(&self) -> HostValue {
        HostValue::String(self.converter.config().unknown_sentinel.clone())
    }
}

/// Object key for an already-converted map key
fn object_key(key: HostValue) -> String {
    match key {
        HostValue::String(s) => s,
        HostValue::Null => "null".to_string(),
        other => other.to_string(),
    }
}
