//! Textual renderings of foreign values
//!
//! Two renderings exist, mirroring the engine:
//!
//! - **Display** (`to_string`): the runtime's own string form. Persistent
//!   collections render in literal notation, host-built collections render
//!   the way the host collection classes do (`[1, 2]`, `{k=v}`), and
//!   strings render raw.
//! - **Literal notation** ([`ForeignValue::to_edn`]): always readable back
//!   by [`crate::reader`], producing an equal value.

use std::fmt::{self, Write};

use super::value::{Datom, ForeignValue, MapRepr, SeqRepr, SetRepr, TempId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Literal,
    Display,
}

impl ForeignValue {
    /// Render in readable literal notation
    ///
    /// # Example
    /// ```
    /// use ednbridge_core::reader;
    ///
    /// let value = reader::read(r#"{:name "ahab" :ranks #{1 2N}}"#).unwrap();
    /// assert_eq!(value.to_edn(), r#"{:name "ahab", :ranks #{1 2N}}"#);
    /// assert_eq!(reader::read(&value.to_edn()).unwrap(), value);
    /// ```
    pub fn to_edn(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = write_value(&mut out, self, Mode::Literal);
        out
    }
}

impl fmt::Display for ForeignValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, Mode::Display)
    }
}

fn write_value<W: Write>(out: &mut W, value: &ForeignValue, mode: Mode) -> fmt::Result {
    match value {
        ForeignValue::Nil => match mode {
            Mode::Literal => out.write_str("nil"),
            Mode::Display => out.write_str("null"),
        },
        ForeignValue::Boolean(b) => write!(out, "{}", b),
        ForeignValue::Long(n) => write!(out, "{}", n),
        ForeignValue::BigInt(n) => match mode {
            Mode::Literal => write!(out, "{}N", n),
            Mode::Display => write!(out, "{}", n),
        },
        ForeignValue::Double(d) => write_double(out, *d, mode),
        ForeignValue::BigDecimal(text) => match mode {
            Mode::Literal => write!(out, "{}M", text),
            Mode::Display => out.write_str(text),
        },
        ForeignValue::String(s) => match mode {
            Mode::Literal => write_string_literal(out, s),
            Mode::Display => out.write_str(s),
        },
        ForeignValue::Char(c) => match mode {
            Mode::Literal => write_char_literal(out, *c),
            Mode::Display => out.write_char(*c),
        },
        ForeignValue::Keyword(kw) => write!(out, "{}", kw),
        ForeignValue::Symbol(sym) => write!(out, "{}", sym),
        ForeignValue::Seq(repr, items) => match (repr, mode) {
            (SeqRepr::ArrayList, Mode::Display) => write_host_seq(out, items),
            (SeqRepr::List, _) => write_seq(out, "(", ")", items),
            _ => write_seq(out, "[", "]", items),
        },
        ForeignValue::Set(repr, items) => match (repr, mode) {
            (SetRepr::HashSet, Mode::Display) => write_host_seq(out, items),
            _ => write_seq(out, "#{", "}", items),
        },
        ForeignValue::Map(repr, entries) => match (repr, mode) {
            (MapRepr::JavaMap, Mode::Display) => write_host_map(out, entries),
            _ => write_map(out, entries),
        },
        ForeignValue::Datom(datom) => write_datom(out, datom, mode),
        ForeignValue::TempId(id) => write_tempid(out, id, mode),
        ForeignValue::Uuid(uuid) => match mode {
            Mode::Literal => write!(out, "#uuid \"{}\"", uuid.hyphenated()),
            Mode::Display => write!(out, "{}", uuid.hyphenated()),
        },
        ForeignValue::Inst(text) => match mode {
            Mode::Literal => write!(out, "#inst \"{}\"", text),
            Mode::Display => out.write_str(text),
        },
    }
}

fn write_double<W: Write>(out: &mut W, d: f64, mode: Mode) -> fmt::Result {
    if d.is_finite() {
        // Debug keeps the fractional part ("1.0"), so the text reads back as a double
        return write!(out, "{:?}", d);
    }
    let text = match (mode, d.is_nan(), d.is_sign_positive()) {
        (Mode::Literal, true, _) => "##NaN",
        (Mode::Literal, false, true) => "##Inf",
        (Mode::Literal, false, false) => "##-Inf",
        (Mode::Display, true, _) => "NaN",
        (Mode::Display, false, true) => "Infinity",
        (Mode::Display, false, false) => "-Infinity",
    };
    out.write_str(text)
}

fn write_string_literal<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

fn write_char_literal<W: Write>(out: &mut W, c: char) -> fmt::Result {
    match c {
        '\n' => out.write_str("\\newline"),
        ' ' => out.write_str("\\space"),
        '\t' => out.write_str("\\tab"),
        '\r' => out.write_str("\\return"),
        '\u{8}' => out.write_str("\\backspace"),
        '\u{c}' => out.write_str("\\formfeed"),
        c if c.is_control() => write!(out, "\\u{:04x}", c as u32),
        c => write!(out, "\\{}", c),
    }
}

fn write_seq<W: Write>(out: &mut W, open: &str, close: &str, items: &[ForeignValue]) -> fmt::Result {
    out.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_char(' ')?;
        }
        write_value(out, item, Mode::Literal)?;
    }
    out.write_str(close)
}

fn write_map<W: Write>(out: &mut W, entries: &[(ForeignValue, ForeignValue)]) -> fmt::Result {
    out.write_char('{')?;
    for (i, (k, v)) in entries.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_value(out, k, Mode::Literal)?;
        out.write_char(' ')?;
        write_value(out, v, Mode::Literal)?;
    }
    out.write_char('}')
}

fn write_host_seq<W: Write>(out: &mut W, items: &[ForeignValue]) -> fmt::Result {
    out.write_char('[')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_value(out, item, Mode::Display)?;
    }
    out.write_char(']')
}

fn write_host_map<W: Write>(out: &mut W, entries: &[(ForeignValue, ForeignValue)]) -> fmt::Result {
    out.write_char('{')?;
    for (i, (k, v)) in entries.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_value(out, k, Mode::Display)?;
        out.write_char('=')?;
        write_value(out, v, Mode::Display)?;
    }
    out.write_char('}')
}

fn write_datom<W: Write>(out: &mut W, datom: &Datom, mode: Mode) -> fmt::Result {
    out.write_str(match mode {
        Mode::Literal => "#datom [",
        Mode::Display => "#datom[",
    })?;
    for field in [&datom.e, &datom.a, &datom.v, &datom.tx] {
        write_value(out, field, Mode::Literal)?;
        out.write_char(' ')?;
    }
    write!(out, "{}]", datom.added)
}

fn write_tempid<W: Write>(out: &mut W, id: &TempId, mode: Mode) -> fmt::Result {
    out.write_str(match mode {
        Mode::Literal => "#db/id [",
        Mode::Display => "#db/id[",
    })?;
    write!(out, "{}", id.partition())?;
    if let Some(idx) = id.idx() {
        write!(out, " {}", idx)?;
    }
    out.write_char(']')
}
