//! Recursive-descent parser for literal notation

use std::collections::HashMap;

use uuid::Uuid;

use super::ReadError;
use crate::models::value::hash_one;
use crate::models::{BigInt, ForeignValue, Keyword, Symbol, TempId};

/// Characters that end a token
fn is_terminator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' | '\\')
}

pub(super) struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Nesting levels still available
    depth_budget: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(src: &'a str, depth_limit: usize) -> Self {
        Self {
            src,
            pos: 0,
            depth_budget: depth_limit,
        }
    }

    pub(super) fn offset(&self) -> usize {
        self.pos
    }

    /// Skip ignorable input and report whether nothing but it remains
    pub(super) fn at_end(&mut self) -> Result<bool, ReadError> {
        self.skip_ignorable()?;
        Ok(self.peek().is_none())
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eof(&self) -> ReadError {
        ReadError::UnexpectedEof { offset: self.pos }
    }

    /// Run `f` one nesting level deeper, failing once the budget is spent
    fn nested<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ReadError>,
    ) -> Result<T, ReadError> {
        if self.depth_budget == 0 {
            return Err(ReadError::DepthLimitExceeded { offset });
        }
        self.depth_budget -= 1;
        let result = f(self);
        self.depth_budget += 1;
        result
    }

    /// Skip whitespace, commas, `;` comments and `#_` discarded forms
    fn skip_ignorable(&mut self) -> Result<(), ReadError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == ',' => {
                    self.bump();
                }
                Some(';') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('#') if self.rest().starts_with("#_") => {
                    let start = self.pos;
                    self.nested(start, |p| {
                        p.pos += 2;
                        p.skip_ignorable()?;
                        if p.peek().is_none() {
                            return Err(p.eof());
                        }
                        p.parse_form().map(drop)
                    })?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Take characters up to the next terminator
    fn take_token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_terminator(c) {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos]
    }

    pub(super) fn parse_form(&mut self) -> Result<ForeignValue, ReadError> {
        self.skip_ignorable()?;
        let start = self.pos;
        let c = self.peek().ok_or_else(|| self.eof())?;
        match c {
            '(' => self.nested(start, |p| {
                p.bump();
                Ok(ForeignValue::list(p.parse_until(')')?))
            }),
            '[' => self.nested(start, |p| {
                p.bump();
                Ok(ForeignValue::vector(p.parse_until(']')?))
            }),
            '{' => self.nested(start, |p| {
                p.bump();
                p.parse_map(start)
            }),
            ')' | ']' | '}' => Err(ReadError::UnmatchedDelimiter {
                found: c,
                offset: start,
            }),
            '"' => {
                self.bump();
                self.parse_string().map(ForeignValue::String)
            }
            '\\' => {
                self.bump();
                self.parse_char(start)
            }
            '#' => {
                self.bump();
                self.parse_dispatch(start)
            }
            _ => {
                let token = self.take_token();
                if token.is_empty() {
                    return Err(ReadError::UnexpectedChar {
                        found: c,
                        offset: start,
                    });
                }
                parse_token(token, start)
            }
        }
    }

    /// Parse forms until the closing delimiter, consuming it
    fn parse_until(&mut self, close: char) -> Result<Vec<ForeignValue>, ReadError> {
        let mut items = Vec::new();
        loop {
            self.skip_ignorable()?;
            match self.peek() {
                None => return Err(self.eof()),
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                Some(c @ (')' | ']' | '}')) => {
                    return Err(ReadError::UnmatchedDelimiter {
                        found: c,
                        offset: self.pos,
                    })
                }
                Some(_) => items.push(self.parse_form()?),
            }
        }
    }

    fn parse_map(&mut self, start: usize) -> Result<ForeignValue, ReadError> {
        let forms = self.parse_until('}')?;
        if forms.len() % 2 != 0 {
            return Err(ReadError::OddMapEntries { offset: start });
        }
        let mut entries: Vec<(ForeignValue, ForeignValue)> = Vec::with_capacity(forms.len() / 2);
        let mut iter = forms.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            entries.push((key, value));
        }
        if let Some(key) = first_duplicate(entries.iter().map(|(k, _)| k)) {
            return Err(ReadError::DuplicateKey {
                key: key.to_edn(),
                offset: start,
            });
        }
        Ok(ForeignValue::map(entries))
    }

    fn parse_set(&mut self, start: usize) -> Result<ForeignValue, ReadError> {
        let items = self.parse_until('}')?;
        if let Some(item) = first_duplicate(items.iter()) {
            return Err(ReadError::DuplicateKey {
                key: item.to_edn(),
                offset: start,
            });
        }
        Ok(ForeignValue::set(items))
    }

    fn parse_string(&mut self) -> Result<String, ReadError> {
        let mut out = String::new();
        loop {
            let escape_at = self.pos;
            match self.bump().ok_or_else(|| self.eof())? {
                '"' => return Ok(out),
                '\\' => {
                    let c = self.bump().ok_or_else(|| self.eof())?;
                    match c {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'u' => {
                            let hex = self.rest().get(..4).ok_or_else(|| self.eof())?;
                            match decode_hex4(hex) {
                                Some(ch) => {
                                    out.push(ch);
                                    self.pos += 4;
                                }
                                None => {
                                    return Err(ReadError::InvalidEscape {
                                        found: format!("u{}", hex),
                                        offset: escape_at,
                                    })
                                }
                            }
                        }
                        other => {
                            return Err(ReadError::InvalidEscape {
                                found: other.to_string(),
                                offset: escape_at,
                            })
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn parse_char(&mut self, start: usize) -> Result<ForeignValue, ReadError> {
        // The first character is taken even when it is a delimiter, e.g. `\(`
        let first = self.bump().ok_or_else(|| self.eof())?;
        let tail = self.take_token();
        if tail.is_empty() {
            return Ok(ForeignValue::Char(first));
        }
        let name = &self.src[start + 1..self.pos];
        let c = match name {
            "newline" => '\n',
            "space" => ' ',
            "tab" => '\t',
            "return" => '\r',
            "backspace" => '\u{8}',
            "formfeed" => '\u{c}',
            _ => name
                .strip_prefix('u')
                .and_then(decode_hex4)
                .ok_or_else(|| ReadError::InvalidToken {
                    text: format!("\\{}", name),
                    offset: start,
                })?,
        };
        Ok(ForeignValue::Char(c))
    }

    /// Everything after `#`: sets, symbolic values and tagged literals
    fn parse_dispatch(&mut self, start: usize) -> Result<ForeignValue, ReadError> {
        match self.peek() {
            None => Err(self.eof()),
            Some('{') => self.nested(start, |p| {
                p.bump();
                p.parse_set(start)
            }),
            Some('#') => {
                self.bump();
                match self.take_token() {
                    "Inf" => Ok(ForeignValue::Double(f64::INFINITY)),
                    "-Inf" => Ok(ForeignValue::Double(f64::NEG_INFINITY)),
                    "NaN" => Ok(ForeignValue::Double(f64::NAN)),
                    other => Err(ReadError::InvalidToken {
                        text: format!("##{}", other),
                        offset: start,
                    }),
                }
            }
            Some(c) => self.nested(start, |p| {
                let tag_text = p.take_token();
                let tag = Symbol::parse(tag_text).ok_or(ReadError::UnexpectedChar {
                    found: c,
                    offset: start + 1,
                })?;
                if p.at_end()? {
                    return Err(p.eof());
                }
                let payload = p.parse_form()?;
                read_tagged(&tag, payload, start)
            }),
        }
    }
}

/// First value equal to an earlier one, found by bucketing on hash
fn first_duplicate<'v>(values: impl Iterator<Item = &'v ForeignValue>) -> Option<&'v ForeignValue> {
    let mut seen: HashMap<u64, Vec<&ForeignValue>> = HashMap::new();
    for value in values {
        let bucket = seen.entry(hash_one(value)).or_default();
        if bucket.iter().any(|earlier| *earlier == value) {
            return Some(value);
        }
        bucket.push(value);
    }
    None
}

// ============================================================================
// Tokens
// ============================================================================

/// Exactly four ASCII hex digits naming a scalar value
fn decode_hex4(hex: &str) -> Option<char> {
    if hex.len() != 4 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

fn parse_token(token: &str, offset: usize) -> Result<ForeignValue, ReadError> {
    match token {
        "nil" => return Ok(ForeignValue::Nil),
        "true" => return Ok(ForeignValue::Boolean(true)),
        "false" => return Ok(ForeignValue::Boolean(false)),
        _ => {}
    }

    let mut chars = token.chars();
    let first = chars.next();
    let second = chars.next();
    let numeric = match (first, second) {
        (Some(c), _) if c.is_ascii_digit() => true,
        (Some('+' | '-'), Some(c)) => c.is_ascii_digit(),
        _ => false,
    };
    if numeric {
        return parse_number(token, offset);
    }

    if token.starts_with(':') {
        return Keyword::parse(token)
            .map(ForeignValue::Keyword)
            .ok_or_else(|| ReadError::InvalidToken {
                text: token.to_owned(),
                offset,
            });
    }

    Symbol::parse(token)
        .map(ForeignValue::Symbol)
        .ok_or_else(|| ReadError::InvalidToken {
            text: token.to_owned(),
            offset,
        })
}

/// Validate `[+-]? digits ( . digits* )? ( [eE] [+-]? digits )?`
///
/// Returns whether the text has a fractional or exponent part.
fn scan_decimal(text: &str) -> Option<bool> {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = &text[int_start..i];
    if int_digits.is_empty() {
        return None;
    }
    let mut floating = false;
    if i < bytes.len() && bytes[i] == b'.' {
        floating = true;
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        floating = true;
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }
    if i != bytes.len() {
        return None;
    }
    // Leading zeros are only allowed on "0" itself and on decimals
    if !floating && int_digits.len() > 1 && int_digits.starts_with('0') {
        return None;
    }
    Some(floating)
}

fn parse_number(token: &str, offset: usize) -> Result<ForeignValue, ReadError> {
    let invalid = || ReadError::InvalidNumber {
        text: token.to_owned(),
        offset,
    };
    let (body, suffix) = match token.as_bytes().last() {
        Some(b'N') => (&token[..token.len() - 1], Some('N')),
        Some(b'M') => (&token[..token.len() - 1], Some('M')),
        _ => (token, None),
    };
    let floating = scan_decimal(body).ok_or_else(invalid)?;

    match suffix {
        Some('M') => Ok(ForeignValue::BigDecimal(body.trim_start_matches('+').to_owned())),
        Some(_) if floating => Err(invalid()),
        Some(_) => BigInt::parse(body).map(ForeignValue::BigInt).ok_or_else(invalid),
        None if floating => {
            // "1." and "1.e5" are valid literals; give the float parser a digit after the dot
            let normalized = match body.find('.') {
                Some(dot) if !body[dot + 1..].starts_with(|c: char| c.is_ascii_digit()) => {
                    format!("{}0{}", &body[..=dot], &body[dot + 1..])
                }
                _ => body.to_owned(),
            };
            normalized
                .parse::<f64>()
                .map(ForeignValue::Double)
                .map_err(|_| invalid())
        }
        None => match body.parse::<i64>() {
            Ok(n) => Ok(ForeignValue::Long(n)),
            // Overflowing integers are promoted, never truncated
            Err(_) => BigInt::parse(body).map(ForeignValue::BigInt).ok_or_else(invalid),
        },
    }
}

// ============================================================================
// Tagged literals
// ============================================================================

fn read_tagged(tag: &Symbol, payload: ForeignValue, offset: usize) -> Result<ForeignValue, ReadError> {
    let tag_name = tag.to_string();
    let invalid = |reason: &str| ReadError::InvalidTagged {
        tag: tag_name.clone(),
        offset,
        reason: reason.to_owned(),
    };

    match tag_name.as_str() {
        "inst" => match payload {
            ForeignValue::String(text) if looks_like_instant(&text) => Ok(ForeignValue::Inst(text)),
            _ => Err(invalid("expected an RFC 3339 timestamp string")),
        },
        "uuid" => match payload {
            ForeignValue::String(text) => Uuid::parse_str(&text)
                .map(ForeignValue::Uuid)
                .map_err(|e| invalid(&e.to_string())),
            _ => Err(invalid("expected a string")),
        },
        "db/id" => match payload.elements() {
            Some([ForeignValue::Keyword(part)]) => Ok(TempId::fresh(part.clone()).into()),
            Some([ForeignValue::Keyword(part), ForeignValue::Long(idx)]) => {
                Ok(TempId::new(part.clone(), *idx).into())
            }
            _ => Err(invalid("expected [partition] or [partition idx]")),
        },
        "datom" => match payload {
            ForeignValue::Seq(_, items) if items.len() == 5 => {
                let mut fields = items.into_iter();
                match (fields.next(), fields.next(), fields.next(), fields.next(), fields.next()) {
                    (Some(e), Some(a), Some(v), Some(tx), Some(ForeignValue::Boolean(added))) => {
                        Ok(ForeignValue::datom(e, a, v, tx, added))
                    }
                    _ => Err(invalid("the added flag must be a boolean")),
                }
            }
            _ => Err(invalid("expected [e a v tx added]")),
        },
        _ => Err(ReadError::UnknownTag {
            tag: tag_name.clone(),
            offset,
        }),
    }
}

fn looks_like_instant(text: &str) -> bool {
    text.len() >= 4 && text.as_bytes()[..4].iter().all(u8::is_ascii_digit)
}
