//! Textual reader bridge
//!
//! Parses the engine's human-readable literal notation into foreign values.
//! Used both to materialize literals directly and to let the engine's own
//! number grammar decide long-vs-double when host numbers cross over.
//!
//! # Critical Invariants
//!
//! - Pure: the same text always yields an equal value
//! - Unparsable text is a hard error; there is no safe default to fall back to

mod parser;

use thiserror::Error;

use crate::core::DEFAULT_MAX_DEPTH;
use crate::models::ForeignValue;
use parser::Parser;

/// Errors raised for malformed literal text
///
/// Every variant carries the byte offset where reading failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReadError {
    #[error("No form to read")]
    EmptyInput,

    #[error("Unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("Unmatched delimiter '{found}' at offset {offset}")]
    UnmatchedDelimiter { found: char, offset: usize },

    #[error("Map literal at offset {offset} must contain an even number of forms")]
    OddMapEntries { offset: usize },

    #[error("Duplicate key {key} at offset {offset}")]
    DuplicateKey { key: String, offset: usize },

    #[error("Invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("Invalid token '{text}' at offset {offset}")]
    InvalidToken { text: String, offset: usize },

    #[error("Invalid escape '\\{found}' at offset {offset}")]
    InvalidEscape { found: String, offset: usize },

    #[error("No reader function for tag #{tag} at offset {offset}")]
    UnknownTag { tag: String, offset: usize },

    #[error("Invalid #{tag} literal at offset {offset}: {reason}")]
    InvalidTagged {
        tag: String,
        offset: usize,
        reason: String,
    },

    #[error("Trailing input after form at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("Nesting exceeds the depth limit at offset {offset}")]
    DepthLimitExceeded { offset: usize },
}

/// Stateless reader for literal notation
///
/// Collections, tagged literals and `#_` discards nested deeper than the
/// depth limit fail with [`ReadError::DepthLimitExceeded`].
///
/// # Example
/// ```
/// use ednbridge_core::{ForeignValue, ReadError, TextualReader};
///
/// let reader = TextualReader::new();
/// assert_eq!(reader.read("nil").unwrap(), ForeignValue::Nil);
/// assert_eq!(reader.read("22").unwrap(), ForeignValue::Long(22));
/// assert_eq!(reader.read("2.5").unwrap(), ForeignValue::Double(2.5));
/// assert!(reader.read("[1 2").is_err());
///
/// let shallow = TextualReader::with_depth_limit(2);
/// assert!(shallow.read("[[1]]").is_ok());
/// assert_eq!(shallow.read("[[[1]]]"), Err(ReadError::DepthLimitExceeded { offset: 2 }));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TextualReader {
    depth_limit: usize,
}

impl Default for TextualReader {
    fn default() -> Self {
        Self::with_depth_limit(DEFAULT_MAX_DEPTH)
    }
}

impl TextualReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth_limit(depth_limit: usize) -> Self {
        Self { depth_limit }
    }

    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Read exactly one form; anything but whitespace after it is an error
    pub fn read(&self, text: &str) -> Result<ForeignValue, ReadError> {
        let mut parser = Parser::new(text, self.depth_limit);
        if parser.at_end()? {
            return Err(ReadError::EmptyInput);
        }
        let value = parser.parse_form()?;
        if !parser.at_end()? {
            return Err(ReadError::TrailingInput {
                offset: parser.offset(),
            });
        }
        Ok(value)
    }

    /// Read every top-level form in the text
    pub fn read_all(&self, text: &str) -> Result<Vec<ForeignValue>, ReadError> {
        let mut parser = Parser::new(text, self.depth_limit);
        let mut forms = Vec::new();
        while !parser.at_end()? {
            forms.push(parser.parse_form()?);
        }
        Ok(forms)
    }
}

/// Read exactly one form with the default reader
pub fn read(text: &str) -> Result<ForeignValue, ReadError> {
    TextualReader::new().read(text)
}

/// Read every top-level form with the default reader
pub fn read_all(text: &str) -> Result<Vec<ForeignValue>, ReadError> {
    TextualReader::new().read_all(text)
}
