#![doc = include_str!("../README.md")]

use std::sync::Arc;

mod tracing_macros;

mod mark;
pub use mark::{Mark, Span};

mod error;
pub use error::{EncodingError, ScanError, ScanErrorKind};

mod encoding;
pub use encoding::{Encoding, MAX_SOURCE_LEN, check_printable, decode, is_printable};

mod reader;
pub use reader::Reader;

mod token;
pub use token::{ScalarStyle, Token, TokenKind};

mod scanner;
pub use scanner::Scanner;

/// Decoded, validated source text of a YAML stream.
///
/// Tokens borrow from this buffer, so it outlives every scanner built on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    text: Arc<str>,
    encoding: Encoding,
}

impl Source {
    /// Detect the encoding of `bytes`, transcode to UTF-8 and validate.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, EncodingError> {
        let (text, encoding) = decode(bytes)?;
        Ok(Self {
            text: Arc::from(text),
            encoding,
        })
    }

    /// Wrap already decoded text, rejecting non-printable characters.
    ///
    /// A leading byte order mark is dropped.
    pub fn new(text: impl Into<String>) -> Result<Self, EncodingError> {
        let mut text = text.into();
        if text.starts_with('\u{FEFF}') {
            text.drain(..'\u{FEFF}'.len_utf8());
        }
        check_printable(&text)?;
        Ok(Self {
            text: Arc::from(text),
            encoding: Encoding::Utf8,
        })
    }

    /// The decoded text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The decoded text as a shared buffer. Scalars composed from this
    /// source point into it.
    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    /// The encoding the bytes were in.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// A scanner over this text.
    pub fn scanner(&self) -> Scanner<'_> {
        Scanner::with_encoding(&self.text, self.encoding)
    }
}
