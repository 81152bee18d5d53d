//! Errors raised while decoding and scanning.

use std::fmt;

use crate::{Encoding, Mark};

/// The input bytes could not be turned into a valid character stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The byte length is not a multiple of the code unit width.
    Misaligned {
        /// Detected encoding.
        encoding: Encoding,
        /// Length of the payload after the byte order mark.
        len: usize,
    },
    /// A byte sequence is not valid in the detected encoding.
    InvalidSequence {
        /// Detected encoding.
        encoding: Encoding,
        /// Byte offset into the original buffer.
        offset: usize,
    },
    /// The stream contains a character YAML does not allow.
    NonPrintable {
        /// Position of the character.
        mark: Mark,
        /// The offending character.
        ch: char,
    },
    /// The decoded text is longer than a [`Mark`] can address.
    TooLarge {
        /// Decoded length in bytes.
        len: usize,
    },
}

impl EncodingError {
    /// Position of the error, if it maps to a decoded character.
    pub fn mark(&self) -> Option<Mark> {
        match self {
            EncodingError::NonPrintable { mark, .. } => Some(*mark),
            _ => None,
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::Misaligned { encoding, len } => write!(
                f,
                "{encoding} input length {len} is not a multiple of {} bytes",
                encoding.unit_width()
            ),
            EncodingError::InvalidSequence { encoding, offset } => {
                write!(f, "invalid {encoding} sequence at byte {offset}")
            }
            EncodingError::NonPrintable { mark, ch } => write!(
                f,
                "{mark}: special characters are not allowed (found U+{:04X})",
                *ch as u32
            ),
            EncodingError::TooLarge { len } => {
                write!(f, "decoded input of {len} bytes exceeds the 4 GiB limit")
            }
        }
    }
}

impl std::error::Error for EncodingError {}

/// A lexical error with the position where it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    /// What went wrong.
    pub kind: ScanErrorKind,
    /// Where it went wrong.
    pub mark: Mark,
}

impl ScanError {
    /// Create a new scan error.
    pub fn new(kind: ScanErrorKind, mark: Mark) -> Self {
        Self { kind, mark }
    }
}

/// Kinds of lexical errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// A character that cannot start any token.
    UnexpectedCharacter(char),
    /// A tab where indentation spaces are expected.
    TabIndentation,
    /// `-` where a block sequence entry cannot start.
    BlockEntryNotAllowed,
    /// `?` where a mapping key cannot start.
    KeyNotAllowed,
    /// `:` where a mapping value cannot start.
    ValueNotAllowed,
    /// A required simple key was never followed by `:`.
    MissingValueIndicator,
    /// `:` inside a plain scalar in flow context.
    UnexpectedColon,
    /// End of stream inside a quoted scalar.
    UnterminatedScalar,
    /// `---` or `...` inside a quoted scalar.
    DocumentMarkerInScalar,
    /// An escape sequence that is not defined.
    InvalidEscape(String),
    /// Malformed block scalar header.
    InvalidBlockScalarHeader(&'static str),
    /// Malformed directive.
    InvalidDirective(&'static str),
    /// Malformed tag.
    InvalidTag(&'static str),
    /// Malformed anchor or alias name.
    InvalidAnchor,
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanErrorKind::UnexpectedCharacter(c) => {
                write!(f, "found character {c:?} that cannot start any token")
            }
            ScanErrorKind::TabIndentation => {
                write!(f, "found a tab character where an indentation space is expected")
            }
            ScanErrorKind::BlockEntryNotAllowed => {
                write!(f, "block sequence entries are not allowed in this context")
            }
            ScanErrorKind::KeyNotAllowed => {
                write!(f, "mapping keys are not allowed in this context")
            }
            ScanErrorKind::ValueNotAllowed => {
                write!(f, "mapping values are not allowed in this context")
            }
            ScanErrorKind::MissingValueIndicator => {
                write!(f, "while scanning a simple key, could not find expected ':'")
            }
            ScanErrorKind::UnexpectedColon => {
                write!(f, "found unexpected ':' while scanning a plain scalar")
            }
            ScanErrorKind::UnterminatedScalar => {
                write!(f, "found unexpected end of stream while scanning a quoted scalar")
            }
            ScanErrorKind::DocumentMarkerInScalar => write!(
                f,
                "found unexpected document indicator while scanning a quoted scalar"
            ),
            ScanErrorKind::InvalidEscape(seq) => write!(f, "found unknown escape sequence `{seq}`"),
            ScanErrorKind::InvalidBlockScalarHeader(problem) => {
                write!(f, "while scanning a block scalar, {problem}")
            }
            ScanErrorKind::InvalidDirective(problem) => {
                write!(f, "while scanning a directive, {problem}")
            }
            ScanErrorKind::InvalidTag(problem) => write!(f, "while scanning a tag, {problem}"),
            ScanErrorKind::InvalidAnchor => write!(
                f,
                "while scanning an anchor or alias, did not find expected alphabetic or numeric character"
            ),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.mark, self.kind)
    }
}

impl std::error::Error for ScanError {}
