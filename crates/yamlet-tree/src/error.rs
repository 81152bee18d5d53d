//! Errors raised while loading a stream.

use std::fmt;

use yamlet_parse::{EncodingError, Mark, ParseError, ParseErrorKind, ScanError};

/// A graph error found while composing nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeError {
    /// What went wrong.
    pub kind: ComposeErrorKind,
    /// Where it went wrong.
    pub mark: Mark,
}

impl ComposeError {
    /// Create a new compose error.
    pub fn new(kind: ComposeErrorKind, mark: Mark) -> Self {
        Self { kind, mark }
    }
}

/// Composer error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeErrorKind {
    /// An alias names an anchor not defined earlier in the document.
    UndefinedAlias(String),
    /// An alias names a collection that is still being composed.
    RecursiveAlias(String),
    /// An anchor is defined twice in one document.
    DuplicateAnchor {
        /// The anchor name.
        name: String,
        /// Where it was first defined.
        first: Mark,
    },
    /// The event stream broke its nesting rules.
    UnexpectedEvent {
        /// What was there instead.
        found: &'static str,
    },
    /// The parser stopped before the end of the stream.
    UnexpectedEnd,
}

impl fmt::Display for ComposeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeErrorKind::UndefinedAlias(name) => write!(f, "found undefined alias *{name}"),
            ComposeErrorKind::RecursiveAlias(name) => {
                write!(f, "found recursive alias *{name}")
            }
            ComposeErrorKind::DuplicateAnchor { name, first } => {
                write!(f, "found duplicate anchor &{name}; first occurrence at {first}")
            }
            ComposeErrorKind::UnexpectedEvent { found } => {
                write!(f, "unexpected {found} event")
            }
            ComposeErrorKind::UnexpectedEnd => write!(f, "unexpected end of event stream"),
        }
    }
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.mark, self.kind)
    }
}

impl std::error::Error for ComposeError {}

/// Any error a load can end with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The bytes could not be decoded.
    Encoding(EncodingError),
    /// A lexical error.
    Scan(ScanError),
    /// A syntax error.
    Parse(ParseError),
    /// An anchor or alias error.
    Compose(ComposeError),
    /// [`Loader::load`](crate::Loader::load) found other than one document.
    DocumentCount {
        /// How many documents the stream holds.
        found: usize,
    },
}

impl LoadError {
    /// Where the error was detected, if it maps to a source position.
    pub fn mark(&self) -> Option<Mark> {
        match self {
            LoadError::Encoding(err) => err.mark(),
            LoadError::Scan(err) => Some(err.mark),
            LoadError::Parse(err) => Some(err.mark),
            LoadError::Compose(err) => Some(err.mark),
            LoadError::DocumentCount { .. } => None,
        }
    }

    /// Which stage raised the error.
    pub fn category(&self) -> &'static str {
        match self {
            LoadError::Encoding(_) => "reader",
            LoadError::Scan(_) => "scanner",
            LoadError::Parse(_) => "parser",
            LoadError::Compose(_) => "composer",
            LoadError::DocumentCount { .. } => "loader",
        }
    }

    /// The message without its position.
    pub fn message(&self) -> String {
        match self {
            LoadError::Encoding(EncodingError::NonPrintable { ch, .. }) => format!(
                "special characters are not allowed (found U+{:04X})",
                *ch as u32
            ),
            LoadError::Encoding(err) => err.to_string(),
            LoadError::Scan(err) => err.kind.to_string(),
            LoadError::Parse(err) => err.kind.to_string(),
            LoadError::Compose(err) => err.kind.to_string(),
            LoadError::DocumentCount { found } => {
                format!("expected a single document in the stream, found {found}")
            }
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Encoding(err) => err.fmt(f),
            LoadError::Scan(err) => err.fmt(f),
            LoadError::Parse(err) => err.fmt(f),
            LoadError::Compose(err) => err.fmt(f),
            LoadError::DocumentCount { .. } => f.write_str(&self.message()),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Encoding(err) => Some(err),
            LoadError::Scan(err) => Some(err),
            LoadError::Parse(err) => Some(err),
            LoadError::Compose(err) => Some(err),
            LoadError::DocumentCount { .. } => None,
        }
    }
}

impl From<EncodingError> for LoadError {
    fn from(err: EncodingError) -> Self {
        LoadError::Encoding(err)
    }
}

impl From<ScanError> for LoadError {
    fn from(err: ScanError) -> Self {
        LoadError::Scan(err)
    }
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        match err.kind {
            ParseErrorKind::Scan(kind) => LoadError::Scan(ScanError::new(kind, err.mark)),
            _ => LoadError::Parse(err),
        }
    }
}

impl From<ComposeError> for LoadError {
    fn from(err: ComposeError) -> Self {
        LoadError::Compose(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;
    use yamlet_parse::ScanErrorKind;

    #[test]
    fn scan_errors_surface_as_scan() {
        let err: LoadError =
            ParseError::new(ParseErrorKind::Scan(ScanErrorKind::TabIndentation), Mark::new(3, 2, 1))
                .into();
        assert_eq!(err.category(), "scanner");
        assert_eq!(err.mark(), Some(Mark::new(3, 2, 1)));
        assert_eq!(
            err.to_string(),
            "line 2, column 1: found a tab character where an indentation space is expected"
        );
    }

    #[test]
    fn compose_error_display() {
        let err = LoadError::from(ComposeError::new(
            ComposeErrorKind::DuplicateAnchor {
                name: "a".to_string(),
                first: Mark::new(0, 1, 1),
            },
            Mark::new(10, 2, 3),
        ));
        assert_eq!(err.category(), "composer");
        assert_eq!(
            err.to_string(),
            "line 2, column 3: found duplicate anchor &a; first occurrence at line 1, column 1"
        );
        assert_eq!(
            err.message(),
            "found duplicate anchor &a; first occurrence at line 1, column 1"
        );
    }

    #[test]
    fn document_count_has_no_mark() {
        let err = LoadError::DocumentCount { found: 2 };
        assert_eq!(err.mark(), None);
        assert_eq!(err.category(), "loader");
        assert_eq!(err.to_string(), "expected a single document in the stream, found 2");
    }
}
