//! Event types produced by the parser.

use std::borrow::Cow;
use std::fmt;

use crate::{Encoding, Mark, ScalarStyle, ScanError, ScanErrorKind, Span};

/// Whether a collection was written with indentation or brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
#[repr(u8)]
pub enum CollectionStyle {
    /// Indentation-delimited.
    Block,
    /// `[...]` or `{...}`.
    Flow,
}

/// A `%TAG` directive: `handle` expands to `prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDirective<'src> {
    /// The handle, e.g. `!e!`.
    pub handle: &'src str,
    /// The prefix it stands for.
    pub prefix: Cow<'src, str>,
}

/// An event with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<'src> {
    /// What happened.
    pub kind: EventKind<'src>,
    /// Where it happened.
    pub span: Span,
}

impl<'src> Event<'src> {
    /// Create a new event.
    pub fn new(kind: EventKind<'src>, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Events emitted by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind<'src> {
    /// Start of the stream.
    StreamStart {
        /// Encoding of the input bytes.
        encoding: Encoding,
    },
    /// End of the stream.
    StreamEnd,

    /// Start of a document.
    DocumentStart {
        /// Whether the document began with `---`.
        explicit: bool,
        /// `%YAML` directive, if any.
        version: Option<(u32, u32)>,
        /// `%TAG` directives declared for this document.
        tags: Vec<TagDirective<'src>>,
    },
    /// End of a document.
    DocumentEnd {
        /// Whether the document ended with `...`.
        explicit: bool,
    },

    /// `*name`
    Alias {
        /// The referenced anchor.
        anchor: &'src str,
    },
    /// A scalar node.
    Scalar {
        /// Anchor defined on this node.
        anchor: Option<&'src str>,
        /// Fully expanded tag, `!` for the non-specific tag.
        tag: Option<Cow<'src, str>>,
        /// Content.
        value: Cow<'src, str>,
        /// How it was written.
        style: ScalarStyle,
        /// The tag may be omitted when emitted plain.
        plain_implicit: bool,
        /// The tag may be omitted when emitted in any non-plain style.
        quoted_implicit: bool,
    },
    /// Start of a sequence.
    SequenceStart {
        /// Anchor defined on this node.
        anchor: Option<&'src str>,
        /// Fully expanded tag.
        tag: Option<Cow<'src, str>>,
        /// No tag was given.
        implicit: bool,
        /// Block or flow.
        style: CollectionStyle,
    },
    /// End of a sequence.
    SequenceEnd,
    /// Start of a mapping.
    MappingStart {
        /// Anchor defined on this node.
        anchor: Option<&'src str>,
        /// Fully expanded tag.
        tag: Option<Cow<'src, str>>,
        /// No tag was given.
        implicit: bool,
        /// Block or flow.
        style: CollectionStyle,
    },
    /// End of a mapping.
    MappingEnd,
}

impl EventKind<'_> {
    /// Short name of the event kind for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::StreamStart { .. } => "stream start",
            EventKind::StreamEnd => "stream end",
            EventKind::DocumentStart { .. } => "document start",
            EventKind::DocumentEnd { .. } => "document end",
            EventKind::Alias { .. } => "alias",
            EventKind::Scalar { .. } => "scalar",
            EventKind::SequenceStart { .. } => "sequence start",
            EventKind::SequenceEnd => "sequence end",
            EventKind::MappingStart { .. } => "mapping start",
            EventKind::MappingEnd => "mapping end",
        }
    }
}

/// A syntax error (or a lexical error passed through from the scanner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Where it went wrong.
    pub mark: Mark,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, mark: Mark) -> Self {
        Self { kind, mark }
    }

    /// The lexical error this wraps, if it came from the scanner.
    pub fn as_scan_error(&self) -> Option<ScanError> {
        match &self.kind {
            ParseErrorKind::Scan(kind) => Some(ScanError::new(kind.clone(), self.mark)),
            _ => None,
        }
    }
}

impl From<ScanError> for ParseError {
    fn from(err: ScanError) -> Self {
        Self::new(ParseErrorKind::Scan(err.kind), err.mark)
    }
}

/// Parse error kinds.
///
/// `found` fields name the token that was there instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The scanner failed.
    Scan(ScanErrorKind),
    /// The token stream ended without a stream end token.
    UnexpectedEnd,
    /// The stream did not begin with a stream start token.
    ExpectedStreamStart { found: &'static str },
    /// Directives were not followed by `---`, or content followed `...`.
    ExpectedDocumentStart { found: &'static str },
    /// A node was expected.
    ExpectedNodeContent { found: &'static str },
    /// A block mapping continues with something other than a key.
    ExpectedKey { found: &'static str },
    /// A block sequence continues with something other than `-`.
    ExpectedBlockEntry { found: &'static str },
    /// A flow sequence entry is followed by something other than `,` or `]`.
    ExpectedFlowSequenceEnd { found: &'static str },
    /// A flow mapping entry is followed by something other than `,` or `}`.
    ExpectedFlowMappingEnd { found: &'static str },
    /// Two `%YAML` directives in one document.
    DuplicateVersionDirective,
    /// `%YAML` with a major version other than 1.
    IncompatibleVersion { major: u32, minor: u32 },
    /// Two `%TAG` directives for the same handle.
    DuplicateTagDirective(String),
    /// A tag uses a handle no `%TAG` directive defined.
    UndefinedTagHandle(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Scan(kind) => kind.fmt(f),
            ParseErrorKind::UnexpectedEnd => write!(f, "unexpected end of token stream"),
            ParseErrorKind::ExpectedStreamStart { found } => {
                write!(f, "did not find expected <stream start>, found {found}")
            }
            ParseErrorKind::ExpectedDocumentStart { found } => {
                write!(f, "did not find expected <document start>, found {found}")
            }
            ParseErrorKind::ExpectedNodeContent { found } => {
                write!(f, "did not find expected node content, found {found}")
            }
            ParseErrorKind::ExpectedKey { found } => write!(
                f,
                "while parsing a block mapping, did not find expected key, found {found}"
            ),
            ParseErrorKind::ExpectedBlockEntry { found } => write!(
                f,
                "while parsing a block collection, did not find expected '-' indicator, found {found}"
            ),
            ParseErrorKind::ExpectedFlowSequenceEnd { found } => write!(
                f,
                "while parsing a flow sequence, did not find expected ',' or ']', found {found}"
            ),
            ParseErrorKind::ExpectedFlowMappingEnd { found } => write!(
                f,
                "while parsing a flow mapping, did not find expected ',' or '}}', found {found}"
            ),
            ParseErrorKind::DuplicateVersionDirective => write!(f, "found duplicate %YAML directive"),
            ParseErrorKind::IncompatibleVersion { major, minor } => {
                write!(f, "found incompatible YAML document (version {major}.{minor})")
            }
            ParseErrorKind::DuplicateTagDirective(handle) => {
                write!(f, "found duplicate %TAG directive for handle {handle}")
            }
            ParseErrorKind::UndefinedTagHandle(handle) => {
                write!(f, "found undefined tag handle {handle}")
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.mark, self.kind)
    }
}

impl std::error::Error for ParseError {}
