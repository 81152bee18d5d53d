//! Token types produced by the scanner.

use std::borrow::Cow;

use crate::{Encoding, Span};

/// How a scalar was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
#[repr(u8)]
pub enum ScalarStyle {
    /// Unquoted: `hello`.
    Plain,
    /// Single-quoted: `'hello'`.
    SingleQuoted,
    /// Double-quoted: `"hello"`.
    DoubleQuoted,
    /// Literal block: `|`.
    Literal,
    /// Folded block: `>`.
    Folded,
}

impl ScalarStyle {
    /// Whether the scalar was written without quotes or block indicator.
    pub fn is_plain(self) -> bool {
        self == ScalarStyle::Plain
    }
}

/// The kind of a token, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'src> {
    /// Start of the stream.
    StreamStart(Encoding),
    /// End of the stream.
    StreamEnd,
    /// `%YAML major.minor`
    VersionDirective {
        /// Major version.
        major: u32,
        /// Minor version.
        minor: u32,
    },
    /// `%TAG handle prefix`
    TagDirective {
        /// Tag handle, including both `!`.
        handle: &'src str,
        /// Prefix the handle expands to.
        prefix: Cow<'src, str>,
    },
    /// `---`
    DocumentStart,
    /// `...`
    DocumentEnd,
    /// Start of an indentation-delimited sequence (implicit).
    BlockSequenceStart,
    /// Start of an indentation-delimited mapping (implicit).
    BlockMappingStart,
    /// End of a block collection (implicit, on dedent).
    BlockEnd,
    /// `[`
    FlowSequenceStart,
    /// `]`
    FlowSequenceEnd,
    /// `{`
    FlowMappingStart,
    /// `}`
    FlowMappingEnd,
    /// `-` in block context.
    BlockEntry,
    /// `,`
    FlowEntry,
    /// `?`, or inserted before a confirmed simple key.
    Key,
    /// `:`
    Value,
    /// `*name`
    Alias(&'src str),
    /// `&name`
    Anchor(&'src str),
    /// `!handle!suffix`, `!suffix`, `!<verbatim>` or `!`.
    Tag {
        /// The handle (`!`, `!!`, `!name!`), empty for verbatim tags and for
        /// the lone non-specific `!`.
        handle: &'src str,
        /// The suffix with `%XX` escapes decoded.
        suffix: Cow<'src, str>,
    },
    /// Any scalar.
    Scalar {
        /// Content after escape processing and line folding.
        value: Cow<'src, str>,
        /// How it was written.
        style: ScalarStyle,
    },
}

impl TokenKind<'_> {
    /// Short name of the token kind for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::StreamStart(_) => "<stream start>",
            TokenKind::StreamEnd => "<stream end>",
            TokenKind::VersionDirective { .. } => "%YAML directive",
            TokenKind::TagDirective { .. } => "%TAG directive",
            TokenKind::DocumentStart => "'---'",
            TokenKind::DocumentEnd => "'...'",
            TokenKind::BlockSequenceStart => "<block sequence start>",
            TokenKind::BlockMappingStart => "<block mapping start>",
            TokenKind::BlockEnd => "<block end>",
            TokenKind::FlowSequenceStart => "'['",
            TokenKind::FlowSequenceEnd => "']'",
            TokenKind::FlowMappingStart => "'{'",
            TokenKind::FlowMappingEnd => "'}'",
            TokenKind::BlockEntry => "'-'",
            TokenKind::FlowEntry => "','",
            TokenKind::Key => "'?'",
            TokenKind::Value => "':'",
            TokenKind::Alias(_) => "alias",
            TokenKind::Anchor(_) => "anchor",
            TokenKind::Tag { .. } => "tag",
            TokenKind::Scalar { .. } => "scalar",
        }
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind<'src>,
    /// The span in the source text.
    pub span: Span,
}

impl<'src> Token<'src> {
    /// Create a new token.
    pub fn new(kind: TokenKind<'src>, span: Span) -> Self {
        Self { kind, span }
    }
}
