//! Pull parser: tokens in, events out.
//!
//! The grammar is LL(1) over the token stream, so the parser is a state
//! machine that looks at one token at a time. Nested collections push the
//! state to return to onto a stack.

use std::borrow::Cow;

#[allow(unused_imports)]
use crate::trace;
use crate::{
    CollectionStyle, Event, EventKind, Mark, ParseError, ParseErrorKind, ScalarStyle, Scanner,
    Span, TagDirective, Token, TokenKind,
};

/// Handles every document starts with.
const DEFAULT_TAG_DIRECTIVES: [(&str, &str); 2] = [("!", "!"), ("!!", "tag:yaml.org,2002:")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockNodeOrIndentlessSequence,
    FlowNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// A pull-based YAML event parser.
pub struct Parser<'src> {
    scanner: Scanner<'src>,
    state: State,
    /// States to return to when the current collection ends.
    states: Vec<State>,
    /// Handles in effect for the current document.
    tag_directives: Vec<TagDirective<'src>>,
    peeked: Option<Event<'src>>,
    failed: bool,
}

impl<'src> Parser<'src> {
    /// Create a parser over UTF-8 source text.
    pub fn new(source: &'src str) -> Self {
        Self::from_scanner(Scanner::new(source))
    }

    /// Create a parser pulling tokens from `scanner`.
    pub fn from_scanner(scanner: Scanner<'src>) -> Self {
        Self {
            scanner,
            state: State::StreamStart,
            states: Vec::new(),
            tag_directives: Vec::new(),
            peeked: None,
            failed: false,
        }
    }

    /// Get the next event. `Ok(None)` after `StreamEnd` or after an error.
    pub fn next_event(&mut self) -> Result<Option<Event<'src>>, ParseError> {
        if let Some(event) = self.peeked.take() {
            return Ok(Some(event));
        }
        if self.failed || self.state == State::End {
            return Ok(None);
        }
        match self.state_machine() {
            Ok(event) => {
                trace!("Event {:?} at {}", event.kind, event.span.start);
                Ok(Some(event))
            }
            Err(err) => {
                self.failed = true;
                Err(err)
            }
        }
    }

    /// Look at the next event without consuming it.
    pub fn peek_event(&mut self) -> Result<Option<&Event<'src>>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.next_event()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn state_machine(&mut self) -> Result<Event<'src>, ParseError> {
        match self.state {
            State::StreamStart => self.stream_start(),
            State::ImplicitDocumentStart => self.document_start(true),
            State::DocumentStart => self.document_start(false),
            State::DocumentContent => self.document_content(),
            State::DocumentEnd => self.document_end(),
            State::BlockNode => self.parse_node(true, false),
            State::BlockNodeOrIndentlessSequence => self.parse_node(true, true),
            State::FlowNode => self.parse_node(false, false),
            State::BlockSequenceFirstEntry => self.block_sequence_entry(true),
            State::BlockSequenceEntry => self.block_sequence_entry(false),
            State::IndentlessSequenceEntry => self.indentless_sequence_entry(),
            State::BlockMappingFirstKey => self.block_mapping_key(true),
            State::BlockMappingKey => self.block_mapping_key(false),
            State::BlockMappingValue => self.block_mapping_value(),
            State::FlowSequenceFirstEntry => self.flow_sequence_entry(true),
            State::FlowSequenceEntry => self.flow_sequence_entry(false),
            State::FlowSequenceEntryMappingKey => self.flow_sequence_entry_mapping_key(),
            State::FlowSequenceEntryMappingValue => self.flow_sequence_entry_mapping_value(),
            State::FlowSequenceEntryMappingEnd => self.flow_sequence_entry_mapping_end(),
            State::FlowMappingFirstKey => self.flow_mapping_key(true),
            State::FlowMappingKey => self.flow_mapping_key(false),
            State::FlowMappingValue => self.flow_mapping_value(false),
            State::FlowMappingEmptyValue => self.flow_mapping_value(true),
            State::End => Err(ParseError::new(
                ParseErrorKind::UnexpectedEnd,
                self.scanner.mark(),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    fn peek(&mut self) -> Result<&Token<'src>, ParseError> {
        let mark = self.scanner.mark();
        match self.scanner.peek_token()? {
            Some(token) => Ok(token),
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEnd, mark)),
        }
    }

    fn next_token(&mut self) -> Result<Token<'src>, ParseError> {
        let mark = self.scanner.mark();
        self.scanner
            .next_token()?
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnexpectedEnd, mark))
    }

    /// Whether the next token matches `pred`.
    fn check(&mut self, pred: impl FnOnce(&TokenKind<'src>) -> bool) -> Result<bool, ParseError> {
        Ok(pred(&self.peek()?.kind))
    }

    /// Name and position of the next token, for error reporting.
    fn found(&mut self) -> Result<(&'static str, Mark), ParseError> {
        let token = self.peek()?;
        Ok((token.kind.name(), token.span.start))
    }

    /// Switch to `state` and produce its first event.
    fn enter(&mut self, state: State) -> Result<Event<'src>, ParseError> {
        self.state = state;
        self.state_machine()
    }

    fn pop_state(&mut self) -> State {
        self.states.pop().unwrap_or(State::End)
    }

    fn empty_scalar(mark: Mark) -> Event<'src> {
        Event::new(
            EventKind::Scalar {
                anchor: None,
                tag: None,
                value: Cow::Borrowed(""),
                style: ScalarStyle::Plain,
                plain_implicit: true,
                quoted_implicit: false,
            },
            Span::empty(mark),
        )
    }

    /// An empty scalar positioned at the next token.
    fn empty_scalar_here(&mut self) -> Result<Event<'src>, ParseError> {
        let mark = self.peek()?.span.start;
        Ok(Self::empty_scalar(mark))
    }

    // ------------------------------------------------------------------
    // Stream and documents
    // ------------------------------------------------------------------

    fn stream_start(&mut self) -> Result<Event<'src>, ParseError> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::StreamStart(encoding) => {
                self.state = State::ImplicitDocumentStart;
                Ok(Event::new(EventKind::StreamStart { encoding }, token.span))
            }
            other => Err(ParseError::new(
                ParseErrorKind::ExpectedStreamStart {
                    found: other.name(),
                },
                token.span.start,
            )),
        }
    }

    fn document_start(&mut self, implicit: bool) -> Result<Event<'src>, ParseError> {
        if !implicit {
            // Extra `...` markers between documents are allowed.
            while self.check(|k| matches!(k, TokenKind::DocumentEnd))? {
                self.next_token()?;
            }
        }

        let start = self.peek()?.span.start;
        let is_document_boundary = self.check(|k| {
            matches!(
                k,
                TokenKind::VersionDirective { .. }
                    | TokenKind::TagDirective { .. }
                    | TokenKind::DocumentStart
                    | TokenKind::StreamEnd
            )
        })?;

        if implicit && !is_document_boundary {
            // A bare document: no directives, no `---`.
            self.reset_tag_directives(&[]);
            self.states.push(State::DocumentEnd);
            self.state = State::BlockNode;
            return Ok(Event::new(
                EventKind::DocumentStart {
                    explicit: false,
                    version: None,
                    tags: Vec::new(),
                },
                Span::empty(start),
            ));
        }

        if self.check(|k| matches!(k, TokenKind::StreamEnd))? {
            let token = self.next_token()?;
            self.state = State::End;
            return Ok(Event::new(EventKind::StreamEnd, token.span));
        }

        let (version, tags) = self.process_directives()?;
        if !self.check(|k| matches!(k, TokenKind::DocumentStart))? {
            let (found, mark) = self.found()?;
            return Err(ParseError::new(
                ParseErrorKind::ExpectedDocumentStart { found },
                mark,
            ));
        }
        let token = self.next_token()?;
        self.states.push(State::DocumentEnd);
        self.state = State::DocumentContent;
        Ok(Event::new(
            EventKind::DocumentStart {
                explicit: true,
                version,
                tags,
            },
            Span::new(start, token.span.end),
        ))
    }

    #[allow(clippy::type_complexity)]
    fn process_directives(
        &mut self,
    ) -> Result<(Option<(u32, u32)>, Vec<TagDirective<'src>>), ParseError> {
        let mut version = None;
        let mut tags: Vec<TagDirective<'src>> = Vec::new();

        while self.check(|k| {
            matches!(
                k,
                TokenKind::VersionDirective { .. } | TokenKind::TagDirective { .. }
            )
        })? {
            let token = self.next_token()?;
            let mark = token.span.start;
            match token.kind {
                TokenKind::VersionDirective { major, minor } => {
                    if version.is_some() {
                        return Err(ParseError::new(
                            ParseErrorKind::DuplicateVersionDirective,
                            mark,
                        ));
                    }
                    if major != 1 {
                        return Err(ParseError::new(
                            ParseErrorKind::IncompatibleVersion { major, minor },
                            mark,
                        ));
                    }
                    if minor > 1 {
                        #[cfg(any(test, feature = "tracing"))]
                        tracing::warn!(
                            "%YAML {major}.{minor} at {mark} is newer than 1.1, parsing as 1.1"
                        );
                    }
                    version = Some((major, minor));
                }
                TokenKind::TagDirective { handle, prefix } => {
                    if tags.iter().any(|tag| tag.handle == handle) {
                        return Err(ParseError::new(
                            ParseErrorKind::DuplicateTagDirective(handle.to_string()),
                            mark,
                        ));
                    }
                    tags.push(TagDirective { handle, prefix });
                }
                _ => {}
            }
        }

        self.reset_tag_directives(&tags);
        Ok((version, tags))
    }

    /// Install the document's directives plus the defaults they don't override.
    fn reset_tag_directives(&mut self, declared: &[TagDirective<'src>]) {
        self.tag_directives = declared.to_vec();
        for (handle, prefix) in DEFAULT_TAG_DIRECTIVES {
            if !declared.iter().any(|tag| tag.handle == handle) {
                self.tag_directives.push(TagDirective {
                    handle,
                    prefix: Cow::Borrowed(prefix),
                });
            }
        }
    }

    fn document_content(&mut self) -> Result<Event<'src>, ParseError> {
        let empty = self.check(|k| {
            matches!(
                k,
                TokenKind::VersionDirective { .. }
                    | TokenKind::TagDirective { .. }
                    | TokenKind::DocumentStart
                    | TokenKind::DocumentEnd
                    | TokenKind::StreamEnd
            )
        })?;
        if empty {
            self.state = self.pop_state();
            self.empty_scalar_here()
        } else {
            self.enter(State::BlockNode)
        }
    }

    fn document_end(&mut self) -> Result<Event<'src>, ParseError> {
        let start = self.peek()?.span.start;
        let mut end = start;
        let explicit = self.check(|k| matches!(k, TokenKind::DocumentEnd))?;
        if explicit {
            end = self.next_token()?.span.end;
        }
        self.tag_directives.clear();
        self.state = State::DocumentStart;
        Ok(Event::new(
            EventKind::DocumentEnd { explicit },
            Span::new(start, end),
        ))
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> Result<Event<'src>, ParseError> {
        if let TokenKind::Alias(anchor) = self.peek()?.kind {
            let span = self.next_token()?.span;
            self.state = self.pop_state();
            return Ok(Event::new(EventKind::Alias { anchor }, span));
        }

        let start = self.peek()?.span.start;
        let mut end = start;
        let mut anchor = None;
        let mut tag_token = None;

        // Properties: anchor and tag, in either order.
        for _ in 0..2 {
            match self.peek()?.kind {
                TokenKind::Anchor(name) if anchor.is_none() => {
                    end = self.next_token()?.span.end;
                    anchor = Some(name);
                }
                TokenKind::Tag { .. } if tag_token.is_none() => {
                    let token = self.next_token()?;
                    end = token.span.end;
                    if let TokenKind::Tag { handle, suffix } = token.kind {
                        tag_token = Some((handle, suffix, token.span.start));
                    }
                }
                _ => break,
            }
        }

        let tag = match tag_token {
            None => None,
            Some((handle, suffix, mark)) => Some(self.resolve_tag(handle, suffix, mark)?),
        };
        let implicit = tag.as_deref().is_none_or(str::is_empty);

        let token = self.peek()?;
        let token_span = token.span;
        let found = token.kind.name();

        if indentless_sequence && matches!(token.kind, TokenKind::BlockEntry) {
            self.state = State::IndentlessSequenceEntry;
            return Ok(Event::new(
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: CollectionStyle::Block,
                },
                Span::new(start, token_span.end),
            ));
        }

        match token.kind {
            TokenKind::Scalar { style, .. } => {
                let value = self.take_scalar_value()?;
                self.state = self.pop_state();
                let plain_implicit =
                    (tag.is_none() && style == ScalarStyle::Plain) || tag.as_deref() == Some("!");
                let quoted_implicit = tag.is_none() && style != ScalarStyle::Plain;
                Ok(Event::new(
                    EventKind::Scalar {
                        anchor,
                        tag,
                        value,
                        style,
                        plain_implicit,
                        quoted_implicit,
                    },
                    Span::new(start, token_span.end),
                ))
            }
            TokenKind::FlowSequenceStart => {
                self.state = State::FlowSequenceFirstEntry;
                Ok(Event::new(
                    EventKind::SequenceStart {
                        anchor,
                        tag,
                        implicit,
                        style: CollectionStyle::Flow,
                    },
                    Span::new(start, token_span.end),
                ))
            }
            TokenKind::FlowMappingStart => {
                self.state = State::FlowMappingFirstKey;
                Ok(Event::new(
                    EventKind::MappingStart {
                        anchor,
                        tag,
                        implicit,
                        style: CollectionStyle::Flow,
                    },
                    Span::new(start, token_span.end),
                ))
            }
            TokenKind::BlockSequenceStart if block => {
                self.state = State::BlockSequenceFirstEntry;
                Ok(Event::new(
                    EventKind::SequenceStart {
                        anchor,
                        tag,
                        implicit,
                        style: CollectionStyle::Block,
                    },
                    Span::new(start, token_span.end),
                ))
            }
            TokenKind::BlockMappingStart if block => {
                self.state = State::BlockMappingFirstKey;
                Ok(Event::new(
                    EventKind::MappingStart {
                        anchor,
                        tag,
                        implicit,
                        style: CollectionStyle::Block,
                    },
                    Span::new(start, token_span.end),
                ))
            }
            _ if anchor.is_some() || tag.is_some() => {
                // Properties without content: an empty scalar.
                self.state = self.pop_state();
                Ok(Event::new(
                    EventKind::Scalar {
                        anchor,
                        tag,
                        value: Cow::Borrowed(""),
                        style: ScalarStyle::Plain,
                        plain_implicit: implicit,
                        quoted_implicit: false,
                    },
                    Span::new(start, end),
                ))
            }
            _ => Err(ParseError::new(
                ParseErrorKind::ExpectedNodeContent { found },
                token_span.start,
            )),
        }
    }

    fn take_scalar_value(&mut self) -> Result<Cow<'src, str>, ParseError> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::Scalar { value, .. } => Ok(value),
            other => Err(ParseError::new(
                ParseErrorKind::ExpectedNodeContent {
                    found: other.name(),
                },
                token.span.start,
            )),
        }
    }

    /// Expand a tag token to the full tag.
    fn resolve_tag(
        &self,
        handle: &'src str,
        suffix: Cow<'src, str>,
        mark: Mark,
    ) -> Result<Cow<'src, str>, ParseError> {
        // Verbatim tags and the lone `!` have no handle.
        if handle.is_empty() {
            return Ok(suffix);
        }
        let Some(directive) = self.tag_directives.iter().find(|tag| tag.handle == handle) else {
            return Err(ParseError::new(
                ParseErrorKind::UndefinedTagHandle(handle.to_string()),
                mark,
            ));
        };
        Ok(Cow::Owned(format!("{}{}", directive.prefix, suffix)))
    }

    // ------------------------------------------------------------------
    // Block collections
    // ------------------------------------------------------------------

    fn block_sequence_entry(&mut self, first: bool) -> Result<Event<'src>, ParseError> {
        if first {
            self.next_token()?;
        }

        let span = self.peek()?.span;
        if self.check(|k| matches!(k, TokenKind::BlockEntry))? {
            self.next_token()?;
            if self.check(|k| matches!(k, TokenKind::BlockEntry | TokenKind::BlockEnd))? {
                self.state = State::BlockSequenceEntry;
                return Ok(Self::empty_scalar(span.end));
            }
            self.states.push(State::BlockSequenceEntry);
            return self.enter(State::BlockNode);
        }

        if self.check(|k| matches!(k, TokenKind::BlockEnd))? {
            self.next_token()?;
            self.state = self.pop_state();
            return Ok(Event::new(EventKind::SequenceEnd, span));
        }

        let (found, mark) = self.found()?;
        Err(ParseError::new(
            ParseErrorKind::ExpectedBlockEntry { found },
            mark,
        ))
    }

    /// A sequence whose `-` entries sit at the indentation of the mapping
    /// key that owns it.
    fn indentless_sequence_entry(&mut self) -> Result<Event<'src>, ParseError> {
        let span = self.peek()?.span;
        if !self.check(|k| matches!(k, TokenKind::BlockEntry))? {
            self.state = self.pop_state();
            return Ok(Event::new(EventKind::SequenceEnd, Span::empty(span.start)));
        }

        self.next_token()?;
        let next_is_empty = self.check(|k| {
            matches!(
                k,
                TokenKind::BlockEntry | TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
            )
        })?;
        if next_is_empty {
            self.state = State::IndentlessSequenceEntry;
            return Ok(Self::empty_scalar(span.end));
        }
        self.states.push(State::IndentlessSequenceEntry);
        self.enter(State::BlockNode)
    }

    fn block_mapping_key(&mut self, first: bool) -> Result<Event<'src>, ParseError> {
        if first {
            self.next_token()?;
        }

        let span = self.peek()?.span;
        if self.check(|k| matches!(k, TokenKind::Key))? {
            self.next_token()?;
            let next_is_empty = self.check(|k| {
                matches!(k, TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd)
            })?;
            if next_is_empty {
                self.state = State::BlockMappingValue;
                return Ok(Self::empty_scalar(span.end));
            }
            self.states.push(State::BlockMappingValue);
            return self.enter(State::BlockNodeOrIndentlessSequence);
        }

        if self.check(|k| matches!(k, TokenKind::BlockEnd))? {
            self.next_token()?;
            self.state = self.pop_state();
            return Ok(Event::new(EventKind::MappingEnd, span));
        }

        let (found, mark) = self.found()?;
        Err(ParseError::new(ParseErrorKind::ExpectedKey { found }, mark))
    }

    fn block_mapping_value(&mut self) -> Result<Event<'src>, ParseError> {
        let span = self.peek()?.span;
        if !self.check(|k| matches!(k, TokenKind::Value))? {
            self.state = State::BlockMappingKey;
            return Ok(Self::empty_scalar(span.start));
        }

        self.next_token()?;
        let next_is_empty = self.check(|k| {
            matches!(k, TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd)
        })?;
        if next_is_empty {
            self.state = State::BlockMappingKey;
            return Ok(Self::empty_scalar(span.end));
        }
        self.states.push(State::BlockMappingKey);
        self.enter(State::BlockNodeOrIndentlessSequence)
    }

    // ------------------------------------------------------------------
    // Flow collections
    // ------------------------------------------------------------------

    fn flow_sequence_entry(&mut self, first: bool) -> Result<Event<'src>, ParseError> {
        if first {
            self.next_token()?;
        }

        if !self.check(|k| matches!(k, TokenKind::FlowSequenceEnd))? {
            if !first {
                if self.check(|k| matches!(k, TokenKind::FlowEntry))? {
                    self.next_token()?;
                } else {
                    let (found, mark) = self.found()?;
                    return Err(ParseError::new(
                        ParseErrorKind::ExpectedFlowSequenceEnd { found },
                        mark,
                    ));
                }
            }

            if self.check(|k| matches!(k, TokenKind::Key))? {
                // `[? a : b]` or `[a: b]`: a single-pair mapping.
                let token = self.next_token()?;
                self.state = State::FlowSequenceEntryMappingKey;
                return Ok(Event::new(
                    EventKind::MappingStart {
                        anchor: None,
                        tag: None,
                        implicit: true,
                        style: CollectionStyle::Flow,
                    },
                    token.span,
                ));
            }
            if !self.check(|k| matches!(k, TokenKind::FlowSequenceEnd))? {
                self.states.push(State::FlowSequenceEntry);
                return self.enter(State::FlowNode);
            }
        }

        let token = self.next_token()?;
        self.state = self.pop_state();
        Ok(Event::new(EventKind::SequenceEnd, token.span))
    }

    fn flow_sequence_entry_mapping_key(&mut self) -> Result<Event<'src>, ParseError> {
        let empty = self.check(|k| {
            matches!(
                k,
                TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowSequenceEnd
            )
        })?;
        if empty {
            self.state = State::FlowSequenceEntryMappingValue;
            return self.empty_scalar_here();
        }
        self.states.push(State::FlowSequenceEntryMappingValue);
        self.enter(State::FlowNode)
    }

    fn flow_sequence_entry_mapping_value(&mut self) -> Result<Event<'src>, ParseError> {
        if self.check(|k| matches!(k, TokenKind::Value))? {
            self.next_token()?;
            if !self.check(|k| matches!(k, TokenKind::FlowEntry | TokenKind::FlowSequenceEnd))? {
                self.states.push(State::FlowSequenceEntryMappingEnd);
                return self.enter(State::FlowNode);
            }
        }
        self.state = State::FlowSequenceEntryMappingEnd;
        self.empty_scalar_here()
    }

    fn flow_sequence_entry_mapping_end(&mut self) -> Result<Event<'src>, ParseError> {
        let mark = self.peek()?.span.start;
        self.state = State::FlowSequenceEntry;
        Ok(Event::new(EventKind::MappingEnd, Span::empty(mark)))
    }

    fn flow_mapping_key(&mut self, first: bool) -> Result<Event<'src>, ParseError> {
        if first {
            self.next_token()?;
        }

        if !self.check(|k| matches!(k, TokenKind::FlowMappingEnd))? {
            if !first {
                if self.check(|k| matches!(k, TokenKind::FlowEntry))? {
                    self.next_token()?;
                } else {
                    let (found, mark) = self.found()?;
                    return Err(ParseError::new(
                        ParseErrorKind::ExpectedFlowMappingEnd { found },
                        mark,
                    ));
                }
            }

            if self.check(|k| matches!(k, TokenKind::Key))? {
                self.next_token()?;
                let empty = self.check(|k| {
                    matches!(
                        k,
                        TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowMappingEnd
                    )
                })?;
                if empty {
                    self.state = State::FlowMappingValue;
                    return self.empty_scalar_here();
                }
                self.states.push(State::FlowMappingValue);
                return self.enter(State::FlowNode);
            }
            if !self.check(|k| matches!(k, TokenKind::FlowMappingEnd))? {
                // `{a, b: c}`: a key without `:` has an empty value.
                self.states.push(State::FlowMappingEmptyValue);
                return self.enter(State::FlowNode);
            }
        }

        let token = self.next_token()?;
        self.state = self.pop_state();
        Ok(Event::new(EventKind::MappingEnd, token.span))
    }

    fn flow_mapping_value(&mut self, empty: bool) -> Result<Event<'src>, ParseError> {
        if empty {
            self.state = State::FlowMappingKey;
            return self.empty_scalar_here();
        }
        if self.check(|k| matches!(k, TokenKind::Value))? {
            self.next_token()?;
            if !self.check(|k| matches!(k, TokenKind::FlowEntry | TokenKind::FlowMappingEnd))? {
                self.states.push(State::FlowMappingKey);
                return self.enter(State::FlowNode);
            }
        }
        self.state = State::FlowMappingKey;
        self.empty_scalar_here()
    }
}

impl<'src> Iterator for Parser<'src> {
    type Item = Result<Event<'src>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

#[cfg(test)]
mod tests;
