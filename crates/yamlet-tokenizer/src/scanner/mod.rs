//! Scanner for YAML: characters in, tokens out.
//!
//! The scanner tracks block indentation with a stack of columns, flow
//! nesting with a level counter, and implicit ("simple") keys with one
//! candidate per flow level. A candidate becomes a `Key` token only once a
//! `:` confirms it, so tokens are queued until no pending candidate could
//! still insert a `Key` (and possibly a `BlockMappingStart`) in front of them.

use std::borrow::Cow;
use std::collections::VecDeque;

#[allow(unused_imports)]
use crate::trace;
use crate::{
    Encoding, Mark, Reader, ScalarStyle, ScanError, ScanErrorKind, Span, Token, TokenKind,
};

mod text;
use text::Text;

/// Simple keys are limited to this many characters.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

/// A position where an implicit key may start.
#[derive(Debug, Clone, Copy, Default)]
struct SimpleKey {
    possible: bool,
    /// A required key must be confirmed or the stream is malformed.
    required: bool,
    /// Number of the first token of the key (counting taken tokens).
    token_number: usize,
    mark: Mark,
    char_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomping {
    Strip,
    Clip,
    Keep,
}

/// A pull-based YAML token scanner.
#[derive(Clone)]
pub struct Scanner<'src> {
    reader: Reader<'src>,
    encoding: Encoding,

    /// Tokens fetched but not handed out yet.
    tokens: VecDeque<Token<'src>>,
    /// Number of tokens handed out.
    tokens_taken: usize,

    stream_start_produced: bool,
    stream_end_produced: bool,
    /// Set after the first error; nothing is produced afterwards.
    failed: bool,

    /// Current block indentation column (0-based), -1 at the top.
    indent: i32,
    indents: Vec<i32>,
    flow_level: usize,

    simple_key_allowed: bool,
    /// One entry per flow level, plus one for the block context.
    simple_keys: Vec<SimpleKey>,
}

impl<'src> Scanner<'src> {
    /// Create a scanner over UTF-8 source text.
    pub fn new(source: &'src str) -> Self {
        Self::with_encoding(source, Encoding::Utf8)
    }

    /// Create a scanner over text that was decoded from `encoding`.
    ///
    /// The encoding is only reported in the `StreamStart` token.
    pub fn with_encoding(source: &'src str, encoding: Encoding) -> Self {
        Self {
            reader: Reader::new(source),
            encoding,
            tokens: VecDeque::new(),
            tokens_taken: 0,
            stream_start_produced: false,
            stream_end_produced: false,
            failed: false,
            indent: -1,
            indents: Vec::new(),
            flow_level: 0,
            simple_key_allowed: false,
            simple_keys: Vec::new(),
        }
    }

    /// Position of the reader.
    pub fn mark(&self) -> Mark {
        self.reader.mark()
    }

    /// Get the next token. `Ok(None)` after `StreamEnd` or after an error.
    pub fn next_token(&mut self) -> Result<Option<Token<'src>>, ScanError> {
        if self.failed {
            return Ok(None);
        }
        if let Err(err) = self.fetch_more_tokens() {
            self.fail();
            return Err(err);
        }
        let token = self.tokens.pop_front();
        if let Some(_token) = &token {
            self.tokens_taken += 1;
            trace!("Token {:?} at {}", _token.kind, _token.span.start);
        }
        Ok(token)
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<&Token<'src>>, ScanError> {
        if self.failed {
            return Ok(None);
        }
        if let Err(err) = self.fetch_more_tokens() {
            self.fail();
            return Err(err);
        }
        Ok(self.tokens.front())
    }

    fn fail(&mut self) {
        self.failed = true;
        self.tokens.clear();
    }

    /// 0-based column of the reader, the unit indentation is measured in.
    #[inline]
    fn column(&self) -> i32 {
        self.reader.column() as i32 - 1
    }

    fn error(&self, kind: ScanErrorKind) -> ScanError {
        ScanError::new(kind, self.reader.mark())
    }

    /// Queue a token spanning from `start` to the current position.
    fn push(&mut self, kind: TokenKind<'src>, start: Mark) {
        let span = Span::new(start, self.reader.mark());
        self.tokens.push_back(Token::new(kind, span));
    }

    fn fetch_more_tokens(&mut self) -> Result<(), ScanError> {
        while !self.stream_end_produced {
            let need_more = if self.tokens.is_empty() {
                true
            } else {
                self.stale_simple_keys()?;
                self.simple_keys
                    .iter()
                    .any(|key| key.possible && key.token_number == self.tokens_taken)
            };
            if !need_more {
                break;
            }
            self.fetch_next_token()?;
        }
        Ok(())
    }

    fn fetch_next_token(&mut self) -> Result<(), ScanError> {
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }

        self.scan_to_next_token();
        self.stale_simple_keys()?;
        self.unroll_indent(self.column());

        if self.reader.is_eof() {
            return self.fetch_stream_end();
        }

        let c = self.reader.front();
        if self.column() == 0 {
            if c == '%' {
                return self.fetch_directive();
            }
            if self.at_document_marker("---") {
                return self.fetch_document_indicator(TokenKind::DocumentStart);
            }
            if self.at_document_marker("...") {
                return self.fetch_document_indicator(TokenKind::DocumentEnd);
            }
        }

        let next = self.reader.peek(1);
        match c {
            '[' => self.fetch_flow_collection_start(TokenKind::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenKind::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenKind::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenKind::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if is_blankz(next) => self.fetch_block_entry(),
            '?' if self.flow_level > 0 || is_blankz(next) => self.fetch_key(),
            ':' if self.flow_level > 0 || is_blankz(next) => self.fetch_value(),
            '*' => self.fetch_anchor(true),
            '&' => self.fetch_anchor(false),
            '!' => self.fetch_tag(),
            '|' if self.flow_level == 0 => self.fetch_block_scalar(ScalarStyle::Literal),
            '>' if self.flow_level == 0 => self.fetch_block_scalar(ScalarStyle::Folded),
            '\'' => self.fetch_flow_scalar(ScalarStyle::SingleQuoted),
            '"' => self.fetch_flow_scalar(ScalarStyle::DoubleQuoted),
            '\t' => Err(self.error(ScanErrorKind::TabIndentation)),
            _ if self.is_plain_scalar_start(c, next) => self.fetch_plain_scalar(),
            _ => Err(self.error(ScanErrorKind::UnexpectedCharacter(c))),
        }
    }

    fn is_plain_scalar_start(&self, c: char, next: char) -> bool {
        let indicator = matches!(
            c,
            '-' | '?'
                | ':'
                | ','
                | '['
                | ']'
                | '{'
                | '}'
                | '#'
                | '&'
                | '*'
                | '!'
                | '|'
                | '>'
                | '\''
                | '"'
                | '%'
                | '@'
                | '`'
        );
        !(is_blankz(c) || indicator)
            || (c == '-' && !is_blank(next))
            || (self.flow_level == 0 && (c == '?' || c == ':') && !is_blankz(next))
    }

    fn at_document_marker(&self, marker: &str) -> bool {
        self.reader.starts_with(marker) && is_blankz(self.reader.peek(3))
    }

    /// Skip whitespace, comments and line breaks up to the next token.
    fn scan_to_next_token(&mut self) {
        loop {
            if self.column() == 0 && self.reader.front() == '\u{FEFF}' {
                self.reader.advance();
            }
            // Tabs are fine between tokens, but not where indentation counts.
            while self.reader.front() == ' '
                || ((self.flow_level > 0 || !self.simple_key_allowed)
                    && self.reader.front() == '\t')
            {
                self.reader.advance();
            }
            if self.reader.front() == '#' {
                while !is_breakz(self.reader.front()) {
                    self.reader.advance();
                }
            }
            if !is_break(self.reader.front()) {
                break;
            }
            self.skip_line();
            if self.flow_level == 0 {
                self.simple_key_allowed = true;
            }
        }
    }

    fn skip_line(&mut self) {
        if self.reader.front() == '\r' && self.reader.peek(1) == '\n' {
            self.reader.advance_by(2);
        } else if is_break(self.reader.front()) {
            self.reader.advance();
        }
    }

    /// Consume one line break into `into`, normalizing CR, CR LF and NEL to LF.
    fn read_line(&mut self, into: &mut Text<'src>) {
        match self.reader.front() {
            '\r' if self.reader.peek(1) == '\n' => {
                into.push('\n');
                self.reader.advance_by(2);
            }
            '\r' | '\u{85}' => {
                into.push('\n');
                self.reader.advance();
            }
            '\n' | '\u{2028}' | '\u{2029}' => self.take_char(into),
            _ => {}
        }
    }

    /// Consume the current character into `into`.
    #[inline]
    fn take_char(&mut self, into: &mut Text<'src>) {
        let at = self.reader.offset();
        self.reader.advance();
        into.push_source(at, self.reader.offset());
    }

    // ------------------------------------------------------------------
    // Simple keys and indentation
    // ------------------------------------------------------------------

    /// Drop key candidates that can no longer be keys: a simple key cannot
    /// span lines or exceed the length limit.
    fn stale_simple_keys(&mut self) -> Result<(), ScanError> {
        let line = self.reader.line();
        let index = self.reader.char_index();
        for key in &mut self.simple_keys {
            if key.possible
                && (key.mark.line < line || key.char_index + MAX_SIMPLE_KEY_LENGTH < index)
            {
                if key.required {
                    return Err(ScanError::new(
                        ScanErrorKind::MissingValueIndicator,
                        key.mark,
                    ));
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    fn save_simple_key(&mut self) -> Result<(), ScanError> {
        // A key at the current block indentation must turn out to be a key.
        let required = self.flow_level == 0 && self.indent == self.column();
        if self.simple_key_allowed {
            let key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_taken + self.tokens.len(),
                mark: self.reader.mark(),
                char_index: self.reader.char_index(),
            };
            self.remove_simple_key()?;
            if let Some(last) = self.simple_keys.last_mut() {
                *last = key;
            }
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScanError> {
        if let Some(key) = self.simple_keys.last_mut() {
            if key.possible && key.required {
                return Err(ScanError::new(
                    ScanErrorKind::MissingValueIndicator,
                    key.mark,
                ));
            }
            key.possible = false;
        }
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// Open a block collection if `column` is deeper than the current
    /// indentation. With `number`, the start token is inserted in front of
    /// the token with that number instead of being appended.
    fn roll_indent(&mut self, column: i32, number: Option<usize>, kind: TokenKind<'src>, mark: Mark) {
        if self.flow_level > 0 || self.indent >= column {
            return;
        }
        self.indents.push(self.indent);
        self.indent = column;
        let token = Token::new(kind, Span::empty(mark));
        match number {
            Some(number) => self.tokens.insert(number - self.tokens_taken, token),
            None => self.tokens.push_back(token),
        }
    }

    /// Close every block collection deeper than `column`.
    fn unroll_indent(&mut self, column: i32) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            let mark = self.reader.mark();
            self.tokens
                .push_back(Token::new(TokenKind::BlockEnd, Span::empty(mark)));
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    // ------------------------------------------------------------------
    // Token fetchers
    // ------------------------------------------------------------------

    fn fetch_stream_start(&mut self) {
        self.indent = -1;
        self.stream_start_produced = true;
        self.simple_key_allowed = true;
        self.simple_keys.push(SimpleKey::default());
        let mark = self.reader.mark();
        self.tokens.push_back(Token::new(
            TokenKind::StreamStart(self.encoding),
            Span::empty(mark),
        ));
    }

    fn fetch_stream_end(&mut self) -> Result<(), ScanError> {
        // The stream ends a line, so every candidate is now stale.
        if let Some(key) = self.simple_keys.iter().find(|k| k.possible && k.required) {
            return Err(ScanError::new(
                ScanErrorKind::MissingValueIndicator,
                key.mark,
            ));
        }
        for key in &mut self.simple_keys {
            key.possible = false;
        }
        self.unroll_indent(-1);
        self.simple_key_allowed = false;
        self.stream_end_produced = true;
        let mark = self.reader.mark();
        self.tokens
            .push_back(Token::new(TokenKind::StreamEnd, Span::empty(mark)));
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), ScanError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        if let Some(token) = self.scan_directive()? {
            self.tokens.push_back(token);
        }
        Ok(())
    }

    fn fetch_document_indicator(&mut self, kind: TokenKind<'src>) -> Result<(), ScanError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.reader.mark();
        self.reader.advance_by(3);
        self.push(kind, start);
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, kind: TokenKind<'src>) -> Result<(), ScanError> {
        // `[` and `{` may start a simple key: `[a, b]: c`.
        self.save_simple_key()?;
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let start = self.reader.mark();
        self.reader.advance();
        self.push(kind, start);
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, kind: TokenKind<'src>) -> Result<(), ScanError> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let start = self.reader.mark();
        self.reader.advance();
        self.push(kind, start);
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScanError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.reader.mark();
        self.reader.advance();
        self.push(TokenKind::FlowEntry, start);
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScanError> {
        let start = self.reader.mark();
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(self.error(ScanErrorKind::BlockEntryNotAllowed));
            }
            self.roll_indent(self.column(), None, TokenKind::BlockSequenceStart, start);
        }
        // In flow context the parser rejects the `-`.
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        self.reader.advance();
        self.push(TokenKind::BlockEntry, start);
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScanError> {
        let start = self.reader.mark();
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(self.error(ScanErrorKind::KeyNotAllowed));
            }
            self.roll_indent(self.column(), None, TokenKind::BlockMappingStart, start);
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        self.reader.advance();
        self.push(TokenKind::Key, start);
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScanError> {
        let start = self.reader.mark();
        let candidate = self.simple_keys.last().copied().filter(|key| key.possible);
        if let Some(key) = candidate {
            // Confirm the candidate: insert KEY (and maybe BLOCK-MAPPING-START)
            // in front of its first token.
            self.tokens.insert(
                key.token_number - self.tokens_taken,
                Token::new(TokenKind::Key, Span::empty(key.mark)),
            );
            self.roll_indent(
                key.mark.column as i32 - 1,
                Some(key.token_number),
                TokenKind::BlockMappingStart,
                key.mark,
            );
            if let Some(last) = self.simple_keys.last_mut() {
                last.possible = false;
            }
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Err(self.error(ScanErrorKind::ValueNotAllowed));
                }
                self.roll_indent(self.column(), None, TokenKind::BlockMappingStart, start);
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        self.reader.advance();
        self.push(TokenKind::Value, start);
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let start = self.reader.mark();
        self.reader.advance();
        let saved = self.reader.save();
        while is_anchor_char(self.reader.front()) {
            self.reader.advance();
        }
        let name = self.reader.slice_from(&saved);
        let c = self.reader.front();
        let terminated = is_blankz(c)
            || matches!(c, '?' | ':' | ',' | ']' | '}' | '%' | '@' | '`');
        if name.is_empty() || !terminated {
            return Err(ScanError::new(ScanErrorKind::InvalidAnchor, start));
        }

        let kind = if alias {
            TokenKind::Alias(name)
        } else {
            TokenKind::Anchor(name)
        };
        self.push(kind, start);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let start = self.reader.mark();
        let (handle, suffix) = if self.reader.peek(1) == '<' {
            self.reader.advance_by(2);
            let suffix = self.scan_tag_uri(false, None)?;
            if self.reader.front() != '>' {
                return Err(self.error(ScanErrorKind::InvalidTag(
                    "did not find the expected '>'",
                )));
            }
            self.reader.advance();
            ("", suffix)
        } else {
            let head = self.reader.offset() + 1;
            let handle = self.scan_tag_handle(false)?;
            if handle.len() > 1 && handle.ends_with('!') {
                (handle, self.scan_tag_uri(false, None)?)
            } else {
                // `!suffix`: what was scanned after the `!` starts the suffix.
                let suffix = self.scan_tag_uri(false, Some(head))?;
                if suffix.is_empty() {
                    // The lone non-specific tag `!`.
                    ("", Cow::Borrowed("!"))
                } else {
                    (&handle[..1], suffix)
                }
            }
        };

        let c = self.reader.front();
        if !(is_blankz(c) || (self.flow_level > 0 && c == ',')) {
            return Err(self.error(ScanErrorKind::InvalidTag(
                "did not find expected whitespace or line break",
            )));
        }
        self.push(TokenKind::Tag { handle, suffix }, start);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, style: ScalarStyle) -> Result<(), ScanError> {
        // A simple key may follow a block scalar.
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let token = self.scan_block_scalar(style)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, style: ScalarStyle) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_flow_scalar(style)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_plain_scalar()?;
        self.tokens.push_back(token);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Directives and tags
    // ------------------------------------------------------------------

    fn scan_directive(&mut self) -> Result<Option<Token<'src>>, ScanError> {
        let start = self.reader.mark();
        self.reader.advance();

        let name = self.scan_directive_name()?;
        let kind = match name {
            "YAML" => {
                let (major, minor) = self.scan_version_directive_value()?;
                Some(TokenKind::VersionDirective { major, minor })
            }
            "TAG" => {
                let (handle, prefix) = self.scan_tag_directive_value()?;
                Some(TokenKind::TagDirective { handle, prefix })
            }
            _ => {
                trace!("skipping reserved directive %{}", name);
                while !is_breakz(self.reader.front()) {
                    self.reader.advance();
                }
                None
            }
        };
        let end = self.reader.mark();

        while is_blank(self.reader.front()) {
            self.reader.advance();
        }
        if self.reader.front() == '#' {
            while !is_breakz(self.reader.front()) {
                self.reader.advance();
            }
        }
        if !is_breakz(self.reader.front()) {
            return Err(self.error(ScanErrorKind::InvalidDirective(
                "did not find expected comment or line break",
            )));
        }
        Ok(kind.map(|kind| Token::new(kind, Span::new(start, end))))
    }

    fn scan_directive_name(&mut self) -> Result<&'src str, ScanError> {
        let saved = self.reader.save();
        while is_anchor_char(self.reader.front()) {
            self.reader.advance();
        }
        let name = self.reader.slice_from(&saved);
        if name.is_empty() {
            return Err(self.error(ScanErrorKind::InvalidDirective(
                "could not find expected directive name",
            )));
        }
        if !is_blankz(self.reader.front()) {
            return Err(self.error(ScanErrorKind::InvalidDirective(
                "found unexpected non-alphabetical character",
            )));
        }
        Ok(name)
    }

    fn scan_version_directive_value(&mut self) -> Result<(u32, u32), ScanError> {
        while is_blank(self.reader.front()) {
            self.reader.advance();
        }
        let major = self.scan_version_number()?;
        if self.reader.front() != '.' {
            return Err(self.error(ScanErrorKind::InvalidDirective(
                "did not find expected digit or '.' character",
            )));
        }
        self.reader.advance();
        let minor = self.scan_version_number()?;
        Ok((major, minor))
    }

    fn scan_version_number(&mut self) -> Result<u32, ScanError> {
        let mut value = 0u32;
        let mut length = 0;
        while let Some(digit) = self.reader.front().to_digit(10) {
            length += 1;
            if length > 9 {
                return Err(self.error(ScanErrorKind::InvalidDirective(
                    "found extremely long version number",
                )));
            }
            value = value * 10 + digit;
            self.reader.advance();
        }
        if length == 0 {
            return Err(self.error(ScanErrorKind::InvalidDirective(
                "did not find expected version number",
            )));
        }
        Ok(value)
    }

    fn scan_tag_directive_value(&mut self) -> Result<(&'src str, Cow<'src, str>), ScanError> {
        while is_blank(self.reader.front()) {
            self.reader.advance();
        }
        let handle = self.scan_tag_handle(true)?;
        if !is_blank(self.reader.front()) {
            return Err(self.error(ScanErrorKind::InvalidDirective(
                "did not find expected whitespace",
            )));
        }
        while is_blank(self.reader.front()) {
            self.reader.advance();
        }
        let prefix = self.scan_tag_uri(true, None)?;
        if !is_blankz(self.reader.front()) {
            return Err(self.error(ScanErrorKind::InvalidDirective(
                "did not find expected whitespace or line break",
            )));
        }
        Ok((handle, prefix))
    }

    fn tag_error(&self, directive: bool, problem: &'static str) -> ScanError {
        if directive {
            self.error(ScanErrorKind::InvalidDirective(problem))
        } else {
            self.error(ScanErrorKind::InvalidTag(problem))
        }
    }

    /// Scan `!`, `!!` or `!name!`. Outside directives a handle may also be
    /// `!name` without the closing `!`, which is really the start of a suffix.
    fn scan_tag_handle(&mut self, directive: bool) -> Result<&'src str, ScanError> {
        if self.reader.front() != '!' {
            return Err(self.tag_error(directive, "did not find expected '!'"));
        }
        let saved = self.reader.save();
        self.reader.advance();
        while is_anchor_char(self.reader.front()) {
            self.reader.advance();
        }
        if self.reader.front() == '!' {
            self.reader.advance();
        } else if directive && self.reader.slice_from(&saved) != "!" {
            return Err(self.tag_error(directive, "did not find expected '!'"));
        }
        Ok(self.reader.slice_from(&saved))
    }

    /// Scan a tag URI. `head` is the byte offset of an already consumed
    /// beginning of the URI.
    fn scan_tag_uri(
        &mut self,
        directive: bool,
        head: Option<usize>,
    ) -> Result<Cow<'src, str>, ScanError> {
        let mut text = Text::new(self.reader.source());
        if let Some(from) = head {
            text.push_source(from, self.reader.offset());
        }
        loop {
            let c = self.reader.front();
            if c == '%' {
                let decoded = self.scan_uri_escapes(directive)?;
                text.push_str(&decoded);
            } else if is_uri_char(c, self.flow_level > 0) {
                self.take_char(&mut text);
            } else {
                break;
            }
        }
        if text.is_empty() && head.is_none() {
            return Err(self.tag_error(directive, "did not find expected tag URI"));
        }
        Ok(text.into_cow())
    }

    /// Decode a run of `%XX` escapes forming one UTF-8 character.
    fn scan_uri_escapes(&mut self, directive: bool) -> Result<String, ScanError> {
        let mut bytes = Vec::with_capacity(4);
        let mut remaining = 0;
        loop {
            let high = self.reader.peek(1).to_digit(16);
            let low = self.reader.peek(2).to_digit(16);
            let (Some(high), Some(low)) = (high, low) else {
                return Err(self.tag_error(directive, "did not find URI escaped octet"));
            };
            if self.reader.front() != '%' {
                return Err(self.tag_error(directive, "did not find URI escaped octet"));
            }
            let octet = (high * 16 + low) as u8;
            if remaining == 0 {
                remaining = match octet {
                    0x00..=0x7F => 1,
                    _ if octet & 0xE0 == 0xC0 => 2,
                    _ if octet & 0xF0 == 0xE0 => 3,
                    _ if octet & 0xF8 == 0xF0 => 4,
                    _ => {
                        return Err(self.tag_error(
                            directive,
                            "found an incorrect leading UTF-8 octet",
                        ));
                    }
                };
            } else if octet & 0xC0 != 0x80 {
                return Err(self.tag_error(directive, "found an incorrect trailing UTF-8 octet"));
            }
            bytes.push(octet);
            self.reader.advance_by(3);
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
        String::from_utf8(bytes)
            .map_err(|_| self.tag_error(directive, "found an invalid UTF-8 sequence"))
    }

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    fn scan_block_scalar(&mut self, style: ScalarStyle) -> Result<Token<'src>, ScanError> {
        let literal = style == ScalarStyle::Literal;
        let start = self.reader.mark();
        self.reader.advance();

        // Header: chomping and indentation indicators, in either order.
        let mut chomping = Chomping::Clip;
        let mut increment = 0i32;
        let c = self.reader.front();
        if c == '+' || c == '-' {
            chomping = if c == '+' { Chomping::Keep } else { Chomping::Strip };
            self.reader.advance();
            if let Some(digit) = self.reader.front().to_digit(10) {
                increment = self.indentation_indicator(digit)?;
                self.reader.advance();
            }
        } else if let Some(digit) = c.to_digit(10) {
            increment = self.indentation_indicator(digit)?;
            self.reader.advance();
            match self.reader.front() {
                '+' => chomping = Chomping::Keep,
                '-' => chomping = Chomping::Strip,
                _ => {}
            }
            if chomping != Chomping::Clip {
                self.reader.advance();
            }
        }

        while is_blank(self.reader.front()) {
            self.reader.advance();
        }
        if self.reader.front() == '#' {
            while !is_breakz(self.reader.front()) {
                self.reader.advance();
            }
        }
        if !is_breakz(self.reader.front()) {
            return Err(self.error(ScanErrorKind::InvalidBlockScalarHeader(
                "did not find expected comment or line break",
            )));
        }
        self.skip_line();

        let mut end = self.reader.mark();
        let mut indent = match increment {
            0 => 0,
            n if self.indent >= 0 => self.indent + n,
            n => n,
        };

        let source = self.reader.source();
        let mut value = Text::new(source);
        let mut leading_break = Text::new(source);
        let mut trailing_breaks = Text::new(source);

        self.scan_block_scalar_breaks(&mut indent, &mut trailing_breaks, &mut end)?;

        let mut leading_blank = false;
        while self.column() == indent && self.reader.front() != '\0' {
            let trailing_blank = is_blank(self.reader.front());
            // Folding: a single line break between two non-indented lines
            // becomes a space.
            if !literal && leading_break.starts_with('\n') && !leading_blank && !trailing_blank {
                if trailing_breaks.is_empty() {
                    value.push(' ');
                }
                leading_break.clear();
            } else {
                value.append(&leading_break);
                leading_break.clear();
            }
            value.append(&trailing_breaks);
            trailing_breaks.clear();

            leading_blank = is_blank(self.reader.front());
            while !is_breakz(self.reader.front()) {
                self.take_char(&mut value);
            }
            self.read_line(&mut leading_break);
            self.scan_block_scalar_breaks(&mut indent, &mut trailing_breaks, &mut end)?;
        }

        if chomping != Chomping::Strip {
            value.append(&leading_break);
        }
        if chomping == Chomping::Keep {
            value.append(&trailing_breaks);
        }

        Ok(Token::new(
            TokenKind::Scalar {
                value: value.into_cow(),
                style,
            },
            Span::new(start, end),
        ))
    }

    fn indentation_indicator(&self, digit: u32) -> Result<i32, ScanError> {
        if digit == 0 {
            return Err(self.error(ScanErrorKind::InvalidBlockScalarHeader(
                "found an indentation indicator equal to 0",
            )));
        }
        Ok(digit as i32)
    }

    /// Consume empty lines (and the indentation of the next content line)
    /// of a block scalar, determining the indentation if it is still unknown.
    fn scan_block_scalar_breaks(
        &mut self,
        indent: &mut i32,
        breaks: &mut Text<'src>,
        end: &mut Mark,
    ) -> Result<(), ScanError> {
        let mut max_indent = 0;
        *end = self.reader.mark();
        loop {
            while (*indent == 0 || self.column() < *indent) && self.reader.front() == ' ' {
                self.reader.advance();
            }
            max_indent = max_indent.max(self.column());
            if (*indent == 0 || self.column() < *indent) && self.reader.front() == '\t' {
                return Err(self.error(ScanErrorKind::TabIndentation));
            }
            if !is_break(self.reader.front()) {
                break;
            }
            self.read_line(breaks);
            *end = self.reader.mark();
        }
        if *indent == 0 {
            *indent = max_indent.max(self.indent + 1).max(1);
        }
        Ok(())
    }

    fn scan_flow_scalar(&mut self, style: ScalarStyle) -> Result<Token<'src>, ScanError> {
        let single = style == ScalarStyle::SingleQuoted;
        let quote = if single { '\'' } else { '"' };
        let start = self.reader.mark();
        self.reader.advance();

        let source = self.reader.source();
        let mut value = Text::new(source);
        let mut leading_break = Text::new(source);
        let mut trailing_breaks = Text::new(source);
        let mut whitespaces = Text::new(source);

        loop {
            if self.column() == 0
                && (self.at_document_marker("---") || self.at_document_marker("..."))
            {
                return Err(self.error(ScanErrorKind::DocumentMarkerInScalar));
            }
            if self.reader.is_eof() || self.reader.front() == '\0' {
                return Err(ScanError::new(ScanErrorKind::UnterminatedScalar, start));
            }

            let mut leading_blanks = false;
            while !is_blankz(self.reader.front()) {
                let c = self.reader.front();
                if single && c == '\'' && self.reader.peek(1) == '\'' {
                    value.push('\'');
                    self.reader.advance_by(2);
                } else if c == quote {
                    break;
                } else if !single && c == '\\' && is_break(self.reader.peek(1)) {
                    // Escaped line break: join without a space.
                    self.reader.advance();
                    self.skip_line();
                    leading_blanks = true;
                    break;
                } else if !single && c == '\\' {
                    self.scan_escape(&mut value)?;
                } else {
                    self.take_char(&mut value);
                }
            }

            if self.reader.front() == quote {
                break;
            }

            while is_blank(self.reader.front()) || is_break(self.reader.front()) {
                if is_blank(self.reader.front()) {
                    if leading_blanks {
                        self.reader.advance();
                    } else {
                        self.take_char(&mut whitespaces);
                    }
                } else if !leading_blanks {
                    whitespaces.clear();
                    self.read_line(&mut leading_break);
                    leading_blanks = true;
                } else {
                    self.read_line(&mut trailing_breaks);
                }
            }

            if leading_blanks {
                if leading_break.starts_with('\n') {
                    if trailing_breaks.is_empty() {
                        value.push(' ');
                    } else {
                        value.append(&trailing_breaks);
                    }
                } else {
                    value.append(&leading_break);
                    value.append(&trailing_breaks);
                }
                leading_break.clear();
                trailing_breaks.clear();
            } else {
                value.append(&whitespaces);
                whitespaces.clear();
            }
        }

        // Closing quote.
        self.reader.advance();
        let span = Span::new(start, self.reader.mark());
        Ok(Token::new(
            TokenKind::Scalar {
                value: value.into_cow(),
                style,
            },
            span,
        ))
    }

    /// Decode one escape sequence of a double-quoted scalar.
    fn scan_escape(&mut self, value: &mut Text<'src>) -> Result<(), ScanError> {
        let mark = self.reader.mark();
        let c = self.reader.peek(1);
        let simple = match c {
            '0' => Some('\0'),
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            't' | '\t' => Some('\t'),
            'n' => Some('\n'),
            'v' => Some('\u{0B}'),
            'f' => Some('\u{0C}'),
            'r' => Some('\r'),
            'e' => Some('\u{1B}'),
            ' ' => Some(' '),
            '"' => Some('"'),
            '/' => Some('/'),
            '\\' => Some('\\'),
            'N' => Some('\u{85}'),
            '_' => Some('\u{A0}'),
            'L' => Some('\u{2028}'),
            'P' => Some('\u{2029}'),
            _ => None,
        };
        if let Some(ch) = simple {
            value.push(ch);
            self.reader.advance_by(2);
            return Ok(());
        }

        let width = match c {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => {
                return Err(ScanError::new(
                    ScanErrorKind::InvalidEscape(format!("\\{}", c.escape_debug())),
                    mark,
                ));
            }
        };
        self.reader.advance_by(2);
        let saved = self.reader.save();
        let mut code = 0u32;
        for _ in 0..width {
            let Some(digit) = self.reader.front().to_digit(16) else {
                let seq = format!("\\{c}{}", self.reader.slice_from(&saved));
                return Err(ScanError::new(ScanErrorKind::InvalidEscape(seq), mark));
            };
            code = code * 16 + digit;
            self.reader.advance();
        }
        let Some(ch) = char::from_u32(code) else {
            let seq = format!("\\{c}{}", self.reader.slice_from(&saved));
            return Err(ScanError::new(ScanErrorKind::InvalidEscape(seq), mark));
        };
        value.push(ch);
        Ok(())
    }

    fn scan_plain_scalar(&mut self) -> Result<Token<'src>, ScanError> {
        let start = self.reader.mark();
        let mut end = start;
        let indent = self.indent + 1;

        let source = self.reader.source();
        let mut value = Text::new(source);
        let mut leading_break = Text::new(source);
        let mut trailing_breaks = Text::new(source);
        let mut whitespaces = Text::new(source);
        let mut leading_blanks = false;

        loop {
            if self.column() == 0
                && (self.at_document_marker("---") || self.at_document_marker("..."))
            {
                break;
            }
            if self.reader.front() == '#' {
                break;
            }

            while !is_blankz(self.reader.front()) {
                let c = self.reader.front();
                let next = self.reader.peek(1);
                if self.flow_level > 0 && c == ':' && !is_blankz(next) && !is_flow_indicator(next)
                {
                    return Err(self.error(ScanErrorKind::UnexpectedColon));
                }
                if (c == ':' && is_blankz(next))
                    || (self.flow_level > 0
                        && matches!(c, ',' | ':' | '?' | '[' | ']' | '{' | '}'))
                {
                    break;
                }

                if leading_blanks || !whitespaces.is_empty() {
                    if leading_blanks {
                        if leading_break.starts_with('\n') {
                            if trailing_breaks.is_empty() {
                                value.push(' ');
                            } else {
                                value.append(&trailing_breaks);
                            }
                        } else {
                            value.append(&leading_break);
                            value.append(&trailing_breaks);
                        }
                        leading_break.clear();
                        trailing_breaks.clear();
                        leading_blanks = false;
                    } else {
                        value.append(&whitespaces);
                        whitespaces.clear();
                    }
                }

                self.take_char(&mut value);
                end = self.reader.mark();
            }

            if !(is_blank(self.reader.front()) || is_break(self.reader.front())) {
                break;
            }

            while is_blank(self.reader.front()) || is_break(self.reader.front()) {
                if is_blank(self.reader.front()) {
                    if leading_blanks && self.column() < indent && self.reader.front() == '\t' {
                        return Err(self.error(ScanErrorKind::TabIndentation));
                    }
                    if leading_blanks {
                        self.reader.advance();
                    } else {
                        self.take_char(&mut whitespaces);
                    }
                } else if !leading_blanks {
                    whitespaces.clear();
                    self.read_line(&mut leading_break);
                    leading_blanks = true;
                } else {
                    self.read_line(&mut trailing_breaks);
                }
            }

            if self.flow_level == 0 && self.column() < indent {
                break;
            }
        }

        // A multi-line scalar ends at the start of a line, where a key may follow.
        if leading_blanks {
            self.simple_key_allowed = true;
        }

        Ok(Token::new(
            TokenKind::Scalar {
                value: value.into_cow(),
                style: ScalarStyle::Plain,
            },
            Span::new(start, end),
        ))
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Result<Token<'src>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[inline]
fn is_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

#[inline]
fn is_breakz(c: char) -> bool {
    is_break(c) || c == '\0'
}

#[inline]
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[inline]
fn is_blankz(c: char) -> bool {
    is_blank(c) || is_breakz(c)
}

#[inline]
fn is_flow_indicator(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// Characters allowed in anchor names, directive names and tag handles.
#[inline]
fn is_anchor_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Characters allowed in tag URIs (besides `%` escapes). Flow indicators end
/// a tag inside flow collections.
fn is_uri_char(c: char, in_flow: bool) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '_'
                | ';'
                | '/'
                | '?'
                | ':'
                | '@'
                | '&'
                | '='
                | '+'
                | '$'
                | '.'
                | '!'
                | '~'
                | '*'
                | '\''
                | '('
                | ')'
        )
        || (!in_flow && matches!(c, ',' | '[' | ']'))
}
