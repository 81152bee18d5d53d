//! Character cursor over decoded source text.

use crate::Mark;

/// A pull-based character cursor with line/column tracking.
///
/// Cloning a reader (see [`Reader::save`]) yields an independent cursor over
/// the same buffer; the text itself is never copied.
#[derive(Debug, Clone)]
pub struct Reader<'src> {
    /// The decoded source text.
    source: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Number of characters before `pos`.
    char_index: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column (1-based, in characters).
    column: u32,
    /// Number of ASCII bytes starting at `pos`. While this is non-zero the
    /// current character is `source[pos]` and no UTF-8 decoding is needed.
    ascii_run: usize,
}

impl<'src> Reader<'src> {
    /// Create a reader positioned at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            char_index: 0,
            line: 1,
            column: 1,
            ascii_run: ascii_run_at(source.as_bytes(), 0),
        }
    }

    /// The whole source text.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// The text from the current position to the end.
    #[inline]
    pub fn remaining(&self) -> &'src str {
        &self.source[self.pos..]
    }

    /// Current byte offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of characters consumed so far.
    #[inline]
    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// Current line (1-based).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column (1-based).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Position of the current character.
    ///
    /// The byte offset fits a `u32` for any text that passed
    /// [`check_printable`](crate::check_printable).
    #[inline]
    pub fn mark(&self) -> Mark {
        Mark::new(self.pos as u32, self.line, self.column)
    }

    /// Whether the cursor is past the last character.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// The current character, or `'\0'` at the end of input.
    #[inline]
    pub fn front(&self) -> char {
        if self.ascii_run > 0 {
            return self.source.as_bytes()[self.pos] as char;
        }
        self.remaining().chars().next().unwrap_or('\0')
    }

    /// The character `n` positions ahead of the cursor, or `'\0'` past the
    /// end of input. `peek(0)` is [`Reader::front`].
    #[inline]
    pub fn peek(&self, n: usize) -> char {
        if n < self.ascii_run {
            return self.source.as_bytes()[self.pos + n] as char;
        }
        self.remaining().chars().nth(n).unwrap_or('\0')
    }

    /// Whether the remaining text starts with `prefix`.
    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.remaining().starts_with(prefix)
    }

    /// Move forward one character.
    pub fn advance(&mut self) {
        if self.is_eof() {
            return;
        }
        let c = self.front();
        if self.ascii_run > 0 {
            self.pos += 1;
            self.ascii_run -= 1;
        } else {
            self.pos += c.len_utf8();
            self.ascii_run = ascii_run_at(self.source.as_bytes(), self.pos);
        }
        self.char_index += 1;

        let is_break = match c {
            '\n' | '\u{85}' | '\u{2028}' | '\u{2029}' => true,
            // A CR LF pair breaks the line on the LF.
            '\r' => self.front() != '\n',
            _ => false,
        };
        if is_break {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Move forward `n` characters.
    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// An independent cursor at the current position.
    #[inline]
    pub fn save(&self) -> Reader<'src> {
        self.clone()
    }

    /// The text between a saved cursor and the current position.
    #[inline]
    pub fn slice_from(&self, saved: &Reader<'src>) -> &'src str {
        debug_assert!(saved.pos <= self.pos);
        &self.source[saved.pos..self.pos]
    }
}

/// Length of the run of ASCII bytes starting at `pos`.
fn ascii_run_at(bytes: &[u8], pos: usize) -> usize {
    bytes[pos.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    /// Walk `source` one `char` at a time without any fast path.
    fn naive(source: &str) -> Vec<(char, u32, u32)> {
        let chars: Vec<char> = source.chars().collect();
        let mut out = Vec::with_capacity(chars.len());
        let (mut line, mut column) = (1, 1);
        for (i, &c) in chars.iter().enumerate() {
            out.push((c, line, column));
            let is_break = match c {
                '\n' | '\u{85}' | '\u{2028}' | '\u{2029}' => true,
                '\r' => chars.get(i + 1) != Some(&'\n'),
                _ => false,
            };
            if is_break {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        out
    }

    fn walk(source: &str) -> Vec<(char, u32, u32)> {
        let mut reader = Reader::new(source);
        let mut out = Vec::new();
        while !reader.is_eof() {
            out.push((reader.front(), reader.line(), reader.column()));
            reader.advance();
        }
        out
    }

    #[test]
    fn ascii_positions() {
        let mut reader = Reader::new("ab\ncd");
        assert_eq!(reader.mark(), Mark::new(0, 1, 1));
        reader.advance_by(3);
        assert_eq!(reader.front(), 'c');
        assert_eq!(reader.mark(), Mark::new(3, 2, 1));
    }

    #[test]
    fn multibyte_columns_count_characters() {
        let mut reader = Reader::new("é日x");
        reader.advance_by(2);
        assert_eq!(reader.front(), 'x');
        assert_eq!(reader.column(), 3);
        assert_eq!(reader.offset(), 5);
        assert_eq!(reader.char_index(), 2);
    }

    #[test]
    fn line_breaks() {
        let source = "a\r\nb\rc\u{85}d\u{2028}e";
        let lines: Vec<_> = walk(source)
            .into_iter()
            .filter(|(c, _, _)| c.is_alphabetic())
            .map(|(c, line, _)| (c, line))
            .collect();
        assert_eq!(
            lines,
            vec![('a', 1), ('b', 2), ('c', 3), ('d', 4), ('e', 5)]
        );
    }

    #[test]
    fn peek_crosses_runs() {
        let reader = Reader::new("a€b");
        assert_eq!(reader.peek(0), 'a');
        assert_eq!(reader.peek(1), '€');
        assert_eq!(reader.peek(2), 'b');
        assert_eq!(reader.peek(3), '\0');
    }

    #[test]
    fn save_and_slice() {
        let mut reader = Reader::new("key: värde");
        reader.advance_by(5);
        let saved = reader.save();
        reader.advance_by(5);
        assert_eq!(reader.slice_from(&saved), "värde");
        assert_eq!(saved.front(), 'v');
        assert!(reader.is_eof());
        assert_eq!(reader.front(), '\0');
    }

    #[test]
    fn alternating_widths_at_every_offset() {
        let pieces = ["a", "é", "\n", "日", "\r", "😀", "\r\n", "\u{2029}", " "];
        for shift in 0..pieces.len() {
            let source: String = (0..40).map(|i| pieces[(i + shift) % pieces.len()]).collect();
            assert_eq!(walk(&source), naive(&source), "shift {shift}");
        }
    }

    mod proptests {
        use super::{naive, walk};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fast_path_matches_naive_decoder(
                source in proptest::collection::vec(
                    prop_oneof![
                        Just('a'), Just(' '), Just('\n'), Just('\r'), Just(':'),
                        Just('é'), Just('€'), Just('😀'), Just('\u{85}'), Just('\u{2028}'),
                        any::<char>(),
                    ],
                    0..64,
                ).prop_map(|chars| chars.into_iter().collect::<String>())
            ) {
                prop_assert_eq!(walk(&source), naive(&source));
            }
        }
    }
}
