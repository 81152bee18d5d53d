//! Scalar text that stays a slice of the source for as long as it can.

use std::borrow::Cow;

/// Accumulates scalar content.
///
/// Appending a range of the source that directly follows what was appended
/// before only moves the end offset; anything else (escapes, folded line
/// breaks, non-adjacent ranges) switches to an owned buffer.
#[derive(Debug, Clone)]
pub(crate) struct Text<'src> {
    source: &'src str,
    start: usize,
    end: usize,
    owned: Option<String>,
}

impl<'src> Text<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            start: 0,
            end: 0,
            owned: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match &self.owned {
            Some(s) => s.is_empty(),
            None => self.start == self.end,
        }
    }

    /// Whether the content starts with `c`.
    pub(crate) fn starts_with(&self, c: char) -> bool {
        match &self.owned {
            Some(s) => s.starts_with(c),
            None => self.source[self.start..self.end].starts_with(c),
        }
    }

    /// Append `source[from..to]`.
    pub(crate) fn push_source(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let source = self.source;
        if let Some(s) = &mut self.owned {
            s.push_str(&source[from..to]);
        } else if self.start == self.end {
            self.start = from;
            self.end = to;
        } else if self.end == from {
            self.end = to;
        } else {
            self.owned_mut().push_str(&source[from..to]);
        }
    }

    pub(crate) fn push(&mut self, c: char) {
        self.owned_mut().push(c);
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        if !s.is_empty() {
            self.owned_mut().push_str(s);
        }
    }

    /// Append the content of another accumulator over the same source.
    pub(crate) fn append(&mut self, other: &Text<'src>) {
        match &other.owned {
            Some(s) => self.push_str(s),
            None => self.push_source(other.start, other.end),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
        self.owned = None;
    }

    pub(crate) fn into_cow(self) -> Cow<'src, str> {
        match self.owned {
            Some(s) => Cow::Owned(s),
            None => Cow::Borrowed(&self.source[self.start..self.end]),
        }
    }

    fn owned_mut(&mut self) -> &mut String {
        let source = self.source;
        let current = &source[self.start..self.end];
        self.owned.get_or_insert_with(|| current.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn adjacent_ranges_stay_borrowed() {
        let source = "hello world";
        let mut text = Text::new(source);
        text.push_source(0, 5);
        text.push_source(5, 6);
        text.push_source(6, 11);
        assert!(matches!(text.into_cow(), Cow::Borrowed("hello world")));
    }

    #[test]
    fn gap_switches_to_owned() {
        let source = "hello   world";
        let mut text = Text::new(source);
        text.push_source(0, 5);
        text.push(' ');
        text.push_source(8, 13);
        let cow = text.into_cow();
        assert!(matches!(cow, Cow::Owned(_)));
        assert_eq!(cow, "hello world");
    }

    #[test]
    fn append_and_clear() {
        let source = "a\nb";
        let mut line_break = Text::new(source);
        line_break.push_source(1, 2);
        let mut text = Text::new(source);
        text.push_source(0, 1);
        text.append(&line_break);
        line_break.clear();
        assert!(line_break.is_empty());
        text.push_source(2, 3);
        assert!(matches!(text.into_cow(), Cow::Borrowed("a\nb")));
    }
}
