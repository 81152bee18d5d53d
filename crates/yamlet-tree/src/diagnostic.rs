//! Diagnostic rendering for load errors.

use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};
use yamlet_parse::{Mark, ParseErrorKind, ScanErrorKind};

use crate::{ComposeErrorKind, LoadError};

impl LoadError {
    /// Render this error with ariadne.
    ///
    /// `source` must be the decoded text the error was found in.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename, source);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        source: &str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, Range<usize>)> {
        let Some(mark) = self.mark() else {
            return Report::build(ReportKind::Error, (filename, 0..0)).with_message(self.message());
        };
        let range = char_range(source, mark);

        let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(self.message())
            .with_label(
                Label::new((filename, range))
                    .with_message(self.label())
                    .with_color(Color::Red),
            );

        if let LoadError::Compose(err) = self
            && let ComposeErrorKind::DuplicateAnchor { first, .. } = &err.kind
        {
            report = report.with_label(
                Label::new((filename, char_range(source, *first)))
                    .with_message("first defined here")
                    .with_color(Color::Blue),
            );
        }

        if let Some(help) = self.help() {
            report = report.with_help(help);
        }
        report
    }

    fn label(&self) -> &'static str {
        match self {
            LoadError::Encoding(_) => "not allowed in YAML",
            LoadError::Scan(err) => match err.kind {
                ScanErrorKind::TabIndentation => "tab here",
                ScanErrorKind::UnterminatedScalar => "scalar starts here",
                ScanErrorKind::InvalidEscape(_) => "invalid escape",
                ScanErrorKind::MissingValueIndicator => "key starts here",
                _ => "here",
            },
            LoadError::Parse(err) => match err.kind {
                ParseErrorKind::UndefinedTagHandle(_) => "unknown handle",
                ParseErrorKind::DuplicateTagDirective(_)
                | ParseErrorKind::DuplicateVersionDirective => "repeated directive",
                _ => "unexpected",
            },
            LoadError::Compose(err) => match err.kind {
                ComposeErrorKind::UndefinedAlias(_) => "no anchor with this name",
                ComposeErrorKind::RecursiveAlias(_) => "refers to an enclosing node",
                ComposeErrorKind::DuplicateAnchor { .. } => "defined again here",
                _ => "here",
            },
            LoadError::DocumentCount { .. } => "here",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            LoadError::Scan(err) => match err.kind {
                ScanErrorKind::TabIndentation => Some("indent with spaces"),
                ScanErrorKind::InvalidEscape(_) => Some(
                    "valid escapes are: \\0 \\a \\b \\t \\n \\v \\f \\r \\e \\\" \\/ \\\\ \\N \\_ \\L \\P \\xXX \\uXXXX \\UXXXXXXXX",
                ),
                ScanErrorKind::UnterminatedScalar => Some("add the closing quote"),
                _ => None,
            },
            LoadError::Parse(err) => match err.kind {
                ParseErrorKind::UndefinedTagHandle(_) => {
                    Some("declare the handle with a %TAG directive before the document")
                }
                _ => None,
            },
            LoadError::Compose(err) => match err.kind {
                ComposeErrorKind::UndefinedAlias(_) => Some("an alias must follow its anchor"),
                ComposeErrorKind::RecursiveAlias(_) => {
                    Some("aliases may only refer to nodes that are already complete")
                }
                ComposeErrorKind::DuplicateAnchor { .. } => {
                    Some("anchor names must be unique within a document")
                }
                _ => None,
            },
            LoadError::DocumentCount { .. } => Some("use load_all for multi-document streams"),
            LoadError::Encoding(_) => None,
        }
    }
}

/// The character range of the character at `mark`.
fn char_range(source: &str, mark: Mark) -> Range<usize> {
    let at = (mark.index as usize).min(source.len());
    let start = source.get(..at).map_or(0, |prefix| prefix.chars().count());
    let width = usize::from(at < source.len());
    start..start + width
}
