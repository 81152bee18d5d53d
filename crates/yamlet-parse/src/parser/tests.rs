use std::borrow::Cow;
use std::fmt::Write;

use super::*;
use facet_testhelpers::test;

/// One line per event, in the notation of the YAML test suite.
fn dump(source: &str) -> String {
    Parser::new(source)
        .map(|event| describe(&event.unwrap().kind))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe(kind: &EventKind<'_>) -> String {
    match kind {
        EventKind::StreamStart { .. } => "+STR".into(),
        EventKind::StreamEnd => "-STR".into(),
        EventKind::DocumentStart { explicit, .. } => {
            if *explicit { "+DOC ---" } else { "+DOC" }.into()
        }
        EventKind::DocumentEnd { explicit } => {
            if *explicit { "-DOC ..." } else { "-DOC" }.into()
        }
        EventKind::Alias { anchor } => format!("=ALI *{anchor}"),
        EventKind::Scalar {
            anchor,
            tag,
            value,
            style,
            ..
        } => {
            let mut out = String::from("=VAL");
            properties(&mut out, *anchor, tag);
            let sigil = match style {
                ScalarStyle::Plain => ':',
                ScalarStyle::SingleQuoted => '\'',
                ScalarStyle::DoubleQuoted => '"',
                ScalarStyle::Literal => '|',
                ScalarStyle::Folded => '>',
            };
            let escaped = value
                .replace('\\', "\\\\")
                .replace('\n', "\\n")
                .replace('\t', "\\t");
            write!(out, " {sigil}{escaped}").unwrap();
            out
        }
        EventKind::SequenceStart {
            anchor, tag, style, ..
        } => {
            let mut out = String::from("+SEQ");
            if *style == CollectionStyle::Flow {
                out.push_str(" []");
            }
            properties(&mut out, *anchor, tag);
            out
        }
        EventKind::SequenceEnd => "-SEQ".into(),
        EventKind::MappingStart {
            anchor, tag, style, ..
        } => {
            let mut out = String::from("+MAP");
            if *style == CollectionStyle::Flow {
                out.push_str(" {}");
            }
            properties(&mut out, *anchor, tag);
            out
        }
        EventKind::MappingEnd => "-MAP".into(),
    }
}

fn properties(out: &mut String, anchor: Option<&str>, tag: &Option<Cow<'_, str>>) {
    if let Some(anchor) = anchor {
        write!(out, " &{anchor}").unwrap();
    }
    if let Some(tag) = tag {
        write!(out, " <{tag}>").unwrap();
    }
}

fn error(source: &str) -> ParseError {
    Parser::new(source)
        .find_map(|event| event.err())
        .expect("no error")
}

fn scalar_event(source: &str) -> EventKind<'_> {
    Parser::new(source)
        .map(|event| event.unwrap().kind)
        .find(|kind| matches!(kind, EventKind::Scalar { .. }))
        .expect("no scalar")
}

#[test]
fn empty_stream() {
    insta::assert_snapshot!(dump(""), @r"
    +STR
    -STR
    ");
}

#[test]
fn simple_mapping() {
    insta::assert_snapshot!(dump("a: 1"), @r"
    +STR
    +DOC
    +MAP
    =VAL :a
    =VAL :1
    -MAP
    -DOC
    -STR
    ");
}

#[test]
fn indentless_sequence_as_mapping_value() {
    insta::assert_snapshot!(dump("k:\n- a\n- b\nj: c"), @r"
    +STR
    +DOC
    +MAP
    =VAL :k
    +SEQ
    =VAL :a
    =VAL :b
    -SEQ
    =VAL :j
    =VAL :c
    -MAP
    -DOC
    -STR
    ");
}

#[test]
fn value_node_returns_to_enclosing_collection() {
    let mut parser = Parser::new("k:\n- a\n");
    for _ in 0..4 {
        parser.next_event().unwrap();
    }
    assert_eq!(parser.state, State::BlockMappingValue);
    let event = parser.next_event().unwrap().unwrap();
    assert!(matches!(event.kind, EventKind::SequenceStart { .. }));
    assert_eq!(parser.state, State::IndentlessSequenceEntry);
    assert_eq!(parser.states.last(), Some(&State::BlockMappingKey));

    let mut parser = Parser::new("[a]");
    for _ in 0..3 {
        parser.next_event().unwrap();
    }
    assert_eq!(parser.state, State::FlowSequenceFirstEntry);
    let event = parser.next_event().unwrap().unwrap();
    assert!(matches!(event.kind, EventKind::Scalar { .. }));
    assert_eq!(parser.state, State::FlowSequenceEntry);
}

#[test]
fn flow_mapping_with_keys_without_values() {
    insta::assert_snapshot!(dump("{a: [1, 2], b}"), @r"
    +STR
    +DOC
    +MAP {}
    =VAL :a
    +SEQ []
    =VAL :1
    =VAL :2
    -SEQ
    =VAL :b
    =VAL :
    -MAP
    -DOC
    -STR
    ");
}

#[test]
fn single_pair_mapping_in_flow_sequence() {
    insta::assert_snapshot!(dump("[a: b, c]"), @r"
    +STR
    +DOC
    +SEQ []
    +MAP {}
    =VAL :a
    =VAL :b
    -MAP
    =VAL :c
    -SEQ
    -DOC
    -STR
    ");
}

#[test]
fn anchors_aliases_and_tags() {
    insta::assert_snapshot!(dump("- &a !!str x\n- *a\n- !local y\n- !<tag:v> z"), @r"
    +STR
    +DOC
    +SEQ
    =VAL &a <tag:yaml.org,2002:str> :x
    =ALI *a
    =VAL <!local> :y
    =VAL <tag:v> :z
    -SEQ
    -DOC
    -STR
    ");
}

#[test]
fn tag_before_anchor() {
    insta::assert_snapshot!(dump("!!str &a x"), @r"
    +STR
    +DOC
    =VAL &a <tag:yaml.org,2002:str> :x
    -DOC
    -STR
    ");
}

#[test]
fn empty_values() {
    insta::assert_snapshot!(dump("a:\nb: ~\n? c\n"), @r"
    +STR
    +DOC
    +MAP
    =VAL :a
    =VAL :
    =VAL :b
    =VAL :~
    =VAL :c
    =VAL :
    -MAP
    -DOC
    -STR
    ");
}

#[test]
fn anchor_on_empty_value() {
    insta::assert_snapshot!(dump("a: &x\nb: *x"), @r"
    +STR
    +DOC
    +MAP
    =VAL :a
    =VAL &x :
    =VAL :b
    =ALI *x
    -MAP
    -DOC
    -STR
    ");
}

#[test]
fn scalar_styles() {
    insta::assert_snapshot!(dump("- 'x'\n- \"y\\tz\"\n- |\n  l\n- >\n  f\n  g\n"), @r#"
    +STR
    +DOC
    +SEQ
    =VAL 'x
    =VAL "y\tz
    =VAL |l\n
    =VAL >f g\n
    -SEQ
    -DOC
    -STR
    "#);
}

#[test]
fn directives_apply_to_their_document() {
    insta::assert_snapshot!(
        dump("%YAML 1.1\n%TAG !e! tag:e.com,2000:\n--- !e!x a\n...\n--- b\n"),
        @r"
    +STR
    +DOC ---
    =VAL <tag:e.com,2000:x> :a
    -DOC ...
    +DOC ---
    =VAL :b
    -DOC
    -STR
    "
    );
}

#[test]
fn document_start_event_carries_directives() {
    let kinds: Vec<_> = Parser::new("%YAML 1.1\n%TAG !e! tag:e.com,2000:\n--- a")
        .map(|e| e.unwrap().kind)
        .collect();
    let EventKind::DocumentStart {
        explicit,
        version,
        tags,
    } = &kinds[1]
    else {
        panic!("expected document start, got {:?}", kinds[1]);
    };
    assert!(*explicit);
    assert_eq!(*version, Some((1, 1)));
    assert_eq!(
        tags,
        &vec![TagDirective {
            handle: "!e!",
            prefix: Cow::Borrowed("tag:e.com,2000:"),
        }]
    );
}

#[test]
fn extra_document_end_markers() {
    insta::assert_snapshot!(dump("a\n...\n...\n--- b"), @r"
    +STR
    +DOC
    =VAL :a
    -DOC ...
    +DOC ---
    =VAL :b
    -DOC
    -STR
    ");
}

#[test]
fn empty_explicit_document() {
    insta::assert_snapshot!(dump("---\n"), @r"
    +STR
    +DOC ---
    =VAL :
    -DOC
    -STR
    ");
}

#[test]
fn implicit_flags() {
    let EventKind::Scalar {
        plain_implicit,
        quoted_implicit,
        ..
    } = scalar_event("'x'")
    else {
        unreachable!()
    };
    assert!(!plain_implicit);
    assert!(quoted_implicit);

    let EventKind::Scalar {
        tag,
        plain_implicit,
        quoted_implicit,
        ..
    } = scalar_event("! x")
    else {
        unreachable!()
    };
    assert_eq!(tag.as_deref(), Some("!"));
    assert!(plain_implicit);
    assert!(!quoted_implicit);
}

#[test]
fn scalar_event_span() {
    let value = Parser::new("key: value")
        .map(|e| e.unwrap())
        .filter(|e| matches!(e.kind, EventKind::Scalar { .. }))
        .nth(1)
        .unwrap();
    assert_eq!(value.span.start, Mark::new(5, 1, 6));
    assert_eq!(value.span.end, Mark::new(10, 1, 11));
}

#[test]
fn peek_event_does_not_consume() {
    let mut parser = Parser::new("a");
    let peeked = parser.peek_event().unwrap().cloned();
    let next = parser.next_event().unwrap();
    assert_eq!(peeked, next);
    assert!(matches!(
        next.unwrap().kind,
        EventKind::StreamStart {
            encoding: crate::Encoding::Utf8
        }
    ));
}

#[test]
fn expected_block_entry() {
    let err = error("- a\nb: c");
    assert_eq!(
        err,
        ParseError::new(
            ParseErrorKind::ExpectedBlockEntry { found: "'?'" },
            Mark::new(4, 2, 1)
        )
    );
}

#[test]
fn expected_key() {
    assert_eq!(
        error("a: 1\n- b").kind,
        ParseErrorKind::ExpectedKey { found: "'-'" }
    );
}

#[test]
fn unclosed_flow_collections() {
    assert_eq!(
        error("[a, b").kind,
        ParseErrorKind::ExpectedFlowSequenceEnd {
            found: "<stream end>"
        }
    );
    assert_eq!(
        error("{a: b").kind,
        ParseErrorKind::ExpectedFlowMappingEnd {
            found: "<stream end>"
        }
    );
}

#[test]
fn expected_node_content() {
    assert_eq!(
        error("a: ]"),
        ParseError::new(
            ParseErrorKind::ExpectedNodeContent { found: "']'" },
            Mark::new(3, 1, 4)
        )
    );
}

#[test]
fn duplicate_version_directive() {
    assert_eq!(
        error("%YAML 1.1\n%YAML 1.1\n--- a"),
        ParseError::new(
            ParseErrorKind::DuplicateVersionDirective,
            Mark::new(10, 2, 1)
        )
    );
}

#[test]
fn incompatible_version() {
    assert_eq!(
        error("%YAML 2.0\n--- a").kind,
        ParseErrorKind::IncompatibleVersion { major: 2, minor: 0 }
    );
}

#[test]
fn newer_minor_version_is_accepted() {
    assert!(Parser::new("%YAML 1.2\n--- a").all(|e| e.is_ok()));
}

#[test]
fn duplicate_tag_directive() {
    assert_eq!(
        error("%TAG !e! a:\n%TAG !e! b:\n--- x").kind,
        ParseErrorKind::DuplicateTagDirective("!e!".into())
    );
}

#[test]
fn directives_need_document_start() {
    assert_eq!(
        error("%YAML 1.1\na").kind,
        ParseErrorKind::ExpectedDocumentStart { found: "scalar" }
    );
}

#[test]
fn undefined_tag_handle() {
    assert_eq!(
        error("!x!y a").kind,
        ParseErrorKind::UndefinedTagHandle("!x!".into())
    );
}

#[test]
fn tag_handles_do_not_leak_into_next_document() {
    let err = error("%TAG !e! tag:e.com,2000:\n--- !e!x a\n--- !e!y b");
    assert_eq!(err.kind, ParseErrorKind::UndefinedTagHandle("!e!".into()));
    assert_eq!(err.mark.line, 3);
}

#[test]
fn scan_errors_pass_through() {
    let err = error("\"abc");
    assert_eq!(
        err.kind,
        ParseErrorKind::Scan(crate::ScanErrorKind::UnterminatedScalar)
    );
    assert_eq!(
        err.as_scan_error(),
        Some(crate::ScanError::new(
            crate::ScanErrorKind::UnterminatedScalar,
            Mark::START
        ))
    );
}

#[test]
fn parser_stops_after_error() {
    let mut parser = Parser::new("[a, b");
    let results: Vec<_> = parser.by_ref().collect();
    assert!(results.last().unwrap().is_err());
    assert!(parser.next().is_none());
}

#[test]
fn error_display_has_position() {
    let err = error("a: ]");
    assert_eq!(
        err.to_string(),
        "line 1, column 4: did not find expected node content, found ']'"
    );
}
