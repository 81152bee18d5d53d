//! Loading tests for yamlet-tree.

use std::sync::Arc;

use yamlet_tree::{
    CollectionStyle, ComposeError, ComposeErrorKind, EncodingError, LoadError, Loader, Mark, Node,
    NodeKind, ScalarStyle, ScanErrorKind, Tag, TagRegistry, YAML_TAG_PREFIX, load, load_all,
};

/// Helper to render a node on one line, with short tags.
fn dump(node: &Node, registry: &TagRegistry) -> String {
    let anchor = node.anchor().map(|a| format!("&{a} ")).unwrap_or_default();
    let tag = match registry.name(node.tag()) {
        None => "?".to_string(),
        Some(name) => match name.strip_prefix(YAML_TAG_PREFIX) {
            Some(short) => format!("!!{short}"),
            None => name.to_string(),
        },
    };
    match node.kind() {
        NodeKind::Scalar { value, .. } => format!("{anchor}{tag} {value:?}"),
        NodeKind::Sequence { items, .. } => {
            let items: Vec<_> = items.iter().map(|item| dump(item, registry)).collect();
            format!("{anchor}{tag} [{}]", items.join(", "))
        }
        NodeKind::Mapping { entries, .. } => {
            let entries: Vec<_> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", dump(k, registry), dump(v, registry)))
                .collect();
            format!("{anchor}{tag} {{{}}}", entries.join(", "))
        }
    }
}

/// Helper to load one document with its own registry and dump it.
fn load_dump(source: &str) -> String {
    let registry = Arc::new(TagRegistry::new());
    let loader = Loader::from_text(source)
        .expect("source should decode")
        .with_registry(registry.clone());
    let root = loader.load().expect("document should load");
    dump(&root, &registry)
}

/// Helper to get the compose error of a single-document load.
fn compose_error(source: &str) -> ComposeError {
    match load(source) {
        Err(LoadError::Compose(err)) => err,
        other => panic!("expected a compose error, got {other:?}"),
    }
}

#[test]
fn indentation_drives_nesting() {
    let root = load("a:\n  b: 1\n  c: 2\n").unwrap();
    let entries = root.as_mapping().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0.as_str(), Some("a"));

    let inner = entries[0].1.as_mapping().unwrap();
    let keys: Vec<_> = inner.iter().map(|(k, _)| k.as_str().unwrap()).collect();
    assert_eq!(keys, ["b", "c"]);
    assert_eq!(root.get("a").unwrap().get("b").unwrap().as_str(), Some("1"));
    assert_eq!(root.get("a").unwrap().get("c").unwrap().as_str(), Some("2"));

    insta::assert_snapshot!(
        load_dump("a:\n  b: 1\n  c: 2\n"),
        @r#"!!map {!!str "a": !!map {!!str "b": !!int "1", !!str "c": !!int "2"}}"#
    );
}

#[test]
fn mixed_document() {
    insta::assert_snapshot!(
        load_dump("name: demo\ntags: [x, 'y']\nempty:\nnested:\n- ~\n- {k: 1.5}\n"),
        @r#"!!map {!!str "name": !!str "demo", !!str "tags": !!seq [!!str "x", !!str "y"], !!str "empty": !!null "", !!str "nested": !!seq [!!null "~", !!map {!!str "k": !!float "1.5"}]}"#
    );
}

#[test]
fn alias_shares_the_anchored_node() {
    let root = load("- &x 1\n- *x").unwrap();
    let items = root.as_sequence().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_str(), Some("1"));
    assert_eq!(items[1].as_str(), Some("1"));
    assert!(Node::ptr_eq(&items[0], &items[1]));
    assert_eq!(items[1].anchor(), Some("x"));
}

#[test]
fn aliased_collections_are_shared() {
    let root = load("a: &a {x: 1}\nb: [*a, *a]\n").unwrap();
    let a = root.get("a").unwrap();
    let b = root.get("b").unwrap();
    assert!(Node::ptr_eq(a, b.index(0).unwrap()));
    assert!(Node::ptr_eq(a, b.index(1).unwrap()));
    assert_eq!(
        load_dump("a: &a {x: 1}\nb: [*a, *a]\n"),
        r#"!!map {!!str "a": &a !!map {!!str "x": !!int "1"}, !!str "b": !!seq [&a !!map {!!str "x": !!int "1"}, &a !!map {!!str "x": !!int "1"}]}"#
    );
}

#[test]
fn alias_before_anchor_fails() {
    assert_eq!(
        compose_error("- *x\n- &x 1"),
        ComposeError::new(
            ComposeErrorKind::UndefinedAlias("x".to_string()),
            Mark::new(2, 1, 3)
        )
    );
}

#[test]
fn self_reference_is_rejected() {
    assert_eq!(
        compose_error("&a [ *a ]"),
        ComposeError::new(
            ComposeErrorKind::RecursiveAlias("a".to_string()),
            Mark::new(5, 1, 6)
        )
    );
    assert_eq!(
        compose_error("&m\nkey: *m\n").kind,
        ComposeErrorKind::RecursiveAlias("m".to_string())
    );
    assert_eq!(
        compose_error("&outer\n- - *outer\n").kind,
        ComposeErrorKind::RecursiveAlias("outer".to_string())
    );
}

#[test]
fn duplicate_anchor_keeps_first_mark() {
    assert_eq!(
        compose_error("- &a 1\n- &a 2\n"),
        ComposeError::new(
            ComposeErrorKind::DuplicateAnchor {
                name: "a".to_string(),
                first: Mark::new(2, 1, 3),
            },
            Mark::new(9, 2, 3)
        )
    );
}

#[test]
fn anchors_do_not_cross_documents() {
    let loader = Loader::from_text("--- &a 1\n--- *a\n").unwrap();
    let mut documents = loader.load_all();

    let first = documents.next().unwrap().unwrap();
    assert_eq!(first.anchor(), Some("a"));

    let err = documents.next().unwrap().unwrap_err();
    let LoadError::Compose(err) = err else {
        panic!("expected a compose error, got {err:?}");
    };
    assert_eq!(err.kind, ComposeErrorKind::UndefinedAlias("a".to_string()));
    assert_eq!(err.mark.line, 2);

    assert!(documents.next().is_none());
    assert!(documents.next().is_none());
}

#[test]
fn anchors_may_be_reused_in_later_documents() {
    let docs = load_all("--- &a 1\n--- &a 2\n...\n").unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].as_str(), Some("1"));
    assert_eq!(docs[1].as_str(), Some("2"));
}

#[test]
fn documents_are_composed_lazily() {
    let loader = Loader::from_text("a: 1\n--- [\n").unwrap();
    let mut documents = loader.load_all();
    assert!(documents.next().unwrap().is_ok());
    assert!(documents.next().unwrap().is_err());
    assert!(documents.next().is_none());
}

#[test]
fn empty_documents_are_null() {
    let docs = load_all("---\n---\n").unwrap();
    assert_eq!(docs.len(), 2);
    for doc in &docs {
        assert_eq!(doc.as_str(), Some(""));
        assert_eq!(doc.tag(), Tag::NULL);
    }
    assert!(load_all("").unwrap().is_empty());
    assert!(load_all("# only a comment\n").unwrap().is_empty());
}

#[test]
fn load_requires_exactly_one_document() {
    assert_eq!(load("").unwrap_err(), LoadError::DocumentCount { found: 0 });
    assert_eq!(
        load("a\n---\nb\n").unwrap_err(),
        LoadError::DocumentCount { found: 2 }
    );
    // An error in a later document wins over the count.
    assert!(matches!(
        load("a\n--- *x\n").unwrap_err(),
        LoadError::Compose(ComposeError {
            kind: ComposeErrorKind::UndefinedAlias(_),
            ..
        })
    ));
}

#[test]
fn styles_are_recorded_verbatim() {
    let root = load("a: 'q'\nb: |\n  lit\nc: [1]\nd: {e: f}\ng:\n  - \"h\"\n").unwrap();
    assert_eq!(
        root.get("a").unwrap().scalar_style(),
        Some(ScalarStyle::SingleQuoted)
    );
    assert_eq!(root.get("b").unwrap().scalar_style(), Some(ScalarStyle::Literal));
    assert_eq!(root.get("b").unwrap().as_str(), Some("lit\n"));
    assert_eq!(
        root.get("c").unwrap().collection_style(),
        Some(CollectionStyle::Flow)
    );
    assert_eq!(
        root.get("d").unwrap().collection_style(),
        Some(CollectionStyle::Flow)
    );
    let g = root.get("g").unwrap();
    assert_eq!(g.collection_style(), Some(CollectionStyle::Block));
    assert_eq!(
        g.index(0).unwrap().scalar_style(),
        Some(ScalarStyle::DoubleQuoted)
    );
    assert_eq!(root.collection_style(), Some(CollectionStyle::Block));
}

#[test]
fn explicit_tags() {
    insta::assert_snapshot!(
        load_dump("- !!str 12\n- ! 12\n- 12\n- '12'\n- !custom x\n- !<tag:example.com,2000:v> y\n- !!set {a}\n"),
        @r#"!!seq [!!str "12", !!str "12", !!int "12", !!str "12", !custom "x", tag:example.com,2000:v "y", !!set {!!str "a": !!null ""}]"#
    );
    insta::assert_snapshot!(
        load_dump("%TAG !e! tag:example.com,2000:app/\n--- !e!foo\nbar: !e!baz [1]\n"),
        @r#"tag:example.com,2000:app/foo {!!str "bar": tag:example.com,2000:app/baz [!!int "1"]}"#
    );
}

#[test]
fn explicit_tags_intern_once() {
    let registry = Arc::new(TagRegistry::new());
    let loader = Loader::from_text("- !point [1, 2]\n- !point [3, 4]\n")
        .unwrap()
        .with_registry(registry.clone());
    let root = loader.load().unwrap();
    let tag = registry.lookup("!point").unwrap();
    assert_eq!(root.index(0).unwrap().tag(), tag);
    assert_eq!(root.index(1).unwrap().tag(), tag);
    assert_eq!(registry.len(), 15);
}

#[test]
fn custom_resolvers() {
    let loader = Loader::from_text("a: [1, yes]\n")
        .unwrap()
        .with_resolver(|_: &str, _: ScalarStyle| Tag::UNRESOLVED);
    let root = loader.load().unwrap();
    assert_eq!(root.tag(), Tag::MAP);
    assert_eq!(root.get("a").unwrap().tag(), Tag::SEQ);
    assert_eq!(root.get("a").unwrap().index(1).unwrap().tag(), Tag::UNRESOLVED);

    struct Everything;
    impl yamlet_tree::Resolver for Everything {
        fn resolve_scalar(&self, _: &str, _: ScalarStyle) -> Tag {
            Tag::STR
        }
        fn resolve_sequence(&self) -> Tag {
            Tag::OMAP
        }
    }
    let root = Loader::from_text("[1, 2]")
        .unwrap()
        .with_resolver(Everything)
        .load()
        .unwrap();
    assert_eq!(root.tag(), Tag::OMAP);
    assert_eq!(root.index(0).unwrap().tag(), Tag::STR);
}

#[test]
fn byte_input_in_other_encodings() {
    let mut utf16le = vec![0xFF, 0xFE];
    for unit in "a: 1".encode_utf16() {
        utf16le.extend(unit.to_le_bytes());
    }
    let root = Loader::from_bytes(utf16le).unwrap().load().unwrap();
    assert_eq!(root.get("a").unwrap().as_str(), Some("1"));

    let mut utf32be = Vec::new();
    for ch in "- é\n".chars() {
        utf32be.extend((ch as u32).to_be_bytes());
    }
    let root = Loader::from_bytes(utf32be).unwrap().load().unwrap();
    assert_eq!(root.index(0).unwrap().as_str(), Some("é"));
}

#[test]
fn encoding_errors() {
    let err = Loader::from_bytes(vec![0xFE, 0xFF, 0x00]).unwrap_err();
    assert!(matches!(err, LoadError::Encoding(EncodingError::Misaligned { .. })));
    assert_eq!(err.category(), "reader");
    assert_eq!(err.mark(), None);

    let err = Loader::from_text("a: \u{1}").unwrap_err();
    assert_eq!(err.mark(), Some(Mark::new(3, 1, 4)));
}

#[test]
fn error_marks_count_characters() {
    let err = load("ключ: *нет\n").unwrap_err();
    assert_eq!(err.category(), "scanner");
    assert_eq!(err.mark(), Some(Mark::new(10, 1, 7)));
    assert!(err.to_string().starts_with("line 1, column 7: "), "{err}");

    let mut utf16be = vec![0xFE, 0xFF];
    for unit in "é: 1\nü: 'x".encode_utf16() {
        utf16be.extend(unit.to_be_bytes());
    }
    let err = Loader::from_bytes(utf16be).unwrap().load().unwrap_err();
    assert!(matches!(&err, LoadError::Scan(e) if e.kind == ScanErrorKind::UnterminatedScalar));
    assert_eq!(err.mark(), Some(Mark::new(10, 2, 4)));
    assert!(err.to_string().starts_with("line 2, column 4: "), "{err}");
}

#[test]
fn scalars_point_into_the_source() {
    let loader = Loader::from_text("plain: value\nquoted: 'x'\nescaped: \"a\\tb\"\n").unwrap();
    let root = loader.load().unwrap();
    let buffer = loader.source().shared_text();
    let text = |key: &str| match root.get(key).unwrap().kind() {
        NodeKind::Scalar { value, .. } => value.clone(),
        other => panic!("expected a scalar, got {other:?}"),
    };

    let plain = text("plain");
    assert!(plain.shares_buffer(&buffer));
    assert!(buffer.as_bytes().as_ptr_range().contains(&plain.as_ptr()));
    assert_eq!(plain, "value");
    assert!(text("quoted").shares_buffer(&buffer));

    let escaped = text("escaped");
    assert_eq!(escaped, "a\tb");
    assert!(!escaped.shares_buffer(&buffer));
}

#[test]
fn stage_errors_keep_their_category() {
    let err = load("a: 'x").unwrap_err();
    assert!(matches!(&err, LoadError::Scan(e) if e.kind == ScanErrorKind::UnterminatedScalar));
    assert_eq!(err.category(), "scanner");

    let err = load("[1, 2").unwrap_err();
    assert_eq!(err.category(), "parser");
    assert!(err.to_string().starts_with("line 1, column 6: "), "{err}");

    let err = load("*nope").unwrap_err();
    assert_eq!(err.category(), "composer");
    assert_eq!(err.to_string(), "line 1, column 1: found undefined alias *nope");
}

#[test]
fn deep_nesting() {
    let depth = 1000;
    let source = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    let root = load(&source).unwrap();
    let mut node = &root;
    let mut seen = 1;
    while let Some(child) = node.index(0) {
        node = child;
        seen += 1;
    }
    assert_eq!(seen, depth);
    assert!(node.is_empty());
}

#[test]
fn from_str_matches_from_text() {
    let loader: Loader = "k: v".parse().unwrap();
    assert_eq!(loader.load().unwrap().get("k").unwrap().as_str(), Some("v"));
    assert_eq!(loader.source().as_str(), "k: v");
}
