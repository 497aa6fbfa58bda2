//! Cross-format conversion scenarios and round-trip properties.

use onelook_convert::{Converter, Error, Format, ImportOptions, converter_for, export, import};
use onelook_core::{
    FontWeight, MindMapDocument, MindMapNode, NodeData, NodeShape, NodeStyle, validate,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn sample() -> MindMapDocument {
    let mut a = MindMapNode::new("Alpha & Omega");
    a.data = Some(NodeData {
        note: Some("remember <this>".into()),
        hyperlink: Some("https://example.test/?a=1&b=2".into()),
        ..NodeData::default()
    });
    let mut b = MindMapNode::new("Beta");
    b.style = Some(NodeStyle {
        color: Some("#123456".into()),
        background: Some("#abcdef".into()),
        font_size: Some(20.0),
        font_weight: Some(FontWeight::Bold),
        ..NodeStyle::default()
    });
    b.data = Some(NodeData {
        priority: Some(2),
        ..NodeData::default()
    });
    let root = MindMapNode::new("Project").with_children([
        a.with_children([MindMapNode::new("A1"), MindMapNode::new("A2")]),
        b,
        MindMapNode::new("Gamma"),
    ]);
    MindMapDocument::with_root("Project", root, 1_700_000_000_000)
}

fn round_trip(format: Format, doc: &MindMapDocument) -> MindMapDocument {
    let bytes = export(format, doc).unwrap();
    import(format, &bytes, &ImportOptions::default()).unwrap()
}

/// Text of every node in pre-order, paired with its depth.
fn outline(node: &MindMapNode) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut stack = vec![(node, 0usize)];
    while let Some((n, depth)) = stack.pop() {
        out.push((depth, n.text.clone()));
        for c in n.children.iter().rev() {
            stack.push((c, depth + 1));
        }
    }
    out
}

fn data(node: &MindMapNode) -> NodeData {
    node.data.clone().unwrap_or_default()
}

// ═════════════════════════════════════════════════════════════════════════

#[test]
fn every_format_preserves_the_outline() {
    let doc = sample();
    for format in Format::ALL {
        let back = round_trip(format, &doc);
        assert_eq!(outline(&back.root), outline(&doc.root), "{format}");
        assert_eq!(back.name, "Project", "{format}");
    }
}

#[test]
fn notes_survive_every_format() {
    let doc = sample();
    for format in Format::ALL {
        let back = round_trip(format, &doc);
        assert_eq!(
            data(&back.root.children[0]).note.as_deref(),
            Some("remember <this>"),
            "{format}"
        );
    }
}

#[test]
fn links_survive_outline_formats() {
    let doc = sample();
    for format in [Format::Opml, Format::Freemind, Format::Xmind, Format::Json] {
        let back = round_trip(format, &doc);
        assert_eq!(
            data(&back.root.children[0]).hyperlink.as_deref(),
            Some("https://example.test/?a=1&b=2"),
            "{format}"
        );
    }
}

#[test]
fn styles_and_priorities_survive_rich_formats() {
    let doc = sample();
    for format in [Format::Freemind, Format::Xmind] {
        let back = round_trip(format, &doc);
        let b = &back.root.children[1];
        let style = b.style.clone().unwrap_or_default();
        assert_eq!(style.color.as_deref(), Some("#123456"), "{format}");
        assert_eq!(style.background.as_deref(), Some("#abcdef"), "{format}");
        assert_eq!(style.font_size, Some(20.0), "{format}");
        assert_eq!(style.font_weight, Some(FontWeight::Bold), "{format}");
        assert_eq!(data(b).priority, Some(2), "{format}");
    }
}

#[test]
fn native_formats_are_lossless() {
    let mut doc = sample();
    doc.root.children[2].style = Some(NodeStyle {
        shape: Some(NodeShape::Ellipse),
        ..NodeStyle::default()
    });
    for format in [Format::Json, Format::Olook] {
        let back = round_trip(format, &doc);
        assert_eq!(back, doc, "{format}");
    }
}

#[test]
fn imports_get_fresh_ids_with_consistent_parents() {
    let doc = sample();
    let back = round_trip(Format::Opml, &doc);
    assert_ne!(back.root.id, doc.root.id);
    assert_eq!(back.root.parent_id, None);
    for child in &back.root.children {
        assert_eq!(child.parent_id.as_ref(), Some(&back.root.id));
    }
}

#[test]
fn olook_envelope_is_checked() {
    let doc = sample();
    let bytes = export(Format::Olook, &doc).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["app"], "OneLook");
    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["created"], doc.created_at);

    let mut foreign = value.clone();
    foreign["app"] = "Other".into();
    let err = import(
        Format::Olook,
        &serde_json::to_vec(&foreign).unwrap(),
        &ImportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidFile { format: Format::Olook, .. }), "{err}");

    let headless = serde_json::json!({ "app": "OneLook", "version": "1.0.0" });
    assert!(
        import(
            Format::Olook,
            &serde_json::to_vec(&headless).unwrap(),
            &ImportOptions::default()
        )
        .is_err()
    );
}

#[test]
fn json_errors_name_the_offending_path() {
    let bad = br#"{"id":"d","name":"n","root":{"id":"r","text":"R","children":[{"id":"c","children":[]}]}}"#;
    let err = import(Format::Json, bad, &ImportOptions::default()).unwrap_err();
    match err {
        Error::Document(onelook_core::Error::InvalidDocument { path, .. }) => {
            assert_eq!(path, "$.root.children[0].text");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_ids_are_rejected_on_import() {
    let dup = br#"{"id":"d","name":"n","root":{"id":"r","text":"R","children":[
        {"id":"x","text":"A","children":[]},{"id":"x","text":"B","children":[]}]}}"#;
    let err = import(Format::Json, dup, &ImportOptions::default()).unwrap_err();
    assert!(
        matches!(err, Error::Document(onelook_core::Error::DuplicateNodeId { .. })),
        "{err}"
    );
}

fn chain_document(levels: usize) -> serde_json::Value {
    let mut node = serde_json::json!({ "id": "leaf", "text": "leaf", "children": [] });
    for i in 0..levels {
        node = serde_json::json!({ "id": format!("n{i}"), "text": "n", "children": [node] });
    }
    serde_json::json!({ "id": "d", "name": "deep", "root": node })
}

#[test]
fn deep_native_documents_import_up_to_the_limit() {
    let doc = chain_document(99);
    let bytes = serde_json::to_vec(&doc).unwrap();
    let back = import(Format::Json, &bytes, &ImportOptions::default()).unwrap();
    assert_eq!(back.root.max_depth(), 99);

    let envelope = serde_json::json!({ "app": "OneLook", "version": "1.0.0", "document": doc });
    let back = import(
        Format::Olook,
        &serde_json::to_vec(&envelope).unwrap(),
        &ImportOptions::default(),
    )
    .unwrap();
    assert_eq!(back.root.max_depth(), 99);

    let exported = export(Format::Json, &back).unwrap();
    let again = import(Format::Json, &exported, &ImportOptions::default()).unwrap();
    assert_eq!(outline(&again.root), outline(&back.root));
}

#[test]
fn json_nesting_beyond_the_limit_is_rejected() {
    let doc = chain_document(validate::MAX_IMPORT_DEPTH + 1);
    let err = converter_for(Format::Json)
        .import(&serde_json::to_vec(&doc).unwrap(), &ImportOptions::default())
        .unwrap_err();
    assert!(
        matches!(err, Error::Document(onelook_core::Error::DepthExceeded { .. })),
        "{err}"
    );

    let runaway = "[".repeat(50_000);
    let err = import(Format::Json, runaway.as_bytes(), &ImportOptions::default()).unwrap_err();
    assert!(
        matches!(err, Error::Document(onelook_core::Error::DepthExceeded { .. })),
        "{err}"
    );
}

#[test]
fn multi_line_and_markup_text_survives_every_format() {
    let mut a = MindMapNode::new("line one\nline two");
    a.data = Some(NodeData {
        note: Some("first\n\nthird".into()),
        ..NodeData::default()
    });
    let mut b = MindMapNode::new("tab\there & <b> \"q\" 'a'");
    b.data = Some(NodeData {
        note: Some("x < y\n\ty > z".into()),
        ..NodeData::default()
    });
    let root = MindMapNode::new("Root").with_children([a, b, MindMapNode::new("C")]);
    let doc = MindMapDocument::with_root("Root", root, 0);

    for format in Format::ALL {
        let back = round_trip(format, &doc);
        assert_eq!(outline(&back.root), outline(&doc.root), "{format}");
        assert_eq!(
            data(&back.root.children[0]).note.as_deref(),
            Some("first\n\nthird"),
            "{format}"
        );
        let note = data(&back.root.children[1]).note;
        // Markdown quote lines are trimmed, so the leading tab of a note line is lost there.
        let expected = if format == Format::Markdown {
            "x < y\ny > z"
        } else {
            "x < y\n\ty > z"
        };
        assert_eq!(note.as_deref(), Some(expected), "{format}");
    }
}

#[test]
fn converter_registry_matches_formats() {
    for format in Format::ALL {
        assert_eq!(converter_for(format).format(), format);
        let info = format.info();
        assert_eq!(
            Format::from_file_name(format!("map.{}", info.extension)),
            Some(format)
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════

/// One or more lines joined by single or double line breaks. Lines carry XML metacharacters,
/// inner tabs and backslashes but never start or end with whitespace.
fn text_strategy() -> impl Strategy<Value = String> {
    let line = r#"[A-Za-z0-9&<>"'\\][A-Za-z0-9&<>"'\\ \t]{0,10}[A-Za-z0-9&<>"'\\]"#;
    (
        line,
        prop::collection::vec((prop_oneof![Just("\n"), Just("\n\n")], line), 0..3),
    )
        .prop_map(|(first, rest)| {
            rest.into_iter().fold(first, |mut text, (sep, line)| {
                text.push_str(sep);
                text.push_str(&line);
                text
            })
        })
}

/// Random trees from `(parent_pick, text)` pairs, as in the layout property tests.
fn tree_strategy() -> impl Strategy<Value = MindMapNode> {
    (
        text_strategy(),
        prop::collection::vec((any::<usize>(), text_strategy()), 0..30),
    )
        .prop_map(|(root_text, spec)| {
            let mut flat: Vec<(MindMapNode, usize)> = vec![(MindMapNode::new(root_text), 0)];
            for (i, (pick, text)) in spec.into_iter().enumerate() {
                flat.push((MindMapNode::new(text), pick % (i + 1)));
            }
            while flat.len() > 1 {
                let (node, parent) = flat.pop().unwrap();
                let parent = &mut flat[parent].0;
                let mut node = node;
                node.parent_id = Some(parent.id.clone());
                parent.children.insert(0, node);
            }
            flat.pop().unwrap().0
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn outline_round_trips_for_every_format(root in tree_strategy()) {
        let doc = MindMapDocument::with_root(root.text.clone(), root, 0);
        for format in Format::ALL {
            let back = round_trip(format, &doc);
            prop_assert_eq!(outline(&back.root), outline(&doc.root), "{}", format);
        }
    }
}
