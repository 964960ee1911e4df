//! Round-trip and fallback behavior of the content codec

use scribe_document::{
    deserialize, plain_text, serialize, try_deserialize, Document, Element, ElementKind, Marks,
    Node, Text,
};

fn sample_nodes() -> Vec<Node> {
    vec![
        Element::new(ElementKind::HeadingOne, vec![Node::text("Quarterly report")]).into(),
        Element::paragraph(vec![
            Node::text("Revenue "),
            Node::Text(Text::with_marks(
                "grew",
                Marks {
                    bold: true,
                    font_size: Some(18),
                    ..Marks::default()
                },
            )),
            Node::text(" again, see "),
            Element::link("https://example.com/q3", vec![Node::text("details")]).into(),
        ])
        .into(),
        Element::new(
            ElementKind::NumberedList,
            vec![
                Element::new(ElementKind::ListItem, vec![Node::text("hire")]).into(),
                Element::new(ElementKind::ListItem, vec![Node::text("ship")]).into(),
            ],
        )
        .into(),
    ]
}

#[test]
fn test_round_trip_equals_normalized_tree() {
    let doc = Document::from_nodes(sample_nodes());
    let restored = deserialize(&serialize(&doc));
    assert_eq!(restored, doc);
}

#[test]
fn test_round_trip_of_unnormalized_input() {
    // Adjacent equal runs and a list item outside any list
    let raw = vec![
        Element::paragraph(vec![Node::text("a"), Node::text("b")]).into(),
        Element::new(ElementKind::ListItem, vec![Node::text("stray")]).into(),
    ];
    let normalized = Document::from_nodes(raw.clone());

    let json = serde_json::to_string(&raw).unwrap();
    assert_eq!(deserialize(&json), normalized);
}

#[test]
fn test_fallback_for_legacy_content() {
    let raw = "Meeting notes\nline two";
    let doc = deserialize(raw);
    assert_eq!(
        doc.children(),
        &[Element::paragraph(vec![Node::text(raw)]).into()]
    );
    assert!(try_deserialize(raw).is_err());
    assert_eq!(plain_text(&doc), raw);
}

#[test]
fn test_font_size_accepts_numbers() {
    let doc = deserialize(r#"[{"type":"paragraph","children":[{"text":"x","fontSize":24}]}]"#);
    assert_eq!(
        serialize(&doc),
        r#"[{"type":"paragraph","children":[{"text":"x","fontSize":"24"}]}]"#
    );
}

#[test]
fn test_false_marks_compare_equal_to_absent() {
    let explicit = deserialize(r#"[{"type":"paragraph","children":[{"text":"x","bold":false}]}]"#);
    let implicit = deserialize(r#"[{"type":"paragraph","children":[{"text":"x"}]}]"#);
    assert_eq!(explicit, implicit);
}

#[test]
fn test_empty_array_normalizes_to_default() {
    assert_eq!(deserialize("[]"), Document::default());
}
