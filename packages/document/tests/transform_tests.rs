//! Multi-step edits through the public transform API

use scribe_document::{
    deserialize, plain_text, Document, Element, ElementKind, ElementPatch, Path, Point, Range,
    TextPosition,
};

fn doc(json: &str) -> Document {
    deserialize(json)
}

#[test]
fn test_list_wrap_then_unwrap_restores_paragraphs() {
    let mut doc = doc(
        r#"[{"type":"paragraph","children":[{"text":"one"}]},{"type":"paragraph","children":[{"text":"two"}]}]"#,
    );
    let original = doc.clone();

    doc.without_normalizing(|doc| {
        for path in doc.text_blocks() {
            doc.set_node_properties(&path, &ElementPatch::kind(ElementKind::ListItem))
                .unwrap();
        }
        doc.wrap_nodes(
            Element::new(ElementKind::BulletedList, Vec::new()),
            &Path::new(vec![0]),
            2,
        )
        .unwrap();
    });
    assert_eq!(doc.children().len(), 1);
    assert!(doc.children()[0].is_kind(ElementKind::BulletedList));

    doc.without_normalizing(|doc| {
        doc.unwrap_lists(0, 1);
        for path in doc.text_blocks() {
            doc.set_node_properties(&path, &ElementPatch::kind(ElementKind::Paragraph))
                .unwrap();
        }
    });
    assert_eq!(doc, original);
}

#[test]
fn test_typing_session() {
    let mut doc = Document::default();
    let caret = doc.insert_text(TextPosition::new(0, 0), "Hello", None).unwrap();
    let caret = doc.insert_break(caret).unwrap();
    let caret = doc.insert_text(caret, "world", None).unwrap();
    assert_eq!(caret, TextPosition::new(1, 5));
    assert_eq!(plain_text(&doc), "Hello\nworld");

    // Join the blocks back together
    let joined = doc
        .delete_between(TextPosition::new(0, 5), TextPosition::new(1, 0))
        .unwrap();
    assert_eq!(joined, TextPosition::new(0, 5));
    assert_eq!(plain_text(&doc), "Helloworld");
}

#[test]
fn test_remove_range_from_list_into_paragraph() {
    let mut doc = doc(
        r#"[
            {"type":"paragraph","children":[{"text":"intro"}]},
            {"type":"bulleted-list","children":[
                {"type":"list-item","children":[{"text":"alpha"}]},
                {"type":"list-item","children":[{"text":"beta"}]}
            ]}
        ]"#,
    );
    let range = Range::new(Point::new(vec![0, 0], 2), Point::new(vec![1, 1, 0], 2));
    doc.remove_range(&range).unwrap();

    assert_eq!(plain_text(&doc), "inta");
    assert_eq!(doc.children().len(), 1);
    assert!(doc.children()[0].is_kind(ElementKind::Paragraph));
}

#[test]
fn test_selection_survives_structural_edit() {
    let mut doc = doc(
        r#"[{"type":"paragraph","children":[{"text":"first"}]},{"type":"paragraph","children":[{"text":"second"}]}]"#,
    );
    let caret = Point::new(vec![1, 0], 3);
    let position = doc.position_of(&caret).unwrap();

    doc.wrap_nodes(
        Element::new(ElementKind::NumberedList, Vec::new()),
        &Path::new(vec![1]),
        1,
    )
    .unwrap();

    assert_eq!(doc.point_at(position), Some(Point::new(vec![1, 0, 0], 3)));
}
