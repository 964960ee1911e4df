//! Longer command sequences
//!
//! This tests:
//! - N undos return to the starting tree, N redos to the final one
//! - Toggling a mark twice restores the tree
//! - Batched edits undo as one step
//! - Typing and deleting across blocks

use scribe_editor::document::{
    deserialize, plain_text, Align, Document, ElementKind, Mark, Point, Range,
};
use scribe_editor::{BlockFormat, EditSession, EditorState, Mutation, UndoStack};

const RICH: &str = r#"[
    {"type":"heading-one","children":[{"text":"Title"}]},
    {"type":"paragraph","children":[{"text":"Plain and "},{"text":"bold","bold":true},{"text":" text"}]},
    {"type":"bulleted-list","children":[
        {"type":"list-item","children":[{"text":"first"}]},
        {"type":"list-item","children":[{"text":"second"}]}
    ]},
    {"type":"paragraph","align":"center","children":[{"text":"See "},{"type":"link","url":"https://example.com","children":[{"text":"here"}]},{"text":""}]}
]"#;

fn range(anchor: (&[usize], usize), focus: (&[usize], usize)) -> Range {
    Range::new(
        Point::new(anchor.0.to_vec(), anchor.1),
        Point::new(focus.0.to_vec(), focus.1),
    )
}

fn selections(doc: &Document) -> Vec<Range> {
    vec![
        doc.all(),
        range((&[0, 0], 1), (&[0, 0], 4)),
        range((&[1, 0], 3), (&[1, 2], 2)),
        range((&[2, 1, 0], 2), (&[1, 1], 1)),
        range((&[0, 0], 0), (&[0, 0], 0)),
    ]
}

fn script() -> Vec<Mutation> {
    vec![
        Mutation::ToggleMark { mark: Mark::Bold },
        Mutation::ToggleMark {
            mark: Mark::Color("#3b82f6".to_string()),
        },
        Mutation::ToggleBlock {
            format: BlockFormat::Kind(ElementKind::NumberedList),
        },
        Mutation::ToggleBlock {
            format: BlockFormat::Align(Align::Right),
        },
        Mutation::increase_font_size(),
        Mutation::ToggleLink {
            url: "https://scribe.dev".to_string(),
        },
        Mutation::InsertText {
            text: "typed".to_string(),
        },
        Mutation::InsertBreak,
        Mutation::DeleteBackward,
        Mutation::ToggleBlock {
            format: BlockFormat::Kind(ElementKind::HeadingThree),
        },
        Mutation::UnwrapLink,
        Mutation::ToggleMark {
            mark: Mark::Underline,
        },
    ]
}

#[test]
fn test_undo_all_then_redo_all() {
    let start = deserialize(RICH);

    for selection in selections(&start) {
        let mut state = EditorState::new(start.clone());
        state.set_selection(Some(selection.clone()));
        let mut stack = UndoStack::with_max_levels(0);

        for mutation in script() {
            stack.apply(&mutation, &mut state).unwrap();
        }
        let end = state.document.clone();
        let levels = stack.undo_levels();

        for _ in 0..levels {
            assert!(stack.undo(&mut state).unwrap());
        }
        assert_eq!(state.document, start, "selection {:?}", selection);
        assert!(!stack.undo(&mut state).unwrap());

        for _ in 0..levels {
            assert!(stack.redo(&mut state).unwrap());
        }
        assert_eq!(state.document, end, "selection {:?}", selection);
    }
}

#[test]
fn test_mark_toggle_twice_restores_tree() {
    let start = deserialize(RICH);
    // Marks RICH never carries, so the first toggle always turns them on
    let marks = [
        Mark::Italic,
        Mark::Underline,
        Mark::Color("#ef4444".to_string()),
        Mark::FontSize(18),
    ];

    for selection in selections(&start) {
        for mark in &marks {
            let mut state = EditorState::new(start.clone());
            state.set_selection(Some(selection.clone()));
            let toggle = Mutation::ToggleMark { mark: mark.clone() };

            toggle.apply(&mut state).unwrap();
            toggle.apply(&mut state).unwrap();
            assert_eq!(
                state.document, start,
                "mark {:?} over {:?}",
                mark, selection
            );
        }
    }
}

#[test]
fn test_partial_mark_turns_on_uniformly() {
    let mut session = EditSession::from_content("client-1", "Notes", RICH);
    // "and bold" spans a plain leaf and a bold leaf
    session.set_selection(Some(range((&[1, 0], 6), (&[1, 1], 4))));

    session.apply(Mutation::ToggleMark { mark: Mark::Bold }).unwrap();
    let doc = session.document();
    let leaves = doc.leaves(&scribe_editor::document::Path::new(vec![1]));
    let texts: Vec<(&str, bool)> = leaves
        .iter()
        .map(|(_, leaf)| (leaf.text.as_str(), leaf.marks.bold))
        .collect();
    assert_eq!(texts, vec![("Plain ", false), ("and bold", true), (" text", false)]);
}

#[test]
fn test_batch_undoes_as_one_step() {
    let mut session = EditSession::from_content("client-1", "Notes", "");
    session.set_selection(Some(range((&[0, 0], 0), (&[0, 0], 0))));
    let start = session.document().clone();

    session.begin_batch("Type a heading");
    for mutation in [
        Mutation::InsertText {
            text: "Heading".to_string(),
        },
        Mutation::ToggleBlock {
            format: BlockFormat::Kind(ElementKind::HeadingOne),
        },
        Mutation::InsertBreak,
        Mutation::InsertText {
            text: "Body".to_string(),
        },
    ] {
        session.apply(mutation).unwrap();
    }
    session.end_batch();

    assert_eq!(session.plain_text(), "Heading\nBody");
    assert_eq!(session.history().undo_levels(), 1);
    assert_eq!(session.history().undo_description(), Some("Type a heading"));

    session.undo().unwrap();
    assert_eq!(session.document(), &start);
}

#[test]
fn test_typing_across_blocks() {
    let mut session = EditSession::from_content("client-1", "Notes", "");
    session.set_selection(Some(range((&[0, 0], 0), (&[0, 0], 0))));

    for mutation in [
        Mutation::InsertText {
            text: "one".to_string(),
        },
        Mutation::InsertBreak,
        Mutation::InsertText {
            text: "two".to_string(),
        },
    ] {
        session.apply(mutation).unwrap();
    }
    assert_eq!(session.document().block_count(), 2);

    // Backspace at the start of the second block joins it to the first
    session.set_selection(Some(range((&[1, 0], 0), (&[1, 0], 0))));
    session.apply(Mutation::DeleteBackward).unwrap();
    assert_eq!(session.plain_text(), "onetwo");
    assert_eq!(session.document().block_count(), 1);

    session.select_all();
    session.apply(Mutation::DeleteFragment).unwrap();
    assert_eq!(session.plain_text(), "");
    assert_eq!(session.document(), &deserialize(""));
}

#[test]
fn test_selection_survives_structural_edits() {
    let mut session = EditSession::from_content("client-1", "Notes", RICH);
    session.set_selection(Some(range((&[2, 0, 0], 1), (&[2, 1, 0], 3))));

    session
        .apply(Mutation::ToggleBlock {
            format: BlockFormat::Kind(ElementKind::Paragraph),
        })
        .unwrap();
    let selection = session.selection().unwrap().clone();
    let doc = session.document();
    assert!(doc.is_valid_point(&selection.anchor));
    assert!(doc.is_valid_point(&selection.focus));
    assert_eq!(
        plain_text(doc),
        "Title\nPlain and bold text\nfirst\nsecond\nSee here"
    );
    assert!(doc.children()[2].is_kind(ElementKind::Paragraph));
}
