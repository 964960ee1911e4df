//! Integration tests for the editor crate

use scribe_editor::document::{deserialize, plain_text, Align, Document, ElementKind, Mark, Path, Point, Range};
use scribe_editor::{
    Dispatch, DocumentStore, EditSession, EditorConfig, KeyChord, Keymap, MemoryStore,
    MockChatBackend, Mutation,
};
use std::sync::Arc;
use std::time::Duration;

fn select(session: &mut EditSession, path: &[usize], from: usize, to: usize) {
    session.set_selection(Some(Range::new(
        Point::new(path.to_vec(), from),
        Point::new(path.to_vec(), to),
    )));
}

fn chord(s: &str) -> KeyChord {
    s.parse().unwrap()
}

fn links(doc: &Document) -> Vec<String> {
    doc.descendants()
        .into_iter()
        .filter_map(|(_, node)| node.as_element())
        .filter(|element| element.kind == ElementKind::Link)
        .filter_map(|element| element.url.clone())
        .collect()
}

#[test]
fn test_bold_one_word() {
    let mut session = EditSession::from_content("client-1", "Notes", "Hello world");
    select(&mut session, &[0, 0], 6, 11);

    session.apply(Mutation::ToggleMark { mark: Mark::Bold }).unwrap();

    let doc = session.document();
    let hello = doc.text_node(&Path::new(vec![0, 0])).unwrap();
    let world = doc.text_node(&Path::new(vec![0, 1])).unwrap();
    assert_eq!(hello.text, "Hello ");
    assert!(!hello.marks.bold);
    assert_eq!(world.text, "world");
    assert!(world.marks.bold);
}

#[test]
fn test_numbered_list_wraps_paragraph() {
    let mut session = EditSession::from_content("client-1", "Notes", "item");
    select(&mut session, &[0, 0], 0, 0);

    session
        .handle_key(&Keymap::with_defaults(), &chord("ctrl+shift+7"))
        .unwrap();

    let expected = deserialize(
        r#"[{"type":"numbered-list","children":[{"type":"list-item","children":[{"text":"item"}]}]}]"#,
    );
    assert_eq!(session.document(), &expected);
}

#[test]
fn test_bulleted_list_round_trip() {
    let original = deserialize(
        r#"[{"type":"paragraph","children":[{"text":"one"}]},{"type":"paragraph","children":[{"text":"two"}]}]"#,
    );
    let mut session = EditSession::new("client-1", original.clone());
    session.select_all();

    let keymap = Keymap::with_defaults();
    session.handle_key(&keymap, &chord("ctrl+shift+8")).unwrap();
    assert!(session.document().children()[0].is_kind(ElementKind::BulletedList));

    session.handle_key(&keymap, &chord("ctrl+shift+8")).unwrap();
    assert_eq!(session.document(), &original);
}

#[test]
fn test_font_size_never_below_minimum() {
    let mut session = EditSession::from_content("client-1", "Notes", "tiny");
    select(&mut session, &[0, 0], 4, 4);

    session
        .apply(Mutation::ToggleMark {
            mark: Mark::FontSize(6),
        })
        .unwrap();
    session
        .handle_key(&Keymap::with_defaults(), &chord("ctrl+shift+,"))
        .unwrap();
    assert_eq!(session.state().marks.as_ref().unwrap().font_size, Some(8));

    session.apply(Mutation::decrease_font_size()).unwrap();
    session
        .apply(Mutation::InsertText {
            text: "!".to_string(),
        })
        .unwrap();
    let inserted = session.document().text_node(&Path::new(vec![0, 1])).unwrap();
    assert_eq!(inserted.text, "!");
    assert_eq!(inserted.marks.font_size, Some(8));
}

#[test]
fn test_font_size_steps_from_default() {
    let mut session = EditSession::from_content("client-1", "Notes", "text");
    session.select_all();
    session.apply(Mutation::increase_font_size()).unwrap();

    let leaf = session.document().text_node(&Path::new(vec![0, 0])).unwrap();
    assert_eq!(leaf.marks.font_size, Some(16));
}

#[test]
fn test_link_wrap_and_unwrap() {
    let mut session = EditSession::from_content("client-1", "Notes", "Hello world");
    select(&mut session, &[0, 0], 6, 11);

    session
        .apply(Mutation::ToggleLink {
            url: "https://example.com".to_string(),
        })
        .unwrap();
    assert_eq!(links(session.document()), vec!["https://example.com"]);
    assert!(session.selection().unwrap().is_collapsed());
    assert_eq!(session.plain_text(), "Hello world");

    select(&mut session, &[0, 1, 0], 1, 3);
    session
        .apply(Mutation::ToggleLink {
            url: "https://other.org".to_string(),
        })
        .unwrap();
    assert_eq!(links(session.document()), vec!["https://other.org"]);

    session.select_all();
    session.apply(Mutation::UnwrapLink).unwrap();
    assert!(links(session.document()).is_empty());
    assert_eq!(session.plain_text(), "Hello world");
}

#[test]
fn test_link_at_caret_inserts_url_text() {
    let mut session = EditSession::from_content("client-1", "Notes", "See ");
    select(&mut session, &[0, 0], 4, 4);

    session
        .apply(Mutation::ToggleLink {
            url: "https://example.com".to_string(),
        })
        .unwrap();
    assert_eq!(session.plain_text(), "See https://example.com");
    assert_eq!(links(session.document()), vec!["https://example.com"]);
}

#[test]
fn test_link_across_blocks_wraps_each_side() {
    let mut session = EditSession::from_content(
        "client-1",
        "Notes",
        r#"[{"type":"paragraph","children":[{"text":"one"}]},{"type":"paragraph","children":[{"text":"two"}]}]"#,
    );
    session.set_selection(Some(Range::new(
        Point::new(vec![0, 0], 1),
        Point::new(vec![1, 0], 2),
    )));

    session
        .apply(Mutation::ToggleLink {
            url: "https://example.com".to_string(),
        })
        .unwrap();

    let doc = session.document();
    assert_eq!(
        links(doc),
        vec!["https://example.com", "https://example.com"]
    );
    assert_eq!(doc.text_node(&Path::new(vec![0, 0])).unwrap().text, "o");
    assert_eq!(doc.text_node(&Path::new(vec![0, 1, 0])).unwrap().text, "ne");
    assert_eq!(doc.text_node(&Path::new(vec![1, 0, 0])).unwrap().text, "tw");
    assert_eq!(doc.text_node(&Path::new(vec![1, 1])).unwrap().text, "o");

    let selection = session.selection().unwrap();
    assert!(selection.is_collapsed());
    assert_eq!(selection.focus, Point::new(vec![1, 0, 0], 2));
}

#[test]
fn test_reserved_chords_pass_through() {
    let mut session = EditSession::from_content("client-1", "Notes", "text");
    session.select_all();
    let before = session.content();

    let dispatch = session
        .handle_key(&Keymap::with_defaults(), &chord("ctrl+k"))
        .unwrap();
    assert_eq!(
        dispatch,
        Dispatch::Reserved {
            action: "insert-link".to_string()
        }
    );
    assert_eq!(session.content(), before);
    assert_eq!(session.version(), 0);
}

#[test]
fn test_heading_and_alignment_chords() {
    let mut session = EditSession::from_content("client-1", "Notes", "Title");
    session.select_all();
    let keymap = Keymap::with_defaults();

    session.handle_key(&keymap, &chord("ctrl+alt+2")).unwrap();
    session.handle_key(&keymap, &chord("ctrl+shift+e")).unwrap();
    let block = session.document().element(&Path::new(vec![0])).unwrap();
    assert_eq!(block.kind, ElementKind::HeadingTwo);
    assert_eq!(block.align, Some(Align::Center));

    // Digits past 3 have no heading kind
    session.handle_key(&keymap, &chord("ctrl+alt+5")).unwrap();
    let block = session.document().element(&Path::new(vec![0])).unwrap();
    assert_eq!(block.kind, ElementKind::Paragraph);
    assert_eq!(block.align, Some(Align::Center));
}

#[test]
fn test_undo_redo_chords() {
    let mut session = EditSession::from_content("client-1", "Notes", "abc");
    session.select_all();
    let keymap = Keymap::with_defaults();
    let original = session.document().clone();

    session.handle_key(&keymap, &chord("ctrl+i")).unwrap();
    let italic = session.document().clone();
    assert_ne!(italic, original);

    session.handle_key(&keymap, &chord("ctrl+z")).unwrap();
    assert_eq!(session.document(), &original);
    session.handle_key(&keymap, &chord("ctrl+shift+z")).unwrap();
    assert_eq!(session.document(), &italic);
}

#[test]
fn test_commands_without_selection_are_noops() {
    let mut session = EditSession::from_content("client-1", "Notes", "text");
    let keymap = Keymap::with_defaults();

    for key in ["ctrl+b", "ctrl+shift+l", "ctrl+shift+8", "ctrl+alt+1", "ctrl+shift+."] {
        session.handle_key(&keymap, &chord(key)).unwrap();
    }
    assert_eq!(session.version(), 0);
    assert!(!session.is_dirty());
}

#[test]
fn test_stale_selection_is_resolved() {
    let mut session = EditSession::from_content("client-1", "Notes", "text");
    session.set_selection(Some(Range::collapsed(Point::new(vec![5, 2], 9))));

    let selection = session.selection().unwrap();
    assert!(session.document().is_valid_point(&selection.anchor));
    session
        .apply(Mutation::InsertText {
            text: "more ".to_string(),
        })
        .unwrap();
    assert_eq!(session.plain_text().len(), "more text".len());
}

#[tokio::test]
async fn test_save_then_reopen() {
    let store = MemoryStore::new();
    let mut session = EditSession::from_content("client-1", "", "Body");
    session.select_all();
    session.apply(Mutation::ToggleMark { mark: Mark::Underline }).unwrap();

    let receipt = session.save(&store).await.unwrap().unwrap();
    let stored = store.load(receipt.document_id).await.unwrap();
    assert_eq!(stored.title, "Untitled Document");
    assert_eq!(stored.content, session.content());

    let reopened = EditSession::open("client-2", &store, receipt.document_id)
        .await
        .unwrap();
    assert_eq!(reopened.document(), session.document());
}

#[tokio::test]
async fn test_chat_context_uses_document_text() {
    let mut session = EditSession::from_content("client-1", "Plan", "Ship it");
    let reply = session.ask(&MockChatBackend, "What is this?").await.unwrap();
    assert!(!reply.is_empty());
    assert!(session.chat().conversation_id().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_autosave_after_editing() {
    let store = Arc::new(MemoryStore::new());
    let config = EditorConfig::default();

    let mut session = EditSession::from_content("client-1", "Draft", "");
    let mut saver = session.autosaver(store.clone(), config.autosave_delay());
    session.set_selection(Some(Range::collapsed(Point::new(vec![0, 0], 0))));
    for text in ["a", "b", "c"] {
        session
            .apply(Mutation::InsertText {
                text: text.to_string(),
            })
            .unwrap();
        saver.schedule(session.title.clone(), session.content());
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    assert!(store.is_empty());

    tokio::time::sleep(Duration::from_millis(2000)).await;
    let stored = store.load(1).await.unwrap();
    assert_eq!(plain_text(&deserialize(&stored.content)), "abc");
    assert_eq!(session.document_id(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_manual_save_after_autosave_reuses_document() {
    let store = Arc::new(MemoryStore::new());
    let mut session = EditSession::from_content("client-1", "Draft", "first");
    let mut saver = session.autosaver(store.clone(), Duration::from_millis(2000));

    saver.schedule(session.title.clone(), session.content());
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(store.len(), 1);

    session.select_all();
    session
        .apply(Mutation::InsertText {
            text: "second".to_string(),
        })
        .unwrap();
    let receipt = session.save(store.as_ref()).await.unwrap().unwrap();

    assert_eq!(receipt.document_id, 1);
    assert_eq!(store.len(), 1);
    let stored = store.load(1).await.unwrap();
    assert_eq!(plain_text(&deserialize(&stored.content)), "second");
}

#[tokio::test(start_paused = true)]
async fn test_autosave_after_manual_save_reuses_document() {
    let store = Arc::new(MemoryStore::new());
    let mut session = EditSession::from_content("client-1", "Draft", "first");
    let mut saver = session.autosaver(store.clone(), Duration::from_millis(2000));

    let receipt = session.save(store.as_ref()).await.unwrap().unwrap();
    assert_eq!(receipt.document_id, 1);

    saver.schedule(session.title.clone(), "[]");
    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert_eq!(store.len(), 1);
    assert_eq!(store.load(1).await.unwrap().content, "[]");
    assert_eq!(saver.document_id(), Some(1));
}

#[test]
fn test_config_drives_keymap() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("scribe.config.json"),
        r#"{ "reservedChords": [{ "chord": "ctrl+b", "action": "bookmarks" }] }"#,
    )
    .unwrap();

    let config = EditorConfig::load(dir.path()).unwrap();
    let keymap = config.keymap().unwrap();
    let mut session = EditSession::from_content("client-1", "Notes", "text").with_config(&config);
    session.select_all();

    let dispatch = session.handle_key(&keymap, &chord("ctrl+b")).unwrap();
    assert_eq!(
        dispatch,
        Dispatch::Reserved {
            action: "bookmarks".to_string()
        }
    );
    // The default reserved chords are replaced, not merged
    let dispatch = session.handle_key(&keymap, &chord("ctrl+k")).unwrap();
    assert_eq!(dispatch, Dispatch::Unhandled);
}
