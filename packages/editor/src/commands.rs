//! # Commands
//!
//! The semantic edit vocabulary: marks, block formats, links and typing.
//!
//! Every command takes the editor state, reads its selection and edits the
//! document in place. Commands never fail. Without a selection, or with
//! arguments that make no sense for the current tree, they leave the state
//! untouched and return `false`.
//!
//! ## Selection tracking
//!
//! Before a structural edit the selection is converted to block-relative
//! [`TextPosition`]s, which survive leaf splits, merges and list
//! wrapping. After the edit the positions are mapped back onto the new tree.
//!
//! ## Toggle policy
//!
//! - A mark is active when every leaf the selection touches carries it with
//!   an equal value. Partial coverage is inactive, so toggling applies it
//!   uniformly.
//! - A block format is active when any targeted block has it.
//! - At a collapsed caret, mark edits only change the pending marks.

use crate::state::EditorState;
use scribe_document::{
    Align, Document, Element, ElementKind, ElementPatch, Mark, MarkKind, Marks, Node, Range,
    TextPosition,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size assumed when no explicit font-size mark is active
pub const DEFAULT_FONT_SIZE: u32 = 14;
pub const MIN_FONT_SIZE: u32 = 8;
pub const FONT_SIZE_STEP: i32 = 2;

/// Sizes offered by the font-size menu
pub const FONT_SIZES: [u32; 10] = [8, 9, 10, 11, 12, 14, 16, 18, 24, 36];

/// Text colors offered by the color picker
pub const COLOR_PALETTE: [&str; 18] = [
    "#000000", "#434343", "#666666", "#999999", "#b7b7b7", "#cccccc", "#d9ead3", "#fce5cd",
    "#fff2cc", "#f4cccc", "#d0e0e3", "#c9daf8", "#34a853", "#ff9900", "#fbbc04", "#ea4335",
    "#4285f4", "#9900ff",
];

/// Target of a block toggle: a structural kind or an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockFormat {
    Kind(ElementKind),
    Align(Align),
}

impl FromStr for BlockFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(align) = s.parse::<Align>() {
            return Ok(BlockFormat::Align(align));
        }
        s.parse::<ElementKind>()
            .map(BlockFormat::Kind)
            .map_err(|_| format!("Unknown block format: {}", s))
    }
}

impl fmt::Display for BlockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockFormat::Kind(kind) => f.write_str(kind.as_str()),
            BlockFormat::Align(align) => f.write_str(align.as_str()),
        }
    }
}

/// A selection pinned to block-relative positions
#[derive(Debug, Clone, Copy)]
struct Anchored {
    anchor: TextPosition,
    focus: TextPosition,
}

impl Anchored {
    fn capture(doc: &Document, range: &Range) -> Option<Self> {
        Some(Self {
            anchor: doc.position_of(&range.anchor)?,
            focus: doc.position_of(&range.focus)?,
        })
    }

    fn restore(self, doc: &Document) -> Option<Range> {
        Some(Range::new(doc.point_at(self.anchor)?, doc.point_at(self.focus)?))
    }
}

fn reselect(state: &mut EditorState, saved: Option<Anchored>, fallback: &Range) {
    let restored = saved.and_then(|saved| saved.restore(&state.document));
    state.selection = Some(restored.unwrap_or_else(|| state.document.resolve_range(fallback)));
}

fn collapse_to(state: &mut EditorState, position: TextPosition) {
    let point = state
        .document
        .point_at(position)
        .unwrap_or_else(|| state.document.end());
    state.selection = Some(Range::collapsed(point));
}

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

/// Marks the next inserted text would carry: the pending marks if any,
/// otherwise those of the leaf at the start of the selection.
pub fn current_marks(state: &EditorState) -> Marks {
    if let Some(marks) = &state.marks {
        return marks.clone();
    }
    let Some(range) = state.resolved_selection() else {
        return Marks::default();
    };

    let doc = &state.document;
    doc.touched_leaves(&range)
        .first()
        .and_then(|path| doc.text_node(path))
        .map(|text| text.marks.clone())
        .unwrap_or_default()
}

pub fn is_mark_active(state: &EditorState, mark: &Mark) -> bool {
    let Some(range) = state.resolved_selection() else {
        return false;
    };
    if range.is_collapsed() {
        return current_marks(state).has(mark);
    }

    let doc = &state.document;
    let leaves = doc.touched_leaves(&range);
    !leaves.is_empty()
        && leaves
            .iter()
            .all(|path| doc.text_node(path).is_some_and(|text| text.marks.has(mark)))
}

/// Remove the mark if it is active across the selection, add it otherwise
pub fn toggle_mark(state: &mut EditorState, mark: &Mark) -> bool {
    if is_mark_active(state, mark) {
        remove_mark(state, mark.kind())
    } else {
        set_mark(state, mark)
    }
}

/// Apply the mark to the selection regardless of its current state
pub fn set_mark(state: &mut EditorState, mark: &Mark) -> bool {
    let Some(range) = state.resolved_selection() else {
        return false;
    };
    if range.is_collapsed() {
        let mut marks = current_marks(state);
        marks.add(mark);
        state.marks = Some(marks);
        return true;
    }
    edit_marks(state, &range, |marks| marks.add(mark))
}

pub fn remove_mark(state: &mut EditorState, kind: MarkKind) -> bool {
    let Some(range) = state.resolved_selection() else {
        return false;
    };
    if range.is_collapsed() {
        let mut marks = current_marks(state);
        marks.remove(kind);
        state.marks = Some(marks);
        return true;
    }
    edit_marks(state, &range, |marks| marks.remove(kind))
}

/// Step the font size up or down, never below [`MIN_FONT_SIZE`]
pub fn adjust_font_size(state: &mut EditorState, delta: i32) -> bool {
    let current = current_marks(state).font_size.unwrap_or(DEFAULT_FONT_SIZE);
    let size = (i64::from(current) + i64::from(delta)).max(i64::from(MIN_FONT_SIZE));
    let size = u32::try_from(size).unwrap_or(MIN_FONT_SIZE);
    set_mark(state, &Mark::FontSize(size))
}

fn edit_marks(state: &mut EditorState, range: &Range, update: impl Fn(&mut Marks)) -> bool {
    let saved = Anchored::capture(&state.document, range);
    let changed = state.document.update_marks(range, update);
    reselect(state, saved, range);
    changed
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

pub fn is_block_active(state: &EditorState, format: BlockFormat) -> bool {
    let Some(range) = state.resolved_selection() else {
        return false;
    };
    let doc = &state.document;
    let blocks = doc.blocks_in_range(&doc.unhang_range(&range));

    match format {
        BlockFormat::Align(align) => blocks
            .iter()
            .any(|path| doc.element(path).is_some_and(|element| element.align == Some(align))),
        BlockFormat::Kind(kind) if kind.is_list() => blocks.iter().any(|path| {
            path.parent()
                .and_then(|list| doc.element(&list))
                .is_some_and(|list| list.kind == kind)
        }),
        BlockFormat::Kind(kind) => blocks
            .iter()
            .any(|path| doc.element(path).is_some_and(|element| element.kind == kind)),
    }
}

/// Toggle a block format on every block the selection touches.
///
/// Alignment only sets or clears `align`. Structural kinds first lift the
/// blocks out of any list, then set the kind (back to paragraph when already
/// active). List kinds and `list-item` wrap the blocks in a fresh list when
/// turning on.
pub fn toggle_block(state: &mut EditorState, format: BlockFormat) -> bool {
    if format == BlockFormat::Kind(ElementKind::Link) {
        return false;
    }
    let Some(range) = state.resolved_selection() else {
        return false;
    };

    let unhung = state.document.unhang_range(&range);
    let (start, end) = unhung.edges();
    let (Some(first), Some(last)) = (
        state.document.position_of(start),
        state.document.position_of(end),
    ) else {
        return false;
    };
    let saved = Anchored::capture(&state.document, &range);
    let active = is_block_active(state, format);

    match format {
        BlockFormat::Align(align) => {
            let value = if active { None } else { Some(align) };
            let blocks = state.document.blocks_in_range(&unhung);
            state.document.without_normalizing(|doc| {
                for path in &blocks {
                    let _ = doc.set_node_properties(path, &ElementPatch::align(value));
                }
            });
        }
        BlockFormat::Kind(kind) => {
            let wraps = kind.is_list() || kind == ElementKind::ListItem;
            let target = if active {
                ElementKind::Paragraph
            } else if wraps {
                ElementKind::ListItem
            } else {
                kind
            };
            let list_kind = if kind.is_list() {
                kind
            } else {
                ElementKind::BulletedList
            };

            state.document.without_normalizing(|doc| {
                doc.unwrap_lists(first.block, last.block);
                let blocks = doc.text_blocks();
                let Some(targeted) = blocks.get(first.block..=last.block) else {
                    return;
                };
                for path in targeted {
                    let _ = doc.set_node_properties(path, &ElementPatch::kind(target));
                }
                if wraps && !active {
                    if let Some(first_block) = targeted.first() {
                        let list = Element::new(list_kind, Vec::new());
                        let _ = doc.wrap_nodes(list, first_block, targeted.len());
                    }
                }
            });
        }
    }

    tracing::debug!(%format, active, "toggled block format");
    reselect(state, saved, &range);
    true
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

pub fn is_link_active(state: &EditorState) -> bool {
    state
        .resolved_selection()
        .is_some_and(|range| !state.document.links_in_range(&range).is_empty())
}

/// Unwrap any link the selection touches, then link the selection to `url`.
/// A collapsed caret gets a new link whose text is the url itself. The
/// selection collapses to the end of the link.
pub fn toggle_link(state: &mut EditorState, url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }
    let Some(range) = state.resolved_selection() else {
        return false;
    };

    let (start, end) = range.edges();
    let (Some(from), Some(to)) = (
        state.document.position_of(start),
        state.document.position_of(end),
    ) else {
        return false;
    };

    let links = state.document.links_in_range(&range);
    if !links.is_empty() {
        state.document.unwrap_nodes(|path, _| links.contains(path));
    }

    let caret = if range.is_collapsed() {
        let link = Element::link(url, vec![Node::text(url)]);
        state.document.insert_inline(from, link.into())
    } else {
        let doc = &mut state.document;
        match (doc.point_at(from), doc.point_at(to)) {
            (Some(anchor), Some(focus)) => {
                doc.wrap_inline(&Element::link(url, Vec::new()), &Range::new(anchor, focus));
                Some(to)
            }
            _ => None,
        }
    };

    state.marks = None;
    match caret {
        Some(position) => collapse_to(state, position),
        None => reselect(state, None, &range),
    }
    true
}

/// Remove every link the selection touches, keeping their text
pub fn unwrap_link(state: &mut EditorState) -> bool {
    let Some(range) = state.resolved_selection() else {
        return false;
    };
    let links = state.document.links_in_range(&range);
    if links.is_empty() {
        return false;
    }

    let saved = Anchored::capture(&state.document, &range);
    state.document.unwrap_nodes(|path, _| links.contains(path));
    reselect(state, saved, &range);
    true
}

// ---------------------------------------------------------------------------
// Typing
// ---------------------------------------------------------------------------

/// Insert text at the caret, replacing an expanded selection. Pending marks
/// are applied to the inserted text and then cleared.
pub fn insert_text(state: &mut EditorState, text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let Some(position) = caret_position(state) else {
        return false;
    };

    let marks = state.marks.take();
    match state.document.insert_text(position, text, marks.as_ref()) {
        Some(after) => {
            collapse_to(state, after);
            true
        }
        None => false,
    }
}

/// Split the block at the caret, replacing an expanded selection
pub fn insert_break(state: &mut EditorState) -> bool {
    let Some(position) = caret_position(state) else {
        return false;
    };

    state.marks = None;
    match state.document.insert_break(position) {
        Some(after) => {
            collapse_to(state, after);
            true
        }
        None => false,
    }
}

/// Delete the char before the caret, joining with the previous block at a
/// block start. An expanded selection is deleted instead.
pub fn delete_backward(state: &mut EditorState) -> bool {
    let Some(range) = state.resolved_selection() else {
        return false;
    };
    if range.is_expanded() {
        return delete_fragment(state);
    }
    let Some(position) = state.document.position_of(range.start()) else {
        return false;
    };

    let target = if position.offset > 0 {
        TextPosition::new(position.block, position.offset - 1)
    } else if position.block > 0 {
        let previous = position.block - 1;
        TextPosition::new(previous, state.document.block_len(previous))
    } else {
        return false;
    };

    state.marks = None;
    match state.document.delete_between(target, position) {
        Some(caret) => {
            collapse_to(state, caret);
            true
        }
        None => false,
    }
}

/// Delete the selected span, merging the end block into the start block
pub fn delete_fragment(state: &mut EditorState) -> bool {
    let Some(range) = state.resolved_selection() else {
        return false;
    };
    if range.is_collapsed() {
        return false;
    }

    match state.document.remove_range(&range) {
        Some(caret) => {
            state.selection = Some(Range::collapsed(caret));
            true
        }
        None => false,
    }
}

/// Caret position after clearing an expanded selection
fn caret_position(state: &mut EditorState) -> Option<TextPosition> {
    let range = state.resolved_selection()?;
    if range.is_expanded() {
        delete_fragment(state);
    }
    let range = state.resolved_selection()?;
    state.document.position_of(range.start())
}
