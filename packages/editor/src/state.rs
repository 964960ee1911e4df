//! The editable unit: a document, where the user is in it, and the marks the
//! next typed text should carry.

use scribe_document::{Document, Marks, Range};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub document: Document,

    /// `None` when the editor has no focus
    pub selection: Option<Range>,

    /// Marks toggled at a collapsed caret, consumed by the next insertion
    pub marks: Option<Marks>,
}

impl EditorState {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            selection: None,
            marks: None,
        }
    }

    /// Replace the selection, snapping it onto the current tree.
    /// Pending marks do not survive a selection change.
    pub fn set_selection(&mut self, range: Option<Range>) {
        self.selection = range.map(|range| self.document.resolve_range(&range));
        self.marks = None;
    }

    pub fn select_all(&mut self) {
        let all = self.document.all();
        self.set_selection(Some(all));
    }

    /// Selection resolved against the current tree
    pub fn resolved_selection(&self) -> Option<Range> {
        self.selection
            .as_ref()
            .map(|range| self.document.resolve_range(range))
    }
}
