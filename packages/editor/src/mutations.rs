//! # Mutations
//!
//! Recordable editor operations. Each variant names one command together
//! with its arguments, so an edit can be replayed (redo), logged, or sent
//! over the wire.
//!
//! ## Inverses
//!
//! Commands restructure the tree in ways that are hard to invert piecewise
//! (leaf splits, list lifting, coalescing). The inverse of any mutation is
//! therefore a [`Mutation::Restore`] of the state captured just before it
//! ran: document, selection and pending marks.

use crate::commands::{self, BlockFormat, FONT_SIZE_STEP};
use crate::state::EditorState;
use scribe_document::{Mark, MarkKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic mutations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Toggle a mark over the selection (or the pending marks at a caret)
    ToggleMark { mark: Mark },

    /// Apply a mark without toggling
    SetMark { mark: Mark },

    RemoveMark { kind: MarkKind },

    /// Step the font size; positive grows, negative shrinks
    AdjustFontSize { delta: i32 },

    ToggleBlock { format: BlockFormat },

    ToggleLink { url: String },

    UnwrapLink,

    InsertText { text: String },

    InsertBreak,

    DeleteBackward,

    DeleteFragment,

    /// Replace the whole editor state with a snapshot
    Restore { snapshot: Box<EditorState> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Link url is empty")]
    EmptyUrl,

    #[error("Nothing to insert")]
    EmptyText,

    #[error("Font size step must not be zero")]
    ZeroFontSizeStep,

    #[error("Invalid mark value: {0}")]
    InvalidMark(String),
}

impl Mutation {
    pub fn increase_font_size() -> Self {
        Mutation::AdjustFontSize {
            delta: FONT_SIZE_STEP,
        }
    }

    pub fn decrease_font_size() -> Self {
        Mutation::AdjustFontSize {
            delta: -FONT_SIZE_STEP,
        }
    }

    /// Apply to the editor state. Returns whether anything changed; a
    /// mutation that finds nothing to act on (no selection, no link under
    /// the caret) is a no-op, not an error.
    pub fn apply(&self, state: &mut EditorState) -> Result<bool, MutationError> {
        self.validate()?;

        let changed = match self {
            Mutation::ToggleMark { mark } => commands::toggle_mark(state, mark),
            Mutation::SetMark { mark } => commands::set_mark(state, mark),
            Mutation::RemoveMark { kind } => commands::remove_mark(state, *kind),
            Mutation::AdjustFontSize { delta } => commands::adjust_font_size(state, *delta),
            Mutation::ToggleBlock { format } => commands::toggle_block(state, *format),
            Mutation::ToggleLink { url } => commands::toggle_link(state, url),
            Mutation::UnwrapLink => commands::unwrap_link(state),
            Mutation::InsertText { text } => commands::insert_text(state, text),
            Mutation::InsertBreak => commands::insert_break(state),
            Mutation::DeleteBackward => commands::delete_backward(state),
            Mutation::DeleteFragment => commands::delete_fragment(state),
            Mutation::Restore { snapshot } => {
                *state = (**snapshot).clone();
                true
            }
        };
        Ok(changed)
    }

    /// Validate arguments without applying
    pub fn validate(&self) -> Result<(), MutationError> {
        match self {
            Mutation::ToggleLink { url } if url.trim().is_empty() => Err(MutationError::EmptyUrl),
            Mutation::InsertText { text } if text.is_empty() => Err(MutationError::EmptyText),
            Mutation::AdjustFontSize { delta: 0 } => Err(MutationError::ZeroFontSizeStep),
            Mutation::ToggleMark { mark } | Mutation::SetMark { mark } => validate_mark(mark),
            _ => Ok(()),
        }
    }

    /// The mutation that undoes this one when applied to the state after it
    pub fn to_inverse(&self, state: &EditorState) -> Result<Mutation, MutationError> {
        self.validate()?;
        Ok(Mutation::Restore {
            snapshot: Box::new(state.clone()),
        })
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::ToggleMark { .. } => "toggle-mark",
            Mutation::SetMark { .. } => "set-mark",
            Mutation::RemoveMark { .. } => "remove-mark",
            Mutation::AdjustFontSize { .. } => "adjust-font-size",
            Mutation::ToggleBlock { .. } => "toggle-block",
            Mutation::ToggleLink { .. } => "toggle-link",
            Mutation::UnwrapLink => "unwrap-link",
            Mutation::InsertText { .. } => "insert-text",
            Mutation::InsertBreak => "insert-break",
            Mutation::DeleteBackward => "delete-backward",
            Mutation::DeleteFragment => "delete-fragment",
            Mutation::Restore { .. } => "restore",
        }
    }
}

fn validate_mark(mark: &Mark) -> Result<(), MutationError> {
    match mark {
        Mark::Color(color) if color.trim().is_empty() => {
            Err(MutationError::InvalidMark("empty color".to_string()))
        }
        Mark::FontSize(0) => Err(MutationError::InvalidMark("font size 0".to_string())),
        _ => Ok(()),
    }
}

/// Result of applying a mutation through a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// False when the mutation found nothing to act on
    pub changed: bool,
}
