//! # Scribe Editor
//!
//! Editing engine on top of the scribe document model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ keymap: key chord → command                 │
//! │  - Reserved chords go back to the host      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: one user editing one document      │
//! │  - Apply mutations with validation          │
//! │  - Undo/redo history                        │
//! │  - Save/load through a DocumentStore        │
//! │  - Chat about the document                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ commands: marks, blocks, links, typing      │
//! │  over scribe-document's tree transforms     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: serialized content and plain text are
//!    derived views
//! 2. **Every change is a Mutation**: recorded, undoable, serializable
//! 3. **Selections survive edits**: commands re-resolve the selection
//!    against the new tree
//! 4. **Collaborators behind traits**: storage and chat are injected
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scribe_editor::{EditSession, Keymap, KeyChord, Mutation};
//!
//! let mut session = EditSession::from_content("client-1", "Notes", &content);
//! session.select_all();
//!
//! session.apply(Mutation::ToggleMark { mark: Mark::Bold })?;
//! session.handle_key(&Keymap::with_defaults(), &"ctrl+alt+1".parse()?)?;
//! session.undo()?;
//!
//! session.save(&store).await?;
//! ```

mod autosave;
mod chat;
mod commands;
mod config;
mod errors;
mod keymap;
mod mutations;
mod persistence;
mod session;
mod state;
mod undo_stack;

pub use autosave::{AutoSaver, SaveTarget, DEFAULT_AUTOSAVE_DELAY};
pub use chat::{
    build_messages, document_context, ChatBackend, ChatError, ChatMessage, ChatReply, ChatRole,
    ChatThread, MockChatBackend, QuickAction, TranscriptEntry, DEFAULT_CONTEXT_LIMIT, ERROR_REPLY,
};
pub use commands::{
    adjust_font_size, current_marks, delete_backward, delete_fragment, insert_break, insert_text,
    is_block_active, is_link_active, is_mark_active, remove_mark, set_mark, toggle_block,
    toggle_link, toggle_mark, unwrap_link, BlockFormat, COLOR_PALETTE, DEFAULT_FONT_SIZE,
    FONT_SIZES, FONT_SIZE_STEP, MIN_FONT_SIZE,
};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use errors::EditorError;
pub use keymap::{
    default_reserved_chords, Dispatch, EditorCommand, KeyChord, KeyCode, Keymap, KeymapError,
    Modifiers, ReservedChord,
};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use persistence::{
    DocumentId, DocumentStore, MemoryStore, PersistenceError, PersistenceResult, SaveReceipt,
    StoredDocument, UNTITLED,
};
pub use session::EditSession;
pub use state::EditorState;
pub use undo_stack::{MutationBatch, UndoStack, DEFAULT_HISTORY_DEPTH};

// Re-export the document model for convenience
pub use scribe_document as document;
