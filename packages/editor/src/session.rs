//! # Edit Session Management
//!
//! An EditSession is one user's view of one document: the editing state,
//! its undo history, the document's title and storage id, and the chat
//! thread about it. Every change goes through [`EditSession::apply`] so the
//! history and version stay in step with the document.

use crate::autosave::{AutoSaver, SaveTarget};
use crate::chat::{document_context, ChatBackend, ChatThread, QuickAction, DEFAULT_CONTEXT_LIMIT};
use crate::config::EditorConfig;
use crate::keymap::{Dispatch, EditorCommand, KeyChord, Keymap};
use crate::mutations::{Mutation, MutationResult};
use crate::persistence::{DocumentId, DocumentStore, SaveReceipt};
use crate::state::EditorState;
use crate::undo_stack::UndoStack;
use crate::EditorError;
use scribe_document::{deserialize, plain_text, serialize, stats, Document, DocumentStats, Range};
use std::sync::Arc;
use std::time::Duration;

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    pub title: String,

    /// Shared with any auto-saver of this session
    target: SaveTarget,
    state: EditorState,
    history: UndoStack,

    /// Bumped on every change, including undo and redo
    version: u64,

    /// Changed since the last save
    dirty: bool,

    chat: ChatThread,
    context_limit: usize,
}

impl EditSession {
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            target: SaveTarget::new(),
            state: EditorState::new(document),
            history: UndoStack::new(),
            version: 0,
            dirty: false,
            chat: ChatThread::new(),
            context_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }

    /// Start from serialized content; malformed content is recovered as
    /// plain text
    pub fn from_content(id: impl Into<String>, title: impl Into<String>, content: &str) -> Self {
        let mut session = Self::new(id, deserialize(content));
        session.title = title.into();
        session
    }

    /// Load a stored document
    pub async fn open(
        id: impl Into<String>,
        store: &dyn DocumentStore,
        document_id: DocumentId,
    ) -> Result<Self, EditorError> {
        let stored = store.load(document_id).await?;
        let mut session = Self::from_content(id, stored.title, &stored.content);
        session.target = SaveTarget::existing(stored.id);
        tracing::debug!(document_id, session = %session.id, "opened document");
        Ok(session)
    }

    pub fn with_config(mut self, config: &EditorConfig) -> Self {
        self.history = UndoStack::with_max_levels(config.history_depth);
        self.context_limit = config.chat_context_limit;
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn selection(&self) -> Option<&Range> {
        self.state.selection.as_ref()
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.target.document_id()
    }

    /// An auto-saver writing to the same document as [`EditSession::save`]
    pub fn autosaver(&self, store: Arc<dyn DocumentStore>, delay: Duration) -> AutoSaver {
        AutoSaver::with_target(store, delay, self.target.clone())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn chat(&self) -> &ChatThread {
        &self.chat
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.dirty = true;
    }

    /// Move the selection. Not an undoable change.
    pub fn set_selection(&mut self, range: Option<Range>) {
        self.state.set_selection(range);
    }

    pub fn select_all(&mut self) {
        self.state.select_all();
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let changed = self.history.apply(&mutation, &mut self.state)?;
        if changed {
            self.touch();
        }
        tracing::debug!(
            session = %self.id,
            mutation = mutation.name(),
            changed,
            version = self.version,
            "applied mutation"
        );
        Ok(MutationResult {
            version: self.version,
            changed,
        })
    }

    /// Group the following mutations into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let undone = self.history.undo(&mut self.state)?;
        if undone {
            self.touch();
            tracing::debug!(session = %self.id, version = self.version, "undo");
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let redone = self.history.redo(&mut self.state)?;
        if redone {
            self.touch();
            tracing::debug!(session = %self.id, version = self.version, "redo");
        }
        Ok(redone)
    }

    /// Dispatch a key chord and run the command it maps to. The returned
    /// dispatch tells the host whether the event was consumed.
    pub fn handle_key(&mut self, keymap: &Keymap, chord: &KeyChord) -> Result<Dispatch, EditorError> {
        let dispatch = keymap.resolve(chord);
        if let Dispatch::Command(command) = &dispatch {
            match command {
                EditorCommand::Apply(mutation) => {
                    self.apply(mutation.clone())?;
                }
                EditorCommand::Undo => {
                    self.undo()?;
                }
                EditorCommand::Redo => {
                    self.redo()?;
                }
            }
        }
        Ok(dispatch)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    /// Serialized document
    pub fn content(&self) -> String {
        serialize(&self.state.document)
    }

    pub fn plain_text(&self) -> String {
        plain_text(&self.state.document)
    }

    pub fn stats(&self) -> DocumentStats {
        stats(&self.state.document)
    }

    /// True when there is neither a title nor any text
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.plain_text().trim().is_empty()
    }

    /// Save through the store. Returns `None` when the session is blank.
    pub async fn save(
        &mut self,
        store: &dyn DocumentStore,
    ) -> Result<Option<SaveReceipt>, EditorError> {
        if self.is_blank() {
            return Ok(None);
        }

        match self.target.save(store, &self.title, &self.content()).await {
            Ok(receipt) => {
                self.dirty = false;
                tracing::info!(
                    session = %self.id,
                    document_id = receipt.document_id,
                    "saved document"
                );
                Ok(Some(receipt))
            }
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "save failed");
                Err(e.into())
            }
        }
    }

    /// Ask the assistant about the current document
    pub async fn ask(
        &mut self,
        backend: &dyn ChatBackend,
        input: &str,
    ) -> Result<String, EditorError> {
        let context = document_context(&self.title, &self.state.document, self.context_limit);
        let reply = self.chat.ask(backend, &context, input).await?;
        Ok(reply.to_string())
    }

    pub async fn quick_action(
        &mut self,
        backend: &dyn ChatBackend,
        action: QuickAction,
    ) -> Result<String, EditorError> {
        self.ask(backend, action.prompt()).await
    }
}
