//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each mutation records its inverse before being applied
//! - Undo applies the inverse and moves the batch to the redo stack
//! - Redo reapplies the original mutations
//! - New mutations clear the redo stack
//! - Mutations that change nothing are not recorded
//! - Supports batched operations (group multiple mutations as one undo step)
//! - History depth is capped (100 batches by default, 0 = unlimited); the
//!   oldest batch is dropped first
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let mut state = EditorState::new(deserialize(&content));
//!
//! stack.apply(&Mutation::ToggleMark { mark: Mark::Bold }, &mut state)?;
//! stack.undo(&mut state)?;
//! stack.redo(&mut state)?;
//! ```

use crate::mutations::{Mutation, MutationError};
use crate::state::EditorState;

/// Default number of undo levels kept
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// The inverse mutations (in reverse order for undo)
    pub inverses: Vec<Mutation>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
            inverses: vec![inverse],
            description: None,
        }
    }
}

/// Undo/redo stack for one editing session
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with the default depth
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_HISTORY_DEPTH)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo. Returns whether the state
    /// changed.
    pub fn apply(&mut self, mutation: &Mutation, state: &mut EditorState) -> Result<bool, MutationError> {
        // Generate inverse before applying
        let inverse = mutation.to_inverse(state)?;

        if !mutation.apply(state)? {
            return Ok(false);
        }

        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(mutation.clone());
            batch.inverses.insert(0, inverse);
        } else {
            self.push_batch(MutationBatch::single(mutation.clone(), inverse));
        }

        tracing::debug!(
            mutation = mutation.name(),
            undo_levels = self.undo_stack.len(),
            "recorded mutation"
        );
        Ok(true)
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(MutationBatch {
            mutations: Vec::new(),
            inverses: Vec::new(),
            description: None,
        });
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new action invalidates the undone future
        self.redo_stack.clear();
    }

    /// Undo the most recent batch. Returns `false` when there is nothing to
    /// undo.
    pub fn undo(&mut self, state: &mut EditorState) -> Result<bool, MutationError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        for inverse in &batch.inverses {
            inverse.apply(state)?;
        }
        self.redo_stack.push(batch);
        Ok(true)
    }

    /// Redo the most recently undone batch. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self, state: &mut EditorState) -> Result<bool, MutationError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        for mutation in &batch.mutations {
            mutation.apply(state)?;
        }
        self.undo_stack.push(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
