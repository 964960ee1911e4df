//! Error types for the editor

use crate::chat::ChatError;
use crate::keymap::KeymapError;
use crate::mutations::MutationError;
use crate::persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Keymap error: {0}")]
    Keymap(#[from] KeymapError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
