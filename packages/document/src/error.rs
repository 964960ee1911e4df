use crate::path::Path;
use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Invalid path: {0}")]
    InvalidPath(Path),

    #[error("Node at {0} is not an element")]
    NotAnElement(Path),

    #[error("Node at {0} is not text")]
    NotText(Path),

    #[error("Malformed content: {0}")]
    MalformedContent(String),
}

impl TreeError {
    pub fn invalid_path(path: &Path) -> Self {
        Self::InvalidPath(path.clone())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContent(message.into())
    }
}
