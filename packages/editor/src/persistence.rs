//! # Persistence
//!
//! The storage collaborator. Hosts implement [`DocumentStore`] against their
//! backend; [`MemoryStore`] is the in-process implementation used by the CLI
//! and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

/// Title given to documents first saved without one
pub const UNTITLED: &str = "Untitled Document";

pub type DocumentId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: DocumentId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    pub title: String,

    /// Serialized node array
    pub content: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returned by a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub document_id: DocumentId,
    pub updated_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Load and save documents by id
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self, id: DocumentId) -> PersistenceResult<StoredDocument>;

    /// Save under `id`, or create a new document when `id` is `None`
    async fn save(
        &self,
        id: Option<DocumentId>,
        title: &str,
        content: &str,
    ) -> PersistenceResult<SaveReceipt>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: DocumentId,
    documents: BTreeMap<DocumentId, StoredDocument>,
}

/// In-memory store with sequential ids starting at 1
#[derive(Debug, Default)]
pub struct MemoryStore {
    owner: Option<String>,
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp new documents with an owner
    pub fn with_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            inner: Mutex::default(),
        }
    }

    /// Snapshot of every stored document, ordered by id
    pub fn documents(&self) -> PersistenceResult<Vec<StoredDocument>> {
        let inner = self.lock()?;
        Ok(inner.documents.values().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.documents.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|e| PersistenceError::Storage(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, id: DocumentId) -> PersistenceResult<StoredDocument> {
        let inner = self.lock()?;
        inner
            .documents
            .get(&id)
            .cloned()
            .ok_or(PersistenceError::NotFound(id))
    }

    async fn save(
        &self,
        id: Option<DocumentId>,
        title: &str,
        content: &str,
    ) -> PersistenceResult<SaveReceipt> {
        let now = Utc::now();
        let mut inner = self.lock()?;

        let document_id = match id {
            Some(id) => {
                let stored = inner
                    .documents
                    .get_mut(&id)
                    .ok_or(PersistenceError::NotFound(id))?;
                stored.title = title.to_string();
                stored.content = content.to_string();
                stored.updated_at = now;
                id
            }
            None => {
                inner.next_id += 1;
                let id = inner.next_id;
                let title = if title.trim().is_empty() {
                    UNTITLED.to_string()
                } else {
                    title.to_string()
                };
                inner.documents.insert(
                    id,
                    StoredDocument {
                        id,
                        owner: self.owner.clone(),
                        title,
                        content: content.to_string(),
                        created_at: now,
                        updated_at: now,
                    },
                );
                id
            }
        };

        Ok(SaveReceipt {
            document_id,
            updated_at: now,
        })
    }
}
