//! # Auto-save
//!
//! Debounced saving. Every edit reschedules a single save that fires once the
//! document has been quiet for the configured delay; only the latest title and
//! content are written. The first successful save assigns the document id,
//! which later saves (scheduled or manual) reuse.

use crate::persistence::{DocumentId, DocumentStore, PersistenceError, SaveReceipt};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Quiet interval before a scheduled save fires
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Default)]
struct SaveState {
    document_id: Option<DocumentId>,
    last_saved: Option<DateTime<Utc>>,
}

/// The document id and save time shared by every save path of one session.
/// Clones point at the same state, so whichever path saves first assigns the
/// id the others reuse.
#[derive(Debug, Clone, Default)]
pub struct SaveTarget {
    state: Arc<Mutex<SaveState>>,
}

impl SaveTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target an existing document
    pub fn existing(id: DocumentId) -> Self {
        let target = Self::new();
        if let Ok(mut state) = target.state.lock() {
            state.document_id = Some(id);
        }
        target
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.state.lock().ok().and_then(|state| state.document_id)
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.state.lock().ok().and_then(|state| state.last_saved)
    }

    pub fn record(&self, receipt: &SaveReceipt) {
        if let Ok(mut state) = self.state.lock() {
            state.document_id = Some(receipt.document_id);
            state.last_saved = Some(receipt.updated_at);
        }
    }

    /// Save through the store into this target
    pub async fn save(
        &self,
        store: &dyn DocumentStore,
        title: &str,
        content: &str,
    ) -> Result<SaveReceipt, PersistenceError> {
        let receipt = store.save(self.document_id(), title, content).await?;
        self.record(&receipt);
        tracing::debug!(document_id = receipt.document_id, "wrote document");
        Ok(receipt)
    }
}

pub struct AutoSaver {
    store: Arc<dyn DocumentStore>,
    delay: Duration,
    target: SaveTarget,
    pending: Option<JoinHandle<()>>,
}

impl AutoSaver {
    pub fn new(store: Arc<dyn DocumentStore>, delay: Duration) -> Self {
        Self::with_target(store, delay, SaveTarget::new())
    }

    /// Save into a target shared with other save paths
    pub fn with_target(
        store: Arc<dyn DocumentStore>,
        delay: Duration,
        target: SaveTarget,
    ) -> Self {
        Self {
            store,
            delay,
            target,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.target.document_id()
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.target.last_saved()
    }

    /// Replace any pending save with one for this snapshot. Must be called
    /// from within a tokio runtime.
    pub fn schedule(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.cancel();

        let title = title.into();
        let content = content.into();
        if is_blank(&title, &content) {
            return;
        }

        let store = Arc::clone(&self.store);
        let target = self.target.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match target.save(store.as_ref(), &title, &content).await {
                Ok(receipt) => {
                    tracing::info!(document_id = receipt.document_id, "auto-saved document")
                }
                Err(e) => tracing::warn!(error = %e, "auto-save failed"),
            }
        }));
    }

    /// Drop the pending save, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Save immediately, superseding any pending save. Returns `None` when
    /// there is nothing to save.
    pub async fn save_now(
        &mut self,
        title: &str,
        content: &str,
    ) -> Result<Option<SaveReceipt>, PersistenceError> {
        self.cancel();
        if is_blank(title, content) {
            return Ok(None);
        }
        self.target
            .save(self.store.as_ref(), title, content)
            .await
            .map(Some)
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn is_blank(title: &str, content: &str) -> bool {
    title.trim().is_empty() && content.trim().is_empty()
}
