//! In-process document store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{DocumentStore, StoreError};
use crate::core::document::{DocumentId, DocumentPatch, DocumentSummary, StoredDocument};

#[derive(Debug, Clone)]
struct Record {
    owner_id: String,
    title: String,
    content: String,
    updated_at: DateTime<Utc>,
    /// Monotonic write counter, orders records written within the same instant
    revision: u64,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<DocumentId, Record>,
    revision: u64,
}

impl Inner {
    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

/// Document store held entirely in memory
///
/// Can be switched offline to simulate an unreachable backend, and counts
/// the calls it receives.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a transport error
    #[cfg(test)]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of calls received so far, failed ones included
    #[cfg(test)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Insert a document directly, bypassing call accounting
    pub fn insert(&self, owner_id: &str, title: &str, content: &str) -> DocumentId {
        let mut inner = self.lock();
        let id = DocumentId::new(Uuid::new_v4().to_string());
        let revision = inner.next_revision();
        inner.records.insert(
            id.clone(),
            Record {
                owner_id: owner_id.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                updated_at: Utc::now(),
                revision,
            },
        );
        id
    }

    /// Raw stored payload of a document, for inspection
    #[cfg(test)]
    pub fn stored_content(&self, id: &DocumentId) -> Option<String> {
        self.lock().records.get(id).map(|r| r.content.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_call(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
    ) -> Result<StoredDocument, StoreError> {
        self.begin_call()?;
        if owner_id.trim().is_empty() {
            return Err(StoreError::Rejected("owner id is required".to_string()));
        }

        let id = self.insert(owner_id, title, content);
        Ok(StoredDocument {
            id,
            title: title.to_string(),
            content: content.to_string(),
        })
    }

    async fn get(&self, id: &DocumentId) -> Result<StoredDocument, StoreError> {
        self.begin_call()?;
        let inner = self.lock();
        let record = inner.records.get(id).ok_or_else(|| StoreError::not_found(id))?;
        Ok(StoredDocument {
            id: id.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
        })
    }

    async fn update(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<(), StoreError> {
        self.begin_call()?;
        let mut inner = self.lock();
        let revision = inner.next_revision();
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id))?;
        if let Some(title) = &patch.title {
            record.title = title.clone();
        }
        if let Some(content) = &patch.content {
            record.content = content.clone();
        }
        record.updated_at = Utc::now();
        record.revision = revision;
        Ok(())
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, StoreError> {
        self.begin_call()?;
        let inner = self.lock();
        let mut records: Vec<_> = inner
            .records
            .iter()
            .filter(|(_, r)| r.owner_id == owner_id)
            .collect();
        records.sort_by(|(_, a), (_, b)| b.revision.cmp(&a.revision));
        Ok(records
            .into_iter()
            .map(|(id, r)| DocumentSummary {
                id: id.clone(),
                title: r.title.clone(),
                updated_at: Some(r.updated_at),
            })
            .collect())
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_update() {
        let store = MemoryStore::new();
        let created = store.create("alice", "Draft", "\"\"").await.unwrap();

        let patch = DocumentPatch {
            title: Some("Final".to_string()),
            content: Some("\"<p>done</p>\"".to_string()),
        };
        store.update(&created.id, &patch).await.unwrap();

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.title, "Final");
        assert_eq!(fetched.content, "\"<p>done</p>\"");
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let id = DocumentId::new("nope");
        assert!(store.get(&id).await.unwrap_err().is_not_found());
        let err = store.update(&id, &DocumentPatch::default()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered() {
        let store = MemoryStore::new();
        let first = store.insert("alice", "First", "");
        let second = store.insert("alice", "Second", "");
        store.insert("bob", "Other", "");

        let listed = store.list("alice").await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![second, first.clone()]);

        store
            .update(&first, &DocumentPatch { title: None, content: Some("\"x\"".into()) })
            .await
            .unwrap();
        let listed = store.list("alice").await.unwrap();
        assert_eq!(listed[0].id, first);
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.create("alice", "Draft", "").await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
        assert_eq!(store.call_count(), 1);
    }
}
