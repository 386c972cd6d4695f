//! Document store backed by a local directory
//!
//! Each document is one JSON record named `<id>.json`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use walkdir::WalkDir;

use super::{DocumentStore, StoreError};
use crate::core::document::{DocumentId, DocumentPatch, DocumentSummary, StoredDocument};

/// On-disk record layout
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    id: DocumentId,
    owner_id: String,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Record> for StoredDocument {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
        }
    }
}

/// Directory-backed document store
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a document's record, or `None` for ids that cannot name a file
    fn record_path(&self, id: &DocumentId) -> Option<PathBuf> {
        let valid = !id.as_str().is_empty()
            && id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.root.join(format!("{}.json", id)))
    }

    async fn read_record(&self, id: &DocumentId) -> Result<Record, StoreError> {
        let path = self.record_path(id).ok_or_else(|| StoreError::not_found(id))?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::not_found(id));
            }
            Err(e) => return Err(io_error(&path, e)),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Malformed(format!("{}: {}", path.display(), e)))
    }

    async fn write_record(&self, record: &Record) -> Result<(), StoreError> {
        let path = self
            .record_path(&record.id)
            .ok_or_else(|| StoreError::Rejected(format!("invalid document id: {}", record.id)))?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;

        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        // Unique sibling per write, renamed into place once complete
        let tmp = self
            .root
            .join(format!("{}.{}.tmp", record.id, Uuid::new_v4()));
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(())
    }
}

fn io_error(path: &Path, err: io::Error) -> StoreError {
    StoreError::Transport(format!("{}: {}", path.display(), err))
}

/// Read every record under `root`, skipping files that are not records
fn scan_records(root: &Path) -> Vec<Record> {
    WalkDir::new(root)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path().extension().map(|ext| ext == "json").unwrap_or(false)
        })
        .filter_map(|e| {
            let bytes = std::fs::read(e.path()).ok()?;
            match serde_json::from_slice::<Record>(&bytes) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!("Skipping unreadable record {}: {}", e.path().display(), err);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn create(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
    ) -> Result<StoredDocument, StoreError> {
        if owner_id.trim().is_empty() {
            return Err(StoreError::Rejected("owner id is required".to_string()));
        }

        let now = Utc::now();
        let record = Record {
            id: DocumentId::new(Uuid::new_v4().to_string()),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.write_record(&record).await?;
        tracing::debug!("Created document {} in {}", record.id, self.root.display());
        Ok(record.into())
    }

    async fn get(&self, id: &DocumentId) -> Result<StoredDocument, StoreError> {
        self.read_record(id).await.map(Into::into)
    }

    async fn update(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<(), StoreError> {
        let mut record = self.read_record(id).await?;
        if let Some(title) = &patch.title {
            record.title = title.clone();
        }
        if let Some(content) = &patch.content {
            record.content = content.clone();
        }
        record.updated_at = Utc::now();
        self.write_record(&record).await
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let root = self.root.clone();
        let mut records = tokio::task::spawn_blocking(move || scan_records(&root))
            .await
            .map_err(|e| StoreError::Transport(format!("directory scan failed: {}", e)))?;

        records.retain(|r| r.owner_id == owner_id);
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records
            .into_iter()
            .map(|r| DocumentSummary {
                id: r.id,
                title: r.title,
                updated_at: Some(r.updated_at),
            })
            .collect())
    }

    fn describe(&self) -> String {
        format!("local folder {}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (LocalStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path().join("documents"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (store, _temp_dir) = create_test_store();

        let created = store.create("alice", "Draft", "\"<p>hi</p>\"").await.unwrap();
        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert!(store.root().join(format!("{}.json", created.id)).exists());
    }

    #[tokio::test]
    async fn test_update_patches_fields() {
        let (store, _temp_dir) = create_test_store();
        let created = store.create("alice", "Draft", "\"\"").await.unwrap();

        let patch = DocumentPatch {
            title: None,
            content: Some("\"<p>new</p>\"".to_string()),
        };
        store.update(&created.id, &patch).await.unwrap();

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.title, "Draft");
        assert_eq!(fetched.content, "\"<p>new</p>\"");
    }

    #[tokio::test]
    async fn test_missing_and_invalid_ids_are_not_found() {
        let (store, _temp_dir) = create_test_store();
        let missing = DocumentId::new("0000");
        assert!(store.get(&missing).await.unwrap_err().is_not_found());

        let traversal = DocumentId::new("../secrets");
        assert!(store.get(&traversal).await.unwrap_err().is_not_found());

        let err = store
            .update(&missing, &DocumentPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_by_owner() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.list("alice").await.unwrap().is_empty());

        let a = store.create("alice", "A", "\"\"").await.unwrap();
        store.create("bob", "B", "\"\"").await.unwrap();

        let listed = store.list("alice").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[0].title, "A");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_updates_all_succeed() {
        let (store, _temp_dir) = create_test_store();
        let store = std::sync::Arc::new(store);
        let created = store.create("alice", "Draft", "\"\"").await.unwrap();
        let payloads = ["\"<p>first</p>\"", "\"<p>second</p>\""];

        for _ in 0..50 {
            let tasks: Vec<_> = payloads
                .iter()
                .map(|payload| {
                    let store = store.clone();
                    let id = created.id.clone();
                    let patch = DocumentPatch {
                        title: None,
                        content: Some(payload.to_string()),
                    };
                    tokio::spawn(async move { store.update(&id, &patch).await })
                })
                .collect();
            for task in tasks {
                task.await.unwrap().unwrap();
            }

            let fetched = store.get(&created.id).await.unwrap();
            assert!(payloads.contains(&fetched.content.as_str()));
        }

        let leftovers = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|ext| ext == "tmp").unwrap_or(false))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_malformed() {
        let (store, _temp_dir) = create_test_store();
        let created = store.create("alice", "Draft", "\"\"").await.unwrap();
        let path = store.root().join(format!("{}.json", created.id));
        std::fs::write(&path, "not json").unwrap();

        let err = store.get(&created.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
        assert!(store.list("alice").await.unwrap().is_empty());
    }
}
