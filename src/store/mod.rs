//! Remote document store
//!
//! The editor talks to persistence only through [`DocumentStore`]. Access
//! control is the store's business: every call is scoped by the owner the
//! backend authenticates, and the editor never checks ownership itself.

pub mod local;
pub mod memory;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::{AppConfig, StoreConfig};
use crate::core::document::{DocumentId, DocumentPatch, DocumentSummary, StoredDocument};

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use remote::RestStore;

/// Failures reported by a document store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No document with this id
    #[error("Document not found: {id}")]
    NotFound { id: DocumentId },

    /// The backend refused the request (validation, constraint, HTTP status)
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The backend answered with something unreadable
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn not_found(id: &DocumentId) -> Self {
        Self::NotFound { id: id.clone() }
    }

    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Open the store described by the configuration
pub fn connect(config: &StoreConfig) -> Arc<dyn DocumentStore> {
    let store: Arc<dyn DocumentStore> = match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Local { dir } => Arc::new(LocalStore::new(
            dir.clone().unwrap_or_else(AppConfig::default_documents_dir),
        )),
        StoreConfig::Remote {
            url,
            api_key,
            access_token,
            table,
        } => {
            let mut store = RestStore::new(url.as_str(), api_key.as_str()).with_table(table.as_str());
            if let Some(token) = access_token {
                store = store.with_access_token(token.as_str());
            }
            Arc::new(store)
        }
    };
    tracing::info!("Using {}", store.describe());
    store
}

/// Create/read/update access to documents by opaque id
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return the stored row, including its new id
    async fn create(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
    ) -> Result<StoredDocument, StoreError>;

    /// Fetch a document by id
    async fn get(&self, id: &DocumentId) -> Result<StoredDocument, StoreError>;

    /// Apply a partial update; fails with `NotFound` for unknown ids
    async fn update(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<(), StoreError>;

    /// List the owner's documents, most recently updated first
    async fn list(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, StoreError>;

    /// Short human-readable description for logs and the status bar
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_connect_picks_backend() {
        assert_eq!(connect(&StoreConfig::Memory).describe(), "in-memory store");

        let local = connect(&StoreConfig::Local {
            dir: Some(PathBuf::from("/tmp/aira-docs")),
        });
        assert_eq!(local.describe(), "local folder /tmp/aira-docs");

        let remote = connect(&StoreConfig::Remote {
            url: "https://x.supabase.co".to_string(),
            api_key: "anon".to_string(),
            access_token: None,
            table: "documents".to_string(),
        });
        assert_eq!(
            remote.describe(),
            "remote table https://x.supabase.co/rest/v1/documents"
        );
    }
}
