//! Editor error types

use thiserror::Error;

use super::document::DocumentId;
use crate::store::StoreError;

/// Failures of editor operations
///
/// Each one is reported to the user as a single notification; none of them
/// leaves the controller unusable.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The store rejected the request or could not be reached
    #[error(transparent)]
    Store(StoreError),

    /// The requested document does not exist
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    /// Save was requested before any document was created or loaded
    #[error("No document is open")]
    NoActiveDocument,

    /// The stored content payload could not be decoded
    #[error("Could not read document content: {0}")]
    Payload(String),
}

impl From<StoreError> for EditorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => EditorError::NotFound(id),
            other => EditorError::Store(other),
        }
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::Payload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: EditorError = StoreError::NotFound {
            id: DocumentId::new("missing"),
        }
        .into();
        assert!(matches!(err, EditorError::NotFound(ref id) if id.as_str() == "missing"));
        assert_eq!(err.to_string(), "Document not found: missing");
    }

    #[test]
    fn test_transport_errors_stay_store_errors() {
        let err: EditorError = StoreError::Transport("connection refused".into()).into();
        assert!(matches!(err, EditorError::Store(StoreError::Transport(_))));
    }
}
