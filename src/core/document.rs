//! Document model and stored content payload

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque document identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The document currently open in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Store identifier, absent until the store has accepted the document
    pub id: Option<DocumentId>,
    /// Short label shown in the document picker
    pub title: String,
    /// Serialized rich-text markup
    pub content: String,
}

impl Document {
    /// Build a document from a stored row, decoding its content payload
    pub fn from_stored(stored: StoredDocument) -> Result<Self, serde_json::Error> {
        let content = decode_content(&stored.content)?;
        Ok(Self {
            id: Some(stored.id),
            title: stored.title,
            content,
        })
    }

    /// Display title, falling back to a placeholder for blank titles
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled Document"
        } else {
            &self.title
        }
    }
}

/// A document row as held by the store, content still encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub title: String,
    /// JSON-encoded markup string
    #[serde(default)]
    pub content: String,
}

/// Picker entry for one of the owner's documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update sent on save
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Encode markup into the stored payload (a JSON string literal)
pub fn encode_content(markup: &str) -> String {
    serde_json::Value::String(markup.to_string()).to_string()
}

/// Decode a stored payload back into markup
///
/// Empty payloads decode to empty markup; anything that is not a JSON
/// string is rejected.
pub fn decode_content(payload: &str) -> Result<String, serde_json::Error> {
    if payload.trim().is_empty() {
        return Ok(String::new());
    }
    serde_json::from_str::<String>(payload)
}
