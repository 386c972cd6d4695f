//! Document store backed by a hosted REST table
//!
//! Speaks the PostgREST dialect used by hosted backend-as-a-service
//! databases: filters go in the query string (`id=eq.<id>`), writes ask for
//! the affected rows back with `Prefer: return=representation`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DocumentStore, StoreError};
use crate::core::document::{DocumentId, DocumentPatch, DocumentSummary, StoredDocument};

const REST_PATH: &str = "rest/v1";
const DEFAULT_TABLE: &str = "documents";

/// REST table client
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    table: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Send requests on behalf of a signed-in user instead of the anonymous key
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// URL of the documents table
    pub fn endpoint(&self) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, self.table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request
            .header("apikey", self.api_key.as_str())
            .bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<Row>, StoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("{} request failed: {}", self.table, e)))?;
        read_rows(response).await
    }
}

async fn read_rows(response: Response) -> Result<Vec<Row>, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(StoreError::Rejected(format!("{}: {}", status, error_message(&body))));
    }

    response
        .json::<Vec<Row>>()
        .await
        .map_err(|e| StoreError::Malformed(e.to_string()))
}

/// Pull the `message` field out of an error body when there is one
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// One table row; columns vary with the `select` list
#[derive(Debug, Deserialize)]
struct Row {
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl Row {
    fn document_id(&self) -> Result<DocumentId, StoreError> {
        match &self.id {
            Value::String(s) => Ok(DocumentId::new(s.clone())),
            Value::Number(n) => Ok(DocumentId::new(n.to_string())),
            other => Err(StoreError::Malformed(format!("unexpected id: {}", other))),
        }
    }

    fn into_stored(self) -> Result<StoredDocument, StoreError> {
        Ok(StoredDocument {
            id: self.document_id()?,
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
        })
    }

    fn into_summary(self) -> Result<DocumentSummary, StoreError> {
        Ok(DocumentSummary {
            id: self.document_id()?,
            title: self.title.unwrap_or_default(),
            updated_at: self.updated_at,
        })
    }
}

#[derive(Serialize)]
struct NewRow<'a> {
    user_id: &'a str,
    title: &'a str,
    content: &'a str,
}

fn id_filter(id: &DocumentId) -> (&'static str, String) {
    ("id", format!("eq.{}", id))
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn create(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
    ) -> Result<StoredDocument, StoreError> {
        let body = NewRow {
            user_id: owner_id,
            title,
            content,
        };
        let request = self
            .client
            .post(self.endpoint())
            .header("Prefer", "return=representation")
            .json(&body);

        self.send(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed("insert returned no row".to_string()))?
            .into_stored()
    }

    async fn get(&self, id: &DocumentId) -> Result<StoredDocument, StoreError> {
        let request = self
            .client
            .get(self.endpoint())
            .query(&[id_filter(id), ("select", "id,title,content".to_string())]);

        self.send(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(id))?
            .into_stored()
    }

    async fn update(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<(), StoreError> {
        let request = self
            .client
            .patch(self.endpoint())
            .query(&[id_filter(id), ("select", "id".to_string())])
            .header("Prefer", "return=representation")
            .json(patch);

        // PostgREST answers an update that matched nothing with an empty array
        if self.send(request).await?.is_empty() {
            return Err(StoreError::not_found(id));
        }
        Ok(())
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<DocumentSummary>, StoreError> {
        let request = self.client.get(self.endpoint()).query(&[
            ("select", "id,title,updated_at".to_string()),
            ("user_id", format!("eq.{}", owner_id)),
            ("order", "updated_at.desc".to_string()),
        ]);

        self.send(request)
            .await?
            .into_iter()
            .map(Row::into_summary)
            .collect()
    }

    fn describe(&self) -> String {
        format!("remote table {}", self.endpoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let store = RestStore::new("https://example.supabase.co/", "key");
        assert_eq!(store.endpoint(), "https://example.supabase.co/rest/v1/documents");

        let store = store.with_table("drafts");
        assert_eq!(store.endpoint(), "https://example.supabase.co/rest/v1/drafts");
    }

    #[test]
    fn test_row_with_uuid_id() {
        let rows: Vec<Row> = serde_json::from_str(
            r#"[{"id": "3f1c", "title": "Draft", "content": "\"<p>x</p>\"", "user_id": "u1"}]"#,
        )
        .unwrap();
        let stored = rows.into_iter().next().unwrap().into_stored().unwrap();
        assert_eq!(stored.id, DocumentId::new("3f1c"));
        assert_eq!(stored.content, "\"<p>x</p>\"");
    }

    #[test]
    fn test_summary_row_with_numeric_id_and_timestamp() {
        let rows: Vec<Row> = serde_json::from_str(
            r#"[{"id": 42, "title": "Notes", "updated_at": "2024-05-01T10:00:00.123456+00:00"}]"#,
        )
        .unwrap();
        let summary = rows.into_iter().next().unwrap().into_summary().unwrap();
        assert_eq!(summary.id, DocumentId::new("42"));
        assert!(summary.updated_at.is_some());
    }

    #[test]
    fn test_null_content_reads_as_empty() {
        let rows: Vec<Row> =
            serde_json::from_str(r#"[{"id": "a", "title": null, "content": null}]"#).unwrap();
        let stored = rows.into_iter().next().unwrap().into_stored().unwrap();
        assert_eq!(stored.title, "");
        assert_eq!(stored.content, "");
    }

    #[test]
    fn test_error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"code":"23505","message":"duplicate key"}"#),
            "duplicate key"
        );
        assert_eq!(error_message(" plain failure \n"), "plain failure");
    }
}
