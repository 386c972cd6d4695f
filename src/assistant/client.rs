//! Clients for the assistant's remote function

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::AssistantConfig;

/// Failures of an assistant request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssistantError {
    #[error("AI assistant is not configured (set AIRA_FUNCTION_URL)")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Function returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The function ran but reported an error in its payload
    #[error("{0}")]
    Function(String),

    #[error("Malformed reply: {0}")]
    Malformed(String),
}

/// Something that answers a prompt with text
#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AssistantError>;
}

/// Client used when no function endpoint is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredAssistant;

#[async_trait]
impl AssistantClient for UnconfiguredAssistant {
    async fn complete(&self, _prompt: &str) -> Result<String, AssistantError> {
        Err(AssistantError::NotConfigured)
    }
}

/// Serverless function that takes `{"prompt"}` and answers `{"text"}` or `{"error"}`
#[derive(Clone)]
pub struct FunctionClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct FunctionRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct FunctionReply {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl FunctionClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Build a client from configuration, if an endpoint is set
    pub fn from_config(config: &AssistantConfig) -> Option<Self> {
        let url = config.function_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        let client = Self::new(url);
        Some(match &config.api_key {
            Some(key) => client.with_api_key(key.as_str()),
            None => client,
        })
    }
}

fn parse_reply(body: &str) -> Result<String, AssistantError> {
    let reply: FunctionReply =
        serde_json::from_str(body).map_err(|e| AssistantError::Malformed(e.to_string()))?;
    if let Some(error) = reply.error.filter(|e| !e.is_empty()) {
        return Err(AssistantError::Function(error));
    }
    reply
        .text
        .ok_or_else(|| AssistantError::Malformed("reply has no text".to_string()))
}

#[async_trait]
impl AssistantClient for FunctionClient {
    async fn complete(&self, prompt: &str) -> Result<String, AssistantError> {
        let mut request = self.client.post(self.url.as_str()).json(&FunctionRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Request(e.to_string()))?;

        if !status.is_success() {
            tracing::error!("Assistant function returned {}: {}", status, body);
            return Err(AssistantError::Status {
                status: status.as_u16(),
                message: parse_reply(&body)
                    .err()
                    .and_then(|e| match e {
                        AssistantError::Function(message) => Some(message),
                        _ => None,
                    })
                    .unwrap_or_else(|| body.trim().to_string()),
            });
        }
        parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_reply() {
        assert_eq!(parse_reply(r#"{"text": "Here is a summary."}"#).unwrap(), "Here is a summary.");
    }

    #[test]
    fn test_parse_error_reply() {
        assert_eq!(
            parse_reply(r#"{"error": "quota exceeded"}"#).unwrap_err(),
            AssistantError::Function("quota exceeded".to_string())
        );
    }

    #[test]
    fn test_parse_unexpected_reply() {
        assert!(matches!(parse_reply("{}"), Err(AssistantError::Malformed(_))));
        assert!(matches!(parse_reply("oops"), Err(AssistantError::Malformed(_))));
    }

    #[test]
    fn test_from_config_requires_url() {
        assert!(FunctionClient::from_config(&AssistantConfig::default()).is_none());

        let config = AssistantConfig {
            function_url: Some("  ".to_string()),
            api_key: None,
        };
        assert!(FunctionClient::from_config(&config).is_none());

        let config = AssistantConfig {
            function_url: Some("https://x.functions.supabase.co/summarize".to_string()),
            api_key: Some("anon".to_string()),
        };
        let client = FunctionClient::from_config(&config).unwrap();
        assert_eq!(client.api_key.as_deref(), Some("anon"));
    }

    #[tokio::test]
    async fn test_unconfigured_assistant_fails() {
        assert_eq!(
            UnconfiguredAssistant.complete("hi").await,
            Err(AssistantError::NotConfigured)
        );
    }
}
