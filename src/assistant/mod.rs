//! AI writing assistant chat
//!
//! The assistant sees the document's plain text plus the user's request and
//! answers with text that can be inserted back into the document.

pub mod client;

use std::sync::Arc;

pub use client::{AssistantClient, AssistantError, FunctionClient, UnconfiguredAssistant};

use crate::core::notification::Notification;

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Prompt sent to the assistant for `request` about `document_text`
pub fn build_prompt(document_text: &str, request: &str) -> String {
    format!(
        "You are an AI research assistant helping a user write a document. \
         The current content of the document is:\n\n---\n{}\n---\n\n\
         Respond to the following request: {}",
        document_text.trim(),
        request.trim()
    )
}

/// Outstanding assistant request
pub struct PendingReply {
    client: Arc<dyn AssistantClient>,
    prompt: String,
}

/// Result of an assistant request
#[derive(Debug)]
pub struct ReplyFinished {
    result: Result<String, AssistantError>,
}

impl PendingReply {
    pub async fn run(self) -> ReplyFinished {
        ReplyFinished {
            result: self.client.complete(&self.prompt).await,
        }
    }
}

/// Chat log and input box state
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    /// Text in the input box
    pub input: String,
    pending: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Prepare the input box to ask about the selected text
    pub fn ask_about(&mut self, selection: &str) -> Notification {
        if selection.is_empty() {
            self.input.clear();
        } else {
            self.input = format!("Regarding the selected text: \"{}\", ", selection);
        }
        Notification::info(
            "Ready to Assist!",
            "Ask a question about your selected text in the AI Assistant panel.",
        )
    }

    /// Move the input into the log and build the request
    ///
    /// Returns `None` for blank input or while a reply is outstanding.
    pub fn begin_send(
        &mut self,
        document_text: &str,
        client: Arc<dyn AssistantClient>,
    ) -> Option<PendingReply> {
        if self.pending || self.input.trim().is_empty() {
            return None;
        }

        let request = std::mem::take(&mut self.input);
        let prompt = build_prompt(document_text, &request);
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: request,
        });
        self.pending = true;
        Some(PendingReply { client, prompt })
    }

    /// Record the reply; returns a notification when the request failed
    pub fn finish_send(&mut self, done: ReplyFinished) -> Option<Notification> {
        self.pending = false;
        match done.result {
            Ok(text) => {
                self.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: text,
                });
                None
            }
            Err(e) => {
                tracing::warn!("Assistant request failed: {}", e);
                Some(Notification::error("AI Chat Error", e.to_string()))
            }
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
