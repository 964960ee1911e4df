//! # AI Chat
//!
//! The assistant collaborator. Each request carries a system message with
//! the document's title and (truncated) plain text followed by the user's
//! message; the backend answers with a reply and a conversation id that is
//! passed back on the next request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scribe_document::{plain_text, Document};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters of document text included in the chat context
pub const DEFAULT_CONTEXT_LIMIT: usize = 1000;

const SYSTEM_PREFIX: &str =
    "You are an AI assistant helping with document editing. Here's the current document context: ";
const EMPTY_CONTEXT: &str = "No document content available.";
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";
const MOCK_REPLY: &str = "I'm a mock AI assistant. Your actual AI integration would go here.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub conversation_id: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Chat message is empty")]
    EmptyMessage,

    #[error("Chat backend failed: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(
        &self,
        messages: &[ChatMessage],
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, ChatError>;
}

/// Canned backend that answers every request the same way
#[derive(Debug, Default, Clone, Copy)]
pub struct MockChatBackend;

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn send(
        &self,
        messages: &[ChatMessage],
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        if messages.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let conversation_id = match conversation_id {
            Some(id) => id.to_string(),
            None => format!("conv_{}", Utc::now().timestamp_millis()),
        };
        Ok(ChatReply {
            response: MOCK_REPLY.to_string(),
            conversation_id,
        })
    }
}

/// Describe the document for the system message
pub fn document_context(title: &str, document: &Document, limit: usize) -> String {
    let text = plain_text(document);
    if text.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }

    let mut excerpt: String = text.chars().take(limit).collect();
    if text.chars().count() > limit {
        excerpt.push_str("...");
    }
    format!("Document context: \"{}\"\n\nContent: {}", title, excerpt)
}

/// The request for one user message: system context, then the message
pub fn build_messages(context: &str, input: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(ChatRole::System, format!("{}{}", SYSTEM_PREFIX, context)),
        ChatMessage::new(ChatRole::User, input),
    ]
}

/// Canned prompts offered next to the chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickAction {
    Summarize,
    Improve,
    Grammar,
    Expand,
}

impl QuickAction {
    pub const ALL: [QuickAction; 4] = [
        QuickAction::Summarize,
        QuickAction::Improve,
        QuickAction::Grammar,
        QuickAction::Expand,
    ];

    pub fn prompt(self) -> &'static str {
        match self {
            QuickAction::Summarize => "Please summarize this document in 3-4 sentences.",
            QuickAction::Improve => {
                "Please suggest improvements to make this document clearer and more engaging."
            }
            QuickAction::Grammar => "Please check this document for grammar and spelling errors.",
            QuickAction::Expand => {
                "Please suggest ways to expand on the key points in this document."
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuickAction::Summarize => "summarize",
            QuickAction::Improve => "improve",
            QuickAction::Grammar => "grammar",
            QuickAction::Expand => "expand",
        }
    }
}

impl FromStr for QuickAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuickAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("Unknown quick action: {}", s))
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub timestamp: DateTime<Utc>,
}

/// A conversation about one document
#[derive(Debug, Clone, Default)]
pub struct ChatThread {
    transcript: Vec<TranscriptEntry>,
    conversation_id: Option<String>,
}

impl ChatThread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Send `input` with the given document context and record both sides.
    /// On failure the error reply is recorded and the error returned.
    pub async fn ask(
        &mut self,
        backend: &dyn ChatBackend,
        context: &str,
        input: &str,
    ) -> Result<&str, ChatError> {
        if input.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.push(ChatRole::User, input);

        let messages = build_messages(context, input);
        match backend.send(&messages, self.conversation_id.as_deref()).await {
            Ok(reply) => {
                self.conversation_id = Some(reply.conversation_id);
                self.push(ChatRole::Assistant, reply.response);
                Ok(self.last_reply())
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                self.push(ChatRole::Assistant, ERROR_REPLY);
                Err(e)
            }
        }
    }

    fn push(&mut self, role: ChatRole, content: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            message: ChatMessage::new(role, content),
            timestamp: Utc::now(),
        });
    }

    fn last_reply(&self) -> &str {
        self.transcript
            .last()
            .map(|entry| entry.message.content.as_str())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
        self.conversation_id = None;
    }
}
