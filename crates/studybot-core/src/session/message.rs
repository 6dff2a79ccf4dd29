//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles, content and the reference sources attached to replies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the assistant.
    Assistant,
}

/// A reference pointer suggested alongside an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Site-relative path of the referenced page.
    pub path: String,
    /// Human readable label.
    pub label: String,
}

impl SourceRef {
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// A single message in a conversation history.
///
/// User messages are complete when created. Assistant messages start empty
/// and their `content` grows while a reply is being revealed; their `sources`
/// are fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier of the message.
    pub id: Uuid,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Reference sources. Always empty for user messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into(), Vec::new())
    }

    /// Creates a complete assistant message, e.g. the greeting.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content.into(), Vec::new())
    }

    /// Creates an empty assistant message that a stream will fill in.
    pub fn assistant_placeholder(sources: Vec<SourceRef>) -> Self {
        Self::new(MessageRole::Assistant, String::new(), sources)
    }

    fn new(role: MessageRole, content: String, sources: Vec<SourceRef>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            sources,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_has_no_sources() {
        let message = ChatMessage::user("What is a closure?");
        assert!(message.is_user());
        assert!(message.sources.is_empty());
        assert_eq!(message.content, "What is a closure?");
    }

    #[test]
    fn test_placeholder_keeps_sources_and_starts_empty() {
        let sources = vec![SourceRef::new("/topics/javascript", "JavaScript")];
        let message = ChatMessage::assistant_placeholder(sources.clone());
        assert!(message.is_assistant());
        assert!(message.content.is_empty());
        assert_eq!(message.sources, sources);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
