//! Session state types shared with rendering collaborators.

use super::message::ChatMessage;
use crate::assistant::{ProviderLabel, TopicKey};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a reply is currently being revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    #[default]
    Idle,
    Streaming,
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Empty or whitespace-only text.
    EmptyInput,
    /// A reply is still being revealed.
    StreamInProgress,
    /// Quick prompt index out of range.
    UnknownPrompt,
}

/// Result of a submission. Rejections leave the session untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted {
        /// Id of the assistant message that is being revealed.
        reply_id: Uuid,
        provider: ProviderLabel,
        topic: TopicKey,
    },
    Rejected(RejectReason),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Read-only view of a session after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    pub stream_state: StreamState,
    pub unread: bool,
    pub provider: ProviderLabel,
    pub topic: TopicKey,
}

impl SessionSnapshot {
    pub fn is_streaming(&self) -> bool {
        self.stream_state == StreamState::Streaming
    }

    /// The most recent assistant message, if any.
    pub fn last_assistant(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
