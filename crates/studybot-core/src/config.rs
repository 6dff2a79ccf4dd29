//! Engine configuration model.
//!
//! Every field has a default, so an empty `config.toml` (or no file at all)
//! yields the stock behaviour: one character every 12 ms, fallback after 8
//! messages, 3/2 suggested sources.

use crate::error::{Result, StudybotError};
use serde::{Deserialize, Serialize};

/// Root of the TOML configuration file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AssistantConfig {
    pub stream: StreamConfig,
    pub policy: PolicyConfig,
    pub sources: SourceLimits,
    pub texts: SessionTexts,
}

impl AssistantConfig {
    /// Rejects values that would stall the reveal loop or invert the source limits.
    pub fn validate(&self) -> Result<()> {
        if self.stream.tick_ms == 0 {
            return Err(StudybotError::config("stream.tick_ms must be greater than 0"));
        }
        if self.stream.chars_per_tick == 0 {
            return Err(StudybotError::config(
                "stream.chars_per_tick must be greater than 0",
            ));
        }
        if self.sources.fallback > self.sources.primary {
            return Err(StudybotError::config(
                "sources.fallback must not exceed sources.primary",
            ));
        }
        if self.texts.greeting.trim().is_empty() {
            return Err(StudybotError::config("texts.greeting must not be empty"));
        }
        Ok(())
    }
}

/// Timing of the incremental reveal.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StreamConfig {
    /// Milliseconds between two ticks.
    pub tick_ms: u64,
    /// Characters revealed per tick.
    pub chars_per_tick: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_ms: 12,
            chars_per_tick: 1,
        }
    }
}

/// Provider switch-over policy.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfig {
    /// The fallback label is reported once the prior message count exceeds this.
    pub fallback_threshold: usize,
    pub primary_name: String,
    pub fallback_name: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: 8,
            primary_name: "Gemini".to_string(),
            fallback_name: "Groq".to_string(),
        }
    }
}

/// Maximum number of suggested sources per reply.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SourceLimits {
    pub primary: usize,
    pub fallback: usize,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            primary: 3,
            fallback: 2,
        }
    }
}

/// Static texts supplied to every session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionTexts {
    /// First assistant message of a fresh session.
    pub greeting: String,
    /// Message shown after a manual clear. Falls back to `greeting` when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<String>,
}

impl SessionTexts {
    /// Text of the single message left after a reset.
    pub fn reset_text(&self) -> &str {
        self.reset.as_deref().unwrap_or(&self.greeting)
    }
}

impl Default for SessionTexts {
    fn default() -> Self {
        Self {
            greeting: "Hi! I'm your study assistant. Ask me anything about the topic you're reading."
                .to_string(),
            reset: Some("Chat cleared. What would you like to learn next?".to_string()),
        }
    }
}
