//! Provider label policy.

use crate::config::PolicyConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider identity reported alongside replies. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderLabel {
    #[default]
    Primary,
    Fallback,
}

impl ProviderLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for ProviderLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Switches to the fallback label once a session's message count exceeds
/// the threshold. Message counts only grow within a session, so the switch
/// happens at most once.
#[derive(Debug, Clone)]
pub struct ProviderPolicy {
    config: PolicyConfig,
}

impl Default for ProviderPolicy {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

impl ProviderPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// `message_count` is the number of messages before the new user message.
    pub fn label_for(&self, message_count: usize) -> ProviderLabel {
        if message_count > self.config.fallback_threshold {
            ProviderLabel::Fallback
        } else {
            ProviderLabel::Primary
        }
    }

    /// Display name configured for `label`.
    pub fn display_name(&self, label: ProviderLabel) -> &str {
        match label {
            ProviderLabel::Primary => &self.config.primary_name,
            ProviderLabel::Fallback => &self.config.fallback_name,
        }
    }

    /// Prior message count above which the fallback label applies.
    pub fn threshold(&self) -> usize {
        self.config.fallback_threshold
    }
}
