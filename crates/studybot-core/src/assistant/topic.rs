//! Topic keys and resolution of the raw navigation context.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known topic keys, i.e. the keys the built-in corpus and source pool carry.
pub const KNOWN_TOPICS: [&str; 6] = ["javascript", "python", "react", "css", "sql", "rust"];

/// Short names accepted as the leading segment of a context.
const ALIASES: [(&str, &str); 8] = [
    ("js", "javascript"),
    ("ts", "javascript"),
    ("typescript", "javascript"),
    ("py", "python"),
    ("reactjs", "react"),
    ("postgres", "sql"),
    ("databases", "sql"),
    ("rs", "rust"),
];

/// Normalized identifier selecting which corpus list and source pool apply.
///
/// Serialized as a bare string: the key itself, or `"none"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(into = "String", from = "String")]
pub enum TopicKey {
    /// A recognized topic.
    Known(String),
    /// No topic recognized; default lists apply.
    #[default]
    None,
}

impl TopicKey {
    pub fn known(key: impl Into<String>) -> Self {
        Self::Known(key.into())
    }

    /// The key string, or `"none"`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(key) => key,
            Self::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<TopicKey> for String {
    fn from(topic: TopicKey) -> Self {
        match topic {
            TopicKey::Known(key) => key,
            TopicKey::None => "none".to_string(),
        }
    }
}

impl From<String> for TopicKey {
    fn from(key: String) -> Self {
        if key == "none" {
            TopicKey::None
        } else {
            TopicKey::Known(key)
        }
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps raw navigation contexts (`"/topics/javascript/closures"`,
/// `"Python-Basics"`, `""`) onto a fixed set of topic keys.
#[derive(Debug, Clone)]
pub struct TopicContextResolver {
    keys: Vec<String>,
}

impl Default for TopicContextResolver {
    fn default() -> Self {
        Self::new(KNOWN_TOPICS.iter().map(|key| key.to_string()))
    }
}

impl TopicContextResolver {
    /// Creates a resolver over the given keys. Keys are matched lowercase.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        let mut keys: Vec<String> = keys.into_iter().map(|k| k.to_lowercase()).collect();
        // Longest first, so "javascript" beats a hypothetical "java".
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keys.dedup();
        Self { keys }
    }

    /// Resolves a raw context string. Total: unknown input yields `TopicKey::None`.
    pub fn resolve(&self, raw_context: &str) -> TopicKey {
        let normalized = normalize(raw_context);
        if normalized.is_empty() {
            return TopicKey::None;
        }

        if let Some(key) = self.keys.iter().find(|key| matches_key(&normalized, key)) {
            return TopicKey::known(key.clone());
        }

        let leading = normalized
            .split(|c: char| !c.is_ascii_alphanumeric())
            .next()
            .unwrap_or_default();
        ALIASES
            .iter()
            .find(|(alias, target)| {
                *alias == leading && self.keys.iter().any(|k| k.as_str() == *target)
            })
            .map(|(_, target)| TopicKey::known(*target))
            .unwrap_or(TopicKey::None)
    }
}

fn normalize(raw_context: &str) -> String {
    let lowered = raw_context.trim().to_lowercase();
    let trimmed = lowered.trim_start_matches('/');
    let stripped = trimmed
        .strip_prefix("topics/")
        .or_else(|| trimmed.strip_prefix("topic/"))
        .unwrap_or(trimmed);
    stripped.to_string()
}

fn matches_key(context: &str, key: &str) -> bool {
    match context.strip_prefix(key) {
        Some("") => true,
        Some(rest) => rest
            .chars()
            .next()
            .is_some_and(|c| !c.is_ascii_alphanumeric()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let resolver = TopicContextResolver::default();
        assert_eq!(resolver.resolve("javascript"), TopicKey::known("javascript"));
        assert_eq!(resolver.resolve("  SQL "), TopicKey::known("sql"));
    }

    #[test]
    fn test_prefix_match_with_boundary() {
        let resolver = TopicContextResolver::default();
        assert_eq!(
            resolver.resolve("/topics/javascript/closures"),
            TopicKey::known("javascript")
        );
        assert_eq!(resolver.resolve("python-basics"), TopicKey::known("python"));
        assert_eq!(resolver.resolve("/topic/react"), TopicKey::known("react"));
        // No boundary after the key
        assert_eq!(resolver.resolve("rustacean"), TopicKey::None);
    }

    #[test]
    fn test_alias_match() {
        let resolver = TopicContextResolver::default();
        assert_eq!(resolver.resolve("/topics/js/arrays"), TopicKey::known("javascript"));
        assert_eq!(resolver.resolve("postgres"), TopicKey::known("sql"));
    }

    #[test]
    fn test_unknown_and_empty_resolve_to_none() {
        let resolver = TopicContextResolver::default();
        assert_eq!(resolver.resolve(""), TopicKey::None);
        assert_eq!(resolver.resolve("/"), TopicKey::None);
        assert_eq!(resolver.resolve("/admin/analytics"), TopicKey::None);
        assert_eq!(resolver.resolve("/topics/haskell"), TopicKey::None);
    }

    #[test]
    fn test_longest_key_wins() {
        let resolver = TopicContextResolver::new(vec!["java".to_string(), "javascript".to_string()]);
        assert_eq!(resolver.resolve("javascript/dom"), TopicKey::known("javascript"));
        assert_eq!(resolver.resolve("java/streams"), TopicKey::known("java"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        assert_eq!(
            serde_json::to_string(&TopicKey::known("javascript")).unwrap(),
            "\"javascript\""
        );
        assert_eq!(serde_json::to_string(&TopicKey::None).unwrap(), "\"none\"");
        let parsed: TopicKey = serde_json::from_str("\"sql\"").unwrap();
        assert_eq!(parsed, TopicKey::known("sql"));
        let parsed: TopicKey = serde_json::from_str("\"none\"").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(TopicKey::None.to_string(), "none");
        assert_eq!(TopicKey::known("css").to_string(), "css");
    }
}
