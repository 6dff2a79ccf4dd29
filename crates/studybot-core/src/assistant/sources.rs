//! Suggested reference sources attached to replies.

use super::topic::TopicKey;
use crate::config::SourceLimits;
use crate::session::SourceRef;

/// Tag for entries used when a topic has no dedicated references.
pub const GENERAL_TAG: &str = "general";

const POOL: &[(&str, &str, &str)] = &[
    ("javascript", "/topics/javascript/closures", "Closures and Scope"),
    ("javascript", "/topics/javascript/async", "Promises and async/await"),
    ("javascript", "/topics/javascript/event-loop", "The Event Loop"),
    ("javascript", "/quizzes/javascript", "JavaScript Quiz"),
    ("python", "/topics/python/comprehensions", "Comprehensions"),
    ("python", "/topics/python/decorators", "Decorators"),
    ("python", "/topics/python/generators", "Generators"),
    ("python", "/quizzes/python", "Python Quiz"),
    ("react", "/topics/react/hooks", "Hooks in Depth"),
    ("react", "/topics/react/state", "Managing State"),
    ("react", "/topics/react/lists", "Lists and Keys"),
    ("css", "/topics/css/flexbox", "Flexbox"),
    ("css", "/topics/css/grid", "CSS Grid"),
    ("css", "/topics/css/specificity", "Specificity"),
    ("sql", "/topics/sql/joins", "Joins Explained"),
    ("sql", "/topics/sql/indexes", "Indexes"),
    ("sql", "/topics/sql/transactions", "Transactions"),
    ("sql", "/quizzes/sql", "SQL Quiz"),
    ("rust", "/topics/rust/ownership", "Ownership"),
    ("rust", "/topics/rust/borrowing", "References and Borrowing"),
    ("rust", "/topics/rust/errors", "Error Handling"),
    (GENERAL_TAG, "/topics", "Topic Library"),
    (GENERAL_TAG, "/quizzes", "All Quizzes"),
    (GENERAL_TAG, "/guides/study-tips", "Study Tips"),
];

/// A topic-tagged reference pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSource {
    pub topic: String,
    pub source: SourceRef,
}

/// Returns a topic's references, truncated by mode. Never looks at message content.
#[derive(Debug, Clone)]
pub struct SourceSuggestionProvider {
    pool: Vec<TaggedSource>,
    limits: SourceLimits,
}

impl Default for SourceSuggestionProvider {
    fn default() -> Self {
        Self::new(SourceLimits::default())
    }
}

impl SourceSuggestionProvider {
    /// Provider over the built-in pool.
    pub fn new(limits: SourceLimits) -> Self {
        let pool = POOL
            .iter()
            .map(|(topic, path, label)| TaggedSource {
                topic: topic.to_string(),
                source: SourceRef::new(*path, *label),
            })
            .collect();
        Self::with_pool(pool, limits)
    }

    pub fn with_pool(pool: Vec<TaggedSource>, limits: SourceLimits) -> Self {
        Self { pool, limits }
    }

    /// Sources for `topic`: at most `limits.primary` entries, or
    /// `limits.fallback` once fallback mode is active.
    pub fn suggest(&self, topic: &TopicKey, fallback_active: bool) -> Vec<SourceRef> {
        let limit = if fallback_active {
            self.limits.fallback
        } else {
            self.limits.primary
        };

        let tagged = self.tagged(topic.as_str());
        if tagged.is_empty() {
            self.tagged(GENERAL_TAG).into_iter().take(limit).collect()
        } else {
            tagged.into_iter().take(limit).collect()
        }
    }

    fn tagged(&self, tag: &str) -> Vec<SourceRef> {
        self.pool
            .iter()
            .filter(|entry| entry.topic == tag)
            .map(|entry| entry.source.clone())
            .collect()
    }
}
