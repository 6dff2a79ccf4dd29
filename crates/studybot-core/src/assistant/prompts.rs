//! Pre-written quick prompts offered by the chat widget.

use super::topic::TopicKey;

const GENERAL: &[&str] = &[
    "Where should I start?",
    "Explain this topic simply",
    "Give me a practice exercise",
];

const BY_TOPIC: &[(&str, &[&str])] = &[
    (
        "javascript",
        &["What is a closure?", "How does the event loop work?", "When should I use async/await?"],
    ),
    (
        "python",
        &["What is a list comprehension?", "How do decorators work?", "What is a generator?"],
    ),
    (
        "react",
        &["When does a component re-render?", "How do I clean up an effect?", "Why do lists need keys?"],
    ),
    ("css", &["Flexbox or Grid?", "How does specificity work?"]),
    ("sql", &["What is the difference between joins?", "When should I add an index?"]),
    ("rust", &["What is ownership?", "How does the borrow checker work?"]),
];

/// Quick prompts for `topic`; the general set when the topic has none.
pub fn quick_prompts(topic: &TopicKey) -> &'static [&'static str] {
    BY_TOPIC
        .iter()
        .find(|(key, _)| *key == topic.as_str())
        .map(|(_, prompts)| *prompts)
        .unwrap_or(GENERAL)
}
