//! Deterministic answer selection.

use super::corpus::ResponseCorpus;
use super::topic::TopicKey;
use std::sync::Arc;

/// 32-bit rolling hash over the UTF-16 code units of `text`
/// (`hash = hash * 31 + unit`, wrapping on overflow).
pub fn question_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Index into a list of `len` entries for `text`. `len` must be non-zero.
pub fn select_index(text: &str, len: usize) -> usize {
    // unsigned_abs keeps i32::MIN representable.
    question_hash(text).unsigned_abs() as usize % len
}

/// Picks a canned answer for a question. Same inputs, same answer.
#[derive(Debug, Clone)]
pub struct DeterministicSelector {
    corpus: Arc<ResponseCorpus>,
}

impl DeterministicSelector {
    pub fn new(corpus: Arc<ResponseCorpus>) -> Self {
        Self { corpus }
    }

    /// Returns the answer for `question` within `topic`'s corpus list.
    pub fn select(&self, topic: &TopicKey, question: &str) -> &str {
        let answers = self.corpus.lookup(topic);
        &answers[select_index(question, answers.len())]
    }

    pub fn corpus(&self) -> &ResponseCorpus {
        &self.corpus
    }
}
