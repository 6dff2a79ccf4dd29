//! Assembles the pieces of an assistant reply.

use super::corpus::ResponseCorpus;
use super::provider::{ProviderLabel, ProviderPolicy};
use super::selector::DeterministicSelector;
use super::sources::SourceSuggestionProvider;
use super::topic::{TopicContextResolver, TopicKey};
use crate::config::AssistantConfig;
use crate::session::SourceRef;
use std::sync::Arc;

/// Everything decided about a reply before it is revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPlan {
    pub topic: TopicKey,
    pub provider: ProviderLabel,
    /// Full answer text the stream will reveal.
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Read-only bundle of the selection components, shared between sessions.
#[derive(Debug, Clone)]
pub struct ReplyComposer {
    resolver: TopicContextResolver,
    selector: DeterministicSelector,
    policy: ProviderPolicy,
    sources: SourceSuggestionProvider,
}

impl ReplyComposer {
    pub fn new(
        resolver: TopicContextResolver,
        selector: DeterministicSelector,
        policy: ProviderPolicy,
        sources: SourceSuggestionProvider,
    ) -> Self {
        Self {
            resolver,
            selector,
            policy,
            sources,
        }
    }

    /// Built-in corpus and source pool, policy and limits from `config`.
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::with_corpus(Arc::new(ResponseCorpus::builtin()), config)
    }

    /// Custom corpus; the resolver recognizes the corpus' topic keys.
    pub fn with_corpus(corpus: Arc<ResponseCorpus>, config: &AssistantConfig) -> Self {
        let resolver =
            TopicContextResolver::new(corpus.topic_keys().into_iter().map(str::to_string));
        Self::new(
            resolver,
            DeterministicSelector::new(corpus),
            ProviderPolicy::new(config.policy.clone()),
            SourceSuggestionProvider::new(config.sources.clone()),
        )
    }

    pub fn resolve_topic(&self, raw_context: &str) -> TopicKey {
        self.resolver.resolve(raw_context)
    }

    /// Plans the reply to `question`. `prior_messages` counts the session's
    /// messages before the user message is appended.
    pub fn compose(&self, topic: &TopicKey, question: &str, prior_messages: usize) -> ReplyPlan {
        let provider = self.policy.label_for(prior_messages);
        ReplyPlan {
            topic: topic.clone(),
            provider,
            answer: self.selector.select(topic, question).to_string(),
            sources: self.sources.suggest(topic, provider.is_fallback()),
        }
    }

    pub fn policy(&self) -> &ProviderPolicy {
        &self.policy
    }

    pub fn corpus(&self) -> &ResponseCorpus {
        self.selector.corpus()
    }
}

impl Default for ReplyComposer {
    fn default() -> Self {
        Self::from_config(&AssistantConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::selector::select_index;

    #[test]
    fn test_closure_scenario() {
        let composer = ReplyComposer::default();
        let topic = composer.resolve_topic("javascript");
        let plan = composer.compose(&topic, "What is a closure?", 1);

        let answers = composer.corpus().lookup(&topic);
        let index = select_index("What is a closure?", answers.len());
        assert_eq!(plan.answer, answers[index]);
        assert_eq!(plan.provider, ProviderLabel::Primary);
        assert_eq!(plan.sources.len(), 3);
    }

    #[test]
    fn test_fallback_reduces_sources() {
        let composer = ReplyComposer::default();
        let topic = TopicKey::known("sql");
        let plan = composer.compose(&topic, "joins?", 9);
        assert_eq!(plan.provider, ProviderLabel::Fallback);
        assert!(plan.sources.len() <= 2);
    }

    #[test]
    fn test_custom_corpus_drives_resolver() {
        let corpus = ResponseCorpus::from_entries(
            vec![("go".to_string(), vec!["Use channels.".to_string()])],
            vec!["Default.".to_string()],
        )
        .unwrap();
        let composer = ReplyComposer::with_corpus(Arc::new(corpus), &AssistantConfig::default());
        let topic = composer.resolve_topic("/topics/go/channels");
        assert_eq!(topic, TopicKey::known("go"));
        assert_eq!(composer.compose(&topic, "anything", 0).answer, "Use channels.");
        assert_eq!(composer.resolve_topic("javascript"), TopicKey::None);
    }
}
