//! Reply selection components.
//!
//! - `corpus`: canned answers per topic (`ResponseCorpus`)
//! - `topic`: navigation context to topic key (`TopicContextResolver`)
//! - `selector`: hash-based answer choice (`DeterministicSelector`)
//! - `provider`: primary/fallback label (`ProviderPolicy`)
//! - `sources`: suggested references (`SourceSuggestionProvider`)
//! - `prompts`: pre-written quick prompts
//! - `composer`: the above bundled into a `ReplyPlan`

mod composer;
mod corpus;
mod prompts;
mod provider;
mod selector;
mod sources;
mod topic;

pub use composer::{ReplyComposer, ReplyPlan};
pub use corpus::ResponseCorpus;
pub use prompts::quick_prompts;
pub use provider::{ProviderLabel, ProviderPolicy};
pub use selector::{DeterministicSelector, question_hash, select_index};
pub use sources::{GENERAL_TAG, SourceSuggestionProvider, TaggedSource};
pub use topic::{KNOWN_TOPICS, TopicContextResolver, TopicKey};
