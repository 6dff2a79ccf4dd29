//! Session orchestration for the Studybot engine.
//!
//! - `scheduler`: timer-driven incremental reveal (`StreamScheduler`)
//! - `session`: the conversation aggregate (`ConversationSession`)

pub mod scheduler;
pub mod session;

pub use scheduler::{StreamId, StreamScheduler};
pub use session::ConversationSession;
