//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`MessageRole`, `ChatMessage`, `SourceRef`)
//! - `state`: Stream state, submission outcomes and renderer snapshots
//!
//! The orchestrator that drives these types lives in `studybot-application`.

mod message;
mod state;

// Re-export public API
pub use message::{ChatMessage, MessageRole, SourceRef};
pub use state::{RejectReason, SessionSnapshot, StreamState, SubmitOutcome};
