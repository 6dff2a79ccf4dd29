//! Domain types and pure components of the Studybot session engine.
//!
//! Nothing in this crate performs I/O or spawns tasks; timing and
//! orchestration live in `studybot-application`.

pub mod assistant;
pub mod config;
pub mod error;
pub mod session;

// Re-export common error type
pub use error::{Result, StudybotError};
