//! Error types for reply generation

use std::time::Duration;
use thiserror::Error;

/// Visitor input rejected before any network call
///
/// Display strings are safe to show to the visitor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The visitor message is empty
    #[error("Message cannot be empty")]
    EmptyMessage,

    /// A message is longer than allowed
    #[error("Message is too long ({0} characters, max {1})")]
    MessageTooLong(usize, usize),

    /// Too many history messages
    #[error("Conversation history is too long ({0} messages, max {1})")]
    HistoryTooLong(usize, usize),

    /// History contains a role other than user or assistant
    #[error("Invalid message role: {0}")]
    InvalidRole(String),

    /// The agent is configured with a model that is not offered
    #[error("Model is not supported: {0}")]
    UnsupportedModel(String),
}

/// Model call failures
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The model did not answer in time
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// Provider error (rate limit, non-2xx, transport)
    #[error("Model error: {0}")]
    Model(String),

    /// The model returned no visible reply
    #[error("Model returned an empty reply")]
    EmptyResponse,

    /// Background task failed to complete
    #[error("Task join error: {0}")]
    Join(String),
}
