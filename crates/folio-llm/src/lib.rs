//! Folio Model Provider Layer
//!
//! Implementations of the `ChatModel` and `EmbeddingModel` traits from
//! `folio-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic chat responses for testing
//! - `MockEmbeddingModel`: deterministic word-hashing embeddings for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions and embeddings
//!
//! Both traits are synchronous; async callers run them on tokio's blocking
//! pool and apply their own timeout.
//!
//! # Examples
//!
//! ```
//! use folio_llm::MockProvider;
//! use folio_domain::traits::ChatModel;
//! use folio_domain::{ChatRequest, Message};
//!
//! let provider = MockProvider::new("Hello from the agent!");
//! let request = ChatRequest {
//!     model: "gpt-4o-mini".to_string(),
//!     temperature: 0.3,
//!     system_prompt: "Be nice.".to_string(),
//!     messages: vec![Message::user("hi")],
//! };
//! assert_eq!(provider.complete(&request).unwrap(), "Hello from the agent!");
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod openai;

use thiserror::Error;

pub use mock::{MockEmbeddingModel, MockProvider};
pub use openai::OpenAiProvider;

/// Errors that can occur during model or embedding calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfigured (missing key, bad endpoint)
    #[error("Provider configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}
