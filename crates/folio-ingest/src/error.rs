//! Error types for knowledge ingestion

use thiserror::Error;

/// Errors that can occur while ingesting or retrieving knowledge
#[derive(Error, Debug)]
pub enum IngestError {
    /// Document URL answered with a non-success status
    #[error("Fetch failed for {url}: HTTP {status}")]
    Fetch {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Document URL could not be reached
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed {
        /// Requested URL
        url: String,
        /// Transport failure
        reason: String,
    },

    /// Document exceeds the configured size limit
    #[error("Document too large: {0} bytes (max: {1})")]
    TooLarge(usize, usize),

    /// Whole document unreadable
    #[error("Unreadable document: {0}")]
    Document(String),

    /// Document yielded no text at all
    #[error("Document contains no extractable text")]
    EmptyDocument,

    /// Embedding provider failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Chunk store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Unknown knowledge source
    #[error("Knowledge source not found: {0}")]
    SourceNotFound(String),

    /// Background task failed to complete
    #[error("Task join error: {0}")]
    Join(String),
}

impl IngestError {
    /// True when the failure happened before any chunk write was attempted
    pub fn is_fetch(&self) -> bool {
        matches!(self, IngestError::Fetch { .. } | IngestError::FetchFailed { .. })
    }
}
