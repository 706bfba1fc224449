//! Knowledge sources and chunks

use crate::RecordId;

/// Kind of uploaded knowledge document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// PDF document
    Pdf,
    /// Plain UTF-8 text
    Text,
}

impl SourceKind {
    /// Storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Pdf => "pdf",
            SourceKind::Text => "text",
        }
    }

    /// Parse a storage name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "text" | "txt" => Some(SourceKind::Text),
            _ => None,
        }
    }
}

/// Processing state of a knowledge source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceStatus {
    /// Uploaded, never processed
    Pending,
    /// Extraction or ingestion in progress
    Processing,
    /// Chunks are available for retrieval
    Ready,
    /// Last processing attempt failed
    Failed,
}

impl SourceStatus {
    /// Storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Pending => "pending",
            SourceStatus::Processing => "processing",
            SourceStatus::Ready => "ready",
            SourceStatus::Failed => "failed",
        }
    }

    /// Parse a storage name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SourceStatus::Pending),
            "processing" => Some(SourceStatus::Processing),
            "ready" => Some(SourceStatus::Ready),
            "failed" => Some(SourceStatus::Failed),
            _ => None,
        }
    }
}

/// An uploaded document owned by a portfolio
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeSource {
    /// Source identifier
    pub id: String,
    /// Owning portfolio
    pub portfolio_id: String,
    /// Document kind
    pub kind: SourceKind,
    /// URL the document bytes can be fetched from
    pub location: String,
    /// Processing state
    pub status: SourceStatus,
    /// Last processing error, if any
    pub last_error: Option<String>,
    /// Number of chunks from the last successful ingestion
    pub chunk_count: usize,
}

/// A stored retrieval unit
///
/// Chunks are created during ingestion and never mutated; re-ingesting a
/// source replaces its whole chunk set.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeChunk {
    /// Chunk identifier
    pub id: RecordId,
    /// Owning source
    pub source_id: String,
    /// Position of the chunk within its source (0-based)
    pub ordinal: usize,
    /// Chunk text
    pub text: String,
    /// Embedding vector; dimensionality is whatever the embedding model yields
    pub embedding: Vec<f32>,
}

/// A chunk ready to be written, before the store assigns its identity
#[derive(Debug, Clone, PartialEq)]
pub struct NewChunk {
    /// Position within the source
    pub ordinal: usize,
    /// Chunk text
    pub text: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
}
