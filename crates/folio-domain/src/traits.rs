//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the core and infrastructure.
//! Implementations live in `folio-store` (persistence) and `folio-llm`
//! (model providers).

use crate::{
    AgentConfig, ChatRequest, KnowledgeChunk, KnowledgeSource, LeadRecord, NewChunk, NewLead,
    SourceStatus, TelemetryEvent,
};

/// Chat completion provider
pub trait ChatModel {
    /// Error type for model calls
    type Error;

    /// Run one completion and return the raw model text
    fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error>;
}

/// Text embedding provider
///
/// Callers must not assume a particular vector dimensionality.
pub trait EmbeddingModel {
    /// Error type for embedding calls
    type Error;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Embed several texts; providers with batch endpoints override this
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Storage for knowledge chunks
pub trait ChunkStore {
    /// Error type for store operations
    type Error;

    /// Replace every chunk of `source_id` with `chunks` in one atomic step
    fn replace_source_chunks(&mut self, source_id: &str, chunks: Vec<NewChunk>)
        -> Result<usize, Self::Error>;

    /// All chunks of a source, by ordinal
    fn source_chunks(&self, source_id: &str) -> Result<Vec<KnowledgeChunk>, Self::Error>;

    /// All chunks belonging to a portfolio's sources, in insertion order
    fn portfolio_chunks(&self, portfolio_id: &str) -> Result<Vec<KnowledgeChunk>, Self::Error>;
}

/// Registry of uploaded knowledge sources
pub trait SourceCatalog {
    /// Error type for catalog operations
    type Error;

    /// Look up a source
    fn get_source(&self, source_id: &str) -> Result<Option<KnowledgeSource>, Self::Error>;

    /// Record a processing state change
    fn set_source_status(
        &mut self,
        source_id: &str,
        status: SourceStatus,
        error: Option<&str>,
        chunk_count: Option<usize>,
    ) -> Result<(), Self::Error>;
}

/// Lead persistence collaborator
pub trait LeadStore {
    /// Error type for lead operations
    type Error;

    /// Persist a lead; at most one lead exists per (portfolio, session key)
    fn create_lead(&mut self, lead: NewLead) -> Result<LeadRecord, Self::Error>;

    /// Lead already captured for this session, if any
    fn find_lead_by_session(
        &self,
        portfolio_id: &str,
        session_key: &str,
    ) -> Result<Option<LeadRecord>, Self::Error>;
}

/// Append-only telemetry log
pub trait TelemetryLog {
    /// Error type for log operations
    type Error;

    /// Append an event
    fn record_event(&mut self, event: &TelemetryEvent) -> Result<(), Self::Error>;

    /// Events with `timestamp >= since`, oldest first
    fn events_since(&self, since: u64) -> Result<Vec<TelemetryEvent>, Self::Error>;
}

/// Agent lookup collaborator
pub trait AgentDirectory {
    /// Error type for lookups
    type Error;

    /// Find an agent by id
    fn find_agent_by_id(&self, agent_id: &str) -> Result<Option<AgentConfig>, Self::Error>;

    /// Find an agent by public handle
    fn find_agent_by_handle(&self, handle: &str) -> Result<Option<AgentConfig>, Self::Error>;
}
