//! Knowledge source processing pipeline
//!
//! Drives one uploaded source through fetch, extraction and indexing while
//! keeping its catalog status current: `processing` while running, then
//! `ready` with the chunk count or `failed` with the error.

use crate::error::IngestError;
use crate::extract::DocumentExtractor;
use crate::index::KnowledgeIndex;
use folio_domain::traits::{ChunkStore, EmbeddingModel, SourceCatalog};
use folio_domain::{KnowledgeSource, SourceStatus};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{info, warn};

/// Result reported back to the processing trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Whether the source is now ready
    pub success: bool,
    /// Chunks stored on success
    pub chunk_count: Option<usize>,
    /// Failure description on failure
    pub error: Option<String>,
}

impl ProcessOutcome {
    fn ready(chunk_count: usize) -> Self {
        Self {
            success: true,
            chunk_count: Some(chunk_count),
            error: None,
        }
    }

    fn failed(error: &IngestError) -> Self {
        Self {
            success: false,
            chunk_count: None,
            error: Some(error.to_string()),
        }
    }
}

/// Runs the extraction and indexing pipeline for knowledge sources
pub struct KnowledgeProcessor<S, E: ?Sized> {
    index: Arc<KnowledgeIndex<S, E>>,
    extractor: DocumentExtractor,
}

impl<S, E> KnowledgeProcessor<S, E>
where
    S: ChunkStore + SourceCatalog + Send + 'static,
    <S as ChunkStore>::Error: Display,
    <S as SourceCatalog>::Error: Display,
    E: EmbeddingModel + Send + Sync + ?Sized + 'static,
    E::Error: Display,
{
    /// Create a new processor
    pub fn new(index: Arc<KnowledgeIndex<S, E>>, extractor: DocumentExtractor) -> Self {
        Self { index, extractor }
    }

    /// Process a knowledge source end to end
    ///
    /// Pipeline failures are recorded on the source and reported as an
    /// unsuccessful outcome. Only an unknown source or a failing catalog is
    /// returned as an error.
    pub async fn process(&self, source_id: &str) -> Result<ProcessOutcome, IngestError> {
        let source = self
            .lookup(source_id)?
            .ok_or_else(|| IngestError::SourceNotFound(source_id.to_string()))?;

        self.set_status(source_id, SourceStatus::Processing, None, None)?;
        info!("Processing {} knowledge source {}", source.kind.as_str(), source_id);

        match self.run(&source).await {
            Ok(chunk_count) => {
                self.set_status(source_id, SourceStatus::Ready, None, Some(chunk_count))?;
                info!("Knowledge source {} ready with {} chunks", source_id, chunk_count);
                Ok(ProcessOutcome::ready(chunk_count))
            }
            Err(e) => {
                if e.is_fetch() {
                    warn!("Fetch failed for source {}, existing chunks kept: {}", source_id, e);
                } else {
                    warn!("Processing failed for source {}: {}", source_id, e);
                }
                let message = e.to_string();
                self.set_status(source_id, SourceStatus::Failed, Some(&message), None)?;
                Ok(ProcessOutcome::failed(&e))
            }
        }
    }

    async fn run(&self, source: &KnowledgeSource) -> Result<usize, IngestError> {
        let document = self
            .extractor
            .extract_from_url(&source.location, source.kind)
            .await?;
        if document.text.trim().is_empty() {
            return Err(IngestError::EmptyDocument);
        }
        info!(
            "Extracted {} pages from source {}",
            document.page_count, source.id
        );

        let index = Arc::clone(&self.index);
        let source_id = source.id.clone();
        tokio::task::spawn_blocking(move || index.ingest(&source_id, &document.text))
            .await
            .map_err(|e| IngestError::Join(e.to_string()))?
    }

    fn lookup(&self, source_id: &str) -> Result<Option<KnowledgeSource>, IngestError> {
        let store = self
            .index
            .store()
            .lock()
            .map_err(|e| IngestError::Store(format!("Store lock error: {}", e)))?;
        store
            .get_source(source_id)
            .map_err(|e| IngestError::Store(e.to_string()))
    }

    fn set_status(
        &self,
        source_id: &str,
        status: SourceStatus,
        error: Option<&str>,
        chunk_count: Option<usize>,
    ) -> Result<(), IngestError> {
        let mut store = self
            .index
            .store()
            .lock()
            .map_err(|e| IngestError::Store(format!("Store lock error: {}", e)))?;
        store
            .set_source_status(source_id, status, error, chunk_count)
            .map_err(|e| IngestError::Store(e.to_string()))
    }
}
