//! Embedding-backed knowledge index
//!
//! The index is synchronous: embedding calls block on the provider and the
//! store is reached through a `Mutex`. Async callers run it on tokio's
//! blocking pool.

use crate::chunking::TextChunker;
use crate::error::IngestError;
use folio_domain::traits::{ChunkStore, EmbeddingModel};
use folio_domain::{KnowledgeChunk, NewChunk};
use folio_store::embedding::cosine_similarity;
use std::cmp::Ordering;
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Chunks, embeds, stores and retrieves knowledge
pub struct KnowledgeIndex<S, E: ?Sized> {
    store: Arc<Mutex<S>>,
    embedder: Arc<E>,
    chunker: TextChunker,
}

impl<S, E> KnowledgeIndex<S, E>
where
    S: ChunkStore,
    S::Error: Display,
    E: EmbeddingModel + ?Sized,
    E::Error: Display,
{
    /// Create a new index over a shared store
    pub fn new(store: Arc<Mutex<S>>, embedder: Arc<E>, chunker: TextChunker) -> Self {
        Self {
            store,
            embedder,
            chunker,
        }
    }

    /// The shared store behind this index
    pub fn store(&self) -> &Arc<Mutex<S>> {
        &self.store
    }

    /// Replace the chunks of `source_id` with chunks of `text`
    ///
    /// Every chunk is embedded before the store is touched; the replacement
    /// itself is one store transaction, so a concurrent retrieval sees the
    /// old set or the new set and nothing in between. An embedding failure
    /// leaves the previous chunks in place.
    pub fn ingest(&self, source_id: &str, text: &str) -> Result<usize, IngestError> {
        let texts = self.chunker.chunk(text);
        info!("Ingesting source {} as {} chunks", source_id, texts.len());

        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .map_err(|e| IngestError::Embedding(e.to_string()))?;
        if embeddings.len() != texts.len() {
            return Err(IngestError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        let chunks: Vec<NewChunk> = texts
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(ordinal, (text, embedding))| NewChunk {
                ordinal,
                text,
                embedding,
            })
            .collect();

        let mut store = self
            .store
            .lock()
            .map_err(|e| IngestError::Store(format!("Store lock error: {}", e)))?;
        store
            .replace_source_chunks(source_id, chunks)
            .map_err(|e| IngestError::Store(e.to_string()))
    }

    /// The `top_k` chunks of a portfolio most similar to `query`
    ///
    /// Ranked by cosine similarity, highest first; equal scores keep chunk
    /// insertion order. A portfolio without chunks yields an empty result
    /// and no embedding call is made. Chunks whose vector dimension differs
    /// from the query's are skipped.
    pub fn retrieve(
        &self,
        query: &str,
        portfolio_id: &str,
        top_k: usize,
    ) -> Result<Vec<KnowledgeChunk>, IngestError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let chunks = {
            let store = self
                .store
                .lock()
                .map_err(|e| IngestError::Store(format!("Store lock error: {}", e)))?;
            store
                .portfolio_chunks(portfolio_id)
                .map_err(|e| IngestError::Store(e.to_string()))?
        };
        if chunks.is_empty() {
            debug!("No knowledge chunks for portfolio");
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .map_err(|e| IngestError::Embedding(e.to_string()))?;

        let mut scored: Vec<(f32, KnowledgeChunk)> = chunks
            .into_iter()
            .filter(|chunk| chunk.embedding.len() == query_embedding.len())
            .map(|chunk| (cosine_similarity(&query_embedding, &chunk.embedding), chunk))
            .collect();

        // sort_by is stable, preserving insertion order on ties
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        debug!("Retrieved {} knowledge chunks", scored.len());
        Ok(scored.into_iter().map(|(_, chunk)| chunk).collect())
    }
}
