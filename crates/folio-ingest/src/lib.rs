//! Folio Knowledge Ingestion
//!
//! Turns uploaded documents into retrievable knowledge chunks and answers
//! similarity queries over them.
//!
//! # Components
//!
//! - [`TextChunker`]: word-bounded, lossless partition of document text
//! - [`DocumentExtractor`]: plain text from PDF or text bytes, optionally fetched by URL
//! - [`KnowledgeIndex`]: embed, store (replace-all per source) and retrieve chunks
//! - [`KnowledgeProcessor`]: the processing trigger driving a source through
//!   extraction and indexing while keeping its status current
//!
//! # Examples
//!
//! ```
//! use folio_ingest::{ChunkingConfig, TextChunker};
//!
//! let chunker = TextChunker::new(ChunkingConfig::default());
//! let chunks = chunker.chunk("  We design   brand identities.\n");
//! assert_eq!(chunks, vec!["We design brand identities.".to_string()]);
//! ```

#![warn(missing_docs)]

pub mod chunking;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod processor;

pub use chunking::{chunk_text, TextChunker};
pub use config::{ChunkingConfig, IngestConfig};
pub use error::IngestError;
pub use extract::{DocumentExtractor, ExtractedDocument};
pub use index::KnowledgeIndex;
pub use processor::{KnowledgeProcessor, ProcessOutcome};
