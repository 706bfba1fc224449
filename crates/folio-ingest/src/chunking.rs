//! Word-bounded text chunking
//!
//! Chunks are anchored at `target_words`. A chunk grows up to `max_words`
//! when stopping at the target would leave a trailing remainder shorter than
//! `min_words`, and the final chunk absorbs whatever remains once it fits
//! under `max_words`. Chunks never overlap, so joining them with single
//! spaces reproduces the whitespace-normalized input.

use crate::config::ChunkingConfig;

/// Splits normalized document text into bounded passages
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk the given text
    pub fn chunk(&self, content: &str) -> Vec<String> {
        let words: Vec<&str> = content.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let max = self.config.max_words.max(1);
        if words.len() <= max {
            return vec![words.join(" ")];
        }

        let target = self.config.target_words.clamp(1, max);
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let remaining = words.len() - start;
            let take = if remaining <= max {
                remaining
            } else if remaining - target < self.config.min_words {
                max
            } else {
                target
            };

            chunks.push(words[start..start + take].join(" "));
            start += take;
        }

        chunks
    }
}

/// Chunk text with the default thresholds (650 / 800 / 500 words)
pub fn chunk_text(content: &str) -> Vec<String> {
    TextChunker::default().chunk(content)
}
