//! Configuration for chunking and document ingestion

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Word-count thresholds for [`crate::TextChunker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Preferred chunk length in words
    pub target_words: usize,

    /// Hard upper bound on chunk length in words
    pub max_words: usize,

    /// Smallest trailing remainder allowed to stand as its own chunk
    pub min_words: usize,
}

impl ChunkingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.target_words == 0 {
            return Err("target_words must be greater than 0".to_string());
        }
        if self.target_words > self.max_words {
            return Err("target_words cannot exceed max_words".to_string());
        }
        if self.min_words > self.max_words {
            return Err("min_words cannot exceed max_words".to_string());
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_words: 650,
            max_words: 800,
            min_words: 500,
        }
    }
}

/// Document fetching limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Timeout for downloading a source document (seconds)
    pub fetch_timeout_secs: u64,

    /// Largest document accepted (bytes)
    pub max_document_bytes: usize,
}

impl IngestConfig {
    /// Get the fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }
        if self.max_document_bytes == 0 {
            return Err("max_document_bytes must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 60,
            max_document_bytes: 25 * 1024 * 1024,
        }
    }
}
