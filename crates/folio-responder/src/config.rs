//! Configuration for reply generation

use crate::error::ValidationError;
use folio_domain::SupportedModel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the reply generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Knowledge chunks placed in the prompt
    pub retrieval_top_k: usize,

    /// Longest history accepted from the widget (messages)
    pub max_history_messages: usize,

    /// Most recent history messages sent to the model
    pub history_window: usize,

    /// Longest single message accepted (characters)
    pub max_message_chars: usize,

    /// Maximum time for one model call (seconds)
    pub generation_timeout_secs: u64,

    /// Model ids tenants may select
    pub supported_models: Vec<String>,
}

impl ResponderConfig {
    /// Get the generation timeout as a Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Resolve a configured model id against the supported list
    pub fn resolve_model(&self, model: &str) -> Result<SupportedModel, ValidationError> {
        SupportedModel::parse(model)
            .filter(|m| self.supported_models.iter().any(|s| s == m.as_str()))
            .ok_or_else(|| ValidationError::UnsupportedModel(model.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_history_messages == 0 {
            return Err("max_history_messages must be greater than 0".to_string());
        }
        if self.history_window == 0 {
            return Err("history_window must be greater than 0".to_string());
        }
        if self.history_window > self.max_history_messages {
            return Err("history_window cannot exceed max_history_messages".to_string());
        }
        if self.max_message_chars == 0 {
            return Err("max_message_chars must be greater than 0".to_string());
        }
        if self.generation_timeout_secs == 0 {
            return Err("generation_timeout_secs must be greater than 0".to_string());
        }
        if self.supported_models.is_empty() {
            return Err("supported_models cannot be empty".to_string());
        }
        if let Some(unknown) = self
            .supported_models
            .iter()
            .find(|m| SupportedModel::parse(m).is_none())
        {
            return Err(format!("Unknown model in supported_models: {}", unknown));
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

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            retrieval_top_k: 5,
            max_history_messages: 40,
            history_window: 12,
            max_message_chars: 4000,
            generation_timeout_secs: 30,
            supported_models: SupportedModel::ALL
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
        }
    }
}
