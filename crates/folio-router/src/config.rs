//! Configuration file parsing for the Folio service.
//!
//! One TOML file carries the server binding, the model provider, the
//! settings of every pipeline component and optional seed agents for local
//! development. It is loaded once at startup and never mutated.

use folio_domain::{AgentConfig, BehaviorType, Persona, StrategyMode, SupportedModel};
use folio_gatekeeper::GuardConfig;
use folio_ingest::{ChunkingConfig, IngestConfig};
use folio_llm::openai::{DEFAULT_API_BASE, DEFAULT_EMBEDDING_MODEL, DEFAULT_MAX_RETRIES};
use folio_monitor::MonitorConfig;
use folio_responder::ResponderConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A section holds values that make no sense
    #[error("Invalid configuration in [{section}]: {message}")]
    Invalid {
        /// Offending section
        section: String,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    fn invalid(section: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            section: section.to_string(),
            message: message.into(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// HTTP binding and database location
    pub server: ServerConfig,
    /// Chat and embedding provider
    pub provider: ProviderConfig,
    /// Chunk sizing
    pub chunking: ChunkingConfig,
    /// Document fetching limits
    pub ingest: IngestConfig,
    /// Reply generation
    pub responder: ResponderConfig,
    /// Lead capture policy
    pub guard: GuardConfig,
    /// Telemetry alert thresholds
    pub alerts: MonitorConfig,
    /// Agents to upsert at startup
    pub agents: Vec<AgentSeed>,
}

/// `[server]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,
    /// Bind port (e.g., 8080)
    pub bind_port: u16,
    /// SQLite database file, or ":memory:"
    pub database_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: "folio.db".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

/// Which provider backs chat and embeddings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible HTTP API
    OpenAi,
    /// Deterministic in-process mocks
    Mock,
}

/// `[provider]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider backing chat and embeddings
    pub kind: ProviderKind,
    /// API base URL
    pub api_base: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Embedding model id
    pub embedding_model: String,
    /// Per-request HTTP timeout
    pub timeout_secs: u64,
    /// Attempts per provider call
    pub max_retries: u32,
    /// Vector size of the mock embedder
    pub mock_dimension: usize,
    /// Reply returned by the mock chat model
    pub mock_reply: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: 60,
            max_retries: DEFAULT_MAX_RETRIES,
            mock_dimension: 64,
            mock_reply: "Thanks for reaching out! How can I help?".to_string(),
        }
    }
}

impl ProviderConfig {
    /// HTTP timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[[agents]]` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSeed {
    /// Agent identifier
    pub agent_id: String,
    /// Owning portfolio
    pub portfolio_id: String,
    /// Public handle
    pub handle: String,
    /// Whether the public chat answers
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    /// Model id, one of the supported models
    #[serde(default = "default_model")]
    pub model: String,
    /// Tone preset name
    #[serde(default = "default_behavior")]
    pub behavior_type: String,
    /// Tenant instructions appended to the preset
    #[serde(default)]
    pub custom_prompt: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Strategy mode name
    #[serde(default = "default_strategy")]
    pub strategy_mode: String,
    /// Name the agent speaks as
    pub display_name: String,
    /// Avatar shown by the widget
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Self-introduction
    #[serde(default)]
    pub intro: Option<String>,
    /// Role label, e.g. "Studio assistant"
    #[serde(default)]
    pub role_label: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_model() -> String {
    SupportedModel::default().as_str().to_string()
}

fn default_behavior() -> String {
    BehaviorType::default().as_str().to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_strategy() -> String {
    StrategyMode::default().as_str().to_string()
}

impl AgentSeed {
    /// Convert into the domain agent, rejecting unknown tags
    pub fn to_agent(&self) -> Result<AgentConfig, ConfigError> {
        let behavior_type = BehaviorType::parse(&self.behavior_type).ok_or_else(|| {
            ConfigError::invalid(
                "agents",
                format!("{}: unknown behavior_type '{}'", self.handle, self.behavior_type),
            )
        })?;
        let strategy_mode = StrategyMode::parse(&self.strategy_mode).ok_or_else(|| {
            ConfigError::invalid(
                "agents",
                format!("{}: unknown strategy_mode '{}'", self.handle, self.strategy_mode),
            )
        })?;

        Ok(AgentConfig {
            agent_id: self.agent_id.clone(),
            portfolio_id: self.portfolio_id.clone(),
            handle: self.handle.clone(),
            is_enabled: self.is_enabled,
            model: self.model.clone(),
            behavior_type,
            custom_prompt: self.custom_prompt.clone(),
            temperature: self.temperature,
            strategy_mode,
            persona: Persona {
                display_name: self.display_name.clone(),
                avatar_url: self.avatar_url.clone(),
                intro: self.intro.clone(),
                role_label: self.role_label.clone(),
            },
        })
    }
}

impl FolioConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: FolioConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.database_path.trim().is_empty() {
            return Err(ConfigError::invalid("server", "database_path must not be empty"));
        }

        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::invalid("provider", "timeout_secs must be greater than 0"));
        }
        match self.provider.kind {
            ProviderKind::OpenAi if self.provider.api_key_env.trim().is_empty() => {
                return Err(ConfigError::invalid("provider", "api_key_env must not be empty"));
            }
            ProviderKind::Mock if self.provider.mock_dimension == 0 => {
                return Err(ConfigError::invalid(
                    "provider",
                    "mock_dimension must be greater than 0",
                ));
            }
            _ => {}
        }

        self.chunking
            .validate()
            .map_err(|e| ConfigError::invalid("chunking", e))?;
        self.ingest
            .validate()
            .map_err(|e| ConfigError::invalid("ingest", e))?;
        self.responder
            .validate()
            .map_err(|e| ConfigError::invalid("responder", e))?;
        self.guard
            .validate()
            .map_err(|e| ConfigError::invalid("guard", e))?;
        self.alerts
            .validate()
            .map_err(|e| ConfigError::invalid("alerts", e))?;

        let mut handles = HashSet::new();
        for seed in &self.agents {
            seed.to_agent()?;
            if !handles.insert(seed.handle.as_str()) {
                return Err(ConfigError::invalid(
                    "agents",
                    format!("duplicate handle '{}'", seed.handle),
                ));
            }
        }

        Ok(())
    }

    /// Configuration for tests and local runs: in-memory store, mock provider
    pub fn default_test_config() -> Self {
        FolioConfig {
            server: ServerConfig {
                database_path: ":memory:".to_string(),
                ..ServerConfig::default()
            },
            provider: ProviderConfig {
                kind: ProviderKind::Mock,
                ..ProviderConfig::default()
            },
            ..FolioConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FolioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.chunking.max_words, 800);
        assert_eq!(config.responder.retrieval_top_k, 5);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [server]
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "/var/lib/folio/folio.db"

            [provider]
            kind = "mock"
            mock_dimension = 32

            [chunking]
            target_words = 300
            max_words = 400
            min_words = 200

            [responder]
            retrieval_top_k = 3

            [guard]
            min_confidence = 0.7

            [alerts.failure_spike]
            lookback_minutes = 30

            [[agents]]
            agent_id = "agent-1"
            portfolio_id = "p-1"
            handle = "studio"
            display_name = "Ava"
            strategy_mode = "sales"
            behavior_type = "friendly"
        "#;

        let config = FolioConfig::from_toml(toml).unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.provider.kind, ProviderKind::Mock);
        assert_eq!(config.provider.mock_dimension, 32);
        assert_eq!(config.chunking.target_words, 300);
        assert_eq!(config.responder.retrieval_top_k, 3);
        assert_eq!(config.responder.history_window, 12);
        assert!((config.guard.min_confidence - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.alerts.failure_spike.lookback_minutes, 30);
        assert_eq!(config.alerts.failure_spike.min_events, 20);

        let agent = config.agents[0].to_agent().unwrap();
        assert_eq!(agent.strategy_mode, StrategyMode::Sales);
        assert_eq!(agent.behavior_type, BehaviorType::Friendly);
        assert_eq!(agent.model, "gpt-4o-mini");
        assert!(agent.is_enabled);
        assert_eq!(agent.persona.display_name, "Ava");
    }

    #[test]
    fn test_example_config_parses() {
        let config =
            FolioConfig::from_toml(include_str!("../../../config/folio.example.toml")).unwrap();
        assert_eq!(config.agents.len(), 1);
        assert_eq!(config.guard.sales.detail_only_min_words, Some(8));
        assert_eq!(config.responder.supported_models.len(), 4);
    }

    #[test]
    fn test_rejects_invalid_chunking() {
        let toml = r#"
            [chunking]
            target_words = 900
            max_words = 800
            min_words = 500
        "#;
        let err = FolioConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref section, .. } if section == "chunking"));
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        let toml = r#"
            [[agents]]
            agent_id = "agent-1"
            portfolio_id = "p-1"
            handle = "studio"
            display_name = "Ava"
            strategy_mode = "aggressive"
        "#;
        assert!(FolioConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_rejects_duplicate_handles() {
        let toml = r#"
            [[agents]]
            agent_id = "agent-1"
            portfolio_id = "p-1"
            handle = "studio"
            display_name = "Ava"

            [[agents]]
            agent_id = "agent-2"
            portfolio_id = "p-2"
            handle = "studio"
            display_name = "Bo"
        "#;
        assert!(FolioConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_unknown_provider_kind_fails_to_parse() {
        let toml = r#"
            [provider]
            kind = "carrier-pigeon"
        "#;
        assert!(matches!(
            FolioConfig::from_toml(toml),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
