//! Folio Router
//!
//! HTTP surface of the portfolio agent: the public chat endpoint the widget
//! talks to, the knowledge processing trigger called after an upload, and
//! operational alert and health checks.

#![warn(missing_docs)]

pub mod chat;
pub mod config;
pub mod handlers;

use config::{FolioConfig, ProviderConfig, ProviderKind};
use folio_domain::traits::{ChatModel, EmbeddingModel};
use folio_gatekeeper::LeadGuard;
use folio_ingest::{DocumentExtractor, IngestError, KnowledgeIndex, KnowledgeProcessor, TextChunker};
use folio_llm::{LlmError, MockEmbeddingModel, MockProvider, OpenAiProvider};
use folio_monitor::TelemetryMonitor;
use folio_responder::ReplyGenerator;
use folio_store::{SqliteStore, StoreError};
use handlers::{create_router, AppState};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::info;

/// Chat model shared across requests
pub type SharedChatModel = dyn ChatModel<Error = LlmError> + Send + Sync;

/// Embedding model shared by ingestion and retrieval
pub type SharedEmbedder = dyn EmbeddingModel<Error = LlmError> + Send + Sync;

/// Reply generator wired to the SQLite store
pub type Generator = ReplyGenerator<SqliteStore, SharedEmbedder, SharedChatModel>;

/// Knowledge processor wired to the SQLite store
pub type Processor = KnowledgeProcessor<SqliteStore, SharedEmbedder>;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened or seeded
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Model provider could not be built
    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),

    /// Document extractor could not be built
    #[error("Ingest setup error: {0}")]
    Ingest(#[from] IngestError),

    /// The API key environment variable is unset
    #[error("Environment variable {0} is not set")]
    MissingApiKey(String),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the chat and embedding providers named in `[provider]`
///
/// The OpenAI provider uses a blocking HTTP client, so this must run outside
/// the async runtime.
pub fn build_providers(
    config: &ProviderConfig,
) -> Result<(Arc<SharedChatModel>, Arc<SharedEmbedder>), RouterError> {
    match config.kind {
        ProviderKind::Mock => {
            info!("Using mock chat and embedding providers");
            let chat: Arc<SharedChatModel> = Arc::new(MockProvider::new(config.mock_reply.clone()));
            let embedder: Arc<SharedEmbedder> =
                Arc::new(MockEmbeddingModel::new(config.mock_dimension));
            Ok((chat, embedder))
        }
        ProviderKind::OpenAi => {
            let api_key = std::env::var(&config.api_key_env)
                .map_err(|_| RouterError::MissingApiKey(config.api_key_env.clone()))?;
            let provider = Arc::new(
                OpenAiProvider::new(
                    config.api_base.clone(),
                    api_key,
                    config.embedding_model.clone(),
                    config.timeout(),
                )?
                .with_max_retries(config.max_retries),
            );
            info!("Using OpenAI-compatible provider at {}", config.api_base);
            let chat: Arc<SharedChatModel> = provider.clone();
            let embedder: Arc<SharedEmbedder> = provider;
            Ok((chat, embedder))
        }
    }
}

/// Assemble the application state over an opened store
///
/// Seed agents from the configuration are upserted before the store is
/// shared.
pub fn build_state(
    config: &FolioConfig,
    mut store: SqliteStore,
    chat: Arc<SharedChatModel>,
    embedder: Arc<SharedEmbedder>,
) -> Result<AppState, RouterError> {
    for seed in &config.agents {
        store.upsert_agent(&seed.to_agent()?)?;
    }
    if !config.agents.is_empty() {
        info!("Seeded {} agents", config.agents.len());
    }

    let store = Arc::new(Mutex::new(store));
    let index = Arc::new(KnowledgeIndex::new(
        Arc::clone(&store),
        embedder,
        TextChunker::new(config.chunking),
    ));
    let extractor = DocumentExtractor::new(&config.ingest)?;

    Ok(AppState {
        store: Arc::clone(&store),
        processor: Arc::new(KnowledgeProcessor::new(Arc::clone(&index), extractor)),
        generator: Arc::new(ReplyGenerator::new(chat, index, config.responder.clone())),
        guard: Arc::new(LeadGuard::new(config.guard.clone())),
        monitor: Arc::new(TelemetryMonitor::new(store, config.alerts)),
    })
}

/// Start the HTTP server
///
/// Opens the database, assembles the pipeline and serves until the listener
/// fails.
pub async fn start_server(
    config: FolioConfig,
    chat: Arc<SharedChatModel>,
    embedder: Arc<SharedEmbedder>,
) -> Result<(), RouterError> {
    info!("Starting Folio Router");
    info!("Bind address: {}", config.server.bind_addr());
    info!("Database: {}", config.server.database_path);

    let store = SqliteStore::new(&config.server.database_path)?;
    let state = build_state(&config, store, chat, embedder)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.server.bind_addr()).await?;
    info!("Router listening on {}", config.server.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}
