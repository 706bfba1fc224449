//! HTTP request handlers for the Folio service.
//!
//! Public chat, knowledge processing, alerting and health check endpoints
//! using axum.

use crate::chat::{handle_public_chat, ChatError, PublicChatRequest, PublicChatResponse, UNKNOWN_CALLER};
use crate::{Generator, Processor};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use folio_gatekeeper::LeadGuard;
use folio_ingest::{IngestError, ProcessOutcome};
use folio_monitor::{AlertReport, MonitorError, TelemetryMonitor};
use folio_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Agents, knowledge, leads and telemetry
    pub store: Arc<Mutex<SqliteStore>>,
    /// Reply generation pipeline
    pub generator: Arc<Generator>,
    /// Knowledge extraction and indexing pipeline
    pub processor: Arc<Processor>,
    /// Lead capture policy
    pub guard: Arc<LeadGuard>,
    /// Telemetry alerting
    pub monitor: Arc<TelemetryMonitor<SqliteStore>>,
}

/// Knowledge processing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// Whether the source is now ready
    pub success: bool,
    /// Chunks stored on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ProcessOutcome> for ProcessResponse {
    fn from(outcome: ProcessOutcome) -> Self {
        Self {
            success: outcome.success,
            chunk_count: outcome.chunk_count,
            error: outcome.error,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Public chat error
    Chat(ChatError),
    /// Knowledge processing could not start
    Processing(IngestError),
    /// Telemetry could not be read
    Monitor(MonitorError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Chat(e) => {
                let status = match &e {
                    ChatError::MissingAgentRef | ChatError::Validation(_) => StatusCode::BAD_REQUEST,
                    ChatError::AgentNotFound => StatusCode::NOT_FOUND,
                    ChatError::AgentDisabled => StatusCode::FORBIDDEN,
                    ChatError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            AppError::Processing(e @ IngestError::SourceNotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AppError::Processing(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Monitor(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        if status.is_server_error() {
            warn!("Request failed: {}", message);
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        AppError::Processing(e)
    }
}

impl From<MonitorError> for AppError {
    fn from(e: MonitorError) -> Self {
        AppError::Monitor(e)
    }
}

/// First `x-forwarded-for` hop, or [`UNKNOWN_CALLER`]
///
/// The tag is an opaque rate-limiting and dedup key, not an identity.
pub fn caller_tag(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CALLER)
        .to_string()
}

/// POST /api/chat/public - Answer one visitor turn
async fn public_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PublicChatRequest>,
) -> Result<Json<PublicChatResponse>, AppError> {
    let caller = caller_tag(&headers);
    let response = handle_public_chat(&state, request, &caller).await?;
    Ok(Json(response))
}

/// POST /api/knowledge/:source_id/process - Extract and index an uploaded source
async fn process_knowledge(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<Json<ProcessResponse>, AppError> {
    info!("Knowledge processing requested for {}", source_id);
    let outcome = state.processor.process(&source_id).await?;
    Ok(Json(outcome.into()))
}

/// GET /api/alerts - Evaluate telemetry alerts
async fn alerts(State(state): State<AppState>) -> Result<Json<AlertReport>, AppError> {
    let report = state.monitor.report()?;
    if report.failure_spike || report.misconfiguration_spike {
        info!("{}", report.summary());
    }
    Ok(Json(report))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/api/chat/public", post(public_chat))
        .route("/api/knowledge/:source_id/process", post(process_knowledge))
        .route("/api/alerts", get(alerts))
        .route("/health", get(health_check))
        .with_state(state)
}
