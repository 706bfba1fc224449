//! Public chat orchestration
//!
//! One visitor turn: resolve the agent, validate input, generate the reply,
//! record telemetry and offer the turn to the lead guard.

use crate::handlers::AppState;
use folio_domain::traits::{AgentDirectory, TelemetryLog};
use folio_domain::{AgentConfig, Outcome, RecordId, TelemetryEvent};
use folio_gatekeeper::{CaptureOutcome, LeadTurn};
use folio_responder::{sanitize_history, validate_message, RawMessage, ValidationError};
use folio_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reply shown to the visitor when generation fails
pub const DEGRADED_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Caller tag used when no forwarding header is present
pub const UNKNOWN_CALLER: &str = "unknown";

/// Public chat request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicChatRequest {
    /// Agent public handle
    #[serde(default)]
    pub handle: Option<String>,
    /// Agent id, used when no handle is given
    #[serde(default)]
    pub agent_id: Option<String>,
    /// The visitor's message
    #[serde(default)]
    pub message: String,
    /// Prior conversation, oldest first
    #[serde(default)]
    pub history: Vec<RawMessage>,
    /// Widget session identifier
    #[serde(default)]
    pub session_id: Option<String>,
    /// Signed-in user, if any
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Agent details echoed to the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    /// Name the agent speaks as
    pub display_name: String,
    /// Avatar image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<&AgentConfig> for AgentSummary {
    fn from(agent: &AgentConfig) -> Self {
        Self {
            display_name: agent.persona.display_name.clone(),
            avatar_url: agent.persona.avatar_url.clone(),
        }
    }
}

/// Public chat response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicChatResponse {
    /// Agent reply text
    pub reply: String,
    /// Whether this turn stored a new lead
    pub lead_captured: bool,
    /// Agent persona
    pub agent: AgentSummary,
}

/// Public chat failures that reach the caller
#[derive(Debug, Error)]
pub enum ChatError {
    /// Neither handle nor agentId was supplied
    #[error("Either handle or agentId is required")]
    MissingAgentRef,

    /// No agent matches the handle or id
    #[error("Agent not found")]
    AgentNotFound,

    /// The agent exists but its public chat is switched off
    #[error("This agent is not accepting messages")]
    AgentDisabled,

    /// Visitor input rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Agent lookup failed
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for ChatError {
    fn from(e: StoreError) -> Self {
        ChatError::Store(e.to_string())
    }
}

/// Key under which at most one lead is captured
///
/// Prefers the widget session, then the signed-in user, then the caller tag.
/// A turn with no identifying information at all gets a key of its own, so
/// unrelated anonymous visitors never share one.
pub fn session_key(session_id: Option<&str>, user_id: Option<&str>, caller_tag: &str) -> String {
    fn non_blank(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }

    if let Some(session_id) = non_blank(session_id) {
        session_id.to_string()
    } else if let Some(user_id) = non_blank(user_id) {
        format!("user:{}", user_id)
    } else if caller_tag != UNKNOWN_CALLER {
        format!("anon:{}", caller_tag)
    } else {
        format!("anon:{}", RecordId::new())
    }
}

/// Handle one public chat turn
///
/// Validation problems are returned before any model call. A failed
/// generation still answers the visitor, with [`DEGRADED_REPLY`], and is
/// recorded as a telemetry failure.
pub async fn handle_public_chat(
    state: &AppState,
    request: PublicChatRequest,
    caller_tag: &str,
) -> Result<PublicChatResponse, ChatError> {
    let agent = lookup_agent(
        &state.store,
        request.handle.as_deref(),
        request.agent_id.as_deref(),
    )?;
    if !agent.is_enabled {
        return Err(ChatError::AgentDisabled);
    }

    let config = state.generator.config();
    let model = config.resolve_model(&agent.model)?;
    let message = validate_message(&request.message, config)?;
    let history = sanitize_history(&request.history, config)?;

    let reply = match state
        .generator
        .generate(&agent, model, &message, &history)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            warn!(agent = agent.handle.as_str(), "Generation failed: {}", e);
            record_telemetry(&state.store, Outcome::Failure, model.as_str(), &agent.portfolio_id);
            return Ok(PublicChatResponse {
                reply: DEGRADED_REPLY.to_string(),
                lead_captured: false,
                agent: AgentSummary::from(&agent),
            });
        }
    };
    record_telemetry(&state.store, Outcome::Success, model.as_str(), &agent.portfolio_id);

    let key = session_key(
        request.session_id.as_deref(),
        request.user_id.as_deref(),
        caller_tag,
    );
    let turn = LeadTurn {
        strategy_mode: agent.strategy_mode,
        claim: &reply.lead_data,
        message: &message,
        history: &history,
    };
    let lead_captured = capture_lead(state, &agent.portfolio_id, &key, &turn);

    info!(
        agent = agent.handle.as_str(),
        lead_detected = reply.lead_detected,
        lead_captured,
        "Public chat turn complete"
    );

    Ok(PublicChatResponse {
        reply: reply.reply_text,
        lead_captured,
        agent: AgentSummary::from(&agent),
    })
}

fn lookup_agent(
    store: &Arc<Mutex<SqliteStore>>,
    handle: Option<&str>,
    agent_id: Option<&str>,
) -> Result<AgentConfig, ChatError> {
    let handle = handle.map(str::trim).filter(|h| !h.is_empty());
    let agent_id = agent_id.map(str::trim).filter(|id| !id.is_empty());

    let store = store.lock().map_err(|_| StoreError::LockPoisoned)?;
    let found = match (handle, agent_id) {
        (Some(handle), _) => store.find_agent_by_handle(handle)?,
        (None, Some(agent_id)) => store.find_agent_by_id(agent_id)?,
        (None, None) => return Err(ChatError::MissingAgentRef),
    };
    found.ok_or(ChatError::AgentNotFound)
}

/// Append a telemetry event; failures are logged, never surfaced
fn record_telemetry(
    store: &Arc<Mutex<SqliteStore>>,
    outcome: Outcome,
    model_id: &str,
    portfolio_id: &str,
) {
    let event = TelemetryEvent::now(outcome, model_id, portfolio_id);
    let result = store
        .lock()
        .map_err(|_| StoreError::LockPoisoned)
        .and_then(|mut store| store.record_event(&event));
    if let Err(e) = result {
        warn!("Failed to record telemetry event: {}", e);
    }
}

/// Offer the turn to the guard; capture failures are logged, not surfaced
fn capture_lead(state: &AppState, portfolio_id: &str, session_key: &str, turn: &LeadTurn<'_>) -> bool {
    let mut store = match state.store.lock() {
        Ok(store) => store,
        Err(_) => {
            warn!("Store lock poisoned, skipping lead capture");
            return false;
        }
    };

    match state
        .guard
        .capture(&mut *store, portfolio_id, session_key, turn)
    {
        Ok(CaptureOutcome::Captured(_)) => true,
        Ok(outcome) => {
            debug!(?outcome, "No lead stored this turn");
            false
        }
        Err(e) => {
            warn!("Lead capture failed: {}", e);
            false
        }
    }
}
