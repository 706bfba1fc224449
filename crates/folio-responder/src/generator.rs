//! Reply generation for one visitor turn

use crate::config::ResponderConfig;
use crate::error::GenerationError;
use crate::parser::parse_reply;
use crate::prompt::PromptBuilder;
use folio_domain::traits::{ChatModel, ChunkStore, EmbeddingModel};
use folio_domain::{AgentConfig, ChatRequest, History, KnowledgeChunk, LeadClaim, Message, SupportedModel};
use folio_ingest::KnowledgeIndex;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The agent's answer to one visitor turn
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReply {
    /// Natural-language reply with the structured suffix removed
    pub reply_text: String,
    /// Whether the model flagged a lead
    pub lead_detected: bool,
    /// Model confidence in its lead judgment
    pub confidence: f64,
    /// Fields the model claims to have extracted
    pub lead_data: LeadClaim,
}

/// Generates agent replies from knowledge, presets and the chat model
pub struct ReplyGenerator<S, E: ?Sized, M: ?Sized> {
    chat: Arc<M>,
    index: Arc<KnowledgeIndex<S, E>>,
    config: ResponderConfig,
}

impl<S, E, M> ReplyGenerator<S, E, M>
where
    S: ChunkStore + Send + 'static,
    S::Error: Display,
    E: EmbeddingModel + Send + Sync + ?Sized + 'static,
    E::Error: Display,
    M: ChatModel + Send + Sync + ?Sized + 'static,
    M::Error: Display,
{
    /// Create a new generator
    pub fn new(chat: Arc<M>, index: Arc<KnowledgeIndex<S, E>>, config: ResponderConfig) -> Self {
        Self {
            chat,
            index,
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Generate the reply to `message`
    ///
    /// `history` must already be sanitized and `model` resolved against the
    /// supported list. Knowledge retrieval failures are logged and the turn
    /// continues without knowledge; model failures and timeouts surface as
    /// [`GenerationError`].
    pub async fn generate(
        &self,
        agent: &AgentConfig,
        model: SupportedModel,
        message: &str,
        history: &History,
    ) -> Result<GeneratedReply, GenerationError> {
        let knowledge = self.retrieve_knowledge(message, &agent.portfolio_id).await;

        let system_prompt = PromptBuilder::for_agent(agent)
            .with_knowledge(knowledge)
            .build();
        debug!("Prompt length: {} chars", system_prompt.len());

        let mut messages = history.clone();
        messages.push(Message::user(message));

        let request = ChatRequest {
            model: model.as_str().to_string(),
            temperature: agent.temperature,
            system_prompt,
            messages,
        };

        let started = Instant::now();
        let raw = self.call_model(request).await?;
        info!(
            model = model.as_str(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Model call complete"
        );

        if raw.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let parsed = parse_reply(&raw);
        if parsed.reply_text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(GeneratedReply {
            reply_text: parsed.reply_text,
            lead_detected: parsed.lead.detected,
            confidence: parsed.lead.confidence,
            lead_data: parsed.lead,
        })
    }

    async fn retrieve_knowledge(&self, query: &str, portfolio_id: &str) -> Vec<KnowledgeChunk> {
        let index = Arc::clone(&self.index);
        let query = query.to_string();
        let portfolio_id = portfolio_id.to_string();
        let top_k = self.config.retrieval_top_k;

        match tokio::task::spawn_blocking(move || index.retrieve(&query, &portfolio_id, top_k)).await {
            Ok(Ok(chunks)) => {
                debug!("Using {} knowledge chunks", chunks.len());
                chunks
            }
            Ok(Err(e)) => {
                warn!("Knowledge retrieval failed, continuing without knowledge: {}", e);
                Vec::new()
            }
            Err(e) => {
                warn!("Knowledge retrieval task failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Call the chat model on the blocking pool under the generation timeout
    async fn call_model(&self, request: ChatRequest) -> Result<String, GenerationError> {
        let chat = Arc::clone(&self.chat);
        let limit = self.config.generation_timeout();

        let handle = tokio::task::spawn_blocking(move || {
            chat.complete(&request)
                .map_err(|e| GenerationError::Model(e.to_string()))
        });

        timeout(limit, handle)
            .await
            .map_err(|_| GenerationError::Timeout(limit))?
            .map_err(|e| GenerationError::Join(e.to_string()))?
    }
}
