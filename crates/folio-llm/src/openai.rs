//! OpenAI-compatible provider
//!
//! Talks to `/chat/completions` and `/embeddings` on any endpoint that
//! speaks the OpenAI wire format. Calls are blocking; the responder runs
//! them on tokio's blocking pool under its own generation timeout.
//!
//! # Examples
//!
//! ```no_run
//! use folio_llm::OpenAiProvider;
//! use std::time::Duration;
//!
//! let provider = OpenAiProvider::new(
//!     "https://api.openai.com/v1",
//!     "sk-...",
//!     "text-embedding-3-small",
//!     Duration::from_secs(30),
//! ).unwrap();
//! ```

use crate::LlmError;
use folio_domain::traits::{ChatModel, EmbeddingModel};
use folio_domain::ChatRequest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default OpenAI API base
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default number of attempts per call
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// OpenAI-compatible chat and embedding provider
pub struct OpenAiProvider {
    api_base: String,
    api_key: String,
    embedding_model: String,
    client: reqwest::blocking::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the API key is empty or the HTTP client
    /// cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        embedding_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            embedding_model: embedding_model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts per call
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// POST a JSON body, retrying transient failures with exponential backoff
    fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
        model: &str,
    ) -> Result<R, LlmError> {
        let url = format!("{}{}", self.api_base, path);
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<R>().map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        });
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(model.to_string()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else if status.is_client_error() {
                        let error_text = response
                            .text()
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    } else {
                        last_error = Some(LlmError::Communication(format!("HTTP {}", status)));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = Duration::from_millis(250 * 2u64.pow(attempts - 1));
                tracing::debug!(attempt = attempts, ?delay, path, "Retrying provider call");
                std::thread::sleep(delay);
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

fn completion_body(request: &ChatRequest) -> CompletionRequest<'_> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(WireMessage {
        role: "system",
        content: &request.system_prompt,
    });
    messages.extend(request.messages.iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: &m.content,
    }));

    CompletionRequest {
        model: &request.model,
        temperature: request.temperature,
        messages,
    }
}

fn completion_text(response: CompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Completion has no content".to_string()))
}

fn ordered_embeddings(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>, LlmError> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(LlmError::InvalidResponse(format!(
            "Expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

impl ChatModel for OpenAiProvider {
    type Error = LlmError;

    fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        let body = completion_body(request);
        let response: CompletionResponse = self.post_json("/chat/completions", &body, &request.model)?;
        completion_text(response)
    }
}

impl EmbeddingModel for OpenAiProvider {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        let mut batch = self.embed_batch(&[text.to_string()])?;
        batch
            .pop()
            .ok_or_else(|| LlmError::InvalidResponse("Empty embedding response".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Self::Error> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts,
        };
        let response: EmbeddingResponse =
            self.post_json("/embeddings", &body, &self.embedding_model)?;
        ordered_embeddings(response, texts.len())
    }
}
