//! Deterministic providers for tests and local development

use crate::LlmError;
use folio_domain::traits::{ChatModel, EmbeddingModel};
use folio_domain::ChatRequest;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const ERROR_MARKER: &str = "ERROR";

/// Mock chat provider
///
/// Returns pre-configured responses without any network calls. Responses are
/// keyed by the newest visitor message of the request.
///
/// # Examples
///
/// ```
/// use folio_llm::MockProvider;
/// use folio_domain::traits::ChatModel;
/// use folio_domain::{ChatRequest, Message};
///
/// let mut provider = MockProvider::default();
/// provider.add_response("pricing?", "Plans start at $500.");
///
/// let request = ChatRequest {
///     model: "gpt-4o-mini".to_string(),
///     temperature: 0.0,
///     system_prompt: String::new(),
///     messages: vec![Message::user("pricing?")],
/// };
/// assert_eq!(provider.complete(&request).unwrap(), "Plans start at $500.");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<ChatRequest>>>,
    latency: Option<Duration>,
}

impl MockProvider {
    /// Create a provider with a fixed response for every message
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            latency: None,
        }
    }

    /// Add a specific response for a given visitor message
    pub fn add_response(&mut self, message: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(message.into(), response.into());
        }
    }

    /// Configure an error for a specific visitor message
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.add_response(message, ERROR_MARKER);
    }

    /// Sleep this long before answering, to exercise caller timeouts
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of completed calls
    pub fn call_count(&self) -> usize {
        self.call_count.lock().map(|c| *c).unwrap_or(0)
    }

    /// The most recent request, for prompt assertions
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ChatModel for MockProvider {
    type Error = LlmError;

    fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        if let Ok(mut count) = self.call_count.lock() {
            *count += 1;
        }
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let responses = self
            .responses
            .lock()
            .map_err(|_| LlmError::Other("Mock lock poisoned".to_string()))?;
        if let Some(response) = request.latest_user_message().and_then(|m| responses.get(m)) {
            if response == ERROR_MARKER {
                return Err(LlmError::Other("Mock error".to_string()));
            }
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}

/// Mock embedding model using feature hashing over words
///
/// Each lower-cased word is hashed into one of `dimension` buckets and the
/// bucket counts are normalized to unit length. The output is deterministic
/// and texts sharing vocabulary score higher cosine similarity, which is
/// enough to exercise retrieval ranking without a real model.
pub struct MockEmbeddingModel {
    dimension: usize,
    fail: bool,
}

impl MockEmbeddingModel {
    /// Create a mock model with the given output dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            fail: false,
        }
    }

    /// A model whose every call fails
    pub fn failing() -> Self {
        Self {
            dimension: 1,
            fail: true,
        }
    }

    /// Output dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn bucket(&self, word: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        word.hash(&mut hasher);
        (hasher.finish() % self.dimension as u64) as usize
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    type Error = LlmError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        if self.fail {
            return Err(LlmError::Communication("Mock embedding failure".to_string()));
        }
        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            embedding[self.bucket(&word.to_lowercase())] += 1.0;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }
}
