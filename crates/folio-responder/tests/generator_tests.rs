//! Integration tests for reply generation

use folio_domain::{
    AgentConfig, BehaviorType, KnowledgeSource, Message, Persona, SourceKind, SourceStatus,
    StrategyMode, SupportedModel,
};
use folio_ingest::{KnowledgeIndex, TextChunker};
use folio_llm::{MockEmbeddingModel, MockProvider};
use folio_responder::{GenerationError, ReplyGenerator, ResponderConfig};
use folio_store::SqliteStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const QUESTION: &str = "Do you do logo design?";

fn agent() -> AgentConfig {
    AgentConfig {
        agent_id: "agent-1".to_string(),
        portfolio_id: "p1".to_string(),
        handle: "studio".to_string(),
        is_enabled: true,
        model: "gpt-4o-mini".to_string(),
        behavior_type: BehaviorType::Friendly,
        custom_prompt: None,
        temperature: 0.3,
        strategy_mode: StrategyMode::Consultative,
        persona: Persona {
            display_name: "Ada".to_string(),
            ..Default::default()
        },
    }
}

fn store_with_knowledge() -> Arc<Mutex<SqliteStore>> {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store
        .register_source(&KnowledgeSource {
            id: "s1".to_string(),
            portfolio_id: "p1".to_string(),
            kind: SourceKind::Text,
            location: "https://files.example/s1.txt".to_string(),
            status: SourceStatus::Ready,
            last_error: None,
            chunk_count: 0,
        })
        .unwrap();
    let store = Arc::new(Mutex::new(store));

    let index = KnowledgeIndex::new(
        Arc::clone(&store),
        Arc::new(MockEmbeddingModel::new(64)),
        TextChunker::default(),
    );
    index
        .ingest("s1", "Logo design packages start at 900 dollars.")
        .unwrap();
    store
}

fn generator(
    provider: MockProvider,
    embedder: MockEmbeddingModel,
    config: ResponderConfig,
) -> ReplyGenerator<SqliteStore, MockEmbeddingModel, MockProvider> {
    let index = KnowledgeIndex::new(store_with_knowledge(), Arc::new(embedder), TextChunker::default());
    ReplyGenerator::new(Arc::new(provider), Arc::new(index), config)
}

#[tokio::test]
async fn test_generate_strips_suffix() {
    let provider = MockProvider::new(
        "Yes, logos are our specialty!\n<<<LEAD_DATA>>>\n{\"lead_detected\": false, \"confidence\": 0.2}",
    );
    let generator = generator(provider, MockEmbeddingModel::new(64), ResponderConfig::default());

    let reply = generator
        .generate(&agent(), SupportedModel::Gpt4oMini, QUESTION, &vec![])
        .await
        .unwrap();
    assert_eq!(reply.reply_text, "Yes, logos are our specialty!");
    assert!(!reply.lead_detected);
    assert_eq!(reply.confidence, 0.2);
}

#[tokio::test]
async fn test_generate_sends_knowledge_and_history() {
    let provider = MockProvider::new("Sure.");
    let generator = generator(provider.clone(), MockEmbeddingModel::new(64), ResponderConfig::default());
    let history = vec![Message::user("Hi"), Message::assistant("Hello!")];

    let reply = generator
        .generate(&agent(), SupportedModel::Gpt41, QUESTION, &history)
        .await
        .unwrap();
    assert_eq!(reply.reply_text, "Sure.");

    let request = provider.last_request().unwrap();
    assert_eq!(request.model, "gpt-4.1");
    assert_eq!(request.temperature, 0.3);
    assert!(request.system_prompt.contains("Logo design packages start at 900 dollars."));
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[2], Message::user(QUESTION));
}

#[tokio::test]
async fn test_retrieval_failure_degrades_to_no_knowledge() {
    let provider = MockProvider::new("Happy to help.");
    let generator = generator(provider.clone(), MockEmbeddingModel::failing(), ResponderConfig::default());

    let reply = generator
        .generate(&agent(), SupportedModel::Gpt4oMini, QUESTION, &vec![])
        .await
        .unwrap();
    assert_eq!(reply.reply_text, "Happy to help.");

    let request = provider.last_request().unwrap();
    assert!(!request.system_prompt.contains("Logo design packages"));
    assert!(!request.system_prompt.contains("[Knowledge"));
}

#[tokio::test]
async fn test_model_error_is_generation_error() {
    let mut provider = MockProvider::default();
    provider.add_error(QUESTION);
    let generator = generator(provider, MockEmbeddingModel::new(64), ResponderConfig::default());

    let result = generator
        .generate(&agent(), SupportedModel::Gpt4oMini, QUESTION, &vec![])
        .await;
    assert!(matches!(result, Err(GenerationError::Model(_))));
}

#[tokio::test]
async fn test_slow_model_times_out() {
    let provider = MockProvider::new("too late").with_latency(Duration::from_millis(2500));
    let config = ResponderConfig {
        generation_timeout_secs: 1,
        ..Default::default()
    };
    let generator = generator(provider, MockEmbeddingModel::new(64), config);

    let result = generator
        .generate(&agent(), SupportedModel::Gpt4oMini, QUESTION, &vec![])
        .await;
    assert!(matches!(result, Err(GenerationError::Timeout(_))));
}

#[tokio::test]
async fn test_empty_reply_is_generation_error() {
    let generator = generator(MockProvider::new("   "), MockEmbeddingModel::new(64), ResponderConfig::default());
    let result = generator
        .generate(&agent(), SupportedModel::Gpt4oMini, QUESTION, &vec![])
        .await;
    assert!(matches!(result, Err(GenerationError::EmptyResponse)));
}

#[tokio::test]
async fn test_malformed_suffix_returns_full_text() {
    let raw = "Let's talk!\n<<<LEAD_DATA>>> {oops";
    let generator = generator(MockProvider::new(raw), MockEmbeddingModel::new(64), ResponderConfig::default());

    let reply = generator
        .generate(&agent(), SupportedModel::Gpt4oMini, QUESTION, &vec![])
        .await
        .unwrap();
    assert_eq!(reply.reply_text, raw);
    assert!(!reply.lead_detected);
}
