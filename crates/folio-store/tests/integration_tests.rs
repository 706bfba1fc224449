//! Integration tests for folio-store
//!
//! These tests exercise each persistence seam against an in-memory database.

use folio_domain::traits::{AgentDirectory, ChunkStore, LeadStore, SourceCatalog, TelemetryLog};
use folio_domain::{
    AgentConfig, BehaviorType, KnowledgeSource, LeadCandidate, LeadChannels, NewChunk, NewLead,
    Outcome, Persona, SourceKind, SourceStatus, StrategyMode, TelemetryEvent,
};
use folio_store::{SqliteStore, StoreError};

fn source(id: &str, portfolio_id: &str) -> KnowledgeSource {
    KnowledgeSource {
        id: id.to_string(),
        portfolio_id: portfolio_id.to_string(),
        kind: SourceKind::Pdf,
        location: format!("https://files.example.com/{}.pdf", id),
        status: SourceStatus::Pending,
        last_error: None,
        chunk_count: 0,
    }
}

fn chunk(ordinal: usize, text: &str) -> NewChunk {
    NewChunk {
        ordinal,
        text: text.to_string(),
        embedding: vec![ordinal as f32, 1.0, 0.5],
    }
}

fn candidate(email: &str) -> LeadCandidate {
    LeadCandidate {
        strategy_mode: StrategyMode::Sales,
        channels: LeadChannels {
            email: Some(email.to_string()),
            ..Default::default()
        },
        name: Some("Jane".to_string()),
        project_details: Some("Quote for a new site".to_string()),
        budget: None,
        confidence: 0.9,
    }
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_replace_source_chunks_is_replace_all() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.register_source(&source("src-1", "portfolio-a")).unwrap();

    let count = store
        .replace_source_chunks("src-1", vec![chunk(0, "alpha"), chunk(1, "beta"), chunk(2, "gamma")])
        .unwrap();
    assert_eq!(count, 3);

    let count = store
        .replace_source_chunks("src-1", vec![chunk(0, "delta")])
        .unwrap();
    assert_eq!(count, 1);

    let chunks = store.source_chunks("src-1").unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "delta");
    assert_eq!(chunks[0].embedding, vec![0.0, 1.0, 0.5]);
}

#[test]
fn test_portfolio_chunks_are_isolated() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.register_source(&source("src-a", "portfolio-a")).unwrap();
    store.register_source(&source("src-b", "portfolio-b")).unwrap();

    store.replace_source_chunks("src-a", vec![chunk(0, "a0"), chunk(1, "a1")]).unwrap();
    store.replace_source_chunks("src-b", vec![chunk(0, "b0")]).unwrap();

    let a = store.portfolio_chunks("portfolio-a").unwrap();
    assert_eq!(a.len(), 2);
    assert!(a.iter().all(|c| c.source_id == "src-a"));
    assert_eq!(a[0].text, "a0");
    assert_eq!(a[1].text, "a1");

    let b = store.portfolio_chunks("portfolio-b").unwrap();
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].source_id, "src-b");

    assert!(store.portfolio_chunks("portfolio-c").unwrap().is_empty());
}

#[test]
fn test_delete_source_removes_chunks() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.register_source(&source("src-1", "portfolio-a")).unwrap();
    store.replace_source_chunks("src-1", vec![chunk(0, "alpha")]).unwrap();

    store.delete_source("src-1").unwrap();

    assert!(store.source_chunks("src-1").unwrap().is_empty());
    assert!(store.get_source("src-1").unwrap().is_none());
    assert!(matches!(store.delete_source("src-1"), Err(StoreError::NotFound(_))));
}

#[test]
fn test_source_status_updates() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store.register_source(&source("src-1", "portfolio-a")).unwrap();

    store
        .set_source_status("src-1", SourceStatus::Failed, Some("fetch failed"), None)
        .unwrap();
    let loaded = store.get_source("src-1").unwrap().unwrap();
    assert_eq!(loaded.status, SourceStatus::Failed);
    assert_eq!(loaded.last_error.as_deref(), Some("fetch failed"));
    assert_eq!(loaded.chunk_count, 0);

    store
        .set_source_status("src-1", SourceStatus::Ready, None, Some(4))
        .unwrap();
    let loaded = store.get_source("src-1").unwrap().unwrap();
    assert_eq!(loaded.status, SourceStatus::Ready);
    assert_eq!(loaded.last_error, None);
    assert_eq!(loaded.chunk_count, 4);

    assert!(matches!(
        store.set_source_status("missing", SourceStatus::Ready, None, None),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_one_lead_per_session() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let lead = store
        .create_lead(NewLead {
            portfolio_id: "portfolio-a".to_string(),
            session_key: "session-1".to_string(),
            candidate: candidate("jane@co.com"),
        })
        .unwrap();
    assert_eq!(lead.email.as_deref(), Some("jane@co.com"));
    assert!(!lead.is_read);

    let duplicate = store.create_lead(NewLead {
        portfolio_id: "portfolio-a".to_string(),
        session_key: "session-1".to_string(),
        candidate: candidate("jane@co.com"),
    });
    assert!(matches!(duplicate, Err(StoreError::Duplicate)));

    // Same session key under another portfolio is a different visitor
    assert!(store
        .create_lead(NewLead {
            portfolio_id: "portfolio-b".to_string(),
            session_key: "session-1".to_string(),
            candidate: candidate("jane@co.com"),
        })
        .is_ok());

    let found = store.find_lead_by_session("portfolio-a", "session-1").unwrap();
    assert_eq!(found.map(|l| l.id), Some(lead.id));
    assert!(store.find_lead_by_session("portfolio-a", "session-2").unwrap().is_none());
    assert_eq!(store.list_leads("portfolio-a").unwrap().len(), 1);
}

#[test]
fn test_telemetry_events_since() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    for (timestamp, outcome) in [(1_000, Outcome::Success), (2_000, Outcome::Failure), (3_000, Outcome::Success)] {
        store
            .record_event(&TelemetryEvent {
                timestamp,
                outcome,
                model_id: "gpt-4o-mini".to_string(),
                portfolio_id: "portfolio-a".to_string(),
            })
            .unwrap();
    }

    let events = store.events_since(2_000).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].timestamp, 2_000);
    assert_eq!(events[0].outcome, Outcome::Failure);
    assert_eq!(events[1].timestamp, 3_000);
}

#[test]
fn test_agent_lookup() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let agent = AgentConfig {
        agent_id: "agent-1".to_string(),
        portfolio_id: "portfolio-a".to_string(),
        handle: "Jane-Studio".to_string(),
        is_enabled: true,
        model: "gpt-4o-mini".to_string(),
        behavior_type: BehaviorType::Professional,
        custom_prompt: Some("Mention the free consultation.".to_string()),
        temperature: 0.5,
        strategy_mode: StrategyMode::Consultative,
        persona: Persona {
            display_name: "Jane's Assistant".to_string(),
            avatar_url: None,
            intro: Some("Hi! Ask me anything.".to_string()),
            role_label: Some("studio assistant".to_string()),
        },
    };
    store.upsert_agent(&agent).unwrap();

    let by_id = store.find_agent_by_id("agent-1").unwrap().unwrap();
    assert_eq!(by_id.behavior_type, BehaviorType::Professional);
    assert_eq!(by_id.strategy_mode, StrategyMode::Consultative);
    assert_eq!(by_id.persona.intro.as_deref(), Some("Hi! Ask me anything."));

    let by_handle = store.find_agent_by_handle("jane-studio").unwrap().unwrap();
    assert_eq!(by_handle.agent_id, "agent-1");
    assert!(store.find_agent_by_handle("nobody").unwrap().is_none());
}

#[test]
fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        store.register_source(&source("src-1", "portfolio-a")).unwrap();
        store.replace_source_chunks("src-1", vec![chunk(0, "kept")]).unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    let chunks = store.portfolio_chunks("portfolio-a").unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "kept");
}
