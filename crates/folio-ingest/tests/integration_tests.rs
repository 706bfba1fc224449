//! Integration tests for knowledge ingestion

use folio_domain::traits::{ChunkStore, SourceCatalog};
use folio_domain::{KnowledgeSource, SourceKind, SourceStatus};
use folio_ingest::{
    DocumentExtractor, IngestConfig, IngestError, KnowledgeIndex, KnowledgeProcessor, TextChunker,
};
use folio_llm::MockEmbeddingModel;
use folio_store::SqliteStore;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Index = KnowledgeIndex<SqliteStore, MockEmbeddingModel>;

fn source(id: &str, portfolio: &str, location: &str) -> KnowledgeSource {
    KnowledgeSource {
        id: id.to_string(),
        portfolio_id: portfolio.to_string(),
        kind: SourceKind::Text,
        location: location.to_string(),
        status: SourceStatus::Pending,
        last_error: None,
        chunk_count: 0,
    }
}

fn index_with_sources(sources: &[KnowledgeSource]) -> Arc<Index> {
    let mut store = SqliteStore::new(":memory:").unwrap();
    for s in sources {
        store.register_source(s).unwrap();
    }
    Arc::new(KnowledgeIndex::new(
        Arc::new(Mutex::new(store)),
        Arc::new(MockEmbeddingModel::new(128)),
        TextChunker::default(),
    ))
}

fn long_document(words: usize) -> String {
    (0..words)
        .map(|i| format!("service{}", i % 97))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serve one canned HTTP response per connection; returns the base URL
async fn serve(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

#[test]
fn test_ingest_is_idempotent() {
    let index = index_with_sources(&[source("s1", "p1", "unused")]);
    let text = long_document(2100);

    let first = index.ingest("s1", &text).unwrap();
    let first_texts: Vec<String> = {
        let store = index.store().lock().unwrap();
        store.source_chunks("s1").unwrap().into_iter().map(|c| c.text).collect()
    };

    let second = index.ingest("s1", &text).unwrap();
    let second_texts: Vec<String> = {
        let store = index.store().lock().unwrap();
        store.source_chunks("s1").unwrap().into_iter().map(|c| c.text).collect()
    };

    assert_eq!(first, second);
    assert_eq!(first, 3);
    assert_eq!(first_texts, second_texts);
}

#[test]
fn test_reingest_replaces_previous_chunks() {
    let index = index_with_sources(&[source("s1", "p1", "unused")]);
    index.ingest("s1", &long_document(2100)).unwrap();
    index.ingest("s1", "Short replacement text.").unwrap();

    let store = index.store().lock().unwrap();
    let chunks = store.source_chunks("s1").unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "Short replacement text.");
}

#[test]
fn test_retrieval_is_portfolio_isolated() {
    let index = index_with_sources(&[
        source("a1", "alpha", "unused"),
        source("a2", "alpha", "unused"),
        source("b1", "beta", "unused"),
    ]);
    index.ingest("a1", "Alpha studio builds mobile apps.").unwrap();
    index.ingest("a2", "Alpha studio pricing starts at 5000.").unwrap();
    index.ingest("b1", "Beta studio builds mobile apps.").unwrap();

    for (portfolio, allowed) in [("alpha", ["a1", "a2"]), ("beta", ["b1", "b1"])] {
        let results = index.retrieve("studio builds mobile apps", portfolio, 10).unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|c| allowed.contains(&c.source_id.as_str())));
    }

    assert!(index.retrieve("anything", "gamma", 10).unwrap().is_empty());
}

#[test]
fn test_concurrent_reingest_and_retrieve_see_complete_sets() {
    let index = index_with_sources(&[source("s1", "p1", "unused")]);
    let long = long_document(2100);
    index.ingest("s1", &long).unwrap();

    let writer = {
        let index = Arc::clone(&index);
        let long = long.clone();
        std::thread::spawn(move || {
            for i in 0..20 {
                let text = if i % 2 == 0 { "tiny".to_string() } else { long.clone() };
                index.ingest("s1", &text).unwrap();
            }
        })
    };

    for _ in 0..50 {
        let count = index.retrieve("service1", "p1", 10).unwrap().len();
        assert!(count == 1 || count == 3, "saw partial chunk set of {}", count);
    }
    writer.join().unwrap();
}

#[tokio::test]
async fn test_processor_marks_source_ready() {
    let base = serve("200 OK", "We design booking flows for clinics.").await;
    let index = index_with_sources(&[source("s1", "p1", &format!("{}/doc.txt", base))]);
    let processor = KnowledgeProcessor::new(
        Arc::clone(&index),
        DocumentExtractor::new(&IngestConfig::default()).unwrap(),
    );

    let outcome = processor.process("s1").await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.chunk_count, Some(1));

    let store = index.store().lock().unwrap();
    let stored = store.get_source("s1").unwrap().unwrap();
    assert_eq!(stored.status, SourceStatus::Ready);
    assert_eq!(stored.chunk_count, 1);
}

#[tokio::test]
async fn test_processor_fetch_failure_keeps_chunks() {
    let base = serve("404 Not Found", "").await;
    let index = index_with_sources(&[source("s1", "p1", &format!("{}/gone.txt", base))]);
    index.ingest("s1", "Existing knowledge stays.").unwrap();

    let processor = KnowledgeProcessor::new(
        Arc::clone(&index),
        DocumentExtractor::new(&IngestConfig::default()).unwrap(),
    );
    let outcome = processor.process("s1").await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("404"));

    let store = index.store().lock().unwrap();
    assert_eq!(store.source_chunks("s1").unwrap().len(), 1);
    let stored = store.get_source("s1").unwrap().unwrap();
    assert_eq!(stored.status, SourceStatus::Failed);
    assert!(stored.last_error.is_some());
}

#[tokio::test]
async fn test_processor_rejects_empty_document() {
    let base = serve("200 OK", "   ").await;
    let index = index_with_sources(&[source("s1", "p1", &format!("{}/blank.txt", base))]);
    let processor = KnowledgeProcessor::new(
        Arc::clone(&index),
        DocumentExtractor::new(&IngestConfig::default()).unwrap(),
    );

    let outcome = processor.process("s1").await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(IngestError::EmptyDocument.to_string()));
}

#[tokio::test]
async fn test_processor_unknown_source() {
    let index = index_with_sources(&[]);
    let processor = KnowledgeProcessor::new(
        index,
        DocumentExtractor::new(&IngestConfig::default()).unwrap(),
    );
    assert!(matches!(
        processor.process("missing").await,
        Err(IngestError::SourceNotFound(_))
    ));
}

#[tokio::test]
async fn test_extract_from_url_reports_status() {
    let base = serve("500 Internal Server Error", "").await;
    let extractor = DocumentExtractor::new(&IngestConfig::default()).unwrap();
    let result = extractor
        .extract_from_url(&format!("{}/doc.pdf", base), SourceKind::Pdf)
        .await;
    assert!(matches!(result, Err(IngestError::Fetch { status: 500, .. })));
}
