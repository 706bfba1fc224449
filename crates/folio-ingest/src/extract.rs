//! Plain-text extraction from uploaded documents

use crate::config::IngestConfig;
use crate::error::IngestError;
use folio_domain::SourceKind;
use lopdf::Document;
use tracing::{debug, warn};

/// Text pulled out of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Best-effort plain text with page boundaries merged
    pub text: String,
    /// Number of pages in the source, including pages whose text failed
    pub page_count: usize,
}

/// Extracts plain text from PDF or text documents
pub struct DocumentExtractor {
    client: reqwest::Client,
    max_document_bytes: usize,
}

impl DocumentExtractor {
    /// Create a new extractor
    pub fn new(config: &IngestConfig) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| IngestError::FetchFailed {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            max_document_bytes: config.max_document_bytes,
        })
    }

    /// Extract text from raw document bytes
    pub fn extract_from_bytes(
        &self,
        kind: SourceKind,
        bytes: &[u8],
    ) -> Result<ExtractedDocument, IngestError> {
        extract_bytes(kind, bytes, self.max_document_bytes)
    }

    /// Fetch a document and extract its text
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Fetch` when the server answers with a
    /// non-success status, `IngestError::FetchFailed` when it cannot be
    /// reached.
    pub async fn extract_from_url(
        &self,
        url: &str,
        kind: SourceKind,
    ) -> Result<ExtractedDocument, IngestError> {
        let fetch_failed = |e: reqwest::Error| IngestError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(fetch_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(fetch_failed)?;
        debug!("Fetched {} bytes for {} document", bytes.len(), kind.as_str());

        // PDF parsing is CPU-bound
        let max_document_bytes = self.max_document_bytes;
        tokio::task::spawn_blocking(move || extract_bytes(kind, &bytes, max_document_bytes))
            .await
            .map_err(|e| IngestError::Join(e.to_string()))?
    }
}

fn extract_bytes(
    kind: SourceKind,
    bytes: &[u8],
    max_document_bytes: usize,
) -> Result<ExtractedDocument, IngestError> {
    if bytes.len() > max_document_bytes {
        return Err(IngestError::TooLarge(bytes.len(), max_document_bytes));
    }

    match kind {
        SourceKind::Pdf => extract_pdf(bytes),
        SourceKind::Text => Ok(ExtractedDocument {
            text: String::from_utf8_lossy(bytes).into_owned(),
            page_count: 1,
        }),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<ExtractedDocument, IngestError> {
    let document = Document::load_mem(bytes)
        .map_err(|e| IngestError::Document(format!("Failed to parse PDF: {}", e)))?;

    let pages = document.get_pages();
    let page_count = pages.len();
    let mut texts = Vec::with_capacity(page_count);
    let mut failed = 0;

    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                failed += 1;
                warn!("Skipping unreadable PDF page {}: {}", page_number, e);
            }
        }
    }

    if page_count > 0 && failed == page_count {
        return Err(IngestError::Document(format!(
            "No readable pages out of {}",
            page_count
        )));
    }

    debug!(
        "Extracted text from {}/{} PDF pages",
        page_count - failed,
        page_count
    );

    Ok(ExtractedDocument {
        text: texts.join("\n"),
        page_count,
    })
}
