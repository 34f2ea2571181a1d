//! Text extraction: turn one PDF into plain text.
//!
//! The default extractor reads the PDF's embedded text layer with
//! `pdf-extract`. Scanned receipts without a text layer come back empty,
//! which the orchestrator records as a placeholder row without spending an
//! LLM call on it.
//!
//! ## Why spawn_blocking?
//!
//! Text extraction is CPU-bound and `pdf-extract` can panic on malformed
//! content streams. Running it on the blocking pool keeps the runtime
//! responsive and turns a panic into a `JoinError`, which we map to an
//! ordinary per-document failure instead of losing the whole batch.

use crate::error::DocumentError;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Anything that can produce the visible text of a document.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, DocumentError>;
}

/// PDF text extractor using the pdf-extract crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, DocumentError> {
        let bytes = std::fs::read(path).map_err(|e| DocumentError::TextExtraction {
            detail: format!("failed to read file: {e}"),
        })?;
        extract_text_from_bytes(&bytes)
    }
}

/// Extract the text layer of an in-memory PDF.
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<String, DocumentError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::TextExtraction {
        detail: e.to_string(),
    })
}

/// Run `extractor` on `path` off the async runtime.
pub async fn extract_document(
    extractor: &Arc<dyn TextExtractor>,
    path: &Path,
) -> Result<String, DocumentError> {
    let extractor = Arc::clone(extractor);
    let owned = path.to_path_buf();

    let text = tokio::task::spawn_blocking(move || extractor.extract_text(&owned))
        .await
        .map_err(|e| DocumentError::TextExtraction {
            detail: format!("extractor panicked: {e}"),
        })??;

    debug!("Extracted {} chars from {}", text.len(), path.display());
    Ok(text)
}
