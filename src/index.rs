//! Receipt-index entry points.
//!
//! [`build_index`] is the whole receipt pipeline: discover PDFs, then for
//! each one, in order, extract its text, ask the model for its fields and
//! append one CSV row. Documents are processed strictly one after another;
//! every per-document failure becomes a row of `N/A` cells, so the index
//! always has exactly one row per discovered PDF.

use crate::config::IndexConfig;
use crate::error::{DocumentError, IndexError};
use crate::output::{IndexRow, IndexStats, ParsedReceipt};
use crate::pipeline::extract::{extract_document, PdfTextExtractor, TextExtractor};
use crate::pipeline::input::{discover_documents, display_name};
use crate::pipeline::llm::{extract_fields, resolve_client, CompletionClient};
use crate::pipeline::writer::IndexWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// What happened to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// The model's reply parsed into fields.
    Parsed(ParsedReceipt),
    /// Text extraction failed or produced no text; the model was not called.
    NoText(Option<DocumentError>),
    /// The model call or reply parsing failed.
    Failed(DocumentError),
}

impl DocumentOutcome {
    /// The fields to persist for this outcome.
    pub fn into_receipt(self) -> ParsedReceipt {
        match self {
            DocumentOutcome::Parsed(r) => r,
            DocumentOutcome::NoText(_) | DocumentOutcome::Failed(_) => ParsedReceipt::unknown(),
        }
    }
}

/// Build a receipt index for every PDF directly inside `source_dir`.
///
/// # Arguments
/// * `source_dir` : directory holding the receipts (not searched recursively)
/// * `destination`: CSV file to create or overwrite
/// * `config`     : model, client, extractor and progress settings
///
/// # Returns
/// `Ok(IndexStats)` once every document has a row, even if some rows are
/// all-`N/A`.
///
/// # Errors
/// Returns `Err(IndexError)` only for fatal errors, all checked before the
/// destination is created:
/// - source directory missing or not a directory
/// - no PDF files found
/// - LLM provider not configured (missing API key)
///
/// plus a write failure on the destination itself.
pub async fn build_index(
    source_dir: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    config: &IndexConfig,
) -> Result<IndexStats, IndexError> {
    let start = Instant::now();
    let source_dir = source_dir.as_ref();
    let destination = destination.as_ref();

    // ── Step 1: Discover documents ───────────────────────────────────────
    let documents = discover_documents(source_dir, &config.extension)?;
    let total = documents.len();
    info!(
        "Found {} PDF files in '{}'. Processing...",
        total,
        source_dir.display()
    );

    // ── Step 2: Resolve client and extractor ─────────────────────────────
    let client = resolve_client(config)?;
    let extractor: Arc<dyn TextExtractor> = config
        .extractor
        .clone()
        .unwrap_or_else(|| Arc::new(PdfTextExtractor));

    // ── Step 3: Open destination ─────────────────────────────────────────
    let mut writer = IndexWriter::create(destination)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 4: One row per document, in order ───────────────────────────
    let mut stats = IndexStats {
        total_documents: total,
        output_path: destination.to_path_buf(),
        ..Default::default()
    };

    for (i, path) in documents.iter().enumerate() {
        let index = i + 1;
        let name = display_name(path);
        info!("Processing ({}/{}): {}", index, total, name);
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(index, total, &name);
        }

        let outcome = process_document(path, &extractor, &client, config).await;

        match &outcome {
            DocumentOutcome::Parsed(_) => stats.parsed_documents += 1,
            DocumentOutcome::NoText(_) => stats.empty_documents += 1,
            DocumentOutcome::Failed(_) => stats.failed_documents += 1,
        }
        if let Some(ref cb) = config.progress_callback {
            match &outcome {
                DocumentOutcome::Parsed(_) => cb.on_item_complete(index, total, &name),
                DocumentOutcome::NoText(None) => {
                    cb.on_item_error(index, total, &name, "no text layer")
                }
                DocumentOutcome::NoText(Some(e)) | DocumentOutcome::Failed(e) => {
                    cb.on_item_error(index, total, &name, &e.to_string())
                }
            }
        }

        writer.write_row(&IndexRow::new(name, outcome.into_receipt()))?;
    }

    stats.rows_written = writer.finish()?;
    stats.total_duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Index file '{}' has been created: {}/{} parsed, {}ms",
        destination.display(),
        stats.parsed_documents,
        total,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.parsed_documents);
    }

    Ok(stats)
}

/// Run one document through extraction and field extraction.
///
/// Never fails: every error is logged with the document name and folded
/// into the returned outcome.
pub async fn process_document(
    path: &Path,
    extractor: &Arc<dyn TextExtractor>,
    client: &Arc<dyn CompletionClient>,
    config: &IndexConfig,
) -> DocumentOutcome {
    let name = display_name(path);

    let text = match extract_document(extractor, path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to extract text from {}: {}", name, e);
            return DocumentOutcome::NoText(Some(e));
        }
    };

    if text.trim().is_empty() {
        warn!("No text found in {}; writing placeholder row", name);
        return DocumentOutcome::NoText(None);
    }

    match extract_fields(client, &text, config).await {
        Ok(receipt) => DocumentOutcome::Parsed(receipt),
        Err(e) => {
            warn!("LLM parsing failed for {}: {}", name, e);
            DocumentOutcome::Failed(e)
        }
    }
}
