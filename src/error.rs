//! Error types for the docbatch library.
//!
//! Each tool has two error types reflecting two distinct failure modes:
//!
//! * [`IndexError`] / [`ArchiveError`]: **Fatal**: the run cannot proceed at
//!   all (missing source directory, no documents, provider not configured).
//!   Returned as `Err(..)` from [`crate::index::build_index`] and
//!   [`crate::mail::convert_archive`].
//!
//! * [`DocumentError`] / [`MessageError`]: **Non-fatal**: one input file
//!   failed (unreadable PDF, API error, malformed reply, bad `.eml`) but the
//!   batch carries on. The receipt indexer turns these into `"N/A"` cells; the
//!   archive converter skips the message.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the receipt indexer.
///
/// Document-level failures use [`DocumentError`] and end up as placeholder
/// cells in the index rather than propagated here.
#[derive(Debug, Error)]
pub enum IndexError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source directory was not found at the given path.
    #[error("The directory '{path}' does not exist.\nCheck the path and try again.")]
    SourceNotFound { path: PathBuf },

    /// Source path exists but is a file, not a directory.
    #[error("'{path}' is not a directory.")]
    NotADirectory { path: PathBuf },

    /// The directory could not be listed.
    #[error("Failed to read directory '{path}': {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No PDF files directly inside the source directory.
    #[error("No PDF files found in '{path}'.")]
    NoDocuments { path: PathBuf },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the destination CSV file.
    #[error("Failed to write index file '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single receipt document.
///
/// Logged with the document name; the row for that document is written with
/// `"N/A"` in every field it affects.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The PDF could not be read or its text layer could not be decoded.
    #[error("text extraction failed: {detail}")]
    TextExtraction { detail: String },

    /// The completion call itself failed (network, auth, provider error).
    #[error("LLM call failed: {detail}")]
    LlmFailed { detail: String },

    /// The completion call did not return within the configured timeout.
    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The reply contained nothing that looks like a JSON object.
    #[error("no JSON object found in reply")]
    NoStructuredPayload,

    /// A `{...}` span was found but is not valid JSON.
    #[error("reply JSON could not be parsed: {detail}")]
    MalformedPayload { detail: String },
}

/// All fatal errors returned by the email archive converter.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Input directory was not found at the given path.
    #[error("Input directory '{path}' does not exist.")]
    InputNotFound { path: PathBuf },

    /// Input path exists but is not a directory.
    #[error("'{path}' is not a directory.")]
    NotADirectory { path: PathBuf },

    /// The input directory could not be listed.
    #[error("Failed to read directory '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured TrueType font could not be read.
    #[error("Failed to load font '{path}': {source}")]
    FontUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The index PDF could not be rendered or written.
    #[error("Failed to write archive index '{path}': {detail}")]
    IndexWriteFailed { path: PathBuf, detail: String },
}

/// A non-fatal error for a single `.eml` message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MessageError {
    /// The file could not be read from disk.
    #[error("could not read message: {detail}")]
    Read { detail: String },

    /// The bytes are not a parseable RFC 5322 message.
    #[error("not a valid RFC 5322 message")]
    Parse,

    /// PDF layout or serialisation failed.
    #[error("PDF rendering failed: {detail}")]
    Render { detail: String },

    /// The rendered PDF could not be written.
    #[error("could not write '{path}': {detail}")]
    Write { path: PathBuf, detail: String },
}
