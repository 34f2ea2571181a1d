//! # docbatch
//!
//! Two small batch tools over a directory of documents:
//!
//! * **Receipt indexing**: read the text layer of every PDF receipt, ask an
//!   LLM for the total, currency, date and a short description, and write
//!   one CSV row per receipt.
//! * **Email archiving**: render every `.eml` message as a PDF and write a
//!   date-sorted `index.pdf` next to them.
//!
//! ## Pipeline Overview
//!
//! ```text
//! receipts/*.pdf
//!  │
//!  ├─ 1. Input    list PDFs directly inside the source directory
//!  ├─ 2. Extract  text layer via pdf-extract (CPU-bound, spawn_blocking)
//!  ├─ 3. LLM      one completion per receipt, JSON object expected back
//!  ├─ 4. Parse    strict JSON, then a brace scan; amounts normalised
//!  └─ 5. Output   one flushed CSV row per document, "N/A" on any failure
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docbatch::{build_index, IndexConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider credentials come from OPENAI_API_KEY (or the provider's own variable).
//!     let config = IndexConfig::default();
//!     let stats = build_index("receipts/", "index.csv", &config).await?;
//!     eprintln!("{}/{} receipts parsed", stats.parsed_documents, stats.total_documents);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `receipts2csv` and `eml2pdf` binaries (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docbatch = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod index;
pub mod mail;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ArchiveConfig, ArchiveConfigBuilder, IndexConfig, IndexConfigBuilder};
pub use error::{ArchiveError, DocumentError, IndexError, MessageError};
pub use index::{build_index, process_document, DocumentOutcome};
pub use mail::{convert_archive, convert_message};
pub use output::{
    Amount, ArchiveEntry, ArchiveStats, Field, IndexRow, IndexStats, ParsedReceipt, UNKNOWN,
};
pub use pipeline::extract::{PdfTextExtractor, TextExtractor};
pub use pipeline::llm::{CompletionClient, CompletionRequest, LlmCompletionClient};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
