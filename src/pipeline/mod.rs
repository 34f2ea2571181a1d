//! Pipeline stages for receipt indexing.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the orchestrator in [`crate::index`] only composes `Result`s.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ parse ──▶ writer
//! (dir)     (PDF text)  (reply)  (fields)  (CSV row)
//! ```
//!
//! 1. [`input`]  : validate the source directory and list its PDFs
//! 2. [`extract`]: read the text layer; runs in `spawn_blocking`
//! 3. [`llm`]    : one completion call per receipt; the only stage with
//!    network I/O
//! 4. [`parse`]  : find the JSON object in the reply and normalise fields
//! 5. [`writer`] : append one flushed row per document

pub mod extract;
pub mod input;
pub mod llm;
pub mod parse;
pub mod writer;
