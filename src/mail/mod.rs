//! Email archive conversion: a directory of `.eml` files to one PDF per
//! message plus a date-sorted `index.pdf`.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ message ──▶ text ──▶ render ──▶ <date>_<subject>.pdf
//! (*.eml)   (parse)     (clean)  (layout)        │
//!                                                ▼
//!                                   entries ──▶ index.pdf
//! ```
//!
//! Messages that fail to read, parse or render are logged and skipped; the
//! run only fails when the input or output directory is unusable.

pub mod message;
pub mod render;
pub mod text;

use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, MessageError};
use crate::output::{ArchiveEntry, ArchiveStats};
use crate::pipeline::input::{display_name, list_by_extension};
use chrono::{Local, NaiveDateTime};
use message::read_message;
use render::{render_index, render_message, FontSource};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use text::{clean_filename, format_date, MISSING_SUBJECT};
use tracing::{debug, info, warn};

/// Extension of the message files picked up from the input directory.
pub const MESSAGE_EXTENSION: &str = "eml";

/// Convert every `.eml` directly inside `input_dir` into `output_dir`.
///
/// The output directory is created if needed. `index.pdf` is written only
/// when at least one message converted; finding no messages at all is not
/// an error.
///
/// # Errors
/// Returns `Err(ArchiveError)` when the input directory is missing or
/// unreadable, the output directory cannot be created, the configured font
/// cannot be read, or the index cannot be written.
pub fn convert_archive(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ArchiveConfig,
) -> Result<ArchiveStats, ArchiveError> {
    let start = Instant::now();
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    // ── Step 1: Validate directories ─────────────────────────────────────
    if !input_dir.exists() {
        return Err(ArchiveError::InputNotFound {
            path: input_dir.to_path_buf(),
        });
    }
    if !input_dir.is_dir() {
        return Err(ArchiveError::NotADirectory {
            path: input_dir.to_path_buf(),
        });
    }
    std::fs::create_dir_all(output_dir).map_err(|source| ArchiveError::OutputDirFailed {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let font = load_font(config)?;

    // ── Step 2: Discover messages ────────────────────────────────────────
    let messages = list_by_extension(input_dir, MESSAGE_EXTENSION).map_err(|source| {
        ArchiveError::InputUnreadable {
            path: input_dir.to_path_buf(),
            source,
        }
    })?;
    let total = messages.len();
    info!("Found {} .eml files in '{}'", total, input_dir.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 3: Convert each message ─────────────────────────────────────
    let now = Local::now().naive_local();
    let mut used_names = HashSet::new();
    let mut entries = Vec::with_capacity(total);
    let mut stats = ArchiveStats {
        total_messages: total,
        ..Default::default()
    };

    for (i, path) in messages.iter().enumerate() {
        let index = i + 1;
        let name = display_name(path);
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(index, total, &name);
        }

        match convert_message(path, output_dir, &font, now, &mut used_names) {
            Ok(entry) => {
                debug!("Converted {} -> {}", name, entry.file_name);
                entries.push(entry);
                stats.converted += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_complete(index, total, &name);
                }
            }
            Err(e) => {
                warn!("Error processing {}: {}", name, e);
                stats.failed += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_error(index, total, &name, &e.to_string());
                }
            }
        }
    }

    // ── Step 4: Index ────────────────────────────────────────────────────
    if !entries.is_empty() {
        let index_path = output_dir.join(&config.index_file_name);
        write_index(&mut entries, &index_path, &font)?;
        info!("Created index at {}", index_path.display());
        stats.index_path = Some(index_path);
    }

    stats.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Successfully converted {} out of {} files ({}ms)",
        stats.converted, total, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.converted);
    }

    Ok(stats)
}

/// Convert one message into `output_dir` and describe it for the index.
///
/// `now` is the fallback date for messages without a usable `Date:` header.
/// `used_names` holds the file names already written in this run; a clash
/// gets a `_2`, `_3`, … suffix.
pub fn convert_message(
    path: &Path,
    output_dir: &Path,
    font: &FontSource,
    now: NaiveDateTime,
    used_names: &mut HashSet<String>,
) -> Result<ArchiveEntry, MessageError> {
    let record = read_message(path)?;
    let pdf = render_message(&record, font)?;

    let stem = format!(
        "{}_{}",
        format_date(record.timestamp, now),
        clean_filename(Some(
            record
                .subject
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(MISSING_SUBJECT)
        ))
    );
    let file_name = unique_file_name(&stem, used_names);
    let target = output_dir.join(&file_name);
    std::fs::write(&target, pdf).map_err(|e| MessageError::Write {
        path: target.clone(),
        detail: e.to_string(),
    })?;
    used_names.insert(file_name.clone());

    Ok(ArchiveEntry {
        file_name,
        subject: record.subject,
        date: record.date,
        sender: record.from,
        timestamp: record.timestamp.map(|t| t.timestamp()),
    })
}

fn unique_file_name(stem: &str, used: &HashSet<String>) -> String {
    let first = format!("{stem}.pdf");
    if !used.contains(&first) {
        return first;
    }
    (2..)
        .map(|n| format!("{stem}_{n}.pdf"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(first)
}

/// Sort entries by date, undated first, and render them to `path`.
fn write_index(
    entries: &mut [ArchiveEntry],
    path: &Path,
    font: &FontSource,
) -> Result<(), ArchiveError> {
    entries.sort_by_key(|e| e.timestamp);
    let failed = |detail: String| ArchiveError::IndexWriteFailed {
        path: path.to_path_buf(),
        detail,
    };
    let pdf = render_index(entries, font).map_err(|e| failed(e.to_string()))?;
    std::fs::write(path, pdf).map_err(|e| failed(e.to_string()))
}

fn load_font(config: &ArchiveConfig) -> Result<FontSource, ArchiveError> {
    match &config.font_path {
        None => Ok(FontSource::Builtin),
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|source| ArchiveError::FontUnreadable {
                path: path.clone(),
                source,
            })?;
            Ok(FontSource::TrueType(Arc::new(bytes)))
        }
    }
}
