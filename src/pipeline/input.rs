//! Input discovery: validate a source directory and list its documents.
//!
//! Discovery is deliberately shallow: only regular files directly inside the
//! directory are considered, matched on extension case-insensitively. The
//! result is sorted by file name so the row order of an index is stable
//! across runs and platforms (raw `read_dir` order is filesystem-defined).

use crate::error::IndexError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Returns true if `path` has extension `ext` (no leading dot, any case).
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// List regular files directly inside `dir` with extension `ext`, sorted by name.
pub fn list_by_extension(dir: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, ext) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Validate the receipt source directory and list its documents.
///
/// # Errors
/// - [`IndexError::SourceNotFound`] if `dir` does not exist
/// - [`IndexError::NotADirectory`] if `dir` is a file
/// - [`IndexError::NoDocuments`] if nothing matches `ext`
pub fn discover_documents(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, IndexError> {
    if !dir.exists() {
        return Err(IndexError::SourceNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(IndexError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let files = list_by_extension(dir, ext).map_err(|e| IndexError::SourceUnreadable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    if files.is_empty() {
        return Err(IndexError::NoDocuments {
            path: dir.to_path_buf(),
        });
    }

    debug!("Discovered {} .{} files in {}", files.len(), ext, dir.display());
    Ok(files)
}

/// Display name of a document: its file name, or the whole path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
