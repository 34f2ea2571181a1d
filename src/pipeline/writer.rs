//! Index output: the destination CSV file.
//!
//! The writer truncates any existing file on open and flushes after every
//! row. A crash mid-run therefore leaves a valid but truncated CSV holding
//! every row written so far; there is no completion marker.

use crate::error::IndexError;
use crate::output::{IndexRow, INDEX_HEADER};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Exclusive owner of the destination CSV for the duration of a run.
#[derive(Debug)]
pub struct IndexWriter {
    inner: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl IndexWriter {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> Result<Self, IndexError> {
        let inner = csv::Writer::from_path(path).map_err(|e| write_failed(path, e))?;
        let mut writer = Self {
            inner,
            path: path.to_path_buf(),
            rows: 0,
        };
        writer
            .inner
            .write_record(INDEX_HEADER)
            .map_err(|e| write_failed(path, e))?;
        writer.flush()?;
        Ok(writer)
    }

    /// Append one data row and flush it to disk.
    pub fn write_row(&mut self, row: &IndexRow) -> Result<(), IndexError> {
        self.inner
            .write_record(row.to_record())
            .map_err(|e| write_failed(&self.path, e))?;
        self.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far (header excluded).
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and close, returning the number of data rows.
    pub fn finish(mut self) -> Result<usize, IndexError> {
        self.flush()?;
        Ok(self.rows)
    }

    fn flush(&mut self) -> Result<(), IndexError> {
        self.inner
            .flush()
            .map_err(|e| write_failed(&self.path, e))
    }
}

fn write_failed(path: &Path, e: impl std::fmt::Display) -> IndexError {
    IndexError::OutputWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}
