//! Progress-callback trait for per-item batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::IndexConfigBuilder::progress_callback`] or
//! [`crate::config::ArchiveConfigBuilder::progress_callback`] to receive
//! events as each receipt or message is processed. The library never prints
//! progress itself; the binaries render these events with a progress bar.
//!
//! # Example
//!
//! ```rust
//! use docbatch::{BatchProgressCallback, IndexConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, index: usize, total: usize, name: &str) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("({}/{}) {} done", index, total, name);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = IndexConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by a batch run as it processes each item.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Items are processed one at a time, in discovery
/// order; `index` is 1-based.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after discovery, before the first item.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before an item is read.
    fn on_item_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an item produced its output.
    fn on_item_complete(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an item failed (the batch continues).
    ///
    /// For the receipt indexer this means a placeholder row was written.
    fn on_item_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every item has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the config structs.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
