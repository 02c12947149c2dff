//! Result store trait and error types
//!
//! This module defines the trait interface for result set backends and
//! associated error types.

use crate::store::ArticleRecord;
use crate::url::ListingKey;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unrecognized result file: {0}")]
    UnknownEntry(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for listing result set backends
///
/// A result set is written once, as a whole, at the end of a traversal.
/// There is no incremental append and no merge with prior content.
pub trait ResultStore {
    /// Returns true iff a result set exists for `key` and holds at least one record
    ///
    /// An existing empty result set does not count as done.
    fn has(&self, key: &ListingKey) -> StoreResult<bool>;

    /// Reads the result set stored for `key`, if any
    fn get(&self, key: &ListingKey) -> StoreResult<Option<Vec<ArticleRecord>>>;

    /// Replaces the result set for `key` with `records`
    ///
    /// # Arguments
    ///
    /// * `key` - The listing identity
    /// * `records` - Every record extracted for the listing, in document order
    fn put(&mut self, key: &ListingKey, records: &[ArticleRecord]) -> StoreResult<()>;

    /// Lists every stored listing key in sorted order
    fn keys(&self) -> StoreResult<Vec<ListingKey>>;
}
