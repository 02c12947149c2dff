//! Storage module for persisting listing result sets
//!
//! This module handles:
//! - The `ArticleRecord` persisted for every extracted article
//! - The `ResultStore` seam used by the traversal controller
//! - The JSON file backend that mirrors listing paths on disk

mod json;
mod traits;

pub use json::JsonFileStore;
pub use traits::{ResultStore, StoreError, StoreResult};

use serde::{Deserialize, Serialize};

/// Metadata of one article card on a listing page
///
/// Every field is resolved and non-empty; partially resolved cards never
/// become records. Serialized field order is fixed by declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Machine-readable publication timestamp, as found in the document
    pub posted_at: String,
    pub author: String,
    pub title: String,
    /// Absolute article URL
    pub url: String,
    pub category: String,
}
