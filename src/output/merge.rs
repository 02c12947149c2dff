//! Deduplicated export across listings
//!
//! An article filed under several categories appears in several listings.
//! The merged export keeps the first occurrence of every article URL.

use crate::store::{ArticleRecord, ResultStore, StoreError, StoreResult};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Collects every stored record, first occurrence per URL wins
///
/// Listings are read in key order, records in their stored order.
pub fn merge_articles(store: &dyn ResultStore) -> StoreResult<Vec<ArticleRecord>> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for key in store.keys()? {
        let Some(records) = store.get(&key)? else {
            continue;
        };

        for record in records {
            if seen.insert(record.url.clone()) {
                merged.push(record);
            }
        }
    }

    Ok(merged)
}

/// Writes the merged export as a pretty-printed JSON array
///
/// # Returns
///
/// The number of articles written
pub fn export_merged(store: &dyn ResultStore, output_path: &Path) -> StoreResult<usize> {
    let merged = merge_articles(store)?;
    let json = serde_json::to_string_pretty(&merged)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    fs::write(output_path, json).map_err(|source| StoreError::Io {
        path: output_path.display().to_string(),
        source,
    })?;

    Ok(merged.len())
}
