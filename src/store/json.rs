//! JSON file storage implementation
//!
//! One pretty-printed JSON array per listing, laid out under a storage root
//! that mirrors the listing URL hierarchy.

use crate::store::traits::{ResultStore, StoreError, StoreResult};
use crate::store::ArticleRecord;
use crate::url::ListingKey;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const RESULT_EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = ".tmp";

/// File-backed result store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `root`
    ///
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the result file for `key`
    pub fn path_for(&self, key: &ListingKey) -> PathBuf {
        key.storage_path(&self.root)
    }

    fn read_records(path: &Path) -> StoreResult<Option<Vec<ArticleRecord>>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };

        let records: Vec<ArticleRecord> = serde_json::from_str(&content)?;
        Ok(Some(records))
    }

    fn collect_keys(&self, dir: &Path, keys: &mut Vec<ListingKey>) -> StoreResult<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_error(dir, e)),
        };

        for entry in entries {
            let path = entry.map_err(|e| io_error(dir, e))?.path();

            if path.is_dir() {
                self.collect_keys(&path, keys)?;
                continue;
            }

            if path.extension().and_then(|ext| ext.to_str()) != Some(RESULT_EXTENSION) {
                continue;
            }

            let relative = path
                .strip_prefix(&self.root)
                .map_err(|_| StoreError::UnknownEntry(path.display().to_string()))?
                .with_extension("");
            let key_str = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            match ListingKey::parse(&key_str) {
                Ok(key) => keys.push(key),
                Err(_) => return Err(StoreError::UnknownEntry(path.display().to_string())),
            }
        }

        Ok(())
    }
}

impl ResultStore for JsonFileStore {
    fn has(&self, key: &ListingKey) -> StoreResult<bool> {
        let path = self.path_for(key);

        match Self::read_records(&path) {
            Ok(Some(records)) => Ok(!records.is_empty()),
            Ok(None) => Ok(false),
            Err(e) => {
                tracing::warn!("Ignoring unreadable result {}: {}", path.display(), e);
                Ok(false)
            }
        }
    }

    fn get(&self, key: &ListingKey) -> StoreResult<Option<Vec<ArticleRecord>>> {
        Self::read_records(&self.path_for(key))
    }

    fn put(&mut self, key: &ListingKey, records: &[ArticleRecord]) -> StoreResult<()> {
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(records)?;

        // Whole-file replace: write a sibling then rename over the target
        let mut temp = path.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        fs::write(&temp, json.as_bytes()).map_err(|e| io_error(&temp, e))?;
        fs::rename(&temp, &path).map_err(|e| io_error(&path, e))?;

        tracing::info!("Saved {} articles to {}", records.len(), path.display());
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<ListingKey>> {
        let mut keys = Vec::new();
        self.collect_keys(&self.root, &mut keys)?;
        keys.sort();
        Ok(keys)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
