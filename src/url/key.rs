use crate::UrlError;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Storage key used when a listing URL has an empty path
const ROOT_KEY: &str = "index";

/// File suffix of a persisted listing
const RESULT_SUFFIX: &str = ".json";

/// Identity of a listing: its URL path without origin or trailing slash
///
/// The key is a pure function of the listing URL, so re-running against the
/// same listing always resolves to the same storage location. Query strings
/// and fragments do not participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingKey(String);

impl ListingKey {
    /// Derives the key for a listing URL
    ///
    /// # Examples
    ///
    /// ```
    /// use listing_harvester::url::ListingKey;
    ///
    /// let key = ListingKey::from_url("https://www.yaga-burundi.com/culture/").unwrap();
    /// assert_eq!(key.as_str(), "culture");
    ///
    /// let nested = ListingKey::from_url("https://example.com/category/sport").unwrap();
    /// assert_eq!(nested.as_str(), "category/sport");
    /// ```
    pub fn from_url(listing_url: &str) -> Result<Self, UrlError> {
        let url = Url::parse(listing_url).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        Self::from_path(url.path())
    }

    /// Derives the key for a listing URL, rejecting URLs outside `origin`
    pub fn for_origin(listing_url: &str, origin: &Url) -> Result<Self, UrlError> {
        let url = Url::parse(listing_url).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.host_str() != origin.host_str()
            || url.port_or_known_default() != origin.port_or_known_default()
        {
            return Err(UrlError::ForeignOrigin {
                url: listing_url.to_string(),
                origin: origin.to_string(),
            });
        }

        Self::from_url(listing_url)
    }

    /// Builds a key from a URL path such as `/culture/`
    fn from_path(path: &str) -> Result<Self, UrlError> {
        let trimmed = path.trim_start_matches('/').trim_end_matches('/');

        if trimmed.is_empty() {
            return Ok(Self(ROOT_KEY.to_string()));
        }

        for segment in trimmed.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(UrlError::UnsafePath(path.to_string()));
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Rebuilds a key from its string form (e.g. a path relative to the storage root)
    pub fn parse(key: &str) -> Result<Self, UrlError> {
        Self::from_path(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Location of this listing's result file under `root`
    ///
    /// The listing hierarchy is mirrored as directories; the last segment
    /// receives the `.json` suffix.
    pub fn storage_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        let mut segments = self.0.split('/').peekable();

        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{}{}", segment, RESULT_SUFFIX));
            }
        }

        path
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
