//! Listing Harvester: exhaustive "load more" listing scraper
//!
//! This crate expands paginated listing pages in a headless browser until the
//! listing is exhausted, extracts article metadata from the rendered document,
//! and persists one JSON result set per listing, skipping listings that were
//! already harvested.

pub mod config;
pub mod harvest;
pub mod output;
pub mod state;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] harvest::BrowserError),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Listing {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition {
        from: state::TraversalPhase,
        to: state::TraversalPhase,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Listing {url} is not under origin {origin}")]
    ForeignOrigin { url: String, origin: String },

    #[error("Unsafe listing path: {0}")]
    UnsafePath(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{RecordExtractor, TraversalController, TraversalOutcome};
pub use state::{StopReason, TraversalPhase};
pub use store::{ArticleRecord, JsonFileStore, ResultStore};
pub use url::ListingKey;
