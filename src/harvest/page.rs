//! The rendered listing page the traversal drives
//!
//! `ListingPage` is the seam between the traversal state machine and the
//! browser. Production code implements it on a Chrome tab; tests implement it
//! with scripted documents.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Errors raised while driving the browser
///
/// All of them are fatal for the listing being traversed.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to start browser: {0}")]
    Launch(String),

    #[error("Failed to open {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Element '{selector}' not found: {message}")]
    ElementNotFound { selector: String, message: String },

    #[error("Click on '{selector}' failed: {message}")]
    Click { selector: String, message: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Failed to read document: {0}")]
    Content(String),

    #[error("Network event subscription failed: {0}")]
    Events(String),
}

/// Kind of resource a network response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Xhr,
    Fetch,
    Other,
}

impl ResourceKind {
    /// Returns true for responses issued by page scripts rather than navigation
    pub fn is_background(&self) -> bool {
        matches!(self, Self::Xhr | Self::Fetch)
    }
}

/// A completed network response observed while the listing is expanded
#[derive(Debug, Clone)]
pub struct ResponseEvent {
    pub url: String,
    pub resource: ResourceKind,
    pub body: String,
}

/// Receiving end of the page's response events
pub type ResponseStream = UnboundedReceiver<ResponseEvent>;

/// A rendered listing page
#[async_trait]
pub trait ListingPage: Send + Sync {
    /// The listing URL this page was opened for
    fn url(&self) -> &str;

    /// Returns true if at least one element matches `selector`
    async fn exists(&self, selector: &str) -> Result<bool, BrowserError>;

    /// Returns true if the first element matching `selector` carries `class`
    ///
    /// Returns false when nothing matches.
    async fn has_class(&self, selector: &str, class: &str) -> Result<bool, BrowserError>;

    /// Clicks the first element matching `selector`
    ///
    /// Fails with `BrowserError::ElementNotFound` if the element vanished.
    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// Scrolls the viewport to the current end of the document
    async fn scroll_to_end(&self) -> Result<(), BrowserError>;

    /// Serialized HTML of the current document
    async fn content(&self) -> Result<String, BrowserError>;

    /// Starts delivering completed network responses
    ///
    /// Called once per traversal, before the first click.
    async fn responses(&mut self) -> Result<ResponseStream, BrowserError>;
}
