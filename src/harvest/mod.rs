//! Harvest module for listing traversal and extraction
//!
//! This module contains the core harvesting logic, including:
//! - The `ListingPage` seam over the browser
//! - The load-more traversal state machine
//! - URI-too-long detection on background responses
//! - Article record extraction
//! - The per-run coordinator

mod browser;
mod controller;
mod coordinator;
mod extractor;
mod monitor;
mod page;

pub use browser::{ChromePage, ChromeSession};
pub use controller::{LoadMoreControl, TraversalController, TraversalOutcome};
pub use coordinator::{run_harvest, HarvestReport, Harvester, ListingFailure, PageSource};
pub use extractor::RecordExtractor;
pub use monitor::{is_uri_too_long, ErrorSignal, NetworkErrorMonitor, URI_TOO_LONG_SIGNATURE};
pub use page::{BrowserError, ListingPage, ResourceKind, ResponseEvent, ResponseStream};
