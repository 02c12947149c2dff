//! Output module for reporting on harvested listings
//!
//! This module handles:
//! - Statistics over the result store
//! - Printing the totals of a harvest run
//! - Exporting a deduplicated article list across listings

mod merge;
pub mod stats;

pub use merge::{export_merged, merge_articles};
pub use stats::{load_statistics, print_report, print_statistics, ListingStat, StoreStatistics};
