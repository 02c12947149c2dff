//! Statistics over persisted listing results
//!
//! This module summarizes what the result store holds and prints the
//! totals of a finished harvest run.

use crate::harvest::HarvestReport;
use crate::store::{ResultStore, StoreResult};
use crate::url::ListingKey;

/// Record count of one stored listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingStat {
    pub key: ListingKey,
    pub records: usize,
}

/// Summary of the result store
#[derive(Debug, Clone, Default)]
pub struct StoreStatistics {
    /// One entry per stored listing, in key order
    pub listings: Vec<ListingStat>,

    /// Total number of records across all listings
    pub total_records: usize,

    /// Listings stored with zero records (revisited on the next run)
    pub empty_listings: usize,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The result store to query
pub fn load_statistics(store: &dyn ResultStore) -> StoreResult<StoreStatistics> {
    let mut stats = StoreStatistics::default();

    for key in store.keys()? {
        let records = store.get(&key)?.map(|r| r.len()).unwrap_or(0);

        stats.total_records += records;
        if records == 0 {
            stats.empty_listings += 1;
        }
        stats.listings.push(ListingStat { key, records });
    }

    Ok(stats)
}

/// Prints store statistics to stdout
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Listings stored: {}", stats.listings.len());
    println!("  Total articles: {}", stats.total_records);
    println!("  Empty listings: {}", stats.empty_listings);
    println!();

    println!("Articles by Listing:");
    let mut by_count: Vec<_> = stats.listings.iter().collect();
    by_count.sort_by(|a, b| b.records.cmp(&a.records).then_with(|| a.key.cmp(&b.key)));

    for stat in by_count {
        let percentage = if stats.total_records > 0 {
            (stat.records as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", stat.key, stat.records, percentage);
    }
}

/// Prints the totals of a harvest run to stdout
pub fn print_report(report: &HarvestReport) {
    println!("=== Harvest Report ===\n");
    println!("  Started: {}", report.started_at.to_rfc3339());
    if let Some(finished) = report.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = report.duration_seconds() {
        println!(
            "  Duration: {} seconds ({:.2} minutes)",
            duration,
            duration as f64 / 60.0
        );
    }
    println!("  Listings visited: {}", report.visited());
    println!("  Harvested: {}", report.harvested);
    println!("  Skipped (already done): {}", report.skipped);
    println!("  Articles saved: {}", report.records);

    if !report.failures.is_empty() {
        println!("\nFailed Listings ({}):", report.failures.len());
        for failure in &report.failures {
            println!("  - {}: {}", failure.url, failure.message);
        }
    }
}
