//! Harvest coordinator - runs the traversal over every configured listing
//!
//! This module contains the outer loop that:
//! - Opens each listing in its own page
//! - Applies the per-listing time budget
//! - Keeps going when a single listing fails
//! - Accumulates a `HarvestReport`

use crate::config::Config;
use crate::harvest::browser::{ChromePage, ChromeSession};
use crate::harvest::controller::{LoadMoreControl, TraversalController, TraversalOutcome};
use crate::harvest::extractor::RecordExtractor;
use crate::harvest::page::{BrowserError, ListingPage};
use crate::store::{JsonFileStore, ResultStore};
use crate::url::parse_origin;
use crate::HarvestError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Opens listing pages for the coordinator
#[async_trait]
pub trait PageSource: Send + Sync {
    type Page: ListingPage;

    /// Opens `listing_url` in a fresh, isolated page
    async fn open(&self, listing_url: &str) -> Result<Self::Page, BrowserError>;

    /// Releases a page once its traversal is over
    async fn release(&self, page: Self::Page) {
        drop(page);
    }
}

#[async_trait]
impl PageSource for ChromeSession {
    type Page = ChromePage;

    async fn open(&self, listing_url: &str) -> Result<ChromePage, BrowserError> {
        ChromeSession::open(self, listing_url).await
    }

    async fn release(&self, page: ChromePage) {
        page.close().await;
    }
}

/// Failure of a single listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFailure {
    pub url: String,
    pub message: String,
}

/// Totals for one harvest run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub harvested: u32,
    pub skipped: u32,
    pub records: u64,
    pub failures: Vec<ListingFailure>,
}

impl HarvestReport {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            harvested: 0,
            skipped: 0,
            records: 0,
            failures: Vec::new(),
        }
    }

    /// Listings that reached a terminal state, successfully or not
    pub fn visited(&self) -> u32 {
        self.harvested + self.skipped + self.failures.len() as u32
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Harvest coordinator structure
pub struct Harvester<S: ResultStore> {
    controller: TraversalController<S>,
    listing_timeout: Duration,
    max_listings: usize,
}

impl<S: ResultStore> Harvester<S> {
    /// Creates a coordinator around `store`
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The origin or a selector is invalid
    pub fn new(config: &Config, store: S) -> Result<Self, HarvestError> {
        let origin = parse_origin(&config.site.origin)?;
        let extractor = RecordExtractor::new(&config.selectors, origin)?;
        let controller = TraversalController::new(
            store,
            extractor,
            LoadMoreControl::from(&config.selectors),
            &config.traversal,
        );

        Ok(Self {
            controller,
            listing_timeout: Duration::from_secs(config.traversal.listing_timeout_secs),
            max_listings: config.traversal.max_listings as usize,
        })
    }

    pub fn store(&self) -> &S {
        self.controller.store()
    }

    /// Visits `listings` in order, one page each
    ///
    /// Individual listing failures are recorded in the report and do not
    /// stop the run.
    pub async fn run<P>(&mut self, source: &P, listings: &[String]) -> HarvestReport
    where
        P: PageSource,
    {
        let mut report = HarvestReport::start();

        if listings.len() > self.max_listings {
            tracing::warn!(
                "{} listings configured, only the first {} will be visited",
                listings.len(),
                self.max_listings
            );
        }

        for (index, url) in listings.iter().take(self.max_listings).enumerate() {
            tracing::debug!("Listing {}/{}: {}", index + 1, listings.len(), url);

            match self.harvest_listing(source, url).await {
                Ok(TraversalOutcome::Skipped) => report.skipped += 1,
                Ok(TraversalOutcome::Harvested { records, .. }) => {
                    report.harvested += 1;
                    report.records += records as u64;
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", url, e);
                    report.failures.push(ListingFailure {
                        url: url.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report.finished_at = Some(Utc::now());
        tracing::info!(
            "Harvest completed: {} harvested, {} skipped, {} failed, {} records",
            report.harvested,
            report.skipped,
            report.failures.len(),
            report.records
        );

        report
    }

    async fn harvest_listing<P>(
        &mut self,
        source: &P,
        url: &str,
    ) -> Result<TraversalOutcome, HarvestError>
    where
        P: PageSource,
    {
        let mut page = source.open(url).await?;

        let budget = self.listing_timeout;
        let outcome = tokio::time::timeout(budget, self.controller.traverse(&mut page))
            .await
            .unwrap_or_else(|_| {
                Err(HarvestError::Timeout {
                    url: url.to_string(),
                    seconds: budget.as_secs(),
                })
            });

        source.release(page).await;
        outcome
    }
}

/// Runs a complete harvest with a Chrome session
///
/// This is the main entry point for a harvest. It will:
/// 1. Open the result store under the configured storage root
/// 2. Launch (or attach to) Chrome
/// 3. Traverse every configured listing
/// 4. Close the browser
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::load_config;
/// use listing_harvester::harvest::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_harvest(&config).await?;
/// println!("{} listings harvested", report.harvested);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: &Config) -> Result<HarvestReport, HarvestError> {
    let store = JsonFileStore::new(&config.output.storage_root);
    let mut harvester = Harvester::new(config, store)?;

    let session = ChromeSession::launch(&config.browser).await?;
    let report = harvester.run(&session, &config.listings).await;
    session.close().await;

    Ok(report)
}
