//! Listing traversal state machine
//!
//! Drives one listing through `Init → Expanding → Extracting → Done`:
//! skip if already harvested, click "load more" until the listing is
//! exhausted (or cut short), then extract and persist once.

use crate::config::{SelectorConfig, TraversalConfig};
use crate::harvest::extractor::RecordExtractor;
use crate::harvest::monitor::{ErrorSignal, NetworkErrorMonitor};
use crate::harvest::page::ListingPage;
use crate::state::{StopReason, TraversalPhase};
use crate::store::ResultStore;
use crate::url::ListingKey;
use crate::HarvestError;
use std::time::Duration;

/// Selectors locating the load-more control
#[derive(Debug, Clone)]
pub struct LoadMoreControl {
    pub holder: String,
    pub button: String,
    pub hidden_class: String,
}

impl From<&SelectorConfig> for LoadMoreControl {
    fn from(config: &SelectorConfig) -> Self {
        Self {
            holder: config.load_more_holder.clone(),
            button: config.load_more_button.clone(),
            hidden_class: config.hidden_class.clone(),
        }
    }
}

/// How a traversal ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalOutcome {
    /// A non-empty result already existed; the page was not touched
    Skipped,

    /// The listing was expanded, extracted and persisted
    Harvested {
        records: usize,
        expansions: u32,
        stop_reason: StopReason,
    },
}

/// Ephemeral per-listing state
#[derive(Debug)]
struct TraversalState {
    phase: TraversalPhase,
    expansions: u32,
    signal: ErrorSignal,
}

impl TraversalState {
    fn new() -> Self {
        Self {
            phase: TraversalPhase::Init,
            expansions: 0,
            signal: ErrorSignal::new(),
        }
    }

    fn advance(&mut self, next: TraversalPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}

/// Traversal controller for a single listing at a time
pub struct TraversalController<S: ResultStore> {
    store: S,
    extractor: RecordExtractor,
    control: LoadMoreControl,
    delay: Duration,
    max_expansions: u32,
}

impl<S: ResultStore> TraversalController<S> {
    /// Creates a controller
    ///
    /// # Arguments
    ///
    /// * `store` - Where result sets are checked and written
    /// * `extractor` - Turns the expanded document into records
    /// * `control` - Selectors of the load-more control
    /// * `config` - Delay and expansion bound
    pub fn new(
        store: S,
        extractor: RecordExtractor,
        control: LoadMoreControl,
        config: &TraversalConfig,
    ) -> Self {
        Self {
            store,
            extractor,
            control,
            delay: Duration::from_millis(config.load_more_delay_ms),
            max_expansions: config.max_expansions,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the full state machine against `page`
    ///
    /// # Returns
    ///
    /// * `Ok(TraversalOutcome::Skipped)` - A non-empty result already existed
    /// * `Ok(TraversalOutcome::Harvested { .. })` - Exactly one result set was written
    /// * `Err(HarvestError)` - Browser or storage failure; nothing was written
    pub async fn traverse<P>(&mut self, page: &mut P) -> Result<TraversalOutcome, HarvestError>
    where
        P: ListingPage + ?Sized,
    {
        let key = ListingKey::from_url(page.url())?;
        let mut state = TraversalState::new();

        // Init
        if self.store.has(&key)? {
            tracing::info!("Listing {} already harvested, skipping", key);
            state.advance(TraversalPhase::Done)?;
            return Ok(TraversalOutcome::Skipped);
        }

        state.advance(TraversalPhase::Expanding)?;
        let mut monitor = NetworkErrorMonitor::new(page.responses().await?, state.signal.clone());
        tracing::info!("Processing {}...", page.url());

        // Expanding
        let stop_reason = loop {
            if let Some(reason) = self.stop_condition(&*page, &mut monitor, &state).await? {
                break reason;
            }

            page.click(&self.control.button).await?;
            state.expansions += 1;
            tracing::debug!("Load more clicked ({} so far)", state.expansions);

            page.scroll_to_end().await?;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            state.advance(TraversalPhase::Expanding)?;
        };

        tracing::info!(
            "Stopped expanding {} after {} clicks: {}",
            key,
            state.expansions,
            stop_reason
        );

        // Extracting
        state.advance(TraversalPhase::Extracting)?;
        let html = page.content().await?;
        let records = self.extractor.extract(&html);
        self.store.put(&key, &records)?;
        state.advance(TraversalPhase::Done)?;

        Ok(TraversalOutcome::Harvested {
            records: records.len(),
            expansions: state.expansions,
            stop_reason,
        })
    }

    /// Evaluates the stop conditions in order
    async fn stop_condition<P>(
        &self,
        page: &P,
        monitor: &mut NetworkErrorMonitor,
        state: &TraversalState,
    ) -> Result<Option<StopReason>, HarvestError>
    where
        P: ListingPage + ?Sized,
    {
        if !page.exists(&self.control.button).await? {
            return Ok(Some(StopReason::ControlAbsent));
        }

        if page
            .has_class(&self.control.holder, &self.control.hidden_class)
            .await?
        {
            return Ok(Some(StopReason::ControlHidden));
        }

        if monitor.poll() {
            return Ok(Some(StopReason::NetworkError));
        }

        if state.expansions >= self.max_expansions {
            tracing::warn!(
                "Reached {} expansions on {}, extracting what is loaded",
                self.max_expansions,
                page.url()
            );
            return Ok(Some(StopReason::ExpansionLimit));
        }

        Ok(None)
    }
}
