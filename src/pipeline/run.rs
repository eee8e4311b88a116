// src/pipeline/run.rs

//! Feed relay entry points.
//!
//! - `Relay::run_feed`: fetch → select → deliver for a single feed
//! - `Relay::run_all`: every configured feed, in order

use std::time::Duration;

use crate::error::Result;
use crate::models::{Config, FeedSource};
use crate::pipeline::{DeliveryOrchestrator, select};
use crate::services::{FeedFetcher, Messenger};
use crate::storage::SeenStore;

/// Settings the relay takes from the configuration file.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Destination chat
    pub chat_id: i64,
    /// Pause after each delivered message
    pub interval: Duration,
    /// Log a failing feed and continue with the next one
    pub isolate_feed_failures: bool,
}

impl RelayOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chat_id: config.telegram.chat_id,
            interval: Duration::from_secs(config.delivery.interval_secs),
            isolate_feed_failures: config.delivery.isolate_feed_failures,
        }
    }
}

/// Outcome of one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOutcome {
    pub feed: String,
    pub fetched: usize,
    pub delivered: usize,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<FeedOutcome>,
    /// Names of feeds that failed (only with isolated failures)
    pub failed: Vec<String>,
}

impl RunSummary {
    /// Total number of delivered entries.
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().map(|o| o.delivered).sum()
    }
}

/// Wires the store and collaborators together.
pub struct Relay<'a> {
    store: &'a SeenStore,
    fetcher: &'a dyn FeedFetcher,
    messenger: &'a dyn Messenger,
    options: RelayOptions,
}

impl<'a> Relay<'a> {
    pub fn new(
        store: &'a SeenStore,
        fetcher: &'a dyn FeedFetcher,
        messenger: &'a dyn Messenger,
        options: RelayOptions,
    ) -> Self {
        Self {
            store,
            fetcher,
            messenger,
            options,
        }
    }

    /// Relay new entries of one feed.
    pub async fn run_feed(&self, feed: &FeedSource) -> Result<FeedOutcome> {
        log::info!("Feed: {}, URL: {}", feed.name, feed.url);

        self.store.ensure_namespace(&feed.name)?;

        let entries = self.fetcher.fetch(feed).await?;
        let fetched = entries.len();

        let selection = select(self.store, &feed.name, entries)?;
        if selection.is_empty() {
            log::info!("Nothing to send for {}", feed.name);
            return Ok(FeedOutcome {
                feed: feed.name.clone(),
                fetched,
                delivered: 0,
            });
        }

        log::info!(
            "{}: {} of {} entries are new",
            feed.name,
            selection.len(),
            fetched
        );

        let orchestrator = DeliveryOrchestrator::new(
            self.store,
            self.messenger,
            self.options.chat_id,
            self.options.interval,
        );
        let report = orchestrator.run(&feed.name, &selection).await?;

        Ok(FeedOutcome {
            feed: feed.name.clone(),
            fetched,
            delivered: report.delivered,
        })
    }

    /// Relay every feed in order.
    ///
    /// The first error aborts the run unless failures are isolated per feed.
    pub async fn run_all(&self, feeds: &[FeedSource]) -> Result<RunSummary> {
        log::info!("Start to send");
        let mut summary = RunSummary::default();

        for feed in feeds {
            match self.run_feed(feed).await {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(e) if self.options.isolate_feed_failures => {
                    log::error!("Feed {} failed: {}", feed.name, e);
                    summary.failed.push(feed.name.clone());
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Stop to send: {} delivered, {} feed(s) failed",
            summary.delivered(),
            summary.failed.len()
        );
        Ok(summary)
    }
}
