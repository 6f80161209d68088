//! The background poll loop.
//!
//! Runs one full cycle, sleeps for a fixed interval, and repeats forever.
//! The next cycle only starts after the previous one finished, so slow
//! remote calls stretch the gap between cycles instead of piling up.

use std::time::Duration;

use tracing::{info, warn};

use crate::tracker::{CycleReport, ProviderTracker};

/// Configuration for the poll loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Sleep between the end of one cycle and the start of the next.
    pub interval: Duration,

    /// Purge notifications left by an earlier process before the first cycle.
    pub purge_on_start: bool,
}

impl PollerConfig {
    /// Set the sleep between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Enable or disable the startup purge.
    pub fn with_purge_on_start(mut self, purge: bool) -> Self {
        self.purge_on_start = purge;
        self
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            purge_on_start: true,
        }
    }
}

/// Drives a [`ProviderTracker`] on a fixed schedule.
pub struct Poller {
    tracker: ProviderTracker,
    config: PollerConfig,
    cycles: u64,
}

impl Poller {
    pub fn new(tracker: ProviderTracker, config: PollerConfig) -> Self {
        Self {
            tracker,
            config,
            cycles: 0,
        }
    }

    /// The tracker being driven.
    pub fn tracker(&self) -> &ProviderTracker {
        &self.tracker
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run the startup purge, if enabled. Failures are logged, not fatal.
    pub async fn start(&self) {
        if !self.config.purge_on_start {
            return;
        }
        if let Err(e) = self.tracker.purge_stale().await {
            warn!(error = %e, "could not list notifications for startup purge");
        }
    }

    /// Run a single cycle and log its outcome.
    pub async fn tick(&mut self) -> CycleReport {
        let report = self.tracker.run_cycle().await;
        self.cycles += 1;

        if !report.listing_failed {
            info!(
                cycle = self.cycles,
                providers = self.tracker.len(),
                added = report.added,
                removed = report.removed,
                reconciled = report.reconciled,
                poll_failures = report.poll_failures,
                apply_failures = report.apply_failures,
                orphaned = report.orphaned,
                "cycle complete"
            );
        }

        report
    }

    /// Purge, then cycle forever. Only process termination stops it.
    pub async fn run_forever(mut self) {
        self.start().await;
        loop {
            self.tick().await;
            tokio::time::sleep(self.config.interval).await;
        }
    }
}
