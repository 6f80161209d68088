//! Provider handlers and the kind → handler registry.
//!
//! A handler turns one provider's configuration into the notification set
//! that should currently be live for it. The tracker only sees the
//! [`ProviderHandler`] contract, so supporting a new provider kind means
//! registering another handler, not touching the tracker.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use tracing::debug;

use crate::anomaly::{DEFAULT_DELAY_THRESHOLD_SECS, filter_anomalies};
use crate::domain::{NewNotification, Provider, ProviderKind};
use crate::feed::{FeedError, ScheduleSource};
use crate::stations::StationDirectory;
use crate::synth::{RouteNames, TRANSIT_SOURCE, synthesize};

/// Errors from polling a single provider.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The schedule could not be fetched or decoded
    #[error("schedule feed error: {0}")]
    Feed(#[from] FeedError),

    /// The provider was bound to a handler for another kind
    #[error("handler cannot serve {0} providers")]
    WrongKind(ProviderKind),
}

/// Common poll contract for every provider kind.
#[async_trait]
pub trait ProviderHandler: Send + Sync {
    /// Source tag stamped on every notification this handler produces.
    fn source_tag(&self) -> &str;

    /// Compute the notifications that should be live for `provider` now.
    async fn poll(&self, provider: &Provider) -> Result<Vec<NewNotification>, PollError>;
}

/// Maps provider kinds to the handler serving them.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<ProviderKind, Arc<dyn ProviderHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for a kind.
    pub fn register(&mut self, kind: ProviderKind, handler: Arc<dyn ProviderHandler>) {
        self.handlers.insert(kind, handler);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, kind: ProviderKind, handler: Arc<dyn ProviderHandler>) -> Self {
        self.register(kind, handler);
        self
    }

    /// Handler for a kind, if one is registered.
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderHandler>> {
        self.handlers.get(&kind).cloned()
    }

    /// Distinct source tags of all registered handlers, sorted.
    pub fn source_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .handlers
            .values()
            .map(|h| h.source_tag().to_string())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Handler for transit-delay providers.
///
/// Fetches the origin station's board, keeps the delayed or canceled trains
/// heading toward the destination, and renders one notification per train.
pub struct TransitDelayHandler {
    schedules: Arc<dyn ScheduleSource>,
    stations: Arc<StationDirectory>,
    threshold_secs: i64,
}

impl TransitDelayHandler {
    pub fn new(schedules: Arc<dyn ScheduleSource>, stations: Arc<StationDirectory>) -> Self {
        Self {
            schedules,
            stations,
            threshold_secs: DEFAULT_DELAY_THRESHOLD_SECS,
        }
    }

    /// Set the lateness that counts as a delay.
    pub fn with_threshold_secs(mut self, secs: i64) -> Self {
        self.threshold_secs = secs;
        self
    }

    pub fn threshold_secs(&self) -> i64 {
        self.threshold_secs
    }
}

#[async_trait]
impl ProviderHandler for TransitDelayHandler {
    fn source_tag(&self) -> &str {
        TRANSIT_SOURCE
    }

    async fn poll(&self, provider: &Provider) -> Result<Vec<NewNotification>, PollError> {
        if provider.kind != ProviderKind::TransitDelay {
            return Err(PollError::WrongKind(provider.kind));
        }

        let route = &provider.route;
        let schedule = self.schedules.station_schedule(&route.origin).await?;

        let origin = self.stations.get(&route.origin);
        let destination = self.stations.get(&route.destination);
        if origin.is_none() || destination.is_none() {
            debug!(provider = %provider.id, %route, "route station missing from directory");
        }

        let anomalies = filter_anomalies(&schedule, origin, destination, self.threshold_secs);
        debug!(
            provider = %provider.id,
            trains = schedule.items.len(),
            anomalies = anomalies.len(),
            "filtered schedule"
        );

        // Anomalies are only found when both names resolved
        let (Some(origin), Some(destination)) = (origin, destination) else {
            return Ok(Vec::new());
        };

        Ok(synthesize(
            &anomalies,
            RouteNames {
                origin,
                destination,
            },
            provider.display_duration,
            self.threshold_secs,
            Local::now(),
        ))
    }
}
