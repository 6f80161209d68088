//! Caching layer for station schedules.
//!
//! Several providers often watch routes out of the same origin station.
//! Caching each station's board for less than one poll interval lets them
//! share a single fetch per cycle while every cycle still sees fresh data.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::StationCode;

use super::ScheduleSource;
use super::error::FeedError;
use super::types::StationSchedule;

/// Configuration for the schedule cache.
#[derive(Debug, Clone)]
pub struct FeedCacheConfig {
    /// TTL for cached boards. Keep it below the poll interval.
    pub ttl: Duration,

    /// Maximum number of cached stations.
    pub max_capacity: u64,
}

impl Default for FeedCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 256,
        }
    }
}

/// Schedule source with a per-station TTL cache in front of it.
///
/// Only successful fetches are cached; failures go straight back to the
/// caller and the next request tries the upstream again.
pub struct CachedScheduleSource<S> {
    inner: S,
    boards: MokaCache<StationCode, Arc<StationSchedule>>,
}

impl<S: ScheduleSource> CachedScheduleSource<S> {
    /// Wrap a schedule source.
    pub fn new(inner: S, config: &FeedCacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, boards }
    }

    /// Access the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached stations (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.boards.entry_count()
    }

    /// Drop all cached boards.
    pub fn invalidate_all(&self) {
        self.boards.invalidate_all();
    }
}

#[async_trait]
impl<S: ScheduleSource> ScheduleSource for CachedScheduleSource<S> {
    async fn station_schedule(&self, station: &StationCode) -> Result<StationSchedule, FeedError> {
        if let Some(cached) = self.boards.get(station).await {
            trace!(%station, "schedule cache hit");
            return Ok(cached.as_ref().clone());
        }

        let schedule = self.inner.station_schedule(station).await?;
        self.boards
            .insert(station.clone(), Arc::new(schedule.clone()))
            .await;

        Ok(schedule)
    }
}
