//! Transit schedule feed client.
//!
//! This module fetches the departure board of a station from the train data
//! web service and decodes it into [`StationSchedule`].
//!
//! Key characteristics of the feed:
//! - The payload is JSON wrapped in an XML envelope
//! - The JSON is an XML-to-JSON conversion, so lists may be flattened,
//!   numbers are strings, and empty lists may be missing entirely
//! - Each train lists its calling points in travel order, with a departed
//!   flag per stop

mod cache;
mod client;
mod envelope;
mod error;
mod types;

use async_trait::async_trait;

use crate::domain::StationCode;

pub use cache::{CachedScheduleSource, FeedCacheConfig};
pub use client::{FeedConfig, ScheduleClient};
pub use envelope::{decode_schedule, envelope_text};
pub use error::FeedError;
pub use types::{ScheduleDocument, StationSchedule, Stop, TrainItem};

/// Anything that can produce the departure board of a station.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch and decode the current schedule for a station.
    async fn station_schedule(&self, station: &StationCode) -> Result<StationSchedule, FeedError>;
}
