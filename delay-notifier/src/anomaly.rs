//! Anomaly detection over a station's departure board.
//!
//! A train is an anomaly for a route when it both *qualifies* (canceled, or
//! running at least the threshold late) and runs *in the monitored
//! direction*: its stop list reaches the origin, not yet departed, before it
//! reaches the destination.

use crate::feed::{StationSchedule, TrainItem};

/// Default lateness that counts as a delay: five minutes.
pub const DEFAULT_DELAY_THRESHOLD_SECS: i64 = 5 * 60;

/// A train that is delayed or canceled within the monitored direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub train_id: String,
    pub status: String,
    pub seconds_late: i64,
    pub scheduled_departure: Option<String>,
}

impl Anomaly {
    fn from_item(item: &TrainItem) -> Self {
        Self {
            train_id: item.train_id.trim().to_string(),
            status: item.status.trim().to_string(),
            seconds_late: item.seconds_late,
            scheduled_departure: item
                .scheduled_departure
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// Whether the status text says the train is canceled.
    pub fn is_canceled(&self) -> bool {
        self.status.eq_ignore_ascii_case("canceled")
    }
}

/// Whether a train is canceled or at least `threshold_secs` late.
pub fn qualifies(item: &TrainItem, threshold_secs: i64) -> bool {
    item.is_canceled() || item.seconds_late >= threshold_secs
}

/// Where a train's stop list places it relative to the monitored route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Origin reached (not yet departed) before the destination.
    Toward,
    /// Origin stop already departed.
    Departed,
    /// Destination reached first, or one of the stations never appears.
    Elsewhere,
}

/// Scan a train's stops in order against canonical station names.
///
/// A `None` name never matches anything, so an unknown origin or
/// destination always yields [`Direction::Elsewhere`].
pub fn direction(item: &TrainItem, origin: Option<&str>, destination: Option<&str>) -> Direction {
    let mut origin_passed = false;

    for stop in &item.stops {
        if origin.is_some_and(|name| stop.is_named(name)) {
            if stop.departed {
                return Direction::Departed;
            }
            origin_passed = true;
        }
        if destination.is_some_and(|name| stop.is_named(name)) {
            return if origin_passed {
                Direction::Toward
            } else {
                Direction::Elsewhere
            };
        }
    }

    Direction::Elsewhere
}

/// Extract the anomalies on the route from `origin` to `destination`.
///
/// `origin` and `destination` are canonical (lowercase) station names, or
/// `None` when the station code is not in the directory. An empty board
/// yields no anomalies.
pub fn filter_anomalies(
    schedule: &StationSchedule,
    origin: Option<&str>,
    destination: Option<&str>,
    threshold_secs: i64,
) -> Vec<Anomaly> {
    schedule
        .items
        .iter()
        .filter(|item| qualifies(item, threshold_secs))
        .filter(|item| direction(item, origin, destination) == Direction::Toward)
        .map(Anomaly::from_item)
        .collect()
}
