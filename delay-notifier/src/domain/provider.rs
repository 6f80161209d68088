//! Provider (monitored route) types.

use std::fmt;

use chrono::Duration;

use super::{ProviderId, StationCode};

/// Default display duration for transit-delay notifications, in minutes.
pub const DEFAULT_DISPLAY_MINUTES: i64 = 15;

/// Longest display duration a provider may ask for, in minutes (one week).
pub const MAX_DISPLAY_MINUTES: i64 = 7 * 24 * 60;

/// The kind of a provider, as tagged by the provider listing.
///
/// Each kind is served by one handler in the
/// [`HandlerRegistry`](crate::handler::HandlerRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Delays and cancellations on a commuter rail route.
    TransitDelay,
}

impl ProviderKind {
    /// Map a wire `type` tag to a kind. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "NJTransit" => Some(ProviderKind::TransitDelay),
            _ => None,
        }
    }

    /// The wire `type` tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            ProviderKind::TransitDelay => "NJTransit",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A monitored direction of travel between two stations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    pub origin: StationCode,
    pub destination: StationCode,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}

/// A provider configuration as returned by the provider listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    pub id: ProviderId,
    pub kind: ProviderKind,
    pub route: Route,
    /// How long each produced notification stays visible.
    pub display_duration: Duration,
}

impl Provider {
    /// Create a transit-delay provider with the default display duration.
    pub fn transit_delay(id: ProviderId, origin: StationCode, destination: StationCode) -> Self {
        Self {
            id,
            kind: ProviderKind::TransitDelay,
            route: Route {
                origin,
                destination,
            },
            display_duration: Duration::minutes(DEFAULT_DISPLAY_MINUTES),
        }
    }

    /// Override the display duration.
    pub fn with_display_duration(mut self, duration: Duration) -> Self {
        self.display_duration = duration;
        self
    }
}
