//! Domain types for the delay notifier.
//!
//! This module contains the validated types shared by the feed, the stores
//! and the reconciliation loop. Identifiers and station codes enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod id;
mod notification;
mod provider;
mod station;

pub use id::{InvalidId, NotificationId, ProviderId};
pub use notification::{NewNotification, Notification};
pub use provider::{DEFAULT_DISPLAY_MINUTES, MAX_DISPLAY_MINUTES, Provider, ProviderKind, Route};
pub use station::{InvalidStationCode, StationCode};
