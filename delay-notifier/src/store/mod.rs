//! Provider listing and notification store clients.
//!
//! Both live behind the same home API: `GET providers` lists the routes to
//! watch, and `notifications` offers create, list and delete. The traits
//! here are what the tracker talks to; the HTTP clients and the in-memory
//! implementations are interchangeable behind them.

mod client;
mod error;
mod memory;
mod notifications;
mod providers;

use async_trait::async_trait;

use crate::domain::{NewNotification, Notification, NotificationId, Provider};

pub use client::{ApiClient, StoreConfig};
pub use error::StoreError;
pub use memory::{InMemoryNotificationStore, StaticProviderSource};
pub use notifications::{HttpNotificationStore, parse_notifications};
pub use providers::{HttpProviderSource, ProviderDto, SkipReason, TransitRouteDto, parse_providers};

/// Yields the current provider configuration set.
#[async_trait]
pub trait ProviderSource: Send + Sync {
    /// List every provider this service can serve.
    async fn list_providers(&self) -> Result<Vec<Provider>, StoreError>;
}

/// CRUD over notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// List notifications; `only_current` restricts to those visible now.
    async fn list(&self, only_current: bool) -> Result<Vec<Notification>, StoreError>;

    /// Create a notification and return the id the store assigned.
    async fn create(&self, notification: &NewNotification) -> Result<NotificationId, StoreError>;

    /// Delete a notification by id.
    async fn delete(&self, id: &NotificationId) -> Result<(), StoreError>;
}
