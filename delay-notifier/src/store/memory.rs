//! In-memory store implementations.
//!
//! Serve the same traits as the HTTP clients without any API access. The
//! notification store backs `--dry-run` and, with its failure switches, the
//! reconciliation tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{NewNotification, Notification, NotificationId, Provider};

use super::error::StoreError;
use super::{NotificationStore, ProviderSource};

#[derive(Default)]
struct StoreState {
    notifications: BTreeMap<String, Notification>,
    next_id: u64,
    /// Creates allowed before every further create fails.
    creates_before_failure: Option<usize>,
    failing_deletes: HashSet<NotificationId>,
    fail_list: bool,
    deleted: Vec<NotificationId>,
}

/// Notification store that keeps everything in memory.
#[derive(Clone, Default)]
pub struct InMemoryNotificationStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a notification as if it was left over from an earlier run.
    pub async fn insert(&self, notification: Notification) {
        let mut state = self.state.lock().await;
        state
            .notifications
            .insert(notification.id.as_str().to_string(), notification);
    }

    /// Let `n` more creates succeed, then fail every create after that.
    /// `None` lifts the restriction.
    pub async fn fail_creates_after(&self, n: Option<usize>) {
        self.state.lock().await.creates_before_failure = n;
    }

    /// Make deletes of `id` fail.
    pub async fn fail_delete(&self, id: NotificationId) {
        self.state.lock().await.failing_deletes.insert(id);
    }

    /// Make listing fail.
    pub async fn fail_list(&self, fail: bool) {
        self.state.lock().await.fail_list = fail;
    }

    /// Ids currently stored, in id order.
    pub async fn ids(&self) -> Vec<NotificationId> {
        let state = self.state.lock().await;
        state.notifications.values().map(|n| n.id.clone()).collect()
    }

    /// Titles currently stored, in id order.
    pub async fn titles(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.notifications.values().map(|n| n.title.clone()).collect()
    }

    /// Ids successfully deleted so far, in order.
    pub async fn deleted(&self) -> Vec<NotificationId> {
        self.state.lock().await.deleted.clone()
    }

    /// Number of stored notifications.
    pub async fn len(&self) -> usize {
        self.state.lock().await.notifications.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn list(&self, only_current: bool) -> Result<Vec<Notification>, StoreError> {
        let state = self.state.lock().await;
        if state.fail_list {
            return Err(StoreError::Unavailable("list".to_string()));
        }

        let now = Local::now().fixed_offset();
        Ok(state
            .notifications
            .values()
            .filter(|n| !only_current || n.is_current(now))
            .cloned()
            .collect())
    }

    async fn create(&self, notification: &NewNotification) -> Result<NotificationId, StoreError> {
        let mut state = self.state.lock().await;

        match state.creates_before_failure {
            Some(0) => return Err(StoreError::Unavailable("create".to_string())),
            Some(n) => state.creates_before_failure = Some(n - 1),
            None => {}
        }

        state.next_id += 1;
        let id = NotificationId::new(format!("mem-{}", state.next_id))
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!(id = %id, title = %notification.title, "stored notification");
        let stored = notification.clone().stored(id.clone());
        state.notifications.insert(id.as_str().to_string(), stored);

        Ok(id)
    }

    async fn delete(&self, id: &NotificationId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        if state.failing_deletes.contains(id) {
            return Err(StoreError::Unavailable(format!("delete {id}")));
        }

        if state.notifications.remove(id.as_str()).is_none() {
            return Err(StoreError::Api {
                status: 404,
                message: format!("no notification {id}"),
            });
        }

        info!(id = %id, "removed notification");
        state.deleted.push(id.clone());
        Ok(())
    }
}

/// Provider source serving a replaceable, fixed list.
#[derive(Clone)]
pub struct StaticProviderSource {
    providers: Arc<Mutex<Result<Vec<Provider>, String>>>,
}

impl StaticProviderSource {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self {
            providers: Arc::new(Mutex::new(Ok(providers))),
        }
    }

    /// Replace the listing.
    pub async fn set(&self, providers: Vec<Provider>) {
        *self.providers.lock().await = Ok(providers);
    }

    /// Make every listing fail with `message` until [`set`](Self::set) is called.
    pub async fn fail(&self, message: impl Into<String>) {
        *self.providers.lock().await = Err(message.into());
    }
}

impl Default for StaticProviderSource {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ProviderSource for StaticProviderSource {
    async fn list_providers(&self) -> Result<Vec<Provider>, StoreError> {
        self.providers
            .lock()
            .await
            .clone()
            .map_err(StoreError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_notification(title: &str, offset_mins: i64) -> NewNotification {
        let start = Local::now().fixed_offset() + Duration::minutes(offset_mins);
        NewNotification {
            title: title.to_string(),
            message: None,
            start_time: start,
            end_time: start + Duration::minutes(15),
            source: Some("njtransit".to_string()),
        }
    }

    #[tokio::test]
    async fn create_list_delete() {
        let store = InMemoryNotificationStore::new();
        let id = store.create(&new_notification("a", -1)).await.unwrap();
        assert_eq!(store.len().await, 1);

        let listed = store.list(true).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);

        store.delete(&id).await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(store.deleted().await, vec![id.clone()]);

        // Second delete of the same id is a not-found error
        assert!(store.delete(&id).await.is_err());
    }

    #[tokio::test]
    async fn only_current_filters_future_notifications() {
        let store = InMemoryNotificationStore::new();
        store.create(&new_notification("now", -1)).await.unwrap();
        store.create(&new_notification("later", 60)).await.unwrap();

        assert_eq!(store.list(true).await.unwrap().len(), 1);
        assert_eq!(store.list(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_failure_switch() {
        let store = InMemoryNotificationStore::new();
        store.fail_creates_after(Some(1)).await;

        assert!(store.create(&new_notification("a", 0)).await.is_ok());
        assert!(store.create(&new_notification("b", 0)).await.is_err());
        assert!(store.create(&new_notification("c", 0)).await.is_err());

        store.fail_creates_after(None).await;
        assert!(store.create(&new_notification("d", 0)).await.is_ok());
        assert_eq!(store.titles().await, vec!["a", "d"]);
    }

    #[tokio::test]
    async fn static_provider_source_failure() {
        let source = StaticProviderSource::default();
        assert!(source.list_providers().await.unwrap().is_empty());

        source.fail("boom").await;
        assert!(source.list_providers().await.is_err());

        source.set(vec![]).await;
        assert!(source.list_providers().await.is_ok());
    }
}
