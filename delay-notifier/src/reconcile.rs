//! Notification reconciliation against the store.
//!
//! # Protocol
//!
//! Each cycle replaces a provider's notification set wholesale:
//!
//! 1. Create every new notification, collecting the assigned ids
//! 2. Only if every create succeeded, delete every notification of the
//!    previous set
//! 3. The created set becomes the provider's new baseline
//!
//! # Critical Invariant
//!
//! The previous set is never deleted unless its replacement is fully live,
//! so a transient store failure can't leave a provider with no notifications.
//! The cost is a possible duplicate: a delete that fails after the creates
//! succeeded is reported as orphaned and not retried.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{NewNotification, Notification, NotificationId};
use crate::store::{NotificationStore, StoreError};

/// A create failed, so the previous set was left untouched.
#[derive(Debug, thiserror::Error)]
#[error("create {failed_at} of {total} failed: {source}")]
pub struct ReconcileError {
    /// 1-based position of the failing create.
    pub failed_at: usize,
    pub total: usize,
    /// Creates from this attempt that did succeed. They stay live.
    pub created: Vec<NotificationId>,
    #[source]
    pub source: StoreError,
}

/// Result of a successful [`Reconciler::apply`].
#[derive(Debug, Clone, Default)]
pub struct Applied {
    /// The new baseline: every created notification with its assigned id.
    pub notifications: Vec<Notification>,
    /// How many previous notifications were deleted.
    pub deleted: usize,
    /// Previous notifications whose delete failed. Nothing tracks them any more.
    pub orphaned: Vec<NotificationId>,
}

/// Result of [`Reconciler::retire`].
#[derive(Debug, Clone, Default)]
pub struct Retired {
    pub deleted: usize,
    pub orphaned: Vec<NotificationId>,
}

/// Applies notification sets to the store.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn NotificationStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }

    /// Replace `previous` with `new` using create-then-delete.
    ///
    /// On error nothing was deleted and the caller must keep `previous` as
    /// its baseline.
    pub async fn apply(
        &self,
        new: Vec<NewNotification>,
        previous: &[Notification],
    ) -> Result<Applied, ReconcileError> {
        let total = new.len();
        let mut applied = Vec::with_capacity(total);

        for (index, notification) in new.into_iter().enumerate() {
            match self.store.create(&notification).await {
                Ok(id) => {
                    debug!(%id, title = %notification.title, "created notification");
                    applied.push(notification.stored(id));
                }
                Err(source) => {
                    return Err(ReconcileError {
                        failed_at: index + 1,
                        total,
                        created: applied.into_iter().map(|n: Notification| n.id).collect(),
                        source,
                    });
                }
            }
        }

        let retired = self.retire(previous).await;

        Ok(Applied {
            notifications: applied,
            deleted: retired.deleted,
            orphaned: retired.orphaned,
        })
    }

    /// Delete every notification in `previous`, carrying on past failures.
    pub async fn retire(&self, previous: &[Notification]) -> Retired {
        let mut retired = Retired::default();

        for notification in previous {
            match self.store.delete(&notification.id).await {
                Ok(()) => {
                    debug!(id = %notification.id, "removed old notification");
                    retired.deleted += 1;
                }
                Err(e) => {
                    warn!(id = %notification.id, error = %e, "failed to remove notification");
                    retired.orphaned.push(notification.id.clone());
                }
            }
        }

        retired
    }
}
