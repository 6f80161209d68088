//! Notification records.
//!
//! A [`NewNotification`] has not been stored yet and therefore has no id.
//! Creating it in the store yields a [`Notification`] carrying the assigned
//! [`NotificationId`]; only those can be deleted later.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::NotificationId;

/// A notification that has not been created in the store yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNotification {
    pub title: String,
    pub message: Option<String>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    /// Feed identifier, used to find our notifications again on restart.
    pub source: Option<String>,
}

impl NewNotification {
    /// Attach the id assigned by the store.
    pub fn stored(self, id: NotificationId) -> Notification {
        Notification {
            id,
            title: self.title,
            message: self.message,
            start_time: self.start_time,
            end_time: self.end_time,
            source: self.source,
        }
    }
}

/// A notification as it exists in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub source: Option<String>,
}

impl Notification {
    /// Whether this notification was produced by the given feed.
    pub fn has_source(&self, source: &str) -> bool {
        self.source.as_deref() == Some(source)
    }

    /// Whether the notification is visible at `now`.
    pub fn is_current(&self, now: DateTime<FixedOffset>) -> bool {
        self.start_time <= now && now < self.end_time
    }
}
