//! Notification store client.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::{NewNotification, Notification, NotificationId};

use super::NotificationStore;
use super::client::{ApiClient, expect_status};
use super::error::StoreError;

/// Notification CRUD over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNotificationStore {
    api: ApiClient,
}

impl HttpNotificationStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

/// Body some servers return from a create instead of a `Location` header.
#[derive(Deserialize)]
struct CreatedBody {
    #[serde(rename = "_id")]
    id: NotificationId,
}

/// Parse a notification listing, skipping records that don't decode.
///
/// The store is shared with other feeds, so one foreign record with an
/// unexpected shape must not hide the rest of the listing.
pub fn parse_notifications(payload: Vec<Value>) -> Vec<Notification> {
    payload
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Notification>(item) {
            Ok(notification) => Some(notification),
            Err(e) => {
                warn!(error = %e, "skipping undecodable notification");
                None
            }
        })
        .collect()
}

/// Take the id from the last path segment of a `Location` header.
fn id_from_location(location: &str) -> Option<NotificationId> {
    let segment = location.trim_end_matches('/').rsplit('/').next()?;
    NotificationId::new(segment.to_string()).ok()
}

#[async_trait]
impl NotificationStore for HttpNotificationStore {
    async fn list(&self, only_current: bool) -> Result<Vec<Notification>, StoreError> {
        let response = self
            .api
            .get("notifications", self.api.query_timeout)
            .query(&[("only_current", if only_current { "true" } else { "false" })])
            .send()
            .await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;

        let body = response.text().await?;
        let payload: Vec<Value> = serde_json::from_str(&body).map_err(|e| StoreError::Json {
            message: e.to_string(),
        })?;

        Ok(parse_notifications(payload))
    }

    async fn create(&self, notification: &NewNotification) -> Result<NotificationId, StoreError> {
        let response = self
            .api
            .post("notifications")
            .json(notification)
            .send()
            .await?;
        let response = expect_status(response, &[StatusCode::CREATED]).await?;

        if let Some(id) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(id_from_location)
        {
            return Ok(id);
        }

        let body = response.text().await?;
        serde_json::from_str::<CreatedBody>(&body)
            .map(|created| created.id)
            .map_err(|_| StoreError::MissingId)
    }

    async fn delete(&self, id: &NotificationId) -> Result<(), StoreError> {
        let url = self.api.item_url("notifications", id.as_str())?;
        let response = self.api.delete(url).send().await?;
        expect_status(response, &[StatusCode::NO_CONTENT, StatusCode::OK]).await?;
        Ok(())
    }
}
