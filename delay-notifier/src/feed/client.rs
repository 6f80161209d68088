//! Schedule feed HTTP client.
//!
//! Queries the train data web service for the departure board of one
//! station. The service authenticates with query-string credentials and
//! answers with an XML envelope around a JSON document.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::StationCode;

use super::ScheduleSource;
use super::envelope::decode_schedule;
use super::error::FeedError;
use super::types::StationSchedule;

/// Default base URL for the train data web service.
const DEFAULT_BASE_URL: &str = "http://traindata.njtransit.com:8092/NJTTrainData.asmx";

/// Configuration for the schedule client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Feed account username
    pub username: String,
    /// Feed account password
    pub password: String,
    /// Base URL for the service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a new config with the given credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the station schedule endpoint.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ScheduleClient {
    /// Create a new schedule client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
        })
    }

    /// Fetch the raw XML envelope for a station.
    pub async fn get_schedule_raw(&self, station: &StationCode) -> Result<String, FeedError> {
        let url = format!("{}/getTrainScheduleJSON", self.base_url);
        debug!(%station, "requesting station schedule");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
                ("station", station.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FeedError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ScheduleSource for ScheduleClient {
    async fn station_schedule(&self, station: &StationCode) -> Result<StationSchedule, FeedError> {
        let body = self.get_schedule_raw(station).await?;
        decode_schedule(&body)
    }
}
