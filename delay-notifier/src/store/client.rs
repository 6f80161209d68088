//! Shared HTTP plumbing for the provider and notification API.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, Url};

use super::error::StoreError;

/// Configuration for the provider/notification API.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL, e.g. `https://home.example.org/api/`
    pub base_url: String,
    /// HTTP basic auth username
    pub username: Option<String>,
    /// HTTP basic auth password
    pub password: Option<String>,
    /// Timeout for listing notifications, in seconds
    pub query_timeout_secs: u64,
    /// Timeout for every other request, in seconds
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Create a new config for the given base URL, without authentication.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            query_timeout_secs: 5,
            timeout_secs: 20,
        }
    }

    /// Use HTTP basic auth.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the timeout for mutating and provider requests.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the timeout for notification queries.
    pub fn with_query_timeout(mut self, secs: u64) -> Self {
        self.query_timeout_secs = secs;
        self
    }
}

/// Authenticated HTTP client bound to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: Option<(String, String)>,
    pub(crate) query_timeout: Duration,
    pub(crate) timeout: Duration,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().build()?;

        // Basic auth only applies when both halves are present
        let auth = match (config.username, config.password) {
            (Some(user), Some(pass)) if !user.is_empty() => Some((user, pass)),
            _ => None,
        };

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of one item in a collection, with `id` percent-encoded as a
    /// single path segment.
    pub fn item_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        let mut url =
            Url::parse(&self.url(collection)).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.clone()))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }

    pub(crate) fn get(&self, path: &str, timeout: Duration) -> RequestBuilder {
        self.authorize(self.http.get(self.url(path)).timeout(timeout))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.post(self.url(path)).timeout(self.timeout))
    }

    pub(crate) fn delete(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.delete(url).timeout(self.timeout))
    }
}

/// Turn any status outside `expected` into a [`StoreError`].
pub(crate) async fn expect_status(
    response: Response,
    expected: &[StatusCode],
) -> Result<Response, StoreError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StoreError::Unauthorized);
    }

    if !expected.contains(&status) {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response)
}
