//! Store API error types.

/// Errors from the provider listing and notification store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check API_USERNAME and API_PASSWORD")]
    Unauthorized,

    /// API returned an unexpected status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// A create succeeded but the response didn't say which id was assigned
    #[error("created notification but the response carried no id")]
    MissingId,

    /// The base URL can't carry an item path
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// Injected by the in-memory store
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::Api {
            status: 503,
            message: "down".into(),
        };
        assert_eq!(err.to_string(), "API error 503: down");
        assert_eq!(
            StoreError::MissingId.to_string(),
            "created notification but the response carried no id"
        );
    }
}
