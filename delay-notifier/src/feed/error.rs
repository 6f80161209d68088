//! Schedule feed error types.

/// Errors from fetching or decoding a station schedule.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Credentials were rejected
    #[error("unauthorized: check NJT_USERNAME and NJT_PASSWORD")]
    Unauthorized,

    /// The XML envelope could not be parsed
    #[error("XML envelope error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The XML envelope carried no payload
    #[error("XML envelope is empty")]
    EmptyEnvelope,

    /// The JSON payload did not match the expected shape. `body` keeps the
    /// start of the payload for debug logging.
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },
}
