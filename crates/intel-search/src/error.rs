use thiserror::Error;

/// Errors returned by the search client and repositories.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The cluster answered with a non-2xx status.
    #[error("search cluster returned {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A requested aggregation was absent or not a bucket aggregation.
    #[error("aggregation error: {0}")]
    Aggregation(String),

    #[error("invalid search URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
