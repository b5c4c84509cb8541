//! HTTP client for the Elasticsearch `_search` API.
//!
//! Wraps `reqwest` with a fixed request timeout, base-URL normalisation and
//! error extraction from the cluster's JSON error envelope. The client is
//! cheap to clone; every clone shares one connection pool.

use std::time::Duration;

use intel_core::IndexSettings;
use reqwest::{Client, Url};

use crate::error::SearchError;
use crate::response::SearchResponse;

/// Longest slice of a non-JSON error body carried into [`SearchError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Index (and optional legacy mapping type) a repository searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTarget {
    pub index: String,
    pub doc_type: Option<String>,
}

impl IndexTarget {
    #[must_use]
    pub fn new(index: impl Into<String>, doc_type: Option<String>) -> Self {
        Self {
            index: index.into(),
            doc_type,
        }
    }

    /// Path relative to the cluster root: `{index}[/{type}]/_search`.
    #[must_use]
    pub fn search_path(&self) -> String {
        match &self.doc_type {
            Some(doc_type) => format!("{}/{doc_type}/_search", self.index),
            None => format!("{}/_search", self.index),
        }
    }
}

impl From<&IndexSettings> for IndexTarget {
    fn from(settings: &IndexSettings) -> Self {
        Self::new(settings.index.clone(), settings.doc_type.clone())
    }
}

#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    base_url: Url,
}

impl SearchClient {
    /// Creates a client for the cluster at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("intel-center/0.1")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SearchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    fn search_url(&self, target: &IndexTarget) -> Result<Url, SearchError> {
        let path = target.search_path();
        self.base_url
            .join(&path)
            .map_err(|e| SearchError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Runs a search body against `target` and parses the response envelope.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Http`] on network failure or timeout.
    /// - [`SearchError::Status`] if the cluster answers with a non-2xx status.
    /// - [`SearchError::Deserialize`] if the body is not a search response.
    pub async fn search(
        &self,
        target: &IndexTarget,
        body: &serde_json::Value,
    ) -> Result<SearchResponse, SearchError> {
        let url = self.search_url(target)?;
        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                reason: error_reason(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| SearchError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Sends `HEAD /` to the cluster root.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] on network failure or a non-2xx status.
    pub async fn ping(&self) -> Result<(), SearchError> {
        self.client
            .head(self.base_url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// [`ping`](Self::ping) folded into reachability; failures are logged.
    pub async fn is_reachable(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(url = %self.base_url, error = %e, "search cluster ping failed");
                false
            }
        }
    }
}

/// Pulls `error.reason` (or the first root cause) out of an error body.
fn error_reason(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.chars().take(MAX_ERROR_BODY).collect();
    };

    let error = json.get("error");
    error
        .and_then(|e| e.get("reason"))
        .or_else(|| {
            error
                .and_then(|e| e.get("root_cause"))
                .and_then(|rc| rc.get(0))
                .and_then(|rc| rc.get("reason"))
        })
        .or(error)
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown error")
        .to_string()
}
