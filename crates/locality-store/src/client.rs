//! HTTP client for the backend's REST table interface.
//!
//! Each [`Select`] becomes one `GET {base}/rest/v1/{table}` request with the
//! query rendered as PostgREST parameters. The project API key is sent both
//! as `apikey` and as a bearer token.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::StoreError;
use crate::query::Select;
use crate::retry::retry_with_backoff;
use crate::source::RowSource;

const DEFAULT_USER_AGENT: &str = "locality/0.1 (listing-resolver)";
const REST_PREFIX: &str = "rest/v1/";

/// Tunables for [`StoreClient`].
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_retries: 2,
            backoff_base_ms: 250,
        }
    }
}

/// Read-only client for the hosted backend.
pub struct StoreClient {
    client: Client,
    api_key: String,
    base_url: Url,
    settings: StoreSettings,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl StoreClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StoreError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, api_key: &str, settings: StoreSettings) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.clone())
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| StoreError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            settings,
        })
    }

    /// Runs `query` and returns the raw JSON rows.
    ///
    /// Transient failures are retried according to [`StoreSettings`].
    ///
    /// # Errors
    ///
    /// - [`StoreError::Api`] if the backend answers with a non-2xx status.
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::Deserialize`] if the body is not a JSON array.
    pub async fn select(&self, query: &Select) -> Result<Vec<Value>, StoreError> {
        let url = self.build_url(query)?;
        let url = &url;
        let table = query.table.as_str();
        retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            move || self.request_rows(url, table),
        )
        .await
    }

    /// Builds the table URL with percent-encoded query parameters.
    fn build_url(&self, query: &Select) -> Result<Url, StoreError> {
        let mut url = self
            .base_url
            .join(REST_PREFIX)
            .and_then(|u| u.join(&query.table))
            .map_err(|e| StoreError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query.to_params() {
                pairs.append_pair(&k, &v);
            }
        }
        Ok(url)
    }

    async fn request_rows(&self, url: &Url, table: &str) -> Result<Vec<Value>, StoreError> {
        let response = self
            .client
            .get(url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
            context: format!("select from {table}"),
            source: e,
        })
    }
}

/// Pulls `message` out of a PostgREST error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

impl RowSource for StoreClient {
    async fn fetch_rows(&self, query: &Select) -> Result<Vec<Value>, StoreError> {
        self.select(query).await
    }
}
