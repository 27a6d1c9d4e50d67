use thiserror::Error;

/// Errors returned by the backend query client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into rows.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The queried table does not exist in the row source.
    #[error("unknown table: {0}")]
    UnknownTable(String),
}
