use thiserror::Error;

/// Errors from the upstream orders API client.
#[derive(Debug, Error)]
pub enum OrdersError {
    /// A client was constructed with an unusable base URL.
    #[error("invalid base URL '{0}'")]
    BaseUrl(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
