use thiserror::Error;

use pedeja_core::DeliveryConfigError;

/// Errors from the geolocation pipeline.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The CEP is not exactly eight digits after normalization. Blocks
    /// checkout.
    #[error("invalid CEP '{0}': expected exactly 8 digits")]
    InvalidCep(String),

    /// The postal service does not know this CEP. Blocks checkout.
    #[error("CEP {0} not found")]
    CepNotFound(String),

    /// The address could not be geocoded. Only surfaced under strict
    /// enforcement; best-effort deployments degrade to an undetermined fee.
    #[error("geocoding returned no match for '{address}'")]
    GeocodeFailed { address: String },

    /// A client was constructed with an unusable base URL.
    #[error("invalid base URL '{0}'")]
    BaseUrl(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A collaborator answered with a non-success status.
    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A settings write was rejected before reaching the wire.
    #[error("invalid delivery configuration: {0}")]
    InvalidConfig(#[from] DeliveryConfigError),
}
