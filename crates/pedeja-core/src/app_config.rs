use std::net::SocketAddr;

use crate::delivery::GeofenceEnforcement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the CEP lookup service (ViaCEP wire shape).
    pub cep_base_url: String,
    /// Base URL of the geocoder (Nominatim wire shape).
    pub geocoder_base_url: String,
    /// Base URL of the marketplace API that owns orders and store settings.
    pub upstream_base_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Admin dashboard poll cadence.
    pub poll_interval_ms: u64,
    pub session_ttl_secs: u64,
    pub geofence_enforcement: GeofenceEnforcement,
}
