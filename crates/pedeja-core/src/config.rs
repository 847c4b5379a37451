use thiserror::Error;

use crate::app_config::{AppConfig, Environment};
use crate::delivery::GeofenceEnforcement;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let upstream_base_url = require("PEDEJA_UPSTREAM_BASE_URL")?;

    let env = parse_environment(&or_default("PEDEJA_ENV", "development"))?;
    let bind_addr = parse_addr("PEDEJA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PEDEJA_LOG_LEVEL", "info");

    let cep_base_url = or_default("PEDEJA_CEP_BASE_URL", "https://viacep.com.br");
    let geocoder_base_url = or_default(
        "PEDEJA_GEOCODER_BASE_URL",
        "https://nominatim.openstreetmap.org",
    );

    let http_timeout_secs = parse_u64("PEDEJA_HTTP_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("PEDEJA_USER_AGENT", "pedeja/0.1 (delivery-core)");
    let poll_interval_ms = parse_u64("PEDEJA_POLL_INTERVAL_MS", "3000")?;
    let session_ttl_secs = parse_u64("PEDEJA_SESSION_TTL_SECS", "3600")?;
    if i64::try_from(session_ttl_secs).is_err() {
        return Err(ConfigError::InvalidEnvVar {
            var: "PEDEJA_SESSION_TTL_SECS".to_string(),
            reason: format!("{session_ttl_secs} seconds does not fit a signed 64-bit duration"),
        });
    }
    let geofence_enforcement =
        parse_enforcement(&or_default("PEDEJA_GEOFENCE_ENFORCEMENT", "best-effort"))?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        cep_base_url,
        geocoder_base_url,
        upstream_base_url,
        http_timeout_secs,
        user_agent,
        poll_interval_ms,
        session_ttl_secs,
        geofence_enforcement,
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PEDEJA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_enforcement(raw: &str) -> Result<GeofenceEnforcement, ConfigError> {
    match raw {
        "best-effort" => Ok(GeofenceEnforcement::BestEffort),
        "strict" => Ok(GeofenceEnforcement::Strict),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PEDEJA_GEOFENCE_ENFORCEMENT".to_string(),
            reason: format!("expected 'best-effort' or 'strict', got '{other}'"),
        }),
    }
}
