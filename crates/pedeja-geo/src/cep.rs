//! CEP (Brazilian postal code) normalization and lookup.
//!
//! Speaks the ViaCEP wire shape: `GET {base}/ws/{cep}/json/` returns the
//! address fields, or a body carrying `"erro"` when the code does not exist.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::GeoError;

/// A CEP has exactly eight digits.
pub const CEP_DIGITS: usize = 8;

const DEFAULT_BASE_URL: &str = "https://viacep.com.br";

/// Strip formatting from a raw CEP and require exactly [`CEP_DIGITS`] digits.
///
/// This is a hard validation gate: checkout must not continue with a
/// malformed CEP.
///
/// # Errors
///
/// Returns [`GeoError::InvalidCep`] when the digit count is wrong.
pub fn normalize_cep(raw: &str) -> Result<String, GeoError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != CEP_DIGITS {
        return Err(GeoError::InvalidCep(raw.to_string()));
    }
    Ok(digits)
}

/// Structured address resolved from a CEP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl PostalAddress {
    /// Assemble the free-text query string handed to the geocoder. Empty
    /// components (common for rural CEPs) are skipped.
    #[must_use]
    pub fn geocoding_query(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for part in [&self.street, &self.neighborhood, &self.city] {
            if !part.is_empty() {
                parts.push(part);
            }
        }
        let mut query = parts.join(", ");
        if !self.state.is_empty() {
            query.push_str(" - ");
            query.push_str(&self.state);
        }
        query.push_str(", Brasil");
        query
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepBody {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

/// Client for the CEP lookup collaborator.
///
/// Use [`CepClient::new`] for production or [`CepClient::with_base_url`] to
/// point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct CepClient {
    client: Client,
    base_url: Url,
}

impl CepClient {
    /// Creates a client pointed at the production ViaCEP service.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, GeoError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the client cannot be constructed, or
    /// [`GeoError::BaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|_| GeoError::BaseUrl(normalised))?;

        Ok(Self { client, base_url })
    }

    /// Resolve an already-normalized CEP to a structured address.
    ///
    /// # Errors
    ///
    /// - [`GeoError::CepNotFound`] when the service flags the code as unknown.
    /// - [`GeoError::Http`] / [`GeoError::HttpStatus`] on transport failures.
    /// - [`GeoError::Deserialize`] when the body has an unexpected shape.
    pub async fn lookup(&self, cep: &str) -> Result<PostalAddress, GeoError> {
        let url = self
            .base_url
            .join(&format!("ws/{cep}/json/"))
            .map_err(|_| GeoError::InvalidCep(cep.to_string()))?;

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(GeoError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let raw = response.text().await?;
        let body: ViaCepBody =
            serde_json::from_str(&raw).map_err(|e| GeoError::Deserialize {
                context: format!("cep lookup ({cep})"),
                source: e,
            })?;

        // ViaCEP signals an unknown code with an "erro" field (historically a
        // boolean, nowadays the string "true") instead of a 404.
        if body.erro.is_some() {
            return Err(GeoError::CepNotFound(cep.to_string()));
        }

        Ok(PostalAddress {
            street: body.logradouro,
            neighborhood: body.bairro,
            city: body.localidade,
            state: body.uf,
        })
    }
}
