//! Free-text address geocoding.
//!
//! Speaks the Nominatim wire shape: `GET {base}/search?q=..&format=json&limit=1`
//! answers a JSON array of matches whose `lat`/`lon` fields are strings.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use pedeja_core::Coordinate;

use crate::error::GeoError;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Client for the geocoding collaborator.
#[derive(Debug, Clone)]
pub struct GeocoderClient {
    client: Client,
    base_url: Url,
}

impl GeocoderClient {
    /// Creates a client pointed at the public Nominatim instance.
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

    /// Geocode a free-text address. Returns `None` when the service has no
    /// match; deciding whether that blocks checkout is the caller's policy.
    ///
    /// # Errors
    ///
    /// - [`GeoError::Http`] / [`GeoError::HttpStatus`] on transport failures.
    /// - [`GeoError::Deserialize`] when the body has an unexpected shape.
    ///   A match with unparseable coordinates degrades to `None` instead.
    pub async fn search(&self, address: &str) -> Result<Option<Coordinate>, GeoError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|_| GeoError::BaseUrl(self.base_url.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(GeoError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let raw = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&raw).map_err(|e| GeoError::Deserialize {
                context: format!("geocode search ({address})"),
                source: e,
            })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = place.lat.parse::<f64>();
        let longitude = place.lon.parse::<f64>();
        match (latitude, longitude) {
            (Ok(latitude), Ok(longitude)) => Ok(Some(Coordinate {
                latitude,
                longitude,
            })),
            _ => {
                tracing::warn!(address, lat = %place.lat, lon = %place.lon,
                    "geocoder returned unparseable coordinates");
                Ok(None)
            }
        }
    }
}
