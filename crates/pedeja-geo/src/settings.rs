//! Store settings collaborator.
//!
//! The marketplace API owns the full settings record; this client reads and
//! writes only the slice the delivery core cares about, and is the single
//! place where tier-table validation runs before a write.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use pedeja_core::StoreDeliveryConfig;

use crate::error::GeoError;

/// The slice of a store's settings record consumed by checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub name: String,
    /// WhatsApp number receiving checkout messages.
    pub whatsapp_phone: String,
    pub delivery: StoreDeliveryConfig,
}

/// Client for the store-settings collaborator.
#[derive(Debug, Clone)]
pub struct SettingsClient {
    client: Client,
    base_url: Url,
}

impl SettingsClient {
    /// Creates a client for the marketplace settings API.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`GeoError::BaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|_| GeoError::BaseUrl(normalised))?;

        Ok(Self { client, base_url })
    }

    /// Fetch the settings slice for one store.
    ///
    /// # Errors
    ///
    /// - [`GeoError::Http`] / [`GeoError::HttpStatus`] on transport failures.
    /// - [`GeoError::Deserialize`] when the body has an unexpected shape.
    pub async fn fetch(&self, store_slug: &str) -> Result<StoreSettings, GeoError> {
        let url = self.store_url(store_slug)?;

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(GeoError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let raw = response.text().await?;
        serde_json::from_str(&raw).map_err(|e| GeoError::Deserialize {
            context: format!("store settings ({store_slug})"),
            source: e,
        })
    }

    /// Persist a store's delivery configuration.
    ///
    /// Validation happens here, at write time, so the resolver can assume a
    /// well-formed tier table.
    ///
    /// # Errors
    ///
    /// - [`GeoError::InvalidConfig`] when the tier table fails validation;
    ///   nothing is sent upstream in that case.
    /// - [`GeoError::Http`] / [`GeoError::HttpStatus`] on transport failures.
    pub async fn update_delivery(
        &self,
        store_slug: &str,
        config: &StoreDeliveryConfig,
    ) -> Result<(), GeoError> {
        config.validate()?;

        let url = self.store_url(store_slug)?;
        let response = self.client.put(url.clone()).json(config).send().await?;
        if !response.status().is_success() {
            return Err(GeoError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(())
    }

    fn store_url(&self, store_slug: &str) -> Result<Url, GeoError> {
        self.base_url
            .join(&format!("api/stores/{store_slug}/settings"))
            .map_err(|_| GeoError::BaseUrl(self.base_url.to_string()))
    }
}
