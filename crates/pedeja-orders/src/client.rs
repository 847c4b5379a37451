//! Client for the upstream marketplace orders API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::Deserialize;

use pedeja_core::{Customer, OrderLineItem, OrderRecord, OrderStatus, PaymentMethod};

use crate::error::OrdersError;

/// Wire shape of an upstream order. The status arrives as a free string and
/// is mapped through [`OrderStatus::parse`] so an unknown value degrades to
/// `pending` instead of failing the whole poll.
#[derive(Debug, Deserialize)]
struct UpstreamOrder {
    id: String,
    ticket_number: u32,
    created_at: DateTime<Utc>,
    status: String,
    total: Decimal,
    #[serde(default)]
    items: Vec<OrderLineItem>,
    customer: Customer,
    payment_method: PaymentMethod,
    #[serde(default)]
    change_for: Option<Decimal>,
}

impl From<UpstreamOrder> for OrderRecord {
    fn from(raw: UpstreamOrder) -> Self {
        OrderRecord {
            status: OrderStatus::parse(&raw.status),
            id: raw.id,
            ticket_number: raw.ticket_number,
            created_at: raw.created_at,
            total: raw.total,
            items: raw.items,
            customer: raw.customer,
            payment_method: raw.payment_method,
            change_for: raw.change_for,
        }
    }
}

/// Client for the orders collaborator: list, status update, clear history.
#[derive(Debug, Clone)]
pub struct OrdersClient {
    client: Client,
    base_url: Url,
}

impl OrdersClient {
    /// Creates a client for the marketplace orders API.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`OrdersError::BaseUrl`] if `base_url`
    /// does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, OrdersError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|_| OrdersError::BaseUrl(normalised))?;

        Ok(Self { client, base_url })
    }

    /// Fetch one store's orders, newest first (upstream contract).
    ///
    /// # Errors
    ///
    /// - [`OrdersError::Http`] / [`OrdersError::HttpStatus`] on transport
    ///   failures.
    /// - [`OrdersError::Deserialize`] when the body has an unexpected shape.
    pub async fn list_orders(&self, store_slug: &str) -> Result<Vec<OrderRecord>, OrdersError> {
        let url = self.join(&format!("api/stores/{store_slug}/orders"))?;

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(OrdersError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let raw = response.text().await?;
        let orders: Vec<UpstreamOrder> =
            serde_json::from_str(&raw).map_err(|e| OrdersError::Deserialize {
                context: format!("order list ({store_slug})"),
                source: e,
            })?;

        Ok(orders.into_iter().map(OrderRecord::from).collect())
    }

    /// Persist a status transition. Idempotent upstream.
    ///
    /// # Errors
    ///
    /// [`OrdersError::Http`] / [`OrdersError::HttpStatus`] on failure; there
    /// is no response body to parse.
    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), OrdersError> {
        let url = self.join(&format!("api/orders/{order_id}/status"))?;

        let response = self
            .client
            .put(url.clone())
            .json(&serde_json::json!({ "status": status.to_string() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OrdersError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// Remove all closed (sent/delivered/cancelled) orders for a store.
    ///
    /// # Errors
    ///
    /// [`OrdersError::Http`] / [`OrdersError::HttpStatus`] on failure.
    pub async fn clear_history(&self, store_slug: &str) -> Result<(), OrdersError> {
        let url = self.join(&format!("api/stores/{store_slug}/orders/clear"))?;

        let response = self.client.post(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(OrdersError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(())
    }

    fn join(&self, path: &str) -> Result<Url, OrdersError> {
        self.base_url
            .join(path)
            .map_err(|_| OrdersError::BaseUrl(self.base_url.to_string()))
    }
}
