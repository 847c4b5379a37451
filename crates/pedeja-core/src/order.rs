//! Order records and the shared status ordering.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Variants are declared in rank order; [`Ord`] compares by rank. The ranking
/// is a monotonic-progress convention shared by reconciliation and history
/// filtering, not a workflow state machine; cancellation can happen from any
/// state and simply ranks highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Sent,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Position in the progress ranking: pending=0 through cancelled=4.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::Sent => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    /// Parse an upstream status string. Unknown values rank as `Pending` so a
    /// newly introduced upstream status can never regress a local edit.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "preparing" => OrderStatus::Preparing,
            "sent" => OrderStatus::Sent,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Pending,
        }
    }

    /// Whether the order belongs to history rather than the active queue.
    /// These are the records removed by a bulk clear-history.
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            OrderStatus::Sent | OrderStatus::Delivered | OrderStatus::Cancelled
        )
    }
}

impl Ord for OrderStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for OrderStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Preparing => write!(f, "preparing"),
            OrderStatus::Sent => write!(f, "sent"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Pix,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "dinheiro"),
            PaymentMethod::Card => write!(f, "cartão"),
            PaymentMethod::Pix => write!(f, "pix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// An order as tracked by the admin dashboard. Server-assigned `id` and
/// `ticket_number`; mutated only through status transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub ticket_number: u32,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderLineItem>,
    pub customer: Customer,
    pub payment_method: PaymentMethod,
    /// Cash amount the customer will pay with, when change is needed.
    pub change_for: Option<Decimal>,
}

/// A checkout submission before the server has assigned id and ticket number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<OrderLineItem>,
    pub customer: Customer,
    pub payment_method: PaymentMethod,
    pub change_for: Option<Decimal>,
}

impl OrderDraft {
    /// Sum of line totals. The delivery fee is not included; it is quoted
    /// separately and appended to the WhatsApp message.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum()
    }
}
