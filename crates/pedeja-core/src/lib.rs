//! Shared domain types and configuration for the pedeja marketplace core.

mod app_config;
mod config;
pub mod delivery;
pub mod order;
pub mod whatsapp;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use delivery::{
    Coordinate, DeliveryConfigError, DeliveryDecision, DeliveryFeeTier, GeofenceEnforcement,
    StoreDeliveryConfig,
};
pub use order::{Customer, OrderDraft, OrderLineItem, OrderRecord, OrderStatus, PaymentMethod};
