//! Geolocation side of checkout: CEP lookup, geocoding, straight-line
//! distance, and the delivery-fee resolver that ties them together.

mod cep;
mod error;
mod geocode;
pub mod haversine;
mod resolver;
mod settings;

pub use cep::{normalize_cep, CepClient, PostalAddress, CEP_DIGITS};
pub use error::GeoError;
pub use geocode::GeocoderClient;
pub use resolver::DeliveryFeeResolver;
pub use settings::{SettingsClient, StoreSettings};
