//! Deliverability and fee decision for one checkout attempt.

use pedeja_core::{DeliveryDecision, GeofenceEnforcement, StoreDeliveryConfig};

use crate::cep::{normalize_cep, CepClient};
use crate::error::GeoError;
use crate::geocode::GeocoderClient;
use crate::haversine;

/// Resolves whether an order is deliverable and what fee applies.
///
/// Two sequential awaited lookups per invocation (CEP, then geocoder); no
/// caching, no retry. CEP failures are hard gates; geocoder failures degrade
/// according to the configured [`GeofenceEnforcement`].
#[derive(Debug, Clone)]
pub struct DeliveryFeeResolver {
    cep: CepClient,
    geocoder: GeocoderClient,
    enforcement: GeofenceEnforcement,
}

impl DeliveryFeeResolver {
    #[must_use]
    pub fn new(
        cep: CepClient,
        geocoder: GeocoderClient,
        enforcement: GeofenceEnforcement,
    ) -> Self {
        Self {
            cep,
            geocoder,
            enforcement,
        }
    }

    /// Decide deliverability for `raw_cep` against a store's geofence.
    ///
    /// Decision sequence:
    /// 1. Geofencing not configured ⇒ `Undetermined`, no lookups at all.
    /// 2. Malformed CEP ⇒ `InvalidCep` (blocks checkout).
    /// 3. Unknown CEP ⇒ `CepNotFound` (blocks checkout).
    /// 4. Geocoder failure or no match ⇒ `Undetermined` under best-effort
    ///    enforcement, error under strict.
    /// 5. Distance strictly beyond the radius ⇒ `Rejected`; a distance equal
    ///    to the radius is still deliverable.
    /// 6. First tier covering the distance sets the fee; an exhausted tier
    ///    table falls back to the configured out-of-tier fee.
    ///
    /// # Errors
    ///
    /// [`GeoError::InvalidCep`], [`GeoError::CepNotFound`], transport errors
    /// from the CEP lookup, and under strict enforcement any geocoding
    /// failure.
    pub async fn resolve(
        &self,
        config: &StoreDeliveryConfig,
        raw_cep: &str,
    ) -> Result<DeliveryDecision, GeoError> {
        let Some(origin) = config.origin.filter(|_| config.is_geofenced()) else {
            return Ok(DeliveryDecision::Undetermined);
        };

        let cep = normalize_cep(raw_cep)?;
        let address = self.cep.lookup(&cep).await?;
        let query = address.geocoding_query();

        let customer = match self.geocoder.search(&query).await {
            Ok(Some(coordinate)) => coordinate,
            Ok(None) => {
                return self.geocode_failure(GeoError::GeocodeFailed { address: query });
            }
            Err(error) => return self.geocode_failure(error),
        };

        let distance_km = haversine::distance_km(origin, customer);

        if distance_km > config.max_radius_km {
            tracing::info!(
                cep,
                distance_km,
                max_radius_km = config.max_radius_km,
                "delivery rejected: out of range"
            );
            return Ok(DeliveryDecision::Rejected {
                distance_km,
                max_radius_km: config.max_radius_km,
            });
        }

        Ok(DeliveryDecision::Allowed {
            fee: config.fee_for_distance(distance_km),
            distance_km,
        })
    }

    /// Apply the enforcement policy to a geocoding failure: fail open under
    /// best-effort so a flaky geocoder never loses an order, fail closed
    /// under strict.
    fn geocode_failure(&self, error: GeoError) -> Result<DeliveryDecision, GeoError> {
        match self.enforcement {
            GeofenceEnforcement::BestEffort => {
                tracing::warn!(error = %error, "geocoding failed; proceeding with undetermined fee");
                Ok(DeliveryDecision::Undetermined)
            }
            GeofenceEnforcement::Strict => Err(error),
        }
    }
}
