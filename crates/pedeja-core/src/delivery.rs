//! Delivery geofencing configuration and decision types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of fee tiers a store may configure.
pub const MAX_FEE_TIERS: usize = 4;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// One row of a store's tiered delivery-fee table.
///
/// The tier applies to any delivery distance up to and including
/// `max_distance_km`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFeeTier {
    pub max_distance_km: f64,
    pub fee: Decimal,
}

/// Per-store delivery geofencing settings.
///
/// Read-only to the resolver; mutated only through the settings collaborator,
/// which must call [`StoreDeliveryConfig::validate`] before persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDeliveryConfig {
    /// The store's own location. `None` means geofencing is not set up.
    pub origin: Option<Coordinate>,
    /// Hard delivery cutoff. Zero means geofencing is not set up.
    #[serde(default)]
    pub max_radius_km: f64,
    /// Fee tiers, ascending by `max_distance_km`.
    #[serde(default)]
    pub tiers: Vec<DeliveryFeeTier>,
    /// Fee charged when the distance is within `max_radius_km` but beyond the
    /// last tier. Defaults to zero, which matches the historical behavior of
    /// charging nothing once the tier table is exhausted.
    #[serde(default)]
    pub out_of_tier_fee: Decimal,
}

impl StoreDeliveryConfig {
    /// Whether geofencing is configured at all. When false, the resolver
    /// returns [`DeliveryDecision::Undetermined`] without any lookups.
    #[must_use]
    pub fn is_geofenced(&self) -> bool {
        self.origin.is_some() && self.max_radius_km > 0.0
    }

    /// Validate the tier table before it is written.
    ///
    /// The resolver assumes a valid table, so malformed configuration must be
    /// rejected here rather than tolerated at resolution time.
    ///
    /// # Errors
    ///
    /// Returns the first [`DeliveryConfigError`] found: too many tiers, a
    /// non-finite or non-positive tier distance, a negative fee, tiers not in
    /// strictly ascending distance order, or a non-finite/negative radius.
    pub fn validate(&self) -> Result<(), DeliveryConfigError> {
        if !self.max_radius_km.is_finite() || self.max_radius_km < 0.0 {
            return Err(DeliveryConfigError::InvalidRadius(self.max_radius_km));
        }
        if self.tiers.len() > MAX_FEE_TIERS {
            return Err(DeliveryConfigError::TooManyTiers(self.tiers.len()));
        }
        let mut last_distance = 0.0_f64;
        for (index, tier) in self.tiers.iter().enumerate() {
            if !tier.max_distance_km.is_finite() || tier.max_distance_km <= 0.0 {
                return Err(DeliveryConfigError::InvalidTierDistance {
                    index,
                    distance_km: tier.max_distance_km,
                });
            }
            if tier.fee < Decimal::ZERO {
                return Err(DeliveryConfigError::NegativeFee { index });
            }
            if tier.max_distance_km <= last_distance && index > 0 {
                return Err(DeliveryConfigError::UnsortedTiers { index });
            }
            last_distance = tier.max_distance_km;
        }
        Ok(())
    }

    /// Look up the fee for a distance already known to be within the radius.
    ///
    /// Scans the tiers in order and returns the fee of the first tier whose
    /// `max_distance_km` is at least `distance_km`; falls back to
    /// `out_of_tier_fee` when the table is exhausted.
    #[must_use]
    pub fn fee_for_distance(&self, distance_km: f64) -> Decimal {
        self.tiers
            .iter()
            .find(|tier| tier.max_distance_km >= distance_km)
            .map_or(self.out_of_tier_fee, |tier| tier.fee)
    }
}

/// Validation failures for a store's delivery settings.
#[derive(Debug, Error, PartialEq)]
pub enum DeliveryConfigError {
    #[error("max_radius_km must be finite and non-negative, got {0}")]
    InvalidRadius(f64),
    #[error("at most {MAX_FEE_TIERS} fee tiers are allowed, got {0}")]
    TooManyTiers(usize),
    #[error("tier {index}: max_distance_km must be finite and positive, got {distance_km}")]
    InvalidTierDistance { index: usize, distance_km: f64 },
    #[error("tier {index}: fee must not be negative")]
    NegativeFee { index: usize },
    #[error("tier {index}: tiers must be strictly ascending by max_distance_km")]
    UnsortedTiers { index: usize },
}

/// Outcome of a deliverability check for one checkout attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum DeliveryDecision {
    /// Within range; charge `fee` for a `distance_km` delivery.
    Allowed { fee: Decimal, distance_km: f64 },
    /// Outside the store's delivery radius.
    Rejected {
        distance_km: f64,
        max_radius_km: f64,
    },
    /// Geofencing is not configured, or the customer address could not be
    /// geocoded under best-effort enforcement. Checkout proceeds without a
    /// delivery-fee block.
    Undetermined,
}

impl DeliveryDecision {
    /// Whether checkout may proceed with this decision.
    #[must_use]
    pub fn permits_checkout(&self) -> bool {
        !matches!(self, DeliveryDecision::Rejected { .. })
    }
}

/// How strictly geocoding failures are treated during checkout.
///
/// `BestEffort` preserves the historical fail-open behavior: a flaky geocoder
/// never costs the store an order. `Strict` turns the same failure into a
/// blocking error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeofenceEnforcement {
    #[default]
    BestEffort,
    Strict,
}

impl std::fmt::Display for GeofenceEnforcement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeofenceEnforcement::BestEffort => write!(f, "best-effort"),
            GeofenceEnforcement::Strict => write!(f, "strict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(max_distance_km: f64, fee: i64) -> DeliveryFeeTier {
        DeliveryFeeTier {
            max_distance_km,
            fee: Decimal::from(fee),
        }
    }

    fn config(tiers: Vec<DeliveryFeeTier>) -> StoreDeliveryConfig {
        StoreDeliveryConfig {
            origin: Some(Coordinate {
                latitude: -8.0476,
                longitude: -34.8770,
            }),
            max_radius_km: 5.0,
            tiers,
            out_of_tier_fee: Decimal::ZERO,
        }
    }

    #[test]
    fn validate_accepts_ascending_tiers() {
        let cfg = config(vec![tier(3.0, 5), tier(6.0, 10)]);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_unsorted_tiers() {
        let cfg = config(vec![tier(6.0, 10), tier(3.0, 5)]);
        assert_eq!(
            cfg.validate(),
            Err(DeliveryConfigError::UnsortedTiers { index: 1 })
        );
    }

    #[test]
    fn validate_rejects_duplicate_tier_distance() {
        let cfg = config(vec![tier(3.0, 5), tier(3.0, 8)]);
        assert_eq!(
            cfg.validate(),
            Err(DeliveryConfigError::UnsortedTiers { index: 1 })
        );
    }

    #[test]
    fn validate_rejects_too_many_tiers() {
        let cfg = config(vec![
            tier(1.0, 1),
            tier(2.0, 2),
            tier(3.0, 3),
            tier(4.0, 4),
            tier(5.0, 5),
        ]);
        assert_eq!(cfg.validate(), Err(DeliveryConfigError::TooManyTiers(5)));
    }

    #[test]
    fn validate_rejects_negative_fee() {
        let cfg = config(vec![DeliveryFeeTier {
            max_distance_km: 3.0,
            fee: Decimal::from(-1),
        }]);
        assert_eq!(
            cfg.validate(),
            Err(DeliveryConfigError::NegativeFee { index: 0 })
        );
    }

    #[test]
    fn validate_rejects_zero_tier_distance() {
        let cfg = config(vec![tier(0.0, 5)]);
        assert!(matches!(
            cfg.validate(),
            Err(DeliveryConfigError::InvalidTierDistance { index: 0, .. })
        ));
    }

    #[test]
    fn fee_picks_first_tier_covering_distance() {
        let cfg = config(vec![tier(3.0, 5), tier(6.0, 10)]);
        assert_eq!(cfg.fee_for_distance(2.0), Decimal::from(5));
        assert_eq!(cfg.fee_for_distance(4.0), Decimal::from(10));
    }

    #[test]
    fn fee_at_exact_tier_boundary_uses_that_tier() {
        let cfg = config(vec![tier(3.0, 5), tier(6.0, 10)]);
        assert_eq!(cfg.fee_for_distance(3.0), Decimal::from(5));
    }

    #[test]
    fn fee_falls_back_when_tiers_exhausted() {
        let mut cfg = config(vec![tier(3.0, 5)]);
        cfg.out_of_tier_fee = Decimal::from(12);
        assert_eq!(cfg.fee_for_distance(4.5), Decimal::from(12));
    }

    #[test]
    fn fee_is_monotonic_over_ascending_tiers() {
        let cfg = config(vec![tier(2.0, 4), tier(4.0, 7), tier(6.0, 11)]);
        let mut last = Decimal::MIN;
        for step in 0..=60 {
            let d = f64::from(step) * 0.1;
            let fee = cfg.fee_for_distance(d);
            assert!(fee >= last, "fee decreased at distance {d}");
            last = fee;
        }
    }

    #[test]
    fn geofencing_requires_origin_and_radius() {
        let mut cfg = config(vec![]);
        assert!(cfg.is_geofenced());
        cfg.origin = None;
        assert!(!cfg.is_geofenced());
        cfg.origin = Some(Coordinate {
            latitude: 0.0,
            longitude: 0.0,
        });
        cfg.max_radius_km = 0.0;
        assert!(!cfg.is_geofenced());
    }
}
