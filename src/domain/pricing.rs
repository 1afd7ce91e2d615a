//! Freight pricing engine
//!
//! One linear formula per delivery tier: `base + km * per_km + kg * per_kg`,
//! rounded to cents half-up. Tier dispatch is a plain lookup table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::{round_half_up, DeliveryTier, Money};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Delivery tier and distance are required")]
    MissingArgument,
    #[error("Distance cannot be negative, got {0}")]
    NegativeDistance(Decimal),
    #[error("Weight cannot be negative, got {0}")]
    NegativeWeight(Decimal),
    #[error("Freight price is out of range")]
    Overflow,
}

/// Rates applied for a tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRates {
    pub base: Decimal,
    pub per_km: Decimal,
    pub per_kg: Decimal,
}

impl DeliveryTier {
    pub fn rates(&self) -> TierRates {
        match self {
            Self::Express => TierRates { base: Decimal::new(2500, 2), per_km: Decimal::new(150, 2), per_kg: Decimal::new(200, 2) },
            Self::Standard => TierRates { base: Decimal::new(1500, 2), per_km: Decimal::new(100, 2), per_kg: Decimal::new(150, 2) },
            Self::Economy => TierRates { base: Decimal::new(1000, 2), per_km: Decimal::new(75, 2), per_kg: Decimal::new(100, 2) },
        }
    }
}

/// Weight assumed when an order has none.
pub fn default_weight() -> Decimal { Decimal::ONE }

/// Prices a shipment. `tier` and `distance_km` are mandatory; a missing
/// weight counts as 1kg.
pub fn price(tier: Option<DeliveryTier>, distance_km: Option<Decimal>, weight_kg: Option<Decimal>) -> Result<Money, PricingError> {
    let (Some(tier), Some(distance_km)) = (tier, distance_km) else {
        return Err(PricingError::MissingArgument);
    };
    quote(tier, distance_km, weight_kg.unwrap_or_else(default_weight))
}

pub fn quote(tier: DeliveryTier, distance_km: Decimal, weight_kg: Decimal) -> Result<Money, PricingError> {
    if distance_km.is_sign_negative() && !distance_km.is_zero() { return Err(PricingError::NegativeDistance(distance_km)); }
    if weight_kg.is_sign_negative() && !weight_kg.is_zero() { return Err(PricingError::NegativeWeight(weight_kg)); }
    let rates = tier.rates();
    let amount = distance_km.checked_mul(rates.per_km)
        .zip(weight_kg.checked_mul(rates.per_kg))
        .and_then(|(km, kg)| rates.base.checked_add(km)?.checked_add(kg))
        .ok_or(PricingError::Overflow)?;
    Ok(Money::brl(round_half_up(amount, 2)))
}
