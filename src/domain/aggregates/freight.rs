//! Freight Record
//!
//! Computed price, distance and lead time for exactly one order.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::pricing::{self, PricingError, TierRates};
use crate::domain::value_objects::{round_half_up, DeliveryTier, Money, PostalCode};

pub const MIN_LEAD_TIME_DAYS: u32 = 1;
pub const MAX_LEAD_TIME_DAYS: u32 = 30;
const NOTES_MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FreightError {
    #[error("Distance must be greater than zero, got {0}")]
    NonPositiveDistance(Decimal),
    #[error("Distance must be at most 9999.99 km, got {0}")]
    DistanceTooLong(Decimal),
    #[error("Lead time must be between 1 and 30 days, got {0}")]
    LeadTime(u32),
    #[error("Freight notes must be at most 500 characters")]
    NotesTooLong,
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Freight {
    tier: DeliveryTier,
    price: Money,
    distance_km: Decimal,
    lead_time_days: u32,
    computed_at: DateTime<Utc>,
    breakdown: Option<TierRates>,
    notes: Option<String>,
    origin_postal_code: PostalCode,
    destination_postal_code: PostalCode,
}

/// Flat view of a freight used by storage backends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FreightSnapshot {
    pub tier: DeliveryTier,
    pub price: Money,
    pub distance_km: Decimal,
    pub lead_time_days: u32,
    pub computed_at: DateTime<Utc>,
    pub breakdown: Option<TierRates>,
    pub notes: Option<String>,
    pub origin_postal_code: PostalCode,
    pub destination_postal_code: PostalCode,
}

impl Freight {
    pub fn new(
        tier: DeliveryTier, price: Money, distance_km: Decimal, lead_time_days: u32,
        origin_postal_code: PostalCode, destination_postal_code: PostalCode,
    ) -> Result<Self, FreightError> {
        check_distance(distance_km)?;
        if !(MIN_LEAD_TIME_DAYS..=MAX_LEAD_TIME_DAYS).contains(&lead_time_days) {
            return Err(FreightError::LeadTime(lead_time_days));
        }
        Ok(Self {
            tier, price, distance_km, lead_time_days, computed_at: Utc::now(), breakdown: None, notes: None,
            origin_postal_code, destination_postal_code,
        })
    }

    pub fn with_breakdown(mut self, rates: TierRates) -> Self { self.breakdown = Some(rates); self }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Result<Self, FreightError> {
        let notes = notes.into();
        if notes.chars().count() > NOTES_MAX_LEN { return Err(FreightError::NotesTooLong); }
        self.notes = Some(notes);
        self.normalize();
        Ok(self)
    }

    pub fn restore(s: FreightSnapshot) -> Self {
        Self {
            tier: s.tier, price: s.price, distance_km: s.distance_km, lead_time_days: s.lead_time_days,
            computed_at: s.computed_at, breakdown: s.breakdown, notes: s.notes,
            origin_postal_code: s.origin_postal_code, destination_postal_code: s.destination_postal_code,
        }
    }

    pub fn snapshot(&self) -> FreightSnapshot {
        FreightSnapshot {
            tier: self.tier, price: self.price.clone(), distance_km: self.distance_km, lead_time_days: self.lead_time_days,
            computed_at: self.computed_at, breakdown: self.breakdown, notes: self.notes.clone(),
            origin_postal_code: self.origin_postal_code.clone(), destination_postal_code: self.destination_postal_code.clone(),
        }
    }

    pub fn tier(&self) -> DeliveryTier { self.tier }
    pub fn price(&self) -> &Money { &self.price }
    pub fn distance_km(&self) -> Decimal { self.distance_km }
    pub fn lead_time_days(&self) -> u32 { self.lead_time_days }
    pub fn computed_at(&self) -> DateTime<Utc> { self.computed_at }
    pub fn breakdown(&self) -> Option<&TierRates> { self.breakdown.as_ref() }
    pub fn notes(&self) -> Option<&str> { self.notes.as_deref() }
    pub fn origin_postal_code(&self) -> &PostalCode { &self.origin_postal_code }
    pub fn destination_postal_code(&self) -> &PostalCode { &self.destination_postal_code }

    /// Reprices with the stored tier. The owning order is responsible for
    /// carrying the new weight.
    pub(crate) fn recompute(&mut self, distance_km: Decimal, weight_kg: Option<Decimal>) -> Result<(), FreightError> {
        check_distance(distance_km)?;
        let price = pricing::price(Some(self.tier), Some(distance_km), weight_kg)?;
        self.distance_km = distance_km;
        self.price = price;
        self.breakdown = Some(self.tier.rates());
        self.computed_at = Utc::now();
        Ok(())
    }

    /// Snaps the lead time back to the tier's canonical value and trims notes.
    /// Storage backends call this before every write.
    pub fn normalize(&mut self) {
        let expected = self.tier.lead_time_days();
        if self.lead_time_days != expected {
            tracing::debug!(tier = %self.tier, stored = self.lead_time_days, expected, "Correcting freight lead time");
            self.lead_time_days = expected;
        }
        self.notes = self.notes.take().map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    }

    pub fn price_per_km(&self) -> Decimal {
        if self.distance_km.is_zero() { return Decimal::ZERO; }
        round_half_up(self.price.amount() / self.distance_km, 4)
    }

    /// True when the estimated delivery is not before computation date + lead time.
    pub fn is_within_deadline(&self, estimated_delivery: Option<NaiveDate>) -> bool {
        match estimated_delivery {
            None => true,
            Some(date) => date >= self.computed_at.date_naive() + Duration::days(i64::from(self.lead_time_days)),
        }
    }

    pub fn is_recent(&self, minutes: i64) -> bool {
        self.computed_at > Utc::now() - Duration::minutes(minutes)
    }

    pub fn is_equivalent(&self, other: &Freight) -> bool {
        self.tier == other.tier && self.price == other.price && self.distance_km == other.distance_km && self.lead_time_days == other.lead_time_days
    }

    pub fn formatted_price(&self) -> String { self.price.formatted() }
    pub fn formatted_distance(&self) -> String { format!("{:.1} km", round_half_up(self.distance_km, 1)) }
    pub fn formatted_lead_time(&self) -> String { format_lead_time(self.lead_time_days) }

    pub fn summary(&self) -> String {
        format!("{} - {} ({} days) - {}", self.tier.label(), self.formatted_price(), self.lead_time_days, self.formatted_distance())
    }
}

pub fn format_lead_time(days: u32) -> String {
    if days == 1 { "1 business day".to_string() } else { format!("{} business days", days) }
}

/// Longest distance a freight can be priced for.
pub fn max_distance_km() -> Decimal { Decimal::new(999_999, 2) }

pub fn check_distance(distance_km: Decimal) -> Result<(), FreightError> {
    if distance_km <= Decimal::ZERO { return Err(FreightError::NonPositiveDistance(distance_km)); }
    if distance_km > max_distance_km() { return Err(FreightError::DistanceTooLong(distance_km)); }
    Ok(())
}
