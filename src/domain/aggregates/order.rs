//! Order Aggregate

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::aggregates::freight::{Freight, FreightError, FreightSnapshot};
use crate::domain::events::OrderEvent;
use crate::domain::value_objects::{
    Address, CustomerRef, DeclaredValue, DeliveryTier, Height, Money, TrackingCode, ValueError, Weight,
};

const DESCRIPTION_MAX_LEN: usize = 500;
const NOTES_MAX_LEN: usize = 1000;
const CANCELLATION_PREFIX: &str = "CANCELLATION: ";

/// Calendar date used for delivery estimates.
pub fn today() -> NaiveDate { Local::now().date_naive() }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus { #[default] Pending, Confirmed, InTransit, Delivered, Canceled }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING", Self::Confirmed => "CONFIRMED", Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED", Self::Canceled => "CANCELED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending", Self::Confirmed => "Confirmed", Self::InTransit => "In Transit",
            Self::Delivered => "Delivered", Self::Canceled => "Canceled",
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Self::Delivered | Self::Canceled) }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending), "CONFIRMED" => Ok(Self::Confirmed), "IN_TRANSIT" => Ok(Self::InTransit),
            "DELIVERED" => Ok(Self::Delivered), "CANCELED" => Ok(Self::Canceled),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// Whether the order's freight has been computed yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingStatus { #[default] AwaitingPricing, Priced }

impl PricingStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::AwaitingPricing => "AWAITING_PRICING", Self::Priced => "PRICED" }
    }
}

impl FromStr for PricingStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AWAITING_PRICING" => Ok(Self::AwaitingPricing), "PRICED" => Ok(Self::Priced),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Only pending orders can be confirmed (order is {0})")]
    NotPending(OrderStatus),
    #[error("Only confirmed orders can start transit (order is {0})")]
    NotConfirmed(OrderStatus),
    #[error("Only orders in transit can be delivered (order is {0})")]
    NotInTransit(OrderStatus),
    #[error("Delivered orders cannot be canceled")]
    AlreadyDelivered,
    #[error("Order is {0} and cannot advance further")]
    Terminal(OrderStatus),
    #[error("Order already has a freight")]
    FreightAlreadyAttached,
    #[error("Order has no freight yet")]
    NoFreight,
    #[error("Canceled orders cannot be priced")]
    Canceled,
    #[error("Freight tier {freight} does not match order tier {order}")]
    TierMismatch { order: DeliveryTier, freight: DeliveryTier },
    #[error("Order is already persisted")]
    AlreadyPersisted,
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Freight(#[from] FreightError),
}

/// Data needed to place a new order.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub customer: CustomerRef,
    pub origin: Address,
    pub destination: Address,
    pub tier: DeliveryTier,
    pub description: String,
    pub weight: Option<Weight>,
    pub height: Option<Height>,
    pub declared_value: Option<DeclaredValue>,
}

#[derive(Clone, Debug)]
pub struct Order {
    id: Option<i64>,
    tracking_code: TrackingCode,
    version: i64,
    customer: CustomerRef,
    origin: Address,
    destination: Address,
    tier: DeliveryTier,
    status: OrderStatus,
    pricing: PricingStatus,
    placed_at: DateTime<Utc>,
    estimated_delivery: Option<NaiveDate>,
    delivered_at: Option<DateTime<Utc>>,
    description: String,
    weight: Option<Weight>,
    height: Option<Height>,
    declared_value: Option<DeclaredValue>,
    notes: Option<String>,
    freight: Option<Freight>,
    updated_at: DateTime<Utc>,
    events: Vec<OrderEvent>,
}

/// Flat view of an order used by storage backends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: Option<i64>,
    pub tracking_code: TrackingCode,
    pub version: i64,
    pub customer: CustomerRef,
    pub origin: Address,
    pub destination: Address,
    pub tier: DeliveryTier,
    pub status: OrderStatus,
    pub pricing: PricingStatus,
    pub placed_at: DateTime<Utc>,
    pub estimated_delivery: Option<NaiveDate>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub description: String,
    pub weight: Option<Weight>,
    pub height: Option<Height>,
    pub declared_value: Option<DeclaredValue>,
    pub notes: Option<String>,
    pub freight: Option<FreightSnapshot>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn place(new: NewOrder) -> Result<Self, OrderError> {
        let description = new.description.trim().to_string();
        if description.is_empty() { return Err(ValueError::Blank("description").into()); }
        if description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(ValueError::TooLong { field: "description", max: DESCRIPTION_MAX_LEN }.into());
        }
        let now = Utc::now();
        let mut order = Self {
            id: None, tracking_code: TrackingCode::generate(), version: 0, customer: new.customer,
            origin: new.origin, destination: new.destination, tier: new.tier,
            status: OrderStatus::Pending, pricing: PricingStatus::AwaitingPricing,
            placed_at: now, estimated_delivery: None, delivered_at: None, description,
            weight: new.weight, height: new.height, declared_value: new.declared_value,
            notes: None, freight: None, updated_at: now, events: vec![],
        };
        order.raise_event(OrderEvent::Created { tracking_code: order.tracking_code.clone(), tier: order.tier });
        Ok(order)
    }

    pub fn restore(s: OrderSnapshot) -> Self {
        Self {
            id: s.id, tracking_code: s.tracking_code, version: s.version, customer: s.customer,
            origin: s.origin, destination: s.destination, tier: s.tier, status: s.status, pricing: s.pricing,
            placed_at: s.placed_at, estimated_delivery: s.estimated_delivery, delivered_at: s.delivered_at,
            description: s.description, weight: s.weight, height: s.height, declared_value: s.declared_value,
            notes: s.notes, freight: s.freight.map(Freight::restore), updated_at: s.updated_at, events: vec![],
        }
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            id: self.id, tracking_code: self.tracking_code.clone(), version: self.version, customer: self.customer.clone(),
            origin: self.origin.clone(), destination: self.destination.clone(), tier: self.tier, status: self.status,
            pricing: self.pricing, placed_at: self.placed_at, estimated_delivery: self.estimated_delivery,
            delivered_at: self.delivered_at, description: self.description.clone(), weight: self.weight,
            height: self.height, declared_value: self.declared_value, notes: self.notes.clone(),
            freight: self.freight.as_ref().map(Freight::snapshot), updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> Option<i64> { self.id }
    pub fn tracking_code(&self) -> &TrackingCode { &self.tracking_code }
    pub fn version(&self) -> i64 { self.version }
    pub fn customer(&self) -> &CustomerRef { &self.customer }
    pub fn origin(&self) -> &Address { &self.origin }
    pub fn destination(&self) -> &Address { &self.destination }
    pub fn tier(&self) -> DeliveryTier { self.tier }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn pricing_status(&self) -> PricingStatus { self.pricing }
    pub fn placed_at(&self) -> DateTime<Utc> { self.placed_at }
    pub fn estimated_delivery(&self) -> Option<NaiveDate> { self.estimated_delivery }
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> { self.delivered_at }
    pub fn description(&self) -> &str { &self.description }
    pub fn weight(&self) -> Option<Weight> { self.weight }
    pub fn height(&self) -> Option<Height> { self.height }
    pub fn declared_value(&self) -> Option<DeclaredValue> { self.declared_value }
    pub fn notes(&self) -> Option<&str> { self.notes.as_deref() }
    pub fn freight(&self) -> Option<&Freight> { self.freight.as_ref() }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    // ==================== Lifecycle ====================

    pub fn confirm(&mut self) -> Result<(), OrderError> { self.confirm_on(today()) }

    /// Confirms with `today` as the reference date for the delivery estimate.
    pub fn confirm_on(&mut self, today: NaiveDate) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending { return Err(OrderError::NotPending(self.status)); }
        let estimate = today + Duration::days(i64::from(self.tier.lead_time_days()));
        self.status = OrderStatus::Confirmed;
        self.estimated_delivery = Some(estimate);
        self.touch();
        self.raise_event(OrderEvent::Confirmed { tracking_code: self.tracking_code.clone(), estimated_delivery: estimate });
        Ok(())
    }

    pub fn start_transit(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Confirmed { return Err(OrderError::NotConfirmed(self.status)); }
        self.status = OrderStatus::InTransit;
        self.touch();
        self.raise_event(OrderEvent::TransitStarted { tracking_code: self.tracking_code.clone() });
        Ok(())
    }

    pub fn complete_delivery(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::InTransit { return Err(OrderError::NotInTransit(self.status)); }
        let now = Utc::now();
        self.status = OrderStatus::Delivered;
        self.delivered_at = Some(now);
        self.touch();
        self.raise_event(OrderEvent::Delivered { tracking_code: self.tracking_code.clone(), delivered_at: now });
        Ok(())
    }

    /// Cancels from any non-delivered state. A non-blank reason is appended to the notes.
    pub fn cancel(&mut self, reason: &str) -> Result<(), OrderError> {
        if self.status == OrderStatus::Delivered { return Err(OrderError::AlreadyDelivered); }
        let reason = reason.trim();
        let recorded = if reason.is_empty() {
            None
        } else {
            let entry = format!("{}{}", CANCELLATION_PREFIX, reason);
            let notes = match self.notes.take() {
                Some(prior) => format!("{}\n{}", prior, entry),
                None => entry,
            };
            if notes.chars().count() > NOTES_MAX_LEN {
                tracing::warn!(tracking_code = %self.tracking_code, "Order notes exceed {} characters", NOTES_MAX_LEN);
            }
            self.notes = Some(notes);
            Some(reason.to_string())
        };
        self.status = OrderStatus::Canceled;
        self.touch();
        self.raise_event(OrderEvent::Canceled { tracking_code: self.tracking_code.clone(), reason: recorded });
        Ok(())
    }

    /// Moves one step along pending → confirmed → in transit → delivered.
    pub fn advance(&mut self) -> Result<OrderStatus, OrderError> {
        match self.status {
            OrderStatus::Pending => self.confirm()?,
            OrderStatus::Confirmed => self.start_transit()?,
            OrderStatus::InTransit => self.complete_delivery()?,
            terminal => return Err(OrderError::Terminal(terminal)),
        }
        Ok(self.status)
    }

    // ==================== Freight ====================

    pub fn attach_freight(&mut self, freight: Freight) -> Result<(), OrderError> {
        if self.freight.is_some() { return Err(OrderError::FreightAlreadyAttached); }
        if self.status == OrderStatus::Canceled { return Err(OrderError::Canceled); }
        if freight.tier() != self.tier { return Err(OrderError::TierMismatch { order: self.tier, freight: freight.tier() }); }
        self.raise_event(OrderEvent::Priced {
            tracking_code: self.tracking_code.clone(), price: freight.price().amount(), distance_km: freight.distance_km(),
        });
        self.freight = Some(freight);
        self.pricing = PricingStatus::Priced;
        self.touch();
        Ok(())
    }

    /// Reprices the attached freight and records `weight` as the order's weight.
    pub fn recompute_freight(&mut self, distance_km: Decimal, weight: Option<Weight>) -> Result<&Freight, OrderError> {
        let freight = self.freight.as_mut().ok_or(OrderError::NoFreight)?;
        freight.recompute(distance_km, weight.map(|w| w.kg()))?;
        let (price, distance_km) = (freight.price().amount(), freight.distance_km());
        self.weight = weight;
        self.touch();
        self.raise_event(OrderEvent::Repriced { tracking_code: self.tracking_code.clone(), price, distance_km });
        self.freight.as_ref().ok_or(OrderError::NoFreight)
    }

    // ==================== Queries ====================

    pub fn is_modifiable(&self) -> bool { self.status == OrderStatus::Pending }
    pub fn is_active(&self) -> bool { self.status != OrderStatus::Canceled }
    pub fn is_delivered(&self) -> bool { self.status == OrderStatus::Delivered }
    pub fn is_awaiting_pricing(&self) -> bool { self.pricing == PricingStatus::AwaitingPricing }
    pub fn is_late(&self) -> bool { self.is_late_on(today()) }

    pub fn is_late_on(&self, today: NaiveDate) -> bool {
        match self.estimated_delivery {
            Some(estimate) if !self.is_delivered() => today > estimate,
            _ => false,
        }
    }

    pub fn is_interstate(&self) -> bool { self.origin.state != self.destination.state }

    /// Freight price plus declared value; `None` until a freight is attached.
    pub fn total_value(&self) -> Option<Money> {
        let freight = self.freight.as_ref()?;
        let declared = self.declared_value.map(|v| v.amount()).unwrap_or(Decimal::ZERO);
        Some(freight.price().add_amount(declared))
    }

    pub fn summary(&self) -> String {
        format!("{} - {} → {} ({})", self.tracking_code, self.origin.city, self.destination.city, self.status.label())
    }

    // ==================== Persistence hooks ====================

    /// Trims notes and normalises the freight before a write.
    pub fn normalize(&mut self) {
        self.notes = self.notes.take().map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        if let Some(freight) = self.freight.as_mut() { freight.normalize(); }
    }

    pub(crate) fn assign_identity(&mut self, id: i64) { self.id = Some(id); }
    pub(crate) fn set_version(&mut self, version: i64) { self.version = version; }

    /// Draws a fresh tracking code for an order that has not been stored yet.
    pub fn reissue_tracking_code(&mut self) -> Result<(), OrderError> {
        if self.id.is_some() { return Err(OrderError::AlreadyPersisted); }
        let code = TrackingCode::generate();
        for event in self.events.iter_mut() {
            if let OrderEvent::Created { tracking_code, .. } = event { *tracking_code = code.clone(); }
        }
        self.tracking_code = code;
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<OrderEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: OrderEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing;
    use crate::domain::value_objects::{FederativeUnit, PostalCode};

    fn address(cep: &str, city: &str, state: FederativeUnit) -> Address {
        Address::new(PostalCode::parse(cep).unwrap(), "Rua Um", Some("10".into()), "Centro", city, state)
    }

    fn order(tier: DeliveryTier) -> Order {
        Order::place(NewOrder {
            customer: CustomerRef::new("Maria Souza", "maria@example.com").unwrap(),
            origin: address("13801-005", "Mogi Mirim", FederativeUnit::SP),
            destination: address("20040-020", "Rio de Janeiro", FederativeUnit::RJ),
            tier,
            description: "Reborn doll, 50cm".into(),
            weight: Some(Weight::new(Decimal::new(2, 0)).unwrap()),
            height: None,
            declared_value: Some(DeclaredValue::new(Decimal::new(30000, 2)).unwrap()),
        }).unwrap()
    }

    fn freight_for(order: &Order, km: i64) -> Freight {
        let distance = Decimal::new(km, 0);
        let price = pricing::quote(order.tier(), distance, Decimal::new(2, 0)).unwrap();
        Freight::new(order.tier(), price, distance, order.tier().lead_time_days(), order.origin().postal_code.clone(), order.destination().postal_code.clone()).unwrap()
    }

    #[test]
    fn test_new_order_is_pending_with_code() {
        let mut o = order(DeliveryTier::Standard);
        assert_eq!(o.status(), OrderStatus::Pending);
        assert!(o.tracking_code().as_str().starts_with("CE"));
        assert!(o.is_awaiting_pricing());
        assert!(o.estimated_delivery().is_none());
        assert!(matches!(o.take_events().as_slice(), [OrderEvent::Created { .. }]));
    }

    #[test]
    fn test_blank_description_rejected() {
        let mut new = NewOrder {
            customer: CustomerRef::new("A", "a@b.c").unwrap(),
            origin: address("13801-005", "Mogi Mirim", FederativeUnit::SP),
            destination: address("13801-005", "Mogi Mirim", FederativeUnit::SP),
            tier: DeliveryTier::Economy, description: "   ".into(), weight: None, height: None, declared_value: None,
        };
        assert!(matches!(Order::place(new.clone()), Err(OrderError::Value(ValueError::Blank(_)))));
        new.description = "x".repeat(501);
        assert!(matches!(Order::place(new), Err(OrderError::Value(ValueError::TooLong { .. }))));
    }

    #[test]
    fn test_confirm_sets_estimate_per_tier() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        for (tier, days) in [(DeliveryTier::Express, 1), (DeliveryTier::Standard, 3), (DeliveryTier::Economy, 7)] {
            let mut o = order(tier);
            o.confirm_on(day).unwrap();
            assert_eq!(o.status(), OrderStatus::Confirmed);
            assert_eq!(o.estimated_delivery(), Some(day + Duration::days(days)));
        }
    }

    #[test]
    fn test_confirm_uses_today() {
        let mut o = order(DeliveryTier::Express);
        o.confirm().unwrap();
        assert_eq!(o.estimated_delivery(), Some(today() + Duration::days(1)));
    }

    #[test]
    fn test_confirm_twice_fails_and_keeps_state() {
        let mut o = order(DeliveryTier::Standard);
        o.confirm().unwrap();
        let estimate = o.estimated_delivery();
        assert_eq!(o.confirm(), Err(OrderError::NotPending(OrderStatus::Confirmed)));
        assert_eq!(o.status(), OrderStatus::Confirmed);
        assert_eq!(o.estimated_delivery(), estimate);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut o = order(DeliveryTier::Express);
        assert!(o.start_transit().is_err());
        assert!(o.complete_delivery().is_err());
        o.confirm().unwrap();
        o.start_transit().unwrap();
        assert_eq!(o.status(), OrderStatus::InTransit);
        o.complete_delivery().unwrap();
        assert!(o.is_delivered());
        assert!(o.delivered_at().is_some());
        assert_eq!(o.advance(), Err(OrderError::Terminal(OrderStatus::Delivered)));
    }

    #[test]
    fn test_advance_walks_the_lifecycle() {
        let mut o = order(DeliveryTier::Economy);
        assert_eq!(o.advance().unwrap(), OrderStatus::Confirmed);
        assert_eq!(o.advance().unwrap(), OrderStatus::InTransit);
        assert_eq!(o.advance().unwrap(), OrderStatus::Delivered);
    }

    #[test]
    fn test_cancel_delivered_fails() {
        let mut o = order(DeliveryTier::Express);
        o.confirm().unwrap();
        o.start_transit().unwrap();
        o.complete_delivery().unwrap();
        assert_eq!(o.cancel("customer backed out"), Err(OrderError::AlreadyDelivered));
        assert_eq!(o.status(), OrderStatus::Delivered);
        assert!(o.notes().is_none());
    }

    #[test]
    fn test_cancel_from_each_open_state_appends_reason() {
        for steps in 0..3 {
            let mut o = order(DeliveryTier::Standard);
            for _ in 0..steps { o.advance().unwrap(); }
            o.cancel("customer backed out").unwrap();
            assert_eq!(o.status(), OrderStatus::Canceled);
            assert!(o.notes().unwrap().ends_with("CANCELLATION: customer backed out"));
            assert!(!o.is_active());
        }
    }

    #[test]
    fn test_cancel_preserves_prior_notes_and_ignores_blank_reason() {
        let mut o = order(DeliveryTier::Standard);
        o.notes = Some("leave at the door".into());
        o.cancel("wrong address").unwrap();
        assert_eq!(o.notes(), Some("leave at the door\nCANCELLATION: wrong address"));

        let mut quiet = order(DeliveryTier::Standard);
        quiet.cancel("   ").unwrap();
        assert_eq!(quiet.status(), OrderStatus::Canceled);
        assert!(quiet.notes().is_none());
    }

    #[test]
    fn test_is_late() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut o = order(DeliveryTier::Express);
        assert!(!o.is_late_on(day));
        o.confirm_on(day).unwrap();
        assert!(!o.is_late_on(day + Duration::days(1)));
        assert!(o.is_late_on(day + Duration::days(2)));
        o.start_transit().unwrap();
        o.complete_delivery().unwrap();
        assert!(!o.is_late_on(day + Duration::days(30)));
    }

    #[test]
    fn test_interstate() {
        assert!(order(DeliveryTier::Express).is_interstate());
        let mut local = order(DeliveryTier::Express);
        local.destination.state = FederativeUnit::SP;
        assert!(!local.is_interstate());
    }

    #[test]
    fn test_total_value_requires_freight() {
        let mut o = order(DeliveryTier::Standard);
        assert!(o.total_value().is_none());
        let freight = freight_for(&o, 100);
        o.attach_freight(freight).unwrap();
        assert_eq!(o.total_value().unwrap().amount(), Decimal::new(41800, 2));
        assert_eq!(o.pricing_status(), PricingStatus::Priced);
    }

    #[test]
    fn test_single_freight_per_order() {
        let mut o = order(DeliveryTier::Standard);
        o.attach_freight(freight_for(&o, 100)).unwrap();
        let second = freight_for(&o, 50);
        assert_eq!(o.attach_freight(second), Err(OrderError::FreightAlreadyAttached));
    }

    #[test]
    fn test_freight_tier_must_match() {
        let mut o = order(DeliveryTier::Standard);
        let express = order(DeliveryTier::Express);
        assert!(matches!(o.attach_freight(freight_for(&express, 10)), Err(OrderError::TierMismatch { .. })));
    }

    #[test]
    fn test_recompute_propagates_weight() {
        let mut o = order(DeliveryTier::Standard);
        assert_eq!(o.recompute_freight(Decimal::ONE, None).unwrap_err(), OrderError::NoFreight);
        o.attach_freight(freight_for(&o, 100)).unwrap();
        let weight = Weight::new(Decimal::new(4, 0)).unwrap();
        let price = o.recompute_freight(Decimal::new(200, 0), Some(weight)).unwrap().price().amount();
        assert_eq!(price, Decimal::new(22100, 2));
        assert_eq!(o.weight(), Some(weight));
    }

    #[test]
    fn test_summary() {
        let o = order(DeliveryTier::Standard);
        assert_eq!(o.summary(), format!("{} - Mogi Mirim → Rio de Janeiro (Pending)", o.tracking_code()));
    }

    #[test]
    fn test_reissue_tracking_code_only_before_persist() {
        let mut o = order(DeliveryTier::Standard);
        o.reissue_tracking_code().unwrap();
        let code = o.tracking_code().clone();
        assert!(matches!(o.take_events().first(), Some(OrderEvent::Created { tracking_code, .. }) if *tracking_code == code));
        o.assign_identity(7);
        assert_eq!(o.reissue_tracking_code(), Err(OrderError::AlreadyPersisted));
    }

    #[test]
    fn test_snapshot_restore_keeps_state() {
        let mut o = order(DeliveryTier::Economy);
        o.attach_freight(freight_for(&o, 30)).unwrap();
        o.confirm().unwrap();
        let restored = Order::restore(o.snapshot());
        assert_eq!(restored.snapshot(), o.snapshot());
    }
}
