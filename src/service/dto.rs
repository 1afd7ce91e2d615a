//! Request and response shapes for the order service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::{Order, OrderStatus, PricingStatus};
use crate::domain::value_objects::{Address, Cpf, DeliveryTier, Phone, PostalCode};
use crate::LogisticsError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate]
    pub destination: DestinationRequest,
    #[validate(length(min = 1, message = "delivery tier is required"))]
    pub tier: String,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(min = 0.1, max = 15.0))]
    pub weight: Option<f64>,
    #[validate(range(min = 20.0, max = 100.0))]
    pub height: Option<f64>,
    #[validate(range(min = 0.0))]
    pub declared_value: Option<f64>,
    #[validate]
    pub customer: Option<CustomerRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DestinationRequest {
    #[validate(length(min = 8, max = 9))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(max = 10))]
    pub number: Option<String>,
    #[validate(length(max = 100))]
    pub complement: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub neighborhood: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(equal = 2))]
    pub state: String,
    #[validate(length(max = 200))]
    pub reference: Option<String>,
}

impl DestinationRequest {
    pub fn to_address(&self) -> Result<Address, LogisticsError> {
        Ok(Address::new(
            PostalCode::parse(&self.postal_code)?,
            self.street.clone(),
            self.number.clone(),
            self.neighborhood.clone(),
            self.city.clone(),
            self.state.parse()?,
        )
        .with_complement(self.complement.clone())
        .with_reference(self.reference.clone()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 16))]
    pub phone: Option<String>,
    #[validate(length(max = 14))]
    pub cpf: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionRequest {
    pub expected_version: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
    pub expected_version: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecomputeFreightRequest {
    #[validate(range(min = 0.001, max = 9999.99))]
    pub distance_km: f64,
    #[validate(range(min = 0.1, max = 15.0))]
    pub weight: Option<f64>,
}

pub(crate) fn tier(raw: &str) -> Result<DeliveryTier, LogisticsError> { Ok(raw.parse()?) }

/// Converts a validated JSON number into a decimal with at most `dp` places.
pub(crate) fn decimal(field: &str, value: f64, dp: u32) -> Result<Decimal, LogisticsError> {
    Decimal::try_from(value)
        .map(|d| d.round_dp(dp).normalize())
        .map_err(|_| LogisticsError::InvalidArgument(format!("{} is not a finite number", field)))
}

/// What callers see of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: Option<i64>,
    pub tracking_code: String,
    pub version: i64,
    pub status: OrderStatus,
    pub status_label: String,
    pub pricing_status: PricingStatus,
    pub tier: DeliveryTier,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_cpf: Option<String>,
    pub origin: String,
    pub destination: String,
    pub delivery_address: String,
    pub interstate: bool,
    pub description: String,
    pub placed_at: DateTime<Utc>,
    pub estimated_delivery: Option<NaiveDate>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub late: bool,
    pub price: Option<String>,
    pub lead_time: Option<String>,
    pub distance: Option<String>,
    pub total_value: Option<String>,
    pub notes: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(o: &Order) -> Self {
        let freight = o.freight();
        Self {
            id: o.id(),
            tracking_code: o.tracking_code().to_string(),
            version: o.version(),
            status: o.status(),
            status_label: o.status().label().to_string(),
            pricing_status: o.pricing_status(),
            tier: o.tier(),
            customer_name: o.customer().name.clone(),
            customer_phone: o.customer().phone.as_ref().map(Phone::formatted),
            customer_cpf: o.customer().cpf.as_ref().map(Cpf::formatted),
            origin: o.origin().postal_formatted(),
            destination: o.destination().postal_formatted(),
            delivery_address: o.destination().full_description(),
            interstate: o.is_interstate(),
            description: o.description().to_string(),
            placed_at: o.placed_at(),
            estimated_delivery: o.estimated_delivery(),
            delivered_at: o.delivered_at(),
            late: o.is_late(),
            price: freight.map(|f| f.formatted_price()),
            lead_time: freight.map(|f| f.formatted_lead_time()),
            distance: freight.map(|f| f.formatted_distance()),
            total_value: o.total_value().map(|m| m.formatted()),
            notes: o.notes().map(str::to_string),
        }
    }
}

impl OrderView {
    pub fn is_awaiting_pricing(&self) -> bool { self.pricing_status == PricingStatus::AwaitingPricing }
}
