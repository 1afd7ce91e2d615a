//! Order orchestration: origin resolution, persistence, distance lookup and
//! pricing, plus the status transitions exposed to callers.

use rust_decimal::Decimal;
use std::sync::Arc;
use validator::Validate;

use super::dto::{self, CreateOrderRequest, OrderView};
use crate::config::OrderSettings;
use crate::domain::aggregates::{check_distance, Freight, NewOrder, Order, OrderError, OrderStatus};
use crate::domain::pricing;
use crate::domain::value_objects::{Address, CustomerRef, DeclaredValue, Height, PostalCode, TrackingCode, Weight};
use crate::integrations::{AddressLookup, DistanceError, DistanceProvider, ResolvedAddress};
use crate::messaging::EventPublisher;
use crate::repository::{OrderRepository, RepositoryError};
use crate::{LogisticsError, Result};

/// Statuses left out of the active order list.
pub const CLOSED_STATUSES: [OrderStatus; 2] = [OrderStatus::Delivered, OrderStatus::Canceled];

pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    distances: Arc<dyn DistanceProvider>,
    addresses: Arc<dyn AddressLookup>,
    events: Arc<dyn EventPublisher>,
    settings: OrderSettings,
}

impl OrderService {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        distances: Arc<dyn DistanceProvider>,
        addresses: Arc<dyn AddressLookup>,
        events: Arc<dyn EventPublisher>,
        settings: OrderSettings,
    ) -> Self {
        Self { repository, distances, addresses, events, settings }
    }

    // ==================== Creation ====================

    /// Places an order and prices it.
    ///
    /// The order is stored before the distance lookup. If the lookup fails the
    /// order stays pending and awaiting pricing and the error carries its
    /// tracking code; [`OrderService::retry_pricing`] finishes it later.
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderView> {
        request.validate()?;
        let tier = dto::tier(&request.tier)?;
        let destination = request.destination.to_address()?;
        let weight = request.weight.map(|v| dto::decimal("weight", v, 3)).transpose()?.map(Weight::new).transpose()?;
        let height = request.height.map(|v| dto::decimal("height", v, 2)).transpose()?.map(Height::new).transpose()?;
        let declared_value = request.declared_value
            .map(|v| dto::decimal("declared_value", v, 2)).transpose()?
            .map(DeclaredValue::new).transpose()?;
        let customer = match &request.customer {
            Some(c) => CustomerRef::new(c.name.clone(), c.email.clone())?.with_contact(c.phone.as_deref(), c.cpf.as_deref())?,
            None => self.settings.default_customer.clone(),
        };

        let origin = self.resolve_origin().await;
        let draft = Order::place(NewOrder { customer, origin, destination, tier, description: request.description, weight, height, declared_value })?;
        let mut order = self.insert_with_fresh_code(draft).await?;
        tracing::info!(tracking_code = %order.tracking_code(), tier = %tier, interstate = order.is_interstate(), "Order placed");
        self.publish(&mut order).await;

        let priced = self.price(order).await?;
        Ok(OrderView::from(&priced))
    }

    /// Prices an order left awaiting pricing. Orders that already carry a
    /// freight are returned as they are.
    pub async fn retry_pricing(&self, code: &str) -> Result<OrderView> {
        let order = self.load(code).await?;
        if !order.is_awaiting_pricing() {
            tracing::debug!(tracking_code = %order.tracking_code(), "Order already priced");
            return Ok(OrderView::from(&order));
        }
        if order.status() == OrderStatus::Canceled { return Err(OrderError::Canceled.into()); }
        let priced = self.price(order).await?;
        Ok(OrderView::from(&priced))
    }

    async fn resolve_origin(&self) -> Address {
        let origin = &self.settings.origin;
        match self.addresses.lookup(&origin.postal_code).await {
            Some(resolved) => {
                let address = resolved.into_address(origin.number.clone(), None);
                if address.is_complete() { return address; }
                tracing::warn!(postal_code = %origin.postal_code, "Resolved origin is incomplete, using fallback address");
            }
            None => tracing::warn!(postal_code = %origin.postal_code, "Origin lookup failed, using fallback address"),
        }
        origin.fallback.clone()
    }

    async fn insert_with_fresh_code(&self, mut order: Order) -> Result<Order> {
        let attempts = self.settings.tracking_code_attempts.max(1);
        for attempt in 1..=attempts {
            match self.repository.insert(order.clone()).await {
                Ok(stored) => return Ok(stored),
                Err(RepositoryError::DuplicateTrackingCode(code)) if attempt < attempts => {
                    tracing::warn!(tracking_code = %code, attempt, "Tracking code collision, drawing a new one");
                    order.reissue_tracking_code()?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(LogisticsError::Conflict("could not allocate a unique tracking code".to_string()))
    }

    async fn price(&self, mut order: Order) -> Result<Order> {
        let origin = order.origin().postal_formatted();
        let destination = order.destination().postal_formatted();
        let route = self.distances.distance(&origin, &destination).await.and_then(|route| {
            check_distance(route.distance_km()).map_err(|e| DistanceError::InvalidResponse(e.to_string()))?;
            Ok(route)
        });
        let route = match route {
            Ok(route) => route,
            Err(source) => {
                tracing::error!(tracking_code = %order.tracking_code(), error = %source, "Distance lookup failed, order left awaiting pricing");
                return Err(LogisticsError::AwaitingPricing { tracking_code: order.tracking_code().to_string(), source });
            }
        };

        let tier = order.tier();
        let distance_km = route.distance_km();
        let price = pricing::price(Some(tier), Some(distance_km), order.weight().map(|w| w.kg()))?;
        let freight = Freight::new(
            tier, price, distance_km, tier.lead_time_days(),
            order.origin().postal_code.clone(), order.destination().postal_code.clone(),
        )?.with_breakdown(tier.rates());
        tracing::info!(
            tracking_code = %order.tracking_code(), distance_km = %distance_km,
            duration_min = route.duration_minutes(), price = %freight.formatted_price(), "Freight computed"
        );
        order.attach_freight(freight)?;

        let mut saved = self.repository.update(order).await?;
        self.publish(&mut saved).await;
        Ok(saved)
    }

    // ==================== Queries ====================

    pub async fn find_by_code(&self, code: &str) -> Result<OrderView> {
        Ok(OrderView::from(&self.load(code).await?))
    }

    pub async fn list_all(&self) -> Result<Vec<OrderView>> {
        Ok(self.repository.list().await?.iter().map(OrderView::from).collect())
    }

    /// Orders that are neither delivered nor canceled.
    pub async fn list_active(&self) -> Result<Vec<OrderView>> {
        Ok(self.repository.list_excluding(&CLOSED_STATUSES).await?.iter().map(OrderView::from).collect())
    }

    pub async fn lookup_address(&self, postal_code: &str) -> Result<ResolvedAddress> {
        let postal_code = PostalCode::parse(postal_code)?;
        self.addresses.lookup(&postal_code).await
            .ok_or_else(|| LogisticsError::NotFound(format!("Postal code {} not found", postal_code)))
    }

    async fn load(&self, code: &str) -> Result<Order> {
        let code = TrackingCode::parse(code)?;
        self.repository.find_by_tracking_code(&code).await?
            .ok_or_else(|| LogisticsError::NotFound(format!("Order {} not found", code)))
    }

    // ==================== Transitions ====================

    pub async fn advance_status(&self, code: &str, expected_version: Option<i64>) -> Result<OrderView> {
        self.transition(code, expected_version, "advance", |o| o.advance().map(|_| ())).await
    }

    pub async fn confirm(&self, code: &str, expected_version: Option<i64>) -> Result<OrderView> {
        self.transition(code, expected_version, "confirm", Order::confirm).await
    }

    pub async fn start_transit(&self, code: &str, expected_version: Option<i64>) -> Result<OrderView> {
        self.transition(code, expected_version, "start_transit", Order::start_transit).await
    }

    pub async fn complete_delivery(&self, code: &str, expected_version: Option<i64>) -> Result<OrderView> {
        self.transition(code, expected_version, "complete_delivery", Order::complete_delivery).await
    }

    pub async fn cancel(&self, code: &str, reason: Option<&str>, expected_version: Option<i64>) -> Result<OrderView> {
        let reason = reason.unwrap_or_default();
        self.transition(code, expected_version, "cancel", |o| o.cancel(reason)).await
    }

    /// Reprices an order's freight for a new distance. An absent weight keeps
    /// the weight already on the order.
    pub async fn recompute_freight(&self, code: &str, distance_km: Decimal, weight: Option<Decimal>) -> Result<OrderView> {
        let weight = weight.map(Weight::new).transpose()?;
        self.transition(code, None, "recompute_freight", move |o| {
            let weight = weight.or(o.weight());
            o.recompute_freight(distance_km, weight).map(|_| ())
        }).await
    }

    async fn transition<F>(&self, code: &str, expected_version: Option<i64>, action: &'static str, apply: F) -> Result<OrderView>
    where
        F: FnOnce(&mut Order) -> std::result::Result<(), OrderError> + Send,
    {
        let mut order = self.load(code).await?;
        if let Some(expected) = expected_version {
            if expected != order.version() {
                return Err(RepositoryError::StaleVersion { expected, actual: order.version() }.into());
            }
        }
        let from = order.status();
        if let Err(e) = apply(&mut order) {
            tracing::warn!(tracking_code = %order.tracking_code(), action, status = %from, error = %e, "Transition rejected");
            return Err(e.into());
        }
        let mut saved = self.repository.update(order).await?;
        tracing::info!(tracking_code = %saved.tracking_code(), action, from = %from, to = %saved.status(), version = saved.version(), "Order updated");
        self.publish(&mut saved).await;
        Ok(OrderView::from(&saved))
    }

    async fn publish(&self, order: &mut Order) {
        let Some(id) = order.id() else { return };
        for event in order.take_events() {
            if let Err(e) = self.events.publish(id, &event).await {
                tracing::warn!(order_id = id, event = event.event_type(), error = %e, "Failed to publish order event");
            }
        }
    }
}
