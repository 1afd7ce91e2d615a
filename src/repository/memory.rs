//! In-memory order store, used in tests and when no database is configured.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{OrderRepository, RepositoryError};
use crate::domain::aggregates::{Order, OrderStatus};
use crate::domain::value_objects::TrackingCode;

#[derive(Default)]
pub struct MemoryOrderRepository {
    orders: Arc<RwLock<HashMap<i64, Order>>>,
    next_id: AtomicI64,
}

impl MemoryOrderRepository {
    pub fn new() -> Self { Self::default() }

    async fn sorted(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let orders = self.orders.read().await;
        let mut found: Vec<Order> = orders.values().filter(|o| keep(o)).cloned().collect();
        found.sort_by(|a, b| b.placed_at().cmp(&a.placed_at()).then_with(|| b.id().cmp(&a.id())));
        found
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn insert(&self, mut order: Order) -> Result<Order, RepositoryError> {
        if order.id().is_some() {
            return Err(RepositoryError::Backend("order already has an identity".to_string()));
        }
        let mut orders = self.orders.write().await;
        if orders.values().any(|o| o.tracking_code() == order.tracking_code()) {
            return Err(RepositoryError::DuplicateTrackingCode(order.tracking_code().to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        order.normalize();
        order.assign_identity(id);
        order.set_version(1);
        let mut stored = order.clone();
        stored.take_events();
        orders.insert(id, stored);
        Ok(order)
    }

    async fn update(&self, mut order: Order) -> Result<Order, RepositoryError> {
        let id = order.id().ok_or_else(|| RepositoryError::NotFound("Order has not been stored yet".to_string()))?;
        let mut orders = self.orders.write().await;
        let current = orders.get(&id).ok_or_else(|| RepositoryError::NotFound(format!("No order with id {}", id)))?;
        if current.version() != order.version() {
            return Err(RepositoryError::StaleVersion { expected: order.version(), actual: current.version() });
        }
        order.normalize();
        order.set_version(order.version() + 1);
        let mut stored = order.clone();
        stored.take_events();
        orders.insert(id, stored);
        Ok(order)
    }

    async fn find_by_tracking_code(&self, code: &TrackingCode) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.values().find(|o| o.tracking_code() == code).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.sorted(|_| true).await)
    }

    async fn list_excluding(&self, excluded: &[OrderStatus]) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.sorted(|o| !excluded.contains(&o.status())).await)
    }
}
