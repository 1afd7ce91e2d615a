//! Order persistence.
//!
//! Orders and their freight are stored together. Every write is guarded by
//! the order's version: a write carrying a stale version is rejected so two
//! requests racing a status change cannot silently overwrite each other.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::{Order, OrderStatus};
use crate::domain::value_objects::TrackingCode;

pub mod memory;
pub mod postgres;

pub use memory::MemoryOrderRepository;
pub use postgres::PgOrderRepository;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    NotFound(String),
    #[error("Tracking code {0} is already in use")]
    DuplicateTrackingCode(String),
    #[error("Order was modified concurrently (expected version {expected}, found {actual})")]
    StaleVersion { expected: i64, actual: i64 },
    #[error("Storage error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self { Self::Backend(e.to_string()) }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a new order, assigning its id and version 1.
    async fn insert(&self, order: Order) -> Result<Order, RepositoryError>;

    /// Writes an existing order if its version matches the stored one,
    /// returning it with the bumped version.
    async fn update(&self, order: Order) -> Result<Order, RepositoryError>;

    async fn find_by_tracking_code(&self, code: &TrackingCode) -> Result<Option<Order>, RepositoryError>;

    /// All orders, newest first.
    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Orders whose status is not in `excluded`, newest first.
    async fn list_excluding(&self, excluded: &[OrderStatus]) -> Result<Vec<Order>, RepositoryError>;
}
