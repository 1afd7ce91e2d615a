//! OpenSASE Logistics Platform
//!
//! Self-hosted delivery order management with distance-based freight pricing.
//!
//! ## Features
//! - Order lifecycle (pending, confirmed, in transit, delivered, canceled)
//! - Freight pricing per delivery tier from real driving distance
//! - Postal-code address resolution with a configured fallback origin
//! - Optimistic concurrency on order writes
//! - Domain events published to NATS

use thiserror::Error;

pub mod config;
pub mod domain;
pub mod http;
pub mod integrations;
pub mod messaging;
pub mod repository;
pub mod service;
pub mod utils;

use crate::domain::aggregates::{FreightError, OrderError};
use crate::domain::pricing::PricingError;
use crate::domain::value_objects::ValueError;
use crate::integrations::DistanceError;
use crate::repository::RepositoryError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum LogisticsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The order was stored but the distance lookup failed; pricing can be
    /// retried with the tracking code.
    #[error("Order {tracking_code} awaiting pricing: {source}")]
    AwaitingPricing { tracking_code: String, source: DistanceError },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LogisticsError {
    /// Message safe to hand back to a caller. Integration and internal
    /// failures never leak collaborator details.
    pub fn public_message(&self) -> String {
        match self {
            Self::AwaitingPricing { .. } => {
                "Distance service temporarily unavailable, try again later".to_string()
            }
            Self::Internal(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }

    /// Tracking code of an order the caller should come back to.
    pub fn tracking_code(&self) -> Option<&str> {
        match self {
            Self::AwaitingPricing { tracking_code, .. } => Some(tracking_code),
            _ => None,
        }
    }
}

impl From<OrderError> for LogisticsError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Value(v) => Self::InvalidArgument(v.to_string()),
            OrderError::Freight(f) => f.into(),
            other => Self::InvalidState(other.to_string()),
        }
    }
}

impl From<FreightError> for LogisticsError {
    fn from(e: FreightError) -> Self {
        match e {
            FreightError::Pricing(p) => p.into(),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

impl From<PricingError> for LogisticsError {
    fn from(e: PricingError) -> Self { Self::InvalidArgument(e.to_string()) }
}

impl From<ValueError> for LogisticsError {
    fn from(e: ValueError) -> Self { Self::InvalidArgument(e.to_string()) }
}

impl From<validator::ValidationErrors> for LogisticsError {
    fn from(e: validator::ValidationErrors) -> Self { Self::Validation(e.to_string()) }
}

impl From<RepositoryError> for LogisticsError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(what) => Self::NotFound(what),
            RepositoryError::StaleVersion { .. } | RepositoryError::DuplicateTrackingCode(_) => {
                Self::Conflict(e.to_string())
            }
            RepositoryError::Backend(msg) => Self::Internal(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, LogisticsError>;
