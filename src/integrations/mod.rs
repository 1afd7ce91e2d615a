//! Outbound collaborators: driving distance and postal-code lookup.
//!
//! The orchestrator only sees the [`DistanceProvider`] and [`AddressLookup`]
//! traits; the HTTP-backed implementations live in the submodules.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::value_objects::{Address, FederativeUnit, PostalCode};
use crate::utils::IsTransient;

pub mod google_maps;
pub mod viacep;

pub use google_maps::GoogleDistanceMatrix;
pub use viacep::ViaCep;

/// Errors that can occur while asking for a driving distance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceError {
    /// Origin or destination could not be geocoded.
    #[error("Address not found: {0}")]
    AddressNotFound(String),
    /// Both addresses resolved but no driving route connects them.
    #[error("No route available between the addresses")]
    NoRoute,
    /// Network failure or an upstream error worth retrying.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The call did not settle within the retry window.
    #[error("Distance lookup interrupted")]
    Interrupted,
    /// The provider answered with something we cannot use.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl IsTransient for DistanceError {
    fn is_transient(&self) -> bool { matches!(self, Self::Transport(_)) }
}

/// Driving route between two addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDistance {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub origin_address: String,
    pub destination_address: String,
}

impl RouteDistance {
    pub fn distance_km(&self) -> Decimal { Decimal::new(self.distance_meters as i64, 3) }
    pub fn duration_minutes(&self) -> u64 { self.duration_seconds / 60 }
}

#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Driving distance between two free-text addresses.
    async fn distance(&self, origin: &str, destination: &str) -> Result<RouteDistance, DistanceError>;
}

/// Address returned by a postal-code lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub postal_code: PostalCode,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: FederativeUnit,
    pub area_code: Option<String>,
}

impl ResolvedAddress {
    pub fn into_address(self, number: Option<String>, complement: Option<String>) -> Address {
        Address::new(self.postal_code, self.street, number, self.neighborhood, self.city, self.state).with_complement(complement)
    }
}

#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// `None` when the code is unknown or the service could not be reached.
    async fn lookup(&self, postal_code: &PostalCode) -> Option<ResolvedAddress>;
}

/// Timeouts shared by the outbound HTTP clients.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self { Self { connect: Duration::from_secs(5), read: Duration::from_secs(10) } }
}

pub fn build_http_client(timeouts: &HttpTimeouts) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(timeouts.connect)
        .read_timeout(timeouts.read)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
}
