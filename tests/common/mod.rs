//! Stub collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use opensase_logistics::config::{AppConfig, OrderSettings};
use opensase_logistics::domain::aggregates::{Order, OrderStatus};
use opensase_logistics::domain::events::OrderEvent;
use opensase_logistics::domain::value_objects::{FederativeUnit, PostalCode, TrackingCode};
use opensase_logistics::integrations::{AddressLookup, DistanceError, DistanceProvider, ResolvedAddress, RouteDistance};
use opensase_logistics::messaging::EventPublisher;
use opensase_logistics::repository::{MemoryOrderRepository, OrderRepository, RepositoryError};
use opensase_logistics::service::{CreateOrderRequest, DestinationRequest, OrderService};

pub fn route(meters: u64) -> RouteDistance {
    RouteDistance { distance_meters: meters, duration_seconds: meters / 20, origin_address: "origin".into(), destination_address: "destination".into() }
}

/// Answers queued results in order, then keeps answering `fallback`.
pub struct StubDistance {
    queued: Mutex<VecDeque<Result<RouteDistance, DistanceError>>>,
    fallback: Result<RouteDistance, DistanceError>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, String)>>,
}

impl StubDistance {
    pub fn answering(fallback: Result<RouteDistance, DistanceError>) -> Self {
        Self { queued: Mutex::new(VecDeque::new()), fallback, calls: AtomicUsize::new(0), requests: Mutex::new(vec![]) }
    }

    pub fn then(self, result: Result<RouteDistance, DistanceError>) -> Self {
        self.queued.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
    pub fn last_request(&self) -> Option<(String, String)> { self.requests.lock().unwrap().last().cloned() }
}

#[async_trait]
impl DistanceProvider for StubDistance {
    async fn distance(&self, origin: &str, destination: &str) -> Result<RouteDistance, DistanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((origin.to_string(), destination.to_string()));
        let queued = self.queued.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Default)]
pub struct StubLookup { known: HashMap<String, ResolvedAddress> }

impl StubLookup {
    pub fn with(mut self, cep: &str, street: &str, neighborhood: &str, city: &str, state: FederativeUnit) -> Self {
        let postal_code = PostalCode::parse(cep).unwrap();
        self.known.insert(postal_code.digits().to_string(), ResolvedAddress {
            postal_code, street: street.into(), neighborhood: neighborhood.into(), city: city.into(), state, area_code: None,
        });
        self
    }

    /// Resolves the default origin postal code to Mogi Mirim - SP.
    pub fn origin() -> Self {
        Self::default().with("13801-005", "Rua Ariovaldo Silveira Franco", "Jardim 31 de Março", "Mogi Mirim", FederativeUnit::SP)
    }
}

#[async_trait]
impl AddressLookup for StubLookup {
    async fn lookup(&self, postal_code: &PostalCode) -> Option<ResolvedAddress> {
        self.known.get(postal_code.digits()).cloned()
    }
}

#[derive(Default)]
pub struct RecordingPublisher { events: Mutex<Vec<(i64, OrderEvent)>> }

impl RecordingPublisher {
    pub fn types(&self) -> Vec<&'static str> { self.events.lock().unwrap().iter().map(|(_, e)| e.event_type()).collect() }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, order_id: i64, event: &OrderEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push((order_id, event.clone()));
        Ok(())
    }
}

/// Rejects the first `collisions` inserts as tracking-code clashes.
pub struct CollidingRepository { inner: MemoryOrderRepository, remaining: AtomicUsize, pub seen: Mutex<Vec<String>> }

impl CollidingRepository {
    pub fn new(collisions: usize) -> Self {
        Self { inner: MemoryOrderRepository::new(), remaining: AtomicUsize::new(collisions), seen: Mutex::new(vec![]) }
    }
}

#[async_trait]
impl OrderRepository for CollidingRepository {
    async fn insert(&self, order: Order) -> Result<Order, RepositoryError> {
        self.seen.lock().unwrap().push(order.tracking_code().to_string());
        if self.remaining.load(Ordering::SeqCst) > 0 {
            self.remaining.fetch_sub(1, Ordering::SeqCst);
            return Err(RepositoryError::DuplicateTrackingCode(order.tracking_code().to_string()));
        }
        self.inner.insert(order).await
    }
    async fn update(&self, order: Order) -> Result<Order, RepositoryError> { self.inner.update(order).await }
    async fn find_by_tracking_code(&self, code: &TrackingCode) -> Result<Option<Order>, RepositoryError> { self.inner.find_by_tracking_code(code).await }
    async fn list(&self) -> Result<Vec<Order>, RepositoryError> { self.inner.list().await }
    async fn list_excluding(&self, excluded: &[OrderStatus]) -> Result<Vec<Order>, RepositoryError> { self.inner.list_excluding(excluded).await }
}

pub fn settings() -> OrderSettings { AppConfig::from_lookup(|_| None).unwrap().orders }

pub struct Harness {
    pub service: OrderService,
    pub repository: Arc<dyn OrderRepository>,
    pub distances: Arc<StubDistance>,
    pub events: Arc<RecordingPublisher>,
}

pub fn harness(distances: StubDistance, lookup: StubLookup) -> Harness {
    harness_with(Arc::new(MemoryOrderRepository::new()), distances, lookup)
}

pub fn harness_with(repository: Arc<dyn OrderRepository>, distances: StubDistance, lookup: StubLookup) -> Harness {
    let distances = Arc::new(distances);
    let events = Arc::new(RecordingPublisher::default());
    let service = OrderService::new(repository.clone(), distances.clone(), Arc::new(lookup), events.clone(), settings());
    Harness { service, repository, distances, events }
}

pub fn destination(cep: &str, city: &str, state: &str) -> DestinationRequest {
    DestinationRequest {
        postal_code: cep.into(), street: "Avenida Rio Branco".into(), number: Some("156".into()), complement: None,
        neighborhood: "Centro".into(), city: city.into(), state: state.into(), reference: None,
    }
}

pub fn create_request(tier: &str, destination: DestinationRequest) -> CreateOrderRequest {
    CreateOrderRequest {
        destination, tier: tier.into(), description: "Reborn doll, 50cm".into(),
        weight: Some(2.0), height: Some(50.0), declared_value: Some(300.0), customer: None,
    }
}

pub fn to_rio() -> CreateOrderRequest { create_request("STANDARD", destination("20040-020", "Rio de Janeiro", "RJ")) }
