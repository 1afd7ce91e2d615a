//! Application services
pub mod catalog;
pub mod dto;
pub mod orders;

pub use dto::{CancelRequest, CreateOrderRequest, CustomerRequest, DestinationRequest, OrderView, RecomputeFreightRequest, TransitionRequest};
pub use catalog::{Catalog, CatalogItem};
pub use orders::OrderService;
