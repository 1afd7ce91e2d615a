//! Domain layer: value objects, the order and freight aggregates, pricing.
pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod value_objects;
