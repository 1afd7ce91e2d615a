//! Aggregates module
pub mod order;
pub mod freight;

pub use order::{today, NewOrder, Order, OrderError, OrderSnapshot, OrderStatus, PricingStatus};
pub use freight::{check_distance, format_lead_time, Freight, FreightError, FreightSnapshot};
