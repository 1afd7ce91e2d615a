//! Order event publishing.
//!
//! Events raised by the order aggregate are wrapped in an [`EventEnvelope`]
//! and sent to `logistics.orders.<event_type>`. Publishing happens after the
//! write has been committed.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::events::OrderEvent;

pub const SUBJECT_PREFIX: &str = "logistics.orders";

#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope<'a> {
    pub id: Uuid,
    pub order_id: i64,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: &'a OrderEvent,
}

impl<'a> EventEnvelope<'a> {
    pub fn new(order_id: i64, event: &'a OrderEvent) -> Self {
        Self { id: Uuid::now_v7(), order_id, occurred_at: Utc::now(), event }
    }

    pub fn subject(&self) -> String { format!("{}.{}", SUBJECT_PREFIX, self.event.event_type()) }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, order_id: i64, event: &OrderEvent) -> Result<()>;
}

pub struct NatsEventPublisher { client: async_nats::Client }

impl NatsEventPublisher {
    pub fn new(client: async_nats::Client) -> Self { Self { client } }
}

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish(&self, order_id: i64, event: &OrderEvent) -> Result<()> {
        let envelope = EventEnvelope::new(order_id, event);
        let subject = envelope.subject();
        let payload = serde_json::to_vec(&envelope)?;
        self.client.publish(subject.clone(), payload.into()).await?;
        tracing::debug!(subject = %subject, event_id = %envelope.id, tracking_code = %event.tracking_code(), "Published order event");
        Ok(())
    }
}

/// Writes events to the log. Used when no broker is configured.
#[derive(Default)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, order_id: i64, event: &OrderEvent) -> Result<()> {
        let envelope = EventEnvelope::new(order_id, event);
        tracing::info!(subject = %envelope.subject(), order_id, payload = %serde_json::to_string(&envelope)?, "Order event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{DeliveryTier, TrackingCode};

    #[test]
    fn test_envelope_shape() {
        let event = OrderEvent::Created { tracking_code: TrackingCode::parse("CE123456001").unwrap(), tier: DeliveryTier::Express };
        let envelope = EventEnvelope::new(12, &event);
        assert_eq!(envelope.subject(), "logistics.orders.created");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["order_id"], 12);
        assert_eq!(json["type"], "Created");
        assert_eq!(json["data"]["tracking_code"], "CE123456001");
        assert_eq!(json["data"]["tier"], "EXPRESS");
    }

    #[tokio::test]
    async fn test_tracing_publisher_accepts_events() {
        let event = OrderEvent::TransitStarted { tracking_code: TrackingCode::parse("CE1").unwrap() };
        assert!(TracingEventPublisher.publish(1, &event).await.is_ok());
    }
}
