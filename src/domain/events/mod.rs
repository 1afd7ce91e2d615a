//! Domain events
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DeliveryTier, TrackingCode};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created { tracking_code: TrackingCode, tier: DeliveryTier },
    Priced { tracking_code: TrackingCode, price: Decimal, distance_km: Decimal },
    Repriced { tracking_code: TrackingCode, price: Decimal, distance_km: Decimal },
    Confirmed { tracking_code: TrackingCode, estimated_delivery: NaiveDate },
    TransitStarted { tracking_code: TrackingCode },
    Delivered { tracking_code: TrackingCode, delivered_at: DateTime<Utc> },
    Canceled { tracking_code: TrackingCode, reason: Option<String> },
}

impl OrderEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Priced { .. } => "priced",
            Self::Repriced { .. } => "repriced",
            Self::Confirmed { .. } => "confirmed",
            Self::TransitStarted { .. } => "transit_started",
            Self::Delivered { .. } => "delivered",
            Self::Canceled { .. } => "canceled",
        }
    }

    pub fn tracking_code(&self) -> &TrackingCode {
        match self {
            Self::Created { tracking_code, .. }
            | Self::Priced { tracking_code, .. }
            | Self::Repriced { tracking_code, .. }
            | Self::Confirmed { tracking_code, .. }
            | Self::TransitStarted { tracking_code }
            | Self::Delivered { tracking_code, .. }
            | Self::Canceled { tracking_code, .. } => tracking_code,
        }
    }
}
