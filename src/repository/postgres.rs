//! PostgreSQL order store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use super::{OrderRepository, RepositoryError};
use crate::domain::aggregates::{FreightSnapshot, Order, OrderSnapshot, OrderStatus, PricingStatus};
use crate::domain::pricing::TierRates;
use crate::domain::value_objects::{
    Address, Cpf, CustomerRef, DeclaredValue, DeliveryTier, Height, Money, Phone, PostalCode, TrackingCode, ValueError, Weight,
};

const SELECT_ORDERS: &str = "SELECT o.id, o.tracking_code, o.version, o.customer_name, o.customer_email, o.customer_phone, o.customer_cpf, o.origin, o.destination, \
    o.tier, o.status, o.pricing_status, o.placed_at, o.estimated_delivery, o.delivered_at, o.description, \
    o.weight_kg, o.height_cm, o.declared_value, o.notes, o.updated_at, \
    f.tier AS f_tier, f.price AS f_price, f.currency AS f_currency, f.distance_km AS f_distance_km, \
    f.lead_time_days AS f_lead_time_days, f.computed_at AS f_computed_at, f.breakdown AS f_breakdown, \
    f.notes AS f_notes, f.origin_postal_code AS f_origin_postal_code, f.destination_postal_code AS f_destination_postal_code \
    FROM orders o LEFT JOIN freights f ON f.order_id = o.id";

#[derive(Clone)]
pub struct PgOrderRepository { pool: PgPool }

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    async fn write_freight(tx: &mut Transaction<'_, Postgres>, order_id: i64, f: &FreightSnapshot) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO freights (order_id, tier, price, currency, distance_km, lead_time_days, computed_at, breakdown, notes, origin_postal_code, destination_postal_code) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
            ON CONFLICT (order_id) DO UPDATE SET tier = EXCLUDED.tier, price = EXCLUDED.price, currency = EXCLUDED.currency, \
            distance_km = EXCLUDED.distance_km, lead_time_days = EXCLUDED.lead_time_days, computed_at = EXCLUDED.computed_at, \
            breakdown = EXCLUDED.breakdown, notes = EXCLUDED.notes, origin_postal_code = EXCLUDED.origin_postal_code, \
            destination_postal_code = EXCLUDED.destination_postal_code")
            .bind(order_id).bind(f.tier.as_str()).bind(f.price.amount()).bind(f.price.currency()).bind(f.distance_km)
            .bind(f.lead_time_days as i32).bind(f.computed_at).bind(f.breakdown.map(Json)).bind(&f.notes)
            .bind(f.origin_postal_code.digits()).bind(f.destination_postal_code.digits())
            .execute(&mut **tx).await?;
        Ok(())
    }

    async fn fetch(&self, filter: &str, bind: Option<&str>) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("{} {} ORDER BY o.placed_at DESC, o.id DESC", SELECT_ORDERS, filter);
        let mut query = sqlx::query_as::<_, OrderRow>(&sql);
        if let Some(value) = bind { query = query.bind(value); }
        query.fetch_all(&self.pool).await?.into_iter().map(OrderRow::into_order).collect()
    }
}

fn unique_violation(e: sqlx::Error, code: &TrackingCode) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::DuplicateTrackingCode(code.to_string()),
        _ => e.into(),
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, mut order: Order) -> Result<Order, RepositoryError> {
        if order.id().is_some() {
            return Err(RepositoryError::Backend("order already has an identity".to_string()));
        }
        order.normalize();
        let s = order.snapshot();
        let mut tx = self.pool.begin().await?;
        let (id,): (i64,) = sqlx::query_as("INSERT INTO orders (tracking_code, version, customer_name, customer_email, origin, destination, tier, status, pricing_status, \
            placed_at, estimated_delivery, delivered_at, description, weight_kg, height_cm, declared_value, notes, updated_at, customer_phone, customer_cpf) \
            VALUES ($1, 1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) RETURNING id")
            .bind(s.tracking_code.as_str()).bind(&s.customer.name).bind(&s.customer.email)
            .bind(Json(&s.origin)).bind(Json(&s.destination)).bind(s.tier.as_str()).bind(s.status.as_str()).bind(s.pricing.as_str())
            .bind(s.placed_at).bind(s.estimated_delivery).bind(s.delivered_at).bind(&s.description)
            .bind(s.weight.map(|w| w.kg())).bind(s.height.map(|h| h.cm())).bind(s.declared_value.map(|v| v.amount()))
            .bind(&s.notes).bind(s.updated_at)
            .bind(s.customer.phone.as_ref().map(Phone::digits)).bind(s.customer.cpf.as_ref().map(Cpf::digits))
            .fetch_one(&mut *tx).await
            .map_err(|e| unique_violation(e, &s.tracking_code))?;
        if let Some(freight) = &s.freight { Self::write_freight(&mut tx, id, freight).await?; }
        tx.commit().await?;

        order.assign_identity(id);
        order.set_version(1);
        tracing::debug!(order_id = id, tracking_code = %s.tracking_code, "Order inserted");
        Ok(order)
    }

    async fn update(&self, mut order: Order) -> Result<Order, RepositoryError> {
        let id = order.id().ok_or_else(|| RepositoryError::NotFound("Order has not been stored yet".to_string()))?;
        order.normalize();
        let s = order.snapshot();
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query("UPDATE orders SET version = version + 1, customer_name = $3, customer_email = $4, origin = $5, destination = $6, \
            status = $7, pricing_status = $8, estimated_delivery = $9, delivered_at = $10, description = $11, weight_kg = $12, \
            height_cm = $13, declared_value = $14, notes = $15, updated_at = $16, customer_phone = $17, customer_cpf = $18 \
            WHERE id = $1 AND version = $2")
            .bind(id).bind(s.version).bind(&s.customer.name).bind(&s.customer.email)
            .bind(Json(&s.origin)).bind(Json(&s.destination)).bind(s.status.as_str()).bind(s.pricing.as_str())
            .bind(s.estimated_delivery).bind(s.delivered_at).bind(&s.description)
            .bind(s.weight.map(|w| w.kg())).bind(s.height.map(|h| h.cm())).bind(s.declared_value.map(|v| v.amount()))
            .bind(&s.notes).bind(s.updated_at)
            .bind(s.customer.phone.as_ref().map(Phone::digits)).bind(s.customer.cpf.as_ref().map(Cpf::digits))
            .execute(&mut *tx).await?;

        if updated.rows_affected() == 0 {
            let current: Option<(i64,)> = sqlx::query_as("SELECT version FROM orders WHERE id = $1").bind(id).fetch_optional(&mut *tx).await?;
            return Err(match current {
                Some((actual,)) => RepositoryError::StaleVersion { expected: s.version, actual },
                None => RepositoryError::NotFound(format!("No order with id {}", id)),
            });
        }
        if let Some(freight) = &s.freight { Self::write_freight(&mut tx, id, freight).await?; }
        tx.commit().await?;

        order.set_version(s.version + 1);
        Ok(order)
    }

    async fn find_by_tracking_code(&self, code: &TrackingCode) -> Result<Option<Order>, RepositoryError> {
        Ok(self.fetch("WHERE o.tracking_code = $1", Some(code.as_str())).await?.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        self.fetch("", None).await
    }

    async fn list_excluding(&self, excluded: &[OrderStatus]) -> Result<Vec<Order>, RepositoryError> {
        let excluded: Vec<&str> = excluded.iter().map(OrderStatus::as_str).collect();
        let sql = format!("{} WHERE o.status <> ALL($1) ORDER BY o.placed_at DESC, o.id DESC", SELECT_ORDERS);
        let rows = sqlx::query_as::<_, OrderRow>(&sql).bind(excluded).fetch_all(&self.pool).await?;
        rows.into_iter().map(OrderRow::into_order).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64, tracking_code: String, version: i64, customer_name: String, customer_email: String,
    customer_phone: Option<String>, customer_cpf: Option<String>,
    origin: Json<Address>, destination: Json<Address>, tier: String, status: String, pricing_status: String,
    placed_at: DateTime<Utc>, estimated_delivery: Option<NaiveDate>, delivered_at: Option<DateTime<Utc>>,
    description: String, weight_kg: Option<Decimal>, height_cm: Option<Decimal>, declared_value: Option<Decimal>,
    notes: Option<String>, updated_at: DateTime<Utc>,
    f_tier: Option<String>, f_price: Option<Decimal>, f_currency: Option<String>, f_distance_km: Option<Decimal>,
    f_lead_time_days: Option<i32>, f_computed_at: Option<DateTime<Utc>>, f_breakdown: Option<Json<TierRates>>,
    f_notes: Option<String>, f_origin_postal_code: Option<String>, f_destination_postal_code: Option<String>,
}

fn corrupt(id: i64, what: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Backend(format!("order {} has an unreadable column: {}", id, what))
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let id = self.id;
        let freight = self.freight().map_err(|e| corrupt(id, e))?;
        Ok(Order::restore(OrderSnapshot {
            id: Some(id),
            tracking_code: TrackingCode::parse(&self.tracking_code).map_err(|e| corrupt(id, e))?,
            version: self.version,
            customer: CustomerRef {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone.as_deref().map(Phone::parse).transpose().map_err(|e| corrupt(id, e))?,
                cpf: self.customer_cpf.as_deref().map(Cpf::parse).transpose().map_err(|e| corrupt(id, e))?,
            },
            origin: self.origin.0,
            destination: self.destination.0,
            tier: self.tier.parse::<DeliveryTier>().map_err(|e| corrupt(id, e))?,
            status: self.status.parse::<OrderStatus>().map_err(|e| corrupt(id, e))?,
            pricing: self.pricing_status.parse::<PricingStatus>().map_err(|e| corrupt(id, e))?,
            placed_at: self.placed_at,
            estimated_delivery: self.estimated_delivery,
            delivered_at: self.delivered_at,
            description: self.description,
            weight: self.weight_kg.map(Weight::try_from).transpose().map_err(|e| corrupt(id, e))?,
            height: self.height_cm.map(Height::try_from).transpose().map_err(|e| corrupt(id, e))?,
            declared_value: self.declared_value.map(DeclaredValue::try_from).transpose().map_err(|e| corrupt(id, e))?,
            notes: self.notes,
            freight,
            updated_at: self.updated_at,
        }))
    }

    fn freight(&self) -> Result<Option<FreightSnapshot>, String> {
        let Some(tier) = &self.f_tier else { return Ok(None) };
        let missing = |column: &str| format!("freight column {} is null", column);
        Ok(Some(FreightSnapshot {
            tier: tier.parse::<DeliveryTier>().map_err(|e: ValueError| e.to_string())?,
            price: Money::new(self.f_price.ok_or_else(|| missing("price"))?, self.f_currency.as_deref().unwrap_or("BRL")),
            distance_km: self.f_distance_km.ok_or_else(|| missing("distance_km"))?,
            lead_time_days: u32::try_from(self.f_lead_time_days.ok_or_else(|| missing("lead_time_days"))?).map_err(|e| e.to_string())?,
            computed_at: self.f_computed_at.ok_or_else(|| missing("computed_at"))?,
            breakdown: self.f_breakdown.as_ref().map(|b| b.0),
            notes: self.f_notes.clone(),
            origin_postal_code: PostalCode::parse(self.f_origin_postal_code.as_deref().unwrap_or_default()).map_err(|e| e.to_string())?,
            destination_postal_code: PostalCode::parse(self.f_destination_postal_code.as_deref().unwrap_or_default()).map_err(|e| e.to_string())?,
        }))
    }
}
