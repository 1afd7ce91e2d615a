//! HTTP surface
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;

use crate::integrations::ResolvedAddress;
use crate::service::{
    dto, CancelRequest, Catalog, CatalogItem, CreateOrderRequest, OrderService, OrderView, RecomputeFreightRequest, TransitionRequest,
};
use crate::LogisticsError;

#[derive(Clone)]
pub struct AppState { pub orders: Arc<OrderService>, pub catalog: Arc<Catalog> }

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-logistics"})) }))
        .route("/api/v1/orders", get(list_orders).post(create_order))
        .route("/api/v1/orders/active", get(list_active_orders))
        .route("/api/v1/orders/:code", get(get_order))
        .route("/api/v1/orders/:code/status", put(advance_status))
        .route("/api/v1/orders/:code/cancel", put(cancel_order))
        .route("/api/v1/orders/:code/pricing", post(retry_pricing))
        .route("/api/v1/orders/:code/freight", put(recompute_freight))
        .route("/api/v1/addresses/:cep", get(lookup_address))
        .route("/api/v1/catalog", get(list_catalog))
        .route("/api/v1/catalog/:id", get(get_catalog_item))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
}

impl LogisticsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AwaitingPricing { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LogisticsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        let body = ErrorBody {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.public_message(),
            tracking_code: self.tracking_code().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, LogisticsError>;

async fn create_order(State(s): State<AppState>, Json(r): Json<CreateOrderRequest>) -> ApiResult<(StatusCode, Json<OrderView>)> {
    Ok((StatusCode::CREATED, Json(s.orders.create_order(r).await?)))
}

async fn list_orders(State(s): State<AppState>) -> ApiResult<Json<Vec<OrderView>>> {
    Ok(Json(s.orders.list_all().await?))
}

async fn list_active_orders(State(s): State<AppState>) -> ApiResult<Json<Vec<OrderView>>> {
    Ok(Json(s.orders.list_active().await?))
}

async fn get_order(State(s): State<AppState>, Path(code): Path<String>) -> ApiResult<Json<OrderView>> {
    Ok(Json(s.orders.find_by_code(&code).await?))
}

async fn advance_status(State(s): State<AppState>, Path(code): Path<String>, body: Option<Json<TransitionRequest>>) -> ApiResult<Json<OrderView>> {
    let r = body.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(s.orders.advance_status(&code, r.expected_version).await?))
}

async fn cancel_order(State(s): State<AppState>, Path(code): Path<String>, body: Option<Json<CancelRequest>>) -> ApiResult<Json<OrderView>> {
    let r = body.map(|Json(r)| r).unwrap_or_default();
    r.validate()?;
    Ok(Json(s.orders.cancel(&code, r.reason.as_deref(), r.expected_version).await?))
}

async fn retry_pricing(State(s): State<AppState>, Path(code): Path<String>) -> ApiResult<Json<OrderView>> {
    Ok(Json(s.orders.retry_pricing(&code).await?))
}

async fn recompute_freight(State(s): State<AppState>, Path(code): Path<String>, Json(r): Json<RecomputeFreightRequest>) -> ApiResult<Json<OrderView>> {
    r.validate()?;
    let distance = dto::decimal("distance_km", r.distance_km, 3)?;
    let weight = r.weight.map(|w| dto::decimal("weight", w, 3)).transpose()?;
    Ok(Json(s.orders.recompute_freight(&code, distance, weight).await?))
}

async fn list_catalog(State(s): State<AppState>) -> Json<Vec<CatalogItem>> {
    Json(s.catalog.items().to_vec())
}

async fn get_catalog_item(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<CatalogItem>> {
    Ok(Json(s.catalog.find(&id)?.clone()))
}

async fn lookup_address(State(s): State<AppState>, Path(cep): Path<String>) -> ApiResult<Json<ResolvedAddress>> {
    Ok(Json(s.orders.lookup_address(&cep).await?))
}
