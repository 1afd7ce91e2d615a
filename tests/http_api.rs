mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use opensase_logistics::http::{router, AppState};
use opensase_logistics::integrations::DistanceError;
use opensase_logistics::service::Catalog;

fn app(distances: StubDistance) -> Router {
    let h = harness(distances, StubLookup::origin());
    router(AppState { orders: Arc::new(h.service), catalog: Arc::new(Catalog::embedded().unwrap()) })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn order_body() -> Value {
    json!({
        "destination": {
            "postal_code": "20040-020", "street": "Avenida Rio Branco", "number": "156",
            "neighborhood": "Centro", "city": "Rio de Janeiro", "state": "RJ"
        },
        "tier": "EXPRESS",
        "description": "Reborn doll, 50cm",
        "weight": 2.0
    })
}

#[tokio::test]
async fn test_health() {
    let app = app(StubDistance::answering(Ok(route(1_000))));
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_then_fetch_and_walk_status() {
    let app = app(StubDistance::answering(Ok(route(100_000))));
    let (status, created) = send(&app, Method::POST, "/api/v1/orders", Some(order_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    // 25.00 + 100 * 1.50 + 2 * 2.00
    assert_eq!(created["price"], "R$ 179.00");
    assert_eq!(created["lead_time"], "1 business day");
    assert_eq!(created["status_label"], "Pending");
    let code = created["tracking_code"].as_str().unwrap().to_string();

    let (status, fetched) = send(&app, Method::GET, &format!("/api/v1/orders/{}", code), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["tracking_code"], code.as_str());

    let (status, confirmed) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/status", code), Some(json!({"expected_version": 2}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "CONFIRMED");

    let (status, error) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/status", code), Some(json!({"expected_version": 2}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["status"], 409);
    assert_eq!(error["error"], "Conflict");

    let (status, in_transit) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/status", code), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(in_transit["status_label"], "In Transit");

    let (status, active) = send(&app, Method::GET, "/api/v1/orders/active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_and_invalid_transition() {
    let app = app(StubDistance::answering(Ok(route(10_000))));
    let (_, created) = send(&app, Method::POST, "/api/v1/orders", Some(order_body())).await;
    let code = created["tracking_code"].as_str().unwrap().to_string();

    let (status, canceled) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/cancel", code), Some(json!({"reason": "customer backed out"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(canceled["status"], "CANCELED");
    assert_eq!(canceled["notes"], "CANCELLATION: customer backed out");

    let (status, error) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/status", code), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(error["message"].as_str().unwrap().contains("cannot advance"));

    let (_, active) = send(&app, Method::GET, "/api/v1/orders/active", None).await;
    assert!(active.as_array().unwrap().is_empty());
    let (_, all) = send(&app, Method::GET, "/api/v1/orders", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_distance_outage_is_503_with_generic_message() {
    let app = app(StubDistance::answering(Err(DistanceError::Transport("connect to 10.1.2.3 refused".into()))));
    let (status, error) = send(&app, Method::POST, "/api/v1/orders", Some(order_body())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["error"], "Service Unavailable");
    assert!(!error["message"].as_str().unwrap().contains("10.1.2.3"));
    let code = error["tracking_code"].as_str().unwrap().to_string();
    assert!(code.starts_with("CE"));

    let (status, pending) = send(&app, Method::GET, &format!("/api/v1/orders/{}", code), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["pricing_status"], "AWAITING_PRICING");

    let (status, _) = send(&app, Method::POST, &format!("/api/v1/orders/{}/pricing", code), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_bad_requests() {
    let app = app(StubDistance::answering(Ok(route(10_000))));

    let mut heavy = order_body();
    heavy["weight"] = json!(16.0);
    let (status, error) = send(&app, Method::POST, "/api/v1/orders", Some(heavy)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["status"], 400);

    let mut unknown_tier = order_body();
    unknown_tier["tier"] = json!("OVERNIGHT");
    let (status, _) = send(&app, Method::POST, "/api/v1/orders", Some(unknown_tier)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, error) = send(&app, Method::GET, "/api/v1/orders/CE000000001", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "Not Found");
    assert!(error.get("tracking_code").is_none());
}

#[tokio::test]
async fn test_recompute_freight_endpoint() {
    let app = app(StubDistance::answering(Ok(route(10_000))));
    let (_, created) = send(&app, Method::POST, "/api/v1/orders", Some(order_body())).await;
    let code = created["tracking_code"].as_str().unwrap().to_string();
    let (status, repriced) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/freight", code), Some(json!({"distance_km": 20.0, "weight": 1.0}))).await;
    assert_eq!(status, StatusCode::OK);
    // 25.00 + 20 * 1.50 + 1 * 2.00
    assert_eq!(repriced["price"], "R$ 57.00");

    for distance in [json!(7e28), json!(10000.0)] {
        let (status, error) = send(&app, Method::PUT, &format!("/api/v1/orders/{}/freight", code), Some(json!({"distance_km": distance}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["status"], 400);
    }
    let (_, unchanged) = send(&app, Method::GET, &format!("/api/v1/orders/{}", code), None).await;
    assert_eq!(unchanged["price"], "R$ 57.00");
}

#[tokio::test]
async fn test_address_lookup() {
    let app = app(StubDistance::answering(Ok(route(10_000))));
    let (status, address) = send(&app, Method::GET, "/api/v1/addresses/13801-005", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(address["city"], "Mogi Mirim");
    assert_eq!(address["state"], "SP");
    assert_eq!(address["postal_code"], "13801-005");

    let (status, _) = send(&app, Method::GET, "/api/v1/addresses/99999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog() {
    let app = app(StubDistance::answering(Ok(route(10_000))));
    let (status, items) = send(&app, Method::GET, "/api/v1/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 6);
    assert_eq!(items[0]["id"], "BB001");
    assert_eq!(items[0]["weight_kg"], 2.5);

    let (status, miguel) = send(&app, Method::GET, "/api/v1/catalog/BB002", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(miguel["name"], "Miguel");
    assert_eq!(miguel["accessories"], "Blue romper, cap, baby bottle");

    let (status, _) = send(&app, Method::GET, "/api/v1/catalog/BB999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
