//! Router fixtures for handler tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use fleetrent_core::ports::FixedClock;
use fleetrent_core::{RentalPolicy, RentalService};
use fleetrent_store::MemoryStore;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, TracingNotifier, create_router};

/// Day the test clock is stuck on.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// A router over an empty in-memory catalog.
pub async fn test_app() -> Router {
    let service = RentalService::open(
        RentalPolicy::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(TracingNotifier),
        Arc::new(FixedClock(today())),
    )
    .await
    .unwrap();
    create_router(AppState {
        service: Arc::new(service),
    })
}

/// Sends one request and decodes the JSON response.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Registers a 100/day vehicle and returns its id.
pub async fn register_vehicle(app: &Router, plate: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/vehicles",
        Some(json!({
            "make": "Toyota",
            "model": "Rush",
            "plate": plate,
            "pricing": {
                "base_price": "100",
                "insurance_rate": "0.10",
                "discounts": {}
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

/// Requests a 100/day rental with insurance for `user`.
pub async fn create_rental(app: &Router, vehicle_id: &str, user: &str, start: &str, end: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/v1/rentals",
        Some(json!({
            "customer": {
                "id": uuid::Uuid::new_v4(),
                "name": format!("{user} tester"),
                "email": format!("{user}@example.com")
            },
            "vehicle_id": vehicle_id,
            "start_date": start,
            "end_date": end,
            "insurance": true,
            "username": user
        })),
    )
    .await
}
