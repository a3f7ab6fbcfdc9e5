// src/routes/health.rs
//! Service health check endpoint.
//!
//! `GET /health` reports that the service answers HTTP, whether the
//! classifier loaded at startup, and when telemetry last arrived. It
//! follows the Explicit Module Boundary Pattern (EMBP):
//! - Internal to this file: endpoint handler(s) and related types
//! - Exports to the gateway (`mod.rs`): a subrouter containing the `/health` route

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    classifier: &'static str,
    last_reading_at: Option<DateTime<Utc>>,
}

/// Handle `GET /health`.
///
/// Reads only in-memory state; the classifier itself is never invoked.
async fn health(State(coordinator): State<AppState>) -> Json<HealthResponse> {
    let classifier = if coordinator.gateway().is_available() {
        "available"
    } else {
        "unavailable"
    };
    Json(HealthResponse {
        status: "ok",
        classifier,
        last_reading_at: coordinator.store().last_updated(),
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
