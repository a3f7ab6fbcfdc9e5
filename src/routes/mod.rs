//! Route gateway (EMBP): each endpoint module exports a sub-router and this
//! module merges them, attaches shared state and the HTTP middleware.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, Json, Router};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ValidationError;
use crate::RequestCoordinator;

mod health;
mod irrigation;
mod process_data;
mod sensor;

// ---

/// State shared by every handler.
pub type AppState = Arc<RequestCoordinator>;

pub fn router(coordinator: RequestCoordinator) -> Router {
    // ---
    Router::new()
        .merge(irrigation::router())
        .merge(sensor::router())
        .merge(process_data::router())
        .merge(health::router())
        .with_state(Arc::new(coordinator))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Decode a JSON body into a payload type, or describe why it can't be.
///
/// Bodies must be JSON objects; arrays are not accepted as positional
/// payloads.
fn decode<T: DeserializeOwned>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, ValidationError> {
    // ---
    let Json(value) =
        body.map_err(|rejection| ValidationError::Malformed(rejection.body_text()))?;
    if !value.is_object() {
        return Err(ValidationError::Malformed(format!(
            "expected a JSON object, got {value}"
        )));
    }
    serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
}
