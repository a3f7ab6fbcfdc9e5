//! Telemetry push and read endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::debug;

use super::{decode, AppState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/sensor", post(push))
        .route("/get_sensor_data", get(read))
}

/// Handle `POST /sensor`. All three readings are required.
async fn push(
    State(coordinator): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    // ---
    debug!(?payload, "POST /sensor received");
    let payload = decode(payload);
    match coordinator.push_telemetry(payload) {
        Ok(accepted) => (StatusCode::OK, Json(accepted)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn read(State(coordinator): State<AppState>) -> impl IntoResponse {
    // ---
    debug!("GET /get_sensor_data called");
    (StatusCode::OK, Json(coordinator.current_telemetry()))
}
