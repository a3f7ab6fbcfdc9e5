//! Irrigation actuator endpoints.
//!
//! - `GET /get_irrigation_state` → `{"irrigation_state": bool}`
//! - `POST /set_irrigation_state` with `{"state": bool}`

use axum::{
    extract::{rejection::JsonRejection, State},
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
        .route("/get_irrigation_state", get(get_state))
        .route("/set_irrigation_state", post(set_state))
}

async fn get_state(State(coordinator): State<AppState>) -> impl IntoResponse {
    // ---
    debug!("GET /get_irrigation_state called");
    Json(coordinator.irrigation_state())
}

async fn set_state(
    State(coordinator): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    // ---
    debug!(?payload, "POST /set_irrigation_state received");
    let payload = decode(payload);
    match coordinator.set_irrigation_state(payload) {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => e.into_response(),
    }
}
