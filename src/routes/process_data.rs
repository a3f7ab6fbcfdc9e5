//! Fertilizer recommendation endpoint.
//!
//! `POST /process_data` combines the latest telemetry with the nutrient,
//! soil and crop values in the body and answers with the classifier's
//! recommendation, e.g. `{"Predicted Fertilizer": "Urea"}`.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, info_span};
use uuid::Uuid;

use super::{decode, AppState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/process_data", post(handler))
}

async fn handler(
    State(coordinator): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    // ---
    let span = info_span!("process_data", request_id = %Uuid::new_v4());
    span.in_scope(|| {
        debug!(?payload, "POST /process_data received");
        let payload = decode(payload);
        match coordinator.recommend(payload) {
            Ok(recommendation) => Json(recommendation).into_response(),
            Err(e) => e.into_response(),
        }
    })
}
