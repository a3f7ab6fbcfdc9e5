//! Error taxonomy for request handling.
//!
//! `ValidationError` is client-caused, `ClassifierError` comes from the
//! classification capability. Both are converted to an [`ApiError`] at the
//! coordinator boundary; nothing else crosses into the transport layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ---

/// Client input that cannot be turned into a request value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid category for {}", .fields.join(", "))]
    InvalidCategory { fields: Vec<&'static str> },

    #[error("Sensor data out of range: {}", .fields.join(", "))]
    OutOfRange { fields: Vec<&'static str> },

    #[error("{0}")]
    Malformed(String),
}

/// Failure of the external classification capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable")]
    Unavailable,

    #[error("Classifier invocation failed: {0}")]
    InvocationFailed(String),
}

/// JSON envelope used for an error body.
///
/// The irrigation endpoints answer with `{"success": false, ..}`, everything
/// else with `{"status": "error", ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Status,
    Success,
}

/// A fully-rendered failure response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub envelope: Envelope,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(envelope: Envelope, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            envelope,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.envelope {
            Envelope::Status => json!({ "status": "error", "message": self.message }),
            Envelope::Success => json!({ "success": false, "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
