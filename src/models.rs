//! Data models for telemetry, requests and responses.
//!
//! Request payloads keep every field optional so that a missing field is a
//! checkable value rather than a framework rejection; the coordinator turns
//! them into fully-populated values or a `ValidationError`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::codec::FertilizerPrediction;

// ---

/// Latest sensor telemetry. Replaced as a whole, never field by field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading {
    // ---
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
}

/// Body of `POST /sensor`.
#[derive(Debug, Default, Deserialize)]
pub struct SensorPayload {
    // ---
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
}

/// Body of `POST /set_irrigation_state`.
#[derive(Debug, Default, Deserialize)]
pub struct IrrigationPayload {
    // ---
    pub state: Option<bool>,
}

/// Body of `POST /process_data`.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessDataPayload {
    // ---
    pub nitrogen: Option<f64>,
    pub potassium: Option<f64>,
    pub phosphorous: Option<f64>,
    #[serde(rename = "soilType", default, deserialize_with = "label")]
    pub soil_type: Option<String>,
    #[serde(rename = "cropType", default, deserialize_with = "label")]
    pub crop_type: Option<String>,
}

/// Accept any JSON value as a categorical label.
///
/// Non-string values keep their JSON text (`3`, `true`), which never names a
/// category, so they are rejected as unknown labels instead of failing the
/// whole body. `null` counts as absent.
fn label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Per-request nutrient levels, passed through to the classifier unchecked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nutrients {
    // ---
    pub nitrogen: f64,
    pub potassium: f64,
    pub phosphorous: f64,
}

/// Response of `GET /get_irrigation_state`.
#[derive(Debug, Serialize)]
pub struct IrrigationState {
    pub irrigation_state: bool,
}

/// Response of `POST /set_irrigation_state`.
#[derive(Debug, Serialize)]
pub struct IrrigationUpdated {
    pub success: bool,
    pub irrigation_state: bool,
}

/// Response of a successful `POST /sensor`.
#[derive(Debug, Serialize)]
pub struct SensorAccepted {
    pub status: &'static str,
    pub message: &'static str,
}

impl Default for SensorAccepted {
    fn default() -> Self {
        Self {
            status: "success",
            message: "Sensor data received",
        }
    }
}

/// Response of a successful `POST /process_data`.
#[derive(Debug, Serialize)]
pub struct Recommendation {
    #[serde(rename = "Predicted Fertilizer")]
    pub predicted_fertilizer: FertilizerPrediction,
}
