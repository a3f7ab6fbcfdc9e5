//! Boundary-facing request operations.
//!
//! One method per external endpoint. Each takes an already-decoded payload
//! (or the `ValidationError::Malformed` explaining why decoding failed) and
//! returns either the success body or a
//! rendered [`ApiError`]. Handlers in `routes` only adapt these to axum.

use std::ops::RangeInclusive;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::assembler::FeatureAssembler;
use crate::config::{ClassifierErrorStatus, Config, TelemetryValidation};
use crate::codec;
use crate::error::{ApiError, ClassifierError, Envelope, ValidationError};
use crate::gateway::ClassificationGateway;
use crate::models::{
    IrrigationPayload, IrrigationState, IrrigationUpdated, Nutrients, ProcessDataPayload,
    Recommendation, SensorAccepted, SensorPayload,
};
use crate::telemetry::TelemetryStore;
use crate::SensorReading;

// ---

pub const MSG_INVALID_REQUEST: &str = "Invalid request";
pub const MSG_MISSING_SENSOR_DATA: &str = "Missing required sensor data!";
pub const MSG_INVALID_DATA: &str = "Invalid data";
pub const MSG_INVALID_CATEGORY: &str = "Invalid Soil or Crop Type";

/// Physical bounds enforced under [`TelemetryValidation::Strict`].
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = -50.0..=70.0;
pub const HUMIDITY_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const SOIL_MOISTURE_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Orchestrates the store, assembler and gateway for each endpoint.
#[derive(Debug, Clone)]
pub struct RequestCoordinator {
    store: Arc<TelemetryStore>,
    assembler: FeatureAssembler,
    gateway: ClassificationGateway,
    classifier_error_status: ClassifierErrorStatus,
    telemetry_validation: TelemetryValidation,
}

impl RequestCoordinator {
    pub fn new(store: Arc<TelemetryStore>, gateway: ClassificationGateway, config: &Config) -> Self {
        Self {
            assembler: FeatureAssembler::new(Arc::clone(&store)),
            store,
            gateway,
            classifier_error_status: config.classifier_error_status,
            telemetry_validation: config.telemetry_validation,
        }
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    pub fn gateway(&self) -> &ClassificationGateway {
        &self.gateway
    }

    /// `GET /get_irrigation_state`
    pub fn irrigation_state(&self) -> IrrigationState {
        IrrigationState {
            irrigation_state: self.store.irrigation(),
        }
    }

    /// `POST /set_irrigation_state`
    pub fn set_irrigation_state(
        &self,
        payload: Result<IrrigationPayload, ValidationError>,
    ) -> Result<IrrigationUpdated, ApiError> {
        // ---
        let invalid = || ApiError::bad_request(Envelope::Success, MSG_INVALID_REQUEST);

        let state = match payload {
            Ok(IrrigationPayload { state: Some(state) }) => state,
            Ok(_) => {
                warn!("Irrigation update without 'state'");
                return Err(invalid());
            }
            Err(detail) => {
                warn!("Rejected irrigation update: {}", detail);
                return Err(invalid());
            }
        };

        self.store.set_irrigation(state);
        info!(irrigation_state = state, "Irrigation state updated");
        Ok(IrrigationUpdated {
            success: true,
            irrigation_state: state,
        })
    }

    /// `POST /sensor`
    pub fn push_telemetry(
        &self,
        payload: Result<SensorPayload, ValidationError>,
    ) -> Result<SensorAccepted, ApiError> {
        // ---
        let payload = payload.map_err(|detail| {
            error!("Error updating sensor data: {}", detail);
            ApiError::bad_request(Envelope::Status, MSG_INVALID_DATA)
        })?;

        let reading = match payload {
            SensorPayload {
                temperature: Some(temperature),
                humidity: Some(humidity),
                soil_moisture: Some(soil_moisture),
            } => SensorReading {
                temperature,
                humidity,
                soil_moisture,
            },
            _ => {
                warn!(?payload, "Incomplete sensor data");
                return Err(ApiError::bad_request(
                    Envelope::Status,
                    MSG_MISSING_SENSOR_DATA,
                ));
            }
        };

        if self.telemetry_validation == TelemetryValidation::Strict {
            if let Err(e) = check_bounds(&reading) {
                warn!(?reading, "Implausible sensor data");
                return Err(ApiError::bad_request(Envelope::Status, e.to_string()));
            }
        }

        self.store.update_reading(reading);
        info!(?reading, "Updated sensor data");
        Ok(SensorAccepted::default())
    }

    /// `GET /get_sensor_data`
    pub fn current_telemetry(&self) -> SensorReading {
        self.store.current_reading()
    }

    /// `POST /process_data`
    pub fn recommend(
        &self,
        payload: Result<ProcessDataPayload, ValidationError>,
    ) -> Result<Recommendation, ApiError> {
        // ---
        let payload = payload.map_err(|e| {
            error!("Error in /process_data: {}", e);
            ApiError::bad_request(Envelope::Status, e.to_string())
        })?;

        let soil = payload.soil_type.as_deref().unwrap_or_default();
        let crop = payload.crop_type.as_deref().unwrap_or_default();

        let nutrients = match nutrients_from(&payload) {
            Ok(nutrients) => nutrients,
            // An unknown label outranks a missing nutrient.
            Err(_) if !labels_known(soil, crop) => return Err(invalid_category(soil, crop)),
            Err(e) => {
                warn!("Rejected /process_data: {}", e);
                return Err(ApiError::bad_request(Envelope::Status, e.to_string()));
            }
        };

        // Assembly only ever rejects categories.
        let features = self
            .assembler
            .assemble(nutrients, soil, crop)
            .map_err(|_| invalid_category(soil, crop))?;

        let predicted = self
            .gateway
            .classify(&features)
            .map_err(|e| self.classifier_failure(e))?;

        Ok(Recommendation {
            predicted_fertilizer: predicted,
        })
    }

    fn classifier_failure(&self, err: ClassifierError) -> ApiError {
        error!("Error in /process_data: {}", err);
        ApiError::bad_request(Envelope::Status, err.to_string())
            .with_status(self.classifier_error_status.status_for(&err))
    }
}

fn labels_known(soil: &str, crop: &str) -> bool {
    codec::encode_soil(soil).is_some() && codec::encode_crop(crop).is_some()
}

fn invalid_category(soil: &str, crop: &str) -> ApiError {
    error!("Invalid soil or crop type: Soil-{}, Crop-{}", soil, crop);
    ApiError::bad_request(Envelope::Status, MSG_INVALID_CATEGORY)
}

fn nutrients_from(payload: &ProcessDataPayload) -> Result<Nutrients, ValidationError> {
    // ---
    Ok(Nutrients {
        nitrogen: payload
            .nitrogen
            .ok_or(ValidationError::MissingField("nitrogen"))?,
        potassium: payload
            .potassium
            .ok_or(ValidationError::MissingField("potassium"))?,
        phosphorous: payload
            .phosphorous
            .ok_or(ValidationError::MissingField("phosphorous"))?,
    })
}

/// Collect every field outside its physical range.
fn check_bounds(reading: &SensorReading) -> Result<(), ValidationError> {
    // ---
    let checks = [
        ("temperature", reading.temperature, &TEMPERATURE_RANGE),
        ("humidity", reading.humidity, &HUMIDITY_RANGE),
        ("soil_moisture", reading.soil_moisture, &SOIL_MOISTURE_RANGE),
    ];
    let fields: Vec<&'static str> = checks
        .iter()
        .filter(|(_, value, range)| !range.contains(value))
        .map(|(name, _, _)| *name)
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { fields })
    }
}
