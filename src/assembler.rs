//! Builds the classifier input from live telemetry and request attributes.

use std::sync::Arc;

use crate::codec;
use crate::error::ValidationError;
use crate::models::Nutrients;
use crate::telemetry::TelemetryStore;

// ---

/// Number of classifier inputs.
pub const FEATURE_COUNT: usize = 8;

/// Input names, in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "temperature",
    "humidity",
    "soil_moisture",
    "soil_type",
    "crop_type",
    "nitrogen",
    "potassium",
    "phosphorous",
];

/// Fixed-order classifier input. Only constructible complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

/// Combines the current [`TelemetryStore`] reading with per-request input.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    store: Arc<TelemetryStore>,
}

impl FeatureAssembler {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }

    /// Assemble a vector, or reject the request if either label is unknown.
    ///
    /// Categories are checked before anything else is read, and every invalid
    /// field is reported, not just the first.
    pub fn assemble(
        &self,
        nutrients: Nutrients,
        soil_label: &str,
        crop_label: &str,
    ) -> Result<FeatureVector, ValidationError> {
        // ---
        let reading = self.store.current_reading();
        let soil = codec::encode_soil(soil_label);
        let crop = codec::encode_crop(crop_label);

        let (soil, crop) = match (soil, crop) {
            (Some(soil), Some(crop)) => (soil, crop),
            (soil, crop) => {
                let mut fields = Vec::with_capacity(2);
                if soil.is_none() {
                    fields.push("soilType");
                }
                if crop.is_none() {
                    fields.push("cropType");
                }
                return Err(ValidationError::InvalidCategory { fields });
            }
        };

        Ok(FeatureVector([
            reading.temperature,
            reading.humidity,
            reading.soil_moisture,
            f64::from(soil),
            f64::from(crop),
            nutrients.nitrogen,
            nutrients.potassium,
            nutrients.phosphorous,
        ]))
    }
}
