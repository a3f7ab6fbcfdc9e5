//! Irrigation telemetry and fertilizer recommendation service.
//!
//! The crate keeps the latest sensor reading and the irrigation flag in a
//! [`TelemetryStore`], and answers fertilizer recommendations by feeding
//! that reading plus per-request soil/crop/nutrient values through a
//! pre-trained classifier.
//!
//! Modules, leaf to root:
//! - `codec` – label/code mapping for soil, crop and fertilizer classes
//! - `telemetry` – concurrency-safe latest reading and actuator flag
//! - `assembler` – builds the fixed-order classifier input
//! - `classifier` – the `Classifier` seam and the JSON tree-ensemble artifact
//! - `gateway` – fail-closed classifier invocation and output decoding
//! - `coordinator` – one operation per HTTP endpoint, error normalization
//! - `routes` – axum sub-routers merged behind a single gateway (EMBP)

pub mod assembler;
pub mod classifier;
pub mod codec;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod models;
pub mod routes;
pub mod telemetry;

pub use assembler::{FeatureAssembler, FeatureVector};
pub use classifier::{Classifier, DecisionForest};
pub use config::Config;
pub use coordinator::RequestCoordinator;
pub use gateway::ClassificationGateway;
pub use telemetry::TelemetryStore;

// Re-exported at the root so that sibling modules depend on the crate
// gateway rather than on each other's paths.
pub use models::SensorReading;
