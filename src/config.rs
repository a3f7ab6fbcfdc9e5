//! Configuration loader for the `fertigate` service.
//!
//! All runtime settings come from environment variables (with optional
//! `.env` support provided by the caller) and are parsed once at startup.
//! Keeping the `env::var` calls here means the rest of the crate only sees
//! typed values.
//!
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Result};
use axum::http::StatusCode;

use crate::error::ClassifierError;

/// Parse an optional environment variable via `FromStr`, with a default.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

// ---

/// HTTP status used when classification fails for a non-client reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierErrorStatus {
    /// Every failure is a 400, as existing clients expect.
    BadRequest,
    /// 503 when unavailable, 500 when the invocation fails.
    ServerError,
}

impl ClassifierErrorStatus {
    pub fn status_for(self, err: &ClassifierError) -> StatusCode {
        match (self, err) {
            (ClassifierErrorStatus::BadRequest, _) => StatusCode::BAD_REQUEST,
            (ClassifierErrorStatus::ServerError, ClassifierError::Unavailable) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            (ClassifierErrorStatus::ServerError, ClassifierError::InvocationFailed(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl FromStr for ClassifierErrorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bad_request" => Ok(Self::BadRequest),
            "server_error" => Ok(Self::ServerError),
            other => Err(format!(
                "expected 'bad_request' or 'server_error', got '{other}'"
            )),
        }
    }
}

/// Plausibility policy applied to telemetry pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryValidation {
    /// Any finite number is stored.
    Lenient,
    /// Readings outside physical bounds are rejected.
    Strict,
}

impl FromStr for TelemetryValidation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("expected 'lenient' or 'strict', got '{other}'")),
        }
    }
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Location of the classifier artifact.
    pub classifier_path: PathBuf,

    /// Status mapping for classifier failures.
    pub classifier_error_status: ClassifierErrorStatus,

    /// Telemetry plausibility policy.
    pub telemetry_validation: TelemetryValidation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            classifier_path: PathBuf::from("classifier.json"),
            classifier_error_status: ClassifierErrorStatus::BadRequest,
            telemetry_validation: TelemetryValidation::Lenient,
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:5000`)
/// - `CLASSIFIER_PATH` – classifier artifact (default: `classifier.json`)
/// - `CLASSIFIER_ERROR_STATUS` – `bad_request` (default) or `server_error`
/// - `TELEMETRY_VALIDATION` – `lenient` (default) or `strict`
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let defaults = Config::default();

    let bind_addr = parse_env!("BIND_ADDR", SocketAddr, defaults.bind_addr);
    let classifier_path = env::var_os("CLASSIFIER_PATH")
        .map(PathBuf::from)
        .unwrap_or(defaults.classifier_path);
    let classifier_error_status = parse_env!(
        "CLASSIFIER_ERROR_STATUS",
        ClassifierErrorStatus,
        defaults.classifier_error_status
    );
    let telemetry_validation = parse_env!(
        "TELEMETRY_VALIDATION",
        TelemetryValidation,
        defaults.telemetry_validation
    );

    Ok(Config {
        bind_addr,
        classifier_path,
        classifier_error_status,
        telemetry_validation,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  BIND_ADDR               : {}", self.bind_addr);
        tracing::info!("  CLASSIFIER_PATH         : {}", self.classifier_path.display());
        tracing::info!("  CLASSIFIER_ERROR_STATUS : {:?}", self.classifier_error_status);
        tracing::info!("  TELEMETRY_VALIDATION    : {:?}", self.telemetry_validation);
    }
}
