//! Process-lifetime telemetry and actuator state.
//!
//! [`TelemetryStore`] is the only shared mutable state in the service. The
//! reading and its arrival time live behind one `RwLock`, so readers always
//! see a complete reading from a single push; the irrigation flag is an
//! independent atomic. No operation performs I/O or waits on anything but
//! the lock itself.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    PoisonError, RwLock,
};

use chrono::{DateTime, Utc};

use crate::SensorReading;

// ---

#[derive(Debug, Clone, Copy, Default)]
struct Latest {
    reading: SensorReading,
    received_at: Option<DateTime<Utc>>,
}

/// Holds the latest sensor reading and the irrigation flag.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    // ---
    latest: RwLock<Latest>,
    irrigation: AtomicBool,
}

impl TelemetryStore {
    /// Zero-valued reading, irrigation off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored reading. Any real number is accepted here;
    /// plausibility checks belong to the caller.
    pub fn update_reading(&self, reading: SensorReading) {
        // ---
        // Writes are one `Copy` assignment, so even a poisoned lock holds a
        // whole reading.
        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        *latest = Latest {
            reading,
            received_at: Some(Utc::now()),
        };
    }

    /// Latest reading, or the zero reading if nothing was ever pushed.
    pub fn current_reading(&self) -> SensorReading {
        self.snapshot().reading
    }

    /// Time the latest reading was accepted, if any.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.snapshot().received_at
    }

    pub fn set_irrigation(&self, on: bool) {
        self.irrigation.store(on, Ordering::SeqCst);
    }

    pub fn irrigation(&self) -> bool {
        self.irrigation.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Latest {
        *self.latest.read().unwrap_or_else(PoisonError::into_inner)
    }
}
