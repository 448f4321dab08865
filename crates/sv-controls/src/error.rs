//! Error types for control operations.

use std::io;

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised by sensors, actuators and controller configuration.
///
/// All of them are fatal for the control loop.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The sensor device could not be accessed.
    #[error("Sensor {sensor} unavailable")]
    SensorUnavailable {
        sensor: String,
        #[source]
        source: io::Error,
    },

    /// The sensor payload did not have the expected shape.
    #[error("Sensor {sensor} returned a malformed payload: {reason}")]
    SensorFormat { sensor: String, reason: String },

    /// Enabling an actuator channel failed.
    #[error("Failed to initialize actuator {channel}")]
    ActuatorInit {
        channel: String,
        #[source]
        source: io::Error,
    },

    /// Writing an actuator state failed.
    #[error("Failed to set actuator {channel} {state}")]
    ActuatorWrite {
        channel: String,
        state: &'static str,
        #[source]
        source: io::Error,
    },

    /// Rejected percentage, period or output limits.
    #[error("Invalid configuration: {what}")]
    ConfigValidation { what: String },
}

impl ControlError {
    pub fn config(what: impl Into<String>) -> Self {
        ControlError::ConfigValidation { what: what.into() }
    }
}

impl From<sv_core::CoreError> for ControlError {
    fn from(e: sv_core::CoreError) -> Self {
        ControlError::ConfigValidation {
            what: e.to_string(),
        }
    }
}
