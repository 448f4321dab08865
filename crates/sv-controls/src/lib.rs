//! Feedback control primitives for the sous-vide controller.
//!
//! The loop is built from three pieces:
//! - a sensor contract producing Celsius readings ([`TemperatureSensor`])
//! - a PID controller producing a clamped correction ([`PidController`])
//! - a duty-cycle executor turning a [0, 1] correction into timed on/off
//!   writes on a binary actuator ([`DutyCycleExecutor`], [`Actuator`])
//!
//! Hardware-backed sensors and actuators live in `sv-io`; simulated ones in
//! `sv-sim`.

pub mod actuator;
pub mod duty_cycle;
pub mod error;
pub mod pid;
pub mod sensor;

pub use actuator::Actuator;
pub use duty_cycle::{DutyCycle, DutyCycleExecutor};
pub use error::{ControlError, ControlResult};
pub use pid::{OutputLimits, PidController, PidGains, PidTerms};
pub use sensor::TemperatureSensor;
