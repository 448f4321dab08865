//! Binary actuator contract.
//!
//! An actuator is a write-only handle on one on/off channel (a heater relay
//! on a GPIO pin, or a simulated element). The core never reads the state
//! back.

use crate::error::ControlResult;

pub trait Actuator {
    /// Label used in diagnostics, e.g. `gpio14`.
    fn channel(&self) -> &str;

    /// Prepare the channel for writes and drive it off.
    ///
    /// Must be idempotent. Failures are `ControlError::ActuatorInit`.
    fn enable(&mut self) -> ControlResult<()>;

    /// Drive the channel on or off. Failures are `ControlError::ActuatorWrite`.
    fn set_state(&mut self, on: bool) -> ControlResult<()>;
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn channel(&self) -> &str {
        (**self).channel()
    }

    fn enable(&mut self) -> ControlResult<()> {
        (**self).enable()
    }

    fn set_state(&mut self, on: bool) -> ControlResult<()> {
        (**self).set_state(on)
    }
}

pub fn state_name(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
