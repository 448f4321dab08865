//! Time-proportioning (duty-cycle) actuation.
//!
//! A binary heater cannot be driven at 40 % power, but it can be held on for
//! 40 % of a fixed period. Each cycle holds the actuator on for
//! `period * percentage`, then off for the rest of the period:
//!
//! ```text
//! |<------------- period ------------->|
//! |<---- on ---->|<------- off ------->|
//! ```
//!
//! A phase with zero length is skipped entirely, including its actuator
//! write.

use std::time::Duration;

use sv_core::Clock;
use tracing::{debug, info};

use crate::actuator::Actuator;
use crate::error::{ControlError, ControlResult};

/// A validated (period, percentage) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyCycle {
    period: Duration,
    percentage: f64,
}

impl DutyCycle {
    /// `percentage` must lie in `[0, 1]`.
    pub fn new(period: Duration, percentage: f64) -> ControlResult<Self> {
        if !(0.0..=1.0).contains(&percentage) {
            return Err(ControlError::config(format!(
                "percentage must be between 0 and 1, got {percentage}"
            )));
        }
        Ok(Self { period, percentage })
    }

    /// Like [`DutyCycle::new`] with the period given in seconds. Negative and
    /// non-finite periods are rejected.
    pub fn from_secs(period_s: f64, percentage: f64) -> ControlResult<Self> {
        Self::new(period_from_secs(period_s)?, percentage)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn on_duration(&self) -> Duration {
        self.period.mul_f64(self.percentage).min(self.period)
    }

    /// Always `period - on_duration`, so both phases add up to the period.
    pub fn off_duration(&self) -> Duration {
        self.period - self.on_duration()
    }
}

/// Convert a period in seconds, rejecting negative and non-finite values.
pub fn period_from_secs(period_s: f64) -> ControlResult<Duration> {
    Duration::try_from_secs_f64(period_s).map_err(|_| {
        ControlError::config(format!(
            "period must be a non-negative number of seconds, got {period_s}"
        ))
    })
}

/// Drives an actuator through duty cycles, blocking on its clock.
#[derive(Debug, Clone)]
pub struct DutyCycleExecutor<C> {
    clock: C,
}

impl<C: Clock> DutyCycleExecutor<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Validate `percentage` and run one cycle.
    ///
    /// Nothing is written when validation fails.
    pub fn execute<A: Actuator + ?Sized>(
        &mut self,
        period: Duration,
        percentage: f64,
        actuator: &mut A,
    ) -> ControlResult<DutyCycle> {
        let cycle = DutyCycle::new(period, percentage)?;
        self.run(&cycle, actuator)?;
        Ok(cycle)
    }

    /// Run one already validated cycle. A failed write aborts the cycle.
    pub fn run<A: Actuator + ?Sized>(
        &mut self,
        cycle: &DutyCycle,
        actuator: &mut A,
    ) -> ControlResult<()> {
        let on = cycle.on_duration();
        let off = cycle.off_duration();

        info!(
            percentage = cycle.percentage(),
            on_s = on.as_secs_f64(),
            off_s = off.as_secs_f64(),
            "duty cycle"
        );

        if !on.is_zero() {
            actuator.set_state(true)?;
            debug!(channel = actuator.channel(), "on phase");
            self.clock.sleep(on);
        }

        if !off.is_zero() {
            actuator.set_state(false)?;
            debug!(channel = actuator.channel(), "off phase");
            self.clock.sleep(off);
        }

        Ok(())
    }
}
