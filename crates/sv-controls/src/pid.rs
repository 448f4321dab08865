//! PID controller with output clamping.
//!
//! - Error is `setpoint - measured` (positive error means too cold)
//! - Integral accumulates `error * elapsed_s` and is never clamped itself;
//!   anti-windup comes from clamping the output to the actuator range
//! - Derivative is taken on the error and is zero when no time has elapsed
//!
//! First update: there is no previous timestamp, so the elapsed time is the
//! configured nominal period (zero unless set with
//! [`PidController::with_nominal_period`]) and the derivative term is zero.

use std::cmp::Ordering;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sv_core::Timestamp;

use crate::error::{ControlError, ControlResult};

/// Controller gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.00001,
            kd: 0.0,
        }
    }
}

/// Inclusive output bounds, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputLimits {
    pub min: f64,
    pub max: f64,
}

impl OutputLimits {
    pub fn new(min: f64, max: f64) -> ControlResult<Self> {
        let limits = Self { min, max };
        limits.validate()?;
        Ok(limits)
    }

    /// Rejects inverted and NaN bounds.
    pub fn validate(&self) -> ControlResult<()> {
        match self.min.partial_cmp(&self.max) {
            Some(Ordering::Less | Ordering::Equal) => Ok(()),
            _ => Err(ControlError::config(format!(
                "output limits must satisfy min <= max (min={}, max={})",
                self.min, self.max
            ))),
        }
    }

    /// Clamp `value` into the bounds. NaN maps to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Breakdown of the most recent update, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidTerms {
    pub error: f64,
    pub elapsed_s: f64,
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
    pub raw: f64,
    pub output: f64,
}

#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    setpoint: f64,
    limits: OutputLimits,
    nominal_period: Duration,

    integral: f64,
    last_error: f64,
    last_update: Option<Timestamp>,
    last_terms: Option<PidTerms>,
}

impl PidController {
    /// Create a controller with setpoint 0 and the given gains and limits.
    pub fn new(gains: PidGains, limits: OutputLimits) -> ControlResult<Self> {
        limits.validate()?;
        Ok(Self {
            gains,
            setpoint: 0.0,
            limits,
            nominal_period: Duration::ZERO,
            integral: 0.0,
            last_error: 0.0,
            last_update: None,
            last_terms: None,
        })
    }

    /// Elapsed time assumed by the first update.
    pub fn with_nominal_period(mut self, period: Duration) -> Self {
        self.nominal_period = period;
        self
    }

    /// Builder form of [`PidController::set_setpoint`].
    pub fn with_setpoint(mut self, setpoint: f64) -> Self {
        self.set_setpoint(setpoint);
        self
    }

    /// Overwrite the target. Integral and derivative history are kept.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Replace the output bounds. On error the previous bounds stay in place.
    pub fn set_output_limits(&mut self, min: f64, max: f64) -> ControlResult<()> {
        self.limits = OutputLimits::new(min, max)?;
        Ok(())
    }

    /// Forget accumulated history. Gains, setpoint and limits are kept.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.last_update = None;
        self.last_terms = None;
    }

    /// Run one control step for `measured` taken at `now`.
    ///
    /// The result always lies within the output limits.
    pub fn update(&mut self, measured: f64, now: Timestamp) -> f64 {
        let error = self.setpoint - measured;

        let (elapsed_s, first) = match self.last_update {
            Some(last) => (now.saturating_sub(last).as_secs_f64(), false),
            None => (self.nominal_period.as_secs_f64(), true),
        };

        self.integral += error * elapsed_s;

        let proportional = self.gains.kp * error;
        let integral = self.gains.ki * self.integral;
        let derivative = if first || elapsed_s == 0.0 {
            0.0
        } else {
            self.gains.kd * (error - self.last_error) / elapsed_s
        };

        let raw = proportional + integral + derivative;
        let output = self.limits.clamp(raw);

        self.last_error = error;
        self.last_update = Some(now);
        self.last_terms = Some(PidTerms {
            error,
            elapsed_s,
            proportional,
            integral,
            derivative,
            raw,
            output,
        });

        output
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn limits(&self) -> OutputLimits {
        self.limits
    }

    /// Accumulated `error * seconds`, before multiplying by Ki.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn last_terms(&self) -> Option<PidTerms> {
        self.last_terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn controller(gains: (f64, f64, f64), limits: (f64, f64), setpoint: f64) -> PidController {
        let limits = OutputLimits::new(limits.0, limits.1).unwrap();
        PidController::new(PidGains::new(gains.0, gains.1, gains.2), limits)
            .unwrap()
            .with_setpoint(setpoint)
    }

    fn pork_controller() -> PidController {
        controller((1.0, 0.00001, 0.0), (0.0, 1.0), 62.78)
    }

    #[test]
    fn first_update_with_nominal_period_saturates_high() {
        let mut pid = pork_controller().with_nominal_period(secs(1));

        let output = pid.update(60.0, secs(0));
        let terms = pid.last_terms().unwrap();

        assert!((terms.error - 2.78).abs() < 1e-9);
        assert!((pid.integral() - 2.78).abs() < 1e-9);
        assert!((terms.proportional - 2.78).abs() < 1e-9);
        assert!((terms.integral - 0.0000278).abs() < 1e-12);
        assert_eq!(terms.derivative, 0.0);
        assert!((terms.raw - 2.7800278).abs() < 1e-9);
        assert_eq!(output, 1.0);
    }

    #[test]
    fn first_update_without_nominal_period_is_proportional_only() {
        let mut pid = controller((0.1, 5.0, 7.0), (0.0, 1.0), 50.0);

        let output = pid.update(45.0, secs(100));
        let terms = pid.last_terms().unwrap();

        assert_eq!(terms.elapsed_s, 0.0);
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(terms.derivative, 0.0);
        assert!((output - 0.5).abs() < 1e-12);
    }

    #[test]
    fn integral_accumulates_over_elapsed_time() {
        let mut pid = controller((0.0, 0.01, 0.0), (0.0, 10.0), 10.0);

        pid.update(8.0, secs(0));
        pid.update(8.0, secs(5));
        let output = pid.update(9.0, secs(10));

        // 2*5 + 1*5
        assert!((pid.integral() - 15.0).abs() < 1e-12);
        assert!((output - 0.15).abs() < 1e-12);
    }

    #[test]
    fn derivative_uses_error_change_over_elapsed() {
        let mut pid = controller((0.0, 0.0, 2.0), (-100.0, 100.0), 20.0);

        pid.update(10.0, secs(0));
        let output = pid.update(14.0, secs(2));

        // error 10 -> 6 over 2 s
        assert!((output - (-4.0)).abs() < 1e-12);
    }

    #[test]
    fn zero_elapsed_suppresses_derivative() {
        let mut pid = controller((0.0, 0.0, 1.0), (-10.0, 10.0), 5.0);

        pid.update(0.0, secs(3));
        let output = pid.update(4.0, secs(3));
        assert_eq!(output, 0.0);
    }

    #[test]
    fn integral_is_not_clamped_while_output_saturates() {
        let mut pid = controller((0.0, 1.0, 0.0), (0.0, 1.0), 100.0);

        pid.update(0.0, secs(0));
        for t in 1..=10 {
            assert_eq!(pid.update(0.0, secs(t * 35)), 1.0);
        }
        assert!((pid.integral() - 35_000.0).abs() < 1e-9);
    }

    #[test]
    fn negative_output_clamps_to_lower_bound() {
        let mut pid = pork_controller();
        assert_eq!(pid.update(80.0, secs(0)), 0.0);
    }

    #[test]
    fn set_setpoint_keeps_history() {
        let mut pid = pork_controller().with_nominal_period(secs(1));
        pid.update(60.0, secs(0));
        let integral = pid.integral();

        pid.set_setpoint(54.0);
        assert_eq!(pid.integral(), integral);
        assert_eq!(pid.setpoint(), 54.0);
    }

    #[test]
    fn inverted_limits_are_rejected() {
        assert!(matches!(
            OutputLimits::new(1.0, 0.0),
            Err(ControlError::ConfigValidation { .. })
        ));
        assert!(OutputLimits::new(f64::NAN, 1.0).is_err());
        assert!(OutputLimits::new(0.5, 0.5).is_ok());

        let mut pid = pork_controller();
        assert!(pid.set_output_limits(2.0, -2.0).is_err());
        assert_eq!(pid.limits(), OutputLimits::default());
    }

    #[test]
    fn reset_forgets_history() {
        let mut pid = pork_controller().with_nominal_period(secs(35));
        pid.update(50.0, secs(0));
        pid.reset();

        assert_eq!(pid.integral(), 0.0);
        assert!(pid.last_terms().is_none());
        assert_eq!(pid.setpoint(), 62.78);
    }

    #[test]
    fn nan_raw_output_falls_back_to_lower_bound() {
        let mut pid = controller((f64::INFINITY, f64::INFINITY, 0.0), (0.0, 1.0), 1.0);

        // inf * 0 integral on the first step
        assert_eq!(pid.update(0.0, secs(0)), 0.0);
        assert!(pid.last_terms().unwrap().raw.is_nan());

        let output = pid.update(2.0, secs(1));
        assert!((0.0..=1.0).contains(&output));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn gain() -> impl Strategy<Value = f64> {
        prop_oneof![
            -1.0e3_f64..1.0e3_f64,
            Just(0.0),
            Just(f64::MAX),
            Just(-f64::MAX),
            Just(f64::INFINITY),
        ]
    }

    proptest! {
        #[test]
        fn output_stays_within_limits(
            kp in gain(),
            ki in gain(),
            kd in gain(),
            lo in -10.0_f64..10.0_f64,
            span in 0.0_f64..10.0_f64,
            setpoint in -1.0e6_f64..1.0e6_f64,
            steps in prop::collection::vec((-1.0e6_f64..1.0e6_f64, 0u64..100_000u64), 1..40),
        ) {
            let limits = OutputLimits::new(lo, lo + span).unwrap();
            let mut pid = PidController::new(PidGains::new(kp, ki, kd), limits)
                .unwrap()
                .with_setpoint(setpoint)
                .with_nominal_period(Duration::from_secs(35));

            let mut now = Duration::ZERO;
            for (measured, dt_ms) in steps {
                now += Duration::from_millis(dt_ms);
                let out = pid.update(measured, now);
                prop_assert!(out >= limits.min && out <= limits.max, "output {} outside {:?}", out, limits);
            }
        }
    }
}
