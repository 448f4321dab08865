//! The feedback loop: sample, correct, actuate, repeat.
//!
//! One iteration is strictly sequential:
//!
//! 1. read the probe
//! 2. feed the reading to the PID controller
//! 3. run one duty cycle with the controller output as the percentage
//!
//! The duty cycle blocks for the whole period, so iterations never overlap
//! and the effective sample interval is the period plus read/compute time.
//!
//! Any sensor or actuator error is fatal: it is logged and returned, and the
//! loop does not retry. With `safe_shutdown` enabled the heater is driven off
//! (best effort) before the error is returned and whenever the loop stops.

use std::time::Duration;

use chrono::Utc;
use sv_controls::{
    Actuator, ControlError, DutyCycle, DutyCycleExecutor, PidController, TemperatureSensor,
};
use sv_core::{Clock, ShutdownToken, Timestamp, celsius_to_fahrenheit};
use sv_io::{Sample, SampleRecorder};
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::error::{AppResult, error_chain};

/// What happened in one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// Zero-based iteration index.
    pub iteration: u64,
    /// Clock time at which the probe was read.
    pub started_at: Timestamp,
    pub measured_c: f64,
    pub setpoint_c: f64,
    pub output: f64,
    pub cycle: DutyCycle,
}

impl IterationReport {
    pub fn error_c(&self) -> f64 {
        self.setpoint_c - self.measured_c
    }

    fn to_sample(&self) -> Sample {
        Sample {
            timestamp: Utc::now(),
            elapsed_s: self.started_at.as_secs_f64(),
            measured_c: self.measured_c,
            setpoint_c: self.setpoint_c,
            output: self.output,
            on_s: self.cycle.on_duration().as_secs_f64(),
            off_s: self.cycle.off_duration().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    IterationLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub reason: StopReason,
}

pub struct ControlLoop<S, A, C> {
    sensor: S,
    actuator: A,
    executor: DutyCycleExecutor<C>,
    pid: PidController,
    period: Duration,
    setpoint_c: f64,
    safe_shutdown: bool,
    shutdown: ShutdownToken,
    max_iterations: Option<u64>,
    recorder: Option<Box<dyn SampleRecorder>>,
    iterations: u64,
    ready: bool,
}

impl<S, A, C> ControlLoop<S, A, C>
where
    S: TemperatureSensor,
    A: Actuator,
    C: Clock,
{
    /// Validate `config` and build the controller. No I/O happens here.
    pub fn new(config: &ControllerConfig, sensor: S, actuator: A, clock: C) -> AppResult<Self> {
        config.validate()?;
        let period = config.period()?;
        let setpoint_c = config.setpoint_c();
        let pid = PidController::new(config.gains, config.output_limits)?
            .with_setpoint(setpoint_c)
            .with_nominal_period(period);

        Ok(Self {
            sensor,
            actuator,
            executor: DutyCycleExecutor::new(clock),
            pid,
            period,
            setpoint_c,
            safe_shutdown: config.safe_shutdown,
            shutdown: ShutdownToken::new(),
            max_iterations: None,
            recorder: None,
            iterations: 0,
            ready: false,
        })
    }

    /// Stop `run` once this token is cancelled. Attach the same token to a
    /// `SystemClock` to also cut the current duty cycle short.
    pub fn with_shutdown(mut self, token: ShutdownToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn with_recorder(mut self, recorder: Box<dyn SampleRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn clock(&self) -> &C {
        self.executor.clock()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Enable the heater channel (off) and log the starting temperature.
    pub fn setup(&mut self) -> AppResult<()> {
        if let Err(e) = self.actuator.enable() {
            return Err(self.fatal("enable heater", e));
        }

        let initial_c = match self.sensor.read_celsius() {
            Ok(c) => c,
            Err(e) => return Err(self.fatal("read temperature", e)),
        };
        info!(
            sensor = self.sensor.id(),
            temperature_c = initial_c,
            temperature_f = celsius_to_fahrenheit(initial_c),
            "initial temperature"
        );
        info!(setpoint_c = self.setpoint_c, "setpoint");

        self.ready = true;
        Ok(())
    }

    /// Run one sample/correct/actuate iteration, running [`Self::setup`]
    /// first if it has not completed yet.
    pub fn step(&mut self) -> AppResult<IterationReport> {
        if !self.ready {
            self.setup()?;
        }

        let started_at = self.executor.clock().now();

        let measured_c = match self.sensor.read_celsius() {
            Ok(c) => c,
            Err(e) => return Err(self.fatal("read temperature", e)),
        };
        info!(
            temperature_c = measured_c,
            target_c = self.setpoint_c,
            "temperature"
        );

        let output = self.pid.update(measured_c, self.executor.clock().now());
        if let Some(terms) = self.pid.last_terms() {
            debug!(
                error = terms.error,
                p = terms.proportional,
                i = terms.integral,
                d = terms.derivative,
                raw = terms.raw,
                output = terms.output,
                "pid update"
            );
        }

        let cycle = match self
            .executor
            .execute(self.period, output, &mut self.actuator)
        {
            Ok(cycle) => cycle,
            Err(e) => return Err(self.fatal("execute duty cycle", e)),
        };

        let report = IterationReport {
            iteration: self.iterations,
            started_at,
            measured_c,
            setpoint_c: self.setpoint_c,
            output,
            cycle,
        };
        self.iterations += 1;

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.record(&report.to_sample()) {
                warn!(error = %e, "failed to record sample");
            }
        }

        Ok(report)
    }

    /// Set up, then iterate until cancelled or the iteration limit is hit.
    ///
    /// Only returns `Ok` on a requested stop; every other exit is a fatal
    /// error.
    pub fn run(&mut self) -> AppResult<RunSummary> {
        if !self.ready {
            self.setup()?;
        }

        loop {
            if self.shutdown.is_cancelled() {
                return Ok(self.stop(StopReason::Cancelled));
            }
            if self.max_iterations.is_some_and(|max| self.iterations >= max) {
                return Ok(self.stop(StopReason::IterationLimit));
            }
            self.step()?;
        }
    }

    fn stop(&mut self, reason: StopReason) -> RunSummary {
        info!(iterations = self.iterations, ?reason, "control loop stopped");
        self.heater_off_best_effort();
        RunSummary {
            iterations: self.iterations,
            reason,
        }
    }

    fn fatal(&mut self, operation: &'static str, err: ControlError) -> crate::AppError {
        error!(operation, error = %error_chain(&err), "fatal control error");
        self.heater_off_best_effort();
        err.into()
    }

    fn heater_off_best_effort(&mut self) {
        if !self.safe_shutdown {
            return;
        }
        match self.actuator.set_state(false) {
            Ok(()) => info!(channel = self.actuator.channel(), "heater driven off"),
            Err(e) => warn!(error = %error_chain(&e), "could not drive heater off"),
        }
    }
}
