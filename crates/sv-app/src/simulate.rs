//! Dry runs of the control loop against the simulated bath.

use std::time::Duration;

use sv_controls::ControlError;
use sv_sim::SimulatedPlant;
use tracing::info;

use crate::config::ControllerConfig;
use crate::control_loop::{ControlLoop, IterationReport};
use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub reports: Vec<IterationReport>,
    pub final_temperature_c: f64,
    pub heated_for: Duration,
    pub simulated: Duration,
}

/// Run the real control loop for `duration` of simulated time.
///
/// The loop executes whole iterations, so the simulated time is `duration`
/// rounded up to a multiple of the period.
pub fn simulate(config: &ControllerConfig, duration: Duration) -> AppResult<SimulationRun> {
    let plant = SimulatedPlant::new(&config.plant);
    let mut control = ControlLoop::new(config, plant.probe(), plant.heater(), plant.clock())?;

    let period = config.period()?;
    let iterations = (duration.as_secs_f64() / period.as_secs_f64()).ceil();
    if !iterations.is_finite() {
        return Err(ControlError::config("simulation duration is too long").into());
    }
    let iterations = iterations as u64;

    info!(
        iterations,
        period_s = period.as_secs_f64(),
        initial_c = plant.temperature_c(),
        "starting simulation"
    );

    control.setup()?;
    let mut reports = Vec::new();
    for _ in 0..iterations {
        reports.push(control.step()?);
    }

    let run = SimulationRun {
        reports,
        final_temperature_c: plant.temperature_c(),
        heated_for: plant.heated_for(),
        simulated: plant.now(),
    };
    info!(
        final_c = run.final_temperature_c,
        heated_s = run.heated_for.as_secs_f64(),
        "simulation finished"
    );
    Ok(run)
}
