//! Application layer for the sous-vide controller.
//!
//! Ties configuration, hardware bindings and the control primitives
//! together into a runnable [`ControlLoop`], and offers the same loop over a
//! simulated plant for dry runs.

pub mod config;
pub mod control_loop;
pub mod error;
pub mod simulate;

pub use config::{ControllerConfig, Preset, load_config, save_config};
pub use control_loop::{ControlLoop, IterationReport, RunSummary, StopReason};
pub use error::{AppError, AppResult, error_chain};
pub use simulate::{SimulationRun, simulate};
