//! Controller configuration.
//!
//! Every field has a default matching the stock rig (DS18B20 probe, relay
//! on GPIO 14, 35 s duty-cycle period, pork setpoint), so an empty YAML
//! document is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sv_controls::duty_cycle::period_from_secs;
use sv_controls::{ControlError, ControlResult, OutputLimits, PidGains};
use sv_core::units::constants::{PORK_SETPOINT_F, STEAK_SETPOINT_F};
use sv_core::{ensure_finite, ensure_in_range, fahrenheit_to_celsius};
use sv_io::{DEFAULT_GPIO_ROOT, DEFAULT_W1_ROOT};
use sv_sim::LiquidParams;

use crate::error::{AppError, AppResult};

/// Named setpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Steak,
    Pork,
}

impl Preset {
    pub fn setpoint_f(self) -> f64 {
        match self {
            Preset::Steak => STEAK_SETPOINT_F,
            Preset::Pork => PORK_SETPOINT_F,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub gains: PidGains,
    pub setpoint_f: f64,
    pub output_limits: OutputLimits,
    /// Duty-cycle period in seconds.
    pub period_s: f64,
    /// 1-Wire device id of the probe.
    pub sensor_id: String,
    /// GPIO pin driving the heater relay.
    pub heater_gpio: u32,
    pub w1_root: PathBuf,
    pub gpio_root: PathBuf,
    /// Diagnostic log, appended alongside stdout.
    pub log_file: Option<PathBuf>,
    /// JSON Lines record of every iteration.
    pub record_file: Option<PathBuf>,
    /// Drive the heater off when the loop stops or fails.
    pub safe_shutdown: bool,
    /// Bath used by `simulate`.
    pub plant: LiquidParams,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::default(),
            setpoint_f: PORK_SETPOINT_F,
            output_limits: OutputLimits::default(),
            period_s: 35.0,
            sensor_id: "28-00000ac851cb".to_string(),
            heater_gpio: 14,
            w1_root: PathBuf::from(DEFAULT_W1_ROOT),
            gpio_root: PathBuf::from(DEFAULT_GPIO_ROOT),
            log_file: Some(PathBuf::from("temperature.log")),
            record_file: None,
            safe_shutdown: true,
            plant: LiquidParams::default(),
        }
    }
}

impl ControllerConfig {
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.setpoint_f = preset.setpoint_f();
        self
    }

    pub fn setpoint_c(&self) -> f64 {
        fahrenheit_to_celsius(self.setpoint_f)
    }

    pub fn period(&self) -> ControlResult<Duration> {
        period_from_secs(self.period_s)
    }

    /// Check everything the loop relies on before any hardware is touched.
    pub fn validate(&self) -> ControlResult<()> {
        ensure_finite(self.gains.kp, "gains.kp")?;
        ensure_finite(self.gains.ki, "gains.ki")?;
        ensure_finite(self.gains.kd, "gains.kd")?;
        ensure_finite(self.setpoint_f, "setpoint_f")?;

        self.output_limits.validate()?;
        // The controller output is used directly as a duty-cycle percentage.
        ensure_in_range(self.output_limits.min, 0.0, 1.0, "output_limits.min")?;
        ensure_in_range(self.output_limits.max, 0.0, 1.0, "output_limits.max")?;

        if self.period()?.is_zero() {
            return Err(ControlError::config("period_s must be positive"));
        }
        if self.sensor_id.trim().is_empty() {
            return Err(ControlError::config("sensor_id must not be empty"));
        }
        Ok(())
    }
}

/// Load and validate a YAML configuration file.
pub fn load_config(path: &Path) -> AppResult<ControllerConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: ControllerConfig =
        serde_yaml::from_str(&content).map_err(|e| AppError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &ControllerConfig) -> AppResult<()> {
    config.validate()?;
    let content = serde_yaml::to_string(config).map_err(|e| AppError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
