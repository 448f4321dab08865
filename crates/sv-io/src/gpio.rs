//! Heater relay on a sysfs GPIO pin.

use std::fs;
use std::path::{Path, PathBuf};

use sv_controls::actuator::state_name;
use sv_controls::{Actuator, ControlError, ControlResult};
use tracing::{debug, info};

pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

/// Output pin driven through `<root>/gpio<N>/{direction,value}`.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    pin: u32,
    root: PathBuf,
    label: String,
}

impl SysfsGpio {
    pub fn new(pin: u32) -> Self {
        Self::with_root(DEFAULT_GPIO_ROOT, pin)
    }

    pub fn with_root(root: impl AsRef<Path>, pin: u32) -> Self {
        Self {
            pin,
            root: root.as_ref().to_path_buf(),
            label: format!("gpio{pin}"),
        }
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }

    pub fn pin_dir(&self) -> PathBuf {
        self.root.join(&self.label)
    }

    fn init_error(&self, source: std::io::Error) -> ControlError {
        ControlError::ActuatorInit {
            channel: self.label.clone(),
            source,
        }
    }
}

impl Actuator for SysfsGpio {
    fn channel(&self) -> &str {
        &self.label
    }

    fn enable(&mut self) -> ControlResult<()> {
        let pin_dir = self.pin_dir();
        if !pin_dir.is_dir() {
            info!(pin = self.pin, "exporting gpio");
            fs::write(self.root.join("export"), format!("{}\n", self.pin))
                .map_err(|e| self.init_error(e))?;
        }

        let direction = pin_dir.join("direction");
        debug!(path = %direction.display(), "setting gpio direction");
        fs::write(&direction, "out\n").map_err(|e| self.init_error(e))?;

        self.set_state(false)
    }

    fn set_state(&mut self, on: bool) -> ControlResult<()> {
        let value = if on { "1" } else { "0" };
        fs::write(self.pin_dir().join("value"), value).map_err(|source| {
            ControlError::ActuatorWrite {
                channel: self.label.clone(),
                state: state_name(on),
                source,
            }
        })
    }
}
