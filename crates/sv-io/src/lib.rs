//! Linux sysfs bindings for the controller, plus per-iteration sample records.
//!
//! - `w1`: DS18B20-style probes under `/sys/bus/w1/devices`
//! - `gpio`: heater relay on a `/sys/class/gpio` pin
//! - `record`: append-only JSON Lines log of control iterations

pub mod gpio;
pub mod record;
pub mod w1;

pub use gpio::{DEFAULT_GPIO_ROOT, SysfsGpio};
pub use record::{JsonlRecorder, Sample, SampleRecorder};
pub use w1::{DEFAULT_W1_ROOT, W1Sensor, parse_w1_payload};
