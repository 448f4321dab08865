//! 1-Wire temperature probes exposed through sysfs.
//!
//! The kernel driver publishes a `w1_slave` file per device:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
//!
//! Only the final `...=<millidegrees>` field is relied upon.

use std::fs;
use std::path::{Path, PathBuf};

use sv_controls::{ControlError, ControlResult, TemperatureSensor};
use tracing::trace;

pub const DEFAULT_W1_ROOT: &str = "/sys/bus/w1/devices";

/// Parse a `w1_slave` payload into degrees Celsius.
///
/// Takes the last whitespace-delimited token, then its last `=`-delimited
/// segment, and reads it as integer millidegrees.
pub fn parse_w1_payload(sensor: &str, payload: &str) -> ControlResult<f64> {
    let last_token = payload
        .split_whitespace()
        .next_back()
        .ok_or_else(|| ControlError::SensorFormat {
            sensor: sensor.to_string(),
            reason: "empty payload".to_string(),
        })?;

    let value = last_token.rsplit('=').next().unwrap_or(last_token).trim();
    let millidegrees: i64 = value.parse().map_err(|e| ControlError::SensorFormat {
        sensor: sensor.to_string(),
        reason: format!("cannot parse {value:?} as millidegrees: {e}"),
    })?;

    Ok(millidegrees as f64 / 1000.0)
}

/// Probe read from `<root>/<id>/w1_slave`.
#[derive(Debug, Clone)]
pub struct W1Sensor {
    id: String,
    path: PathBuf,
}

impl W1Sensor {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_root(DEFAULT_W1_ROOT, id)
    }

    pub fn with_root(root: impl AsRef<Path>, id: impl Into<String>) -> Self {
        let id = id.into();
        let path = root.as_ref().join(&id).join("w1_slave");
        Self { id, path }
    }

    pub fn device_path(&self) -> &Path {
        &self.path
    }
}

impl TemperatureSensor for W1Sensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_celsius(&mut self) -> ControlResult<f64> {
        let payload =
            fs::read_to_string(&self.path).map_err(|source| ControlError::SensorUnavailable {
                sensor: self.id.clone(),
                source,
            })?;
        trace!(sensor = %self.id, payload = %payload.trim_end(), "w1 payload");
        parse_w1_payload(&self.id, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_millidegrees() {
        let c = parse_w1_payload("probe", "... crc=YES t=21562").unwrap();
        assert!((c - 21.562).abs() < 1e-12);
    }

    #[test]
    fn parses_full_kernel_payload() {
        let payload = "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n\
                       72 01 4b 46 7f ff 0e 10 57 t=23125\n";
        assert_eq!(parse_w1_payload("probe", payload).unwrap(), 23.125);
    }

    #[test]
    fn parses_negative_and_bare_values() {
        assert_eq!(parse_w1_payload("probe", "t=-1250").unwrap(), -1.25);
        assert_eq!(parse_w1_payload("probe", "a b 4000").unwrap(), 4.0);
        assert_eq!(parse_w1_payload("probe", "x=y=62000 \n").unwrap(), 62.0);
    }

    #[test]
    fn rejects_non_numeric_trailing_segment() {
        for payload in ["... crc=57 YES", "t=21.5", "t=", ""] {
            let err = parse_w1_payload("28-abc", payload).unwrap_err();
            match err {
                ControlError::SensorFormat { sensor, .. } => assert_eq!(sensor, "28-abc"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn device_path_follows_sysfs_layout() {
        let sensor = W1Sensor::new("28-00000ac851cb");
        assert_eq!(
            sensor.device_path(),
            Path::new("/sys/bus/w1/devices/28-00000ac851cb/w1_slave")
        );
    }
}
