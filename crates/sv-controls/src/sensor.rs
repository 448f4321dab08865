//! Temperature sensor contract.

use crate::error::ControlResult;

pub trait TemperatureSensor {
    /// Sensor identifier, e.g. a 1-Wire device id.
    fn id(&self) -> &str;

    /// Take one reading in degrees Celsius.
    ///
    /// Fails with `SensorUnavailable` when the device cannot be read and
    /// `SensorFormat` when its payload cannot be parsed.
    fn read_celsius(&mut self) -> ControlResult<f64>;
}

impl<S: TemperatureSensor + ?Sized> TemperatureSensor for Box<S> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn read_celsius(&mut self) -> ControlResult<f64> {
        (**self).read_celsius()
    }
}
