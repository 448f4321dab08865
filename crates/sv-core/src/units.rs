// sv-core/src/units.rs

use uom::si::f64::{Energy as UomEnergy, Mass as UomMass, Power as UomPower, Time as UomTime};

pub type Energy = UomEnergy;
pub type Mass = UomMass;
pub type Power = UomPower;
pub type Time = UomTime;

#[inline]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[inline]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * (5.0 / 9.0)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

pub mod constants {
    /// Specific heat capacity of water, J/(kg·K).
    pub const HEAT_CAPACITY_WATER: f64 = 4200.0;
    /// Mass of one US gallon of water.
    pub const KG_PER_GALLON_WATER: f64 = 3.785;

    pub const STEAK_SETPOINT_F: f64 = 129.0;
    pub const PORK_SETPOINT_F: f64 = 145.0;
}
