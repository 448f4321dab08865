//! Plant simulation for exercising the control loop without hardware.
//!
//! Provides:
//! - a lumped liquid model (Newtonian cooling + resistive heating)
//! - a simulated plant whose heater, probe and clock plug into the same
//!   `Actuator`, `TemperatureSensor` and `Clock` seams as the real hardware

pub mod liquid;
pub mod plant;

pub use liquid::{Liquid, LiquidParams};
pub use plant::{SimClock, SimHeater, SimProbe, SimulatedPlant};
