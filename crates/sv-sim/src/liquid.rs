//! Lumped-parameter liquid bath.
//!
//! While the heater is on, all electrical energy goes into the liquid:
//! `dT = P * t / (m * c)`. While idle, the bath relaxes towards ambient:
//! `dT = k * (T_ambient - T) * dt`, taken as one explicit step per idle
//! interval.

use serde::{Deserialize, Serialize};
use sv_core::units::{Energy, Mass, Power, Time, constants, kg, s, watts};
use uom::si::energy::joule;
use uom::si::mass::kilogram;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidParams {
    pub mass_kg: f64,
    pub heat_capacity_j_per_kg_k: f64,
    pub initial_c: f64,
    pub ambient_c: f64,
    /// Newtonian cooling coefficient, 1/s.
    pub cooling_per_s: f64,
    pub heater_w: f64,
}

impl Default for LiquidParams {
    /// Two gallons of water at room temperature with a 1 kW element.
    fn default() -> Self {
        Self {
            mass_kg: 2.0 * constants::KG_PER_GALLON_WATER,
            heat_capacity_j_per_kg_k: constants::HEAT_CAPACITY_WATER,
            initial_c: 20.0,
            ambient_c: 20.0,
            cooling_per_s: 0.0001,
            heater_w: 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Liquid {
    temperature_c: f64,
    ambient_c: f64,
    cooling_per_s: f64,
    mass: Mass,
    heat_capacity: f64,
    heater: Power,
}

impl Liquid {
    pub fn new(params: &LiquidParams) -> Self {
        Self {
            temperature_c: params.initial_c,
            ambient_c: params.ambient_c,
            cooling_per_s: params.cooling_per_s,
            mass: kg(params.mass_kg),
            heat_capacity: params.heat_capacity_j_per_kg_k,
            heater: watts(params.heater_w),
        }
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    pub fn heater_power(&self) -> Power {
        self.heater
    }

    /// Temperature rise produced by `energy`.
    pub fn temperature_rise(&self, energy: Energy) -> f64 {
        energy.get::<joule>() / (self.mass.get::<kilogram>() * self.heat_capacity)
    }

    pub fn apply_heat(&mut self, power: Power, duration: Time) -> f64 {
        let energy: Energy = power * duration;
        self.temperature_c += self.temperature_rise(energy);
        self.temperature_c
    }

    pub fn idle(&mut self, duration_s: f64) -> f64 {
        self.temperature_c +=
            self.cooling_per_s * (self.ambient_c - self.temperature_c) * duration_s;
        self.temperature_c
    }

    /// Run the heater at full power for `duration_s`.
    pub fn heat_for(&mut self, duration_s: f64) -> f64 {
        self.apply_heat(self.heater, s(duration_s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_gallon_rises_one_degree_in_about_sixteen_seconds() {
        let mut liquid = Liquid::new(&LiquidParams {
            mass_kg: constants::KG_PER_GALLON_WATER,
            ..Default::default()
        });

        // 4200 J/kg/K * 3.785 kg = 15897 J per degree
        let t = liquid.heat_for(15.897);
        assert!((t - 21.0).abs() < 1e-9);
    }

    #[test]
    fn idle_relaxes_towards_ambient() {
        let mut liquid = Liquid::new(&LiquidParams {
            initial_c: 60.0,
            ambient_c: 20.0,
            cooling_per_s: 0.001,
            ..Default::default()
        });

        let t = liquid.idle(10.0);
        // 60 + 0.001 * (20 - 60) * 10
        assert!((t - 59.6).abs() < 1e-9);
    }

    #[test]
    fn bath_at_ambient_stays_put_when_idle() {
        let mut liquid = Liquid::new(&LiquidParams::default());
        assert_eq!(liquid.idle(3600.0), 20.0);
    }
}
