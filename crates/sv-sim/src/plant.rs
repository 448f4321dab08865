//! Simulated plant: heater, probe and clock sharing one liquid bath.
//!
//! Time only passes when the control loop sleeps, and the bath evolves
//! during that sleep according to the heater state at the time.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use sv_controls::actuator::state_name;
use sv_controls::{Actuator, ControlError, ControlResult, TemperatureSensor};
use sv_core::units::s;
use sv_core::{Clock, Timestamp};
use sv_io::parse_w1_payload;

use crate::liquid::{Liquid, LiquidParams};

#[derive(Debug)]
struct PlantState {
    liquid: Liquid,
    heater_on: bool,
    now: Timestamp,
    heater_writes: usize,
    heated_for: Duration,
    fail_writes_after: Option<usize>,
}

/// Handle to the shared plant state. Cloning shares the same bath.
#[derive(Debug, Clone)]
pub struct SimulatedPlant {
    state: Rc<RefCell<PlantState>>,
}

impl SimulatedPlant {
    pub fn new(params: &LiquidParams) -> Self {
        Self {
            state: Rc::new(RefCell::new(PlantState {
                liquid: Liquid::new(params),
                heater_on: false,
                now: Duration::ZERO,
                heater_writes: 0,
                heated_for: Duration::ZERO,
                fail_writes_after: None,
            })),
        }
    }

    /// Make every heater write after the first `writes` fail.
    pub fn fail_heater_after(&self, writes: usize) {
        self.state.borrow_mut().fail_writes_after = Some(writes);
    }

    pub fn heater(&self) -> SimHeater {
        SimHeater {
            plant: self.clone(),
        }
    }

    pub fn probe(&self) -> SimProbe {
        SimProbe {
            plant: self.clone(),
        }
    }

    pub fn clock(&self) -> SimClock {
        SimClock {
            plant: self.clone(),
        }
    }

    pub fn temperature_c(&self) -> f64 {
        self.state.borrow().liquid.temperature_c()
    }

    pub fn heater_on(&self) -> bool {
        self.state.borrow().heater_on
    }

    pub fn heater_writes(&self) -> usize {
        self.state.borrow().heater_writes
    }

    /// Total simulated time with the heater on.
    pub fn heated_for(&self) -> Duration {
        self.state.borrow().heated_for
    }

    pub fn now(&self) -> Timestamp {
        self.state.borrow().now
    }
}

pub struct SimHeater {
    plant: SimulatedPlant,
}

impl Actuator for SimHeater {
    fn channel(&self) -> &str {
        "sim-heater"
    }

    fn enable(&mut self) -> ControlResult<()> {
        self.set_state(false).map_err(|e| ControlError::ActuatorInit {
            channel: self.channel().to_string(),
            source: io::Error::other(e.to_string()),
        })
    }

    fn set_state(&mut self, on: bool) -> ControlResult<()> {
        let mut state = self.plant.state.borrow_mut();
        let writes = state.heater_writes;
        if state.fail_writes_after.is_some_and(|limit| writes >= limit) {
            return Err(ControlError::ActuatorWrite {
                channel: "sim-heater".to_string(),
                state: state_name(on),
                source: io::Error::other("simulated relay fault"),
            });
        }
        state.heater_writes += 1;
        state.heater_on = on;
        Ok(())
    }
}

/// Probe that reports the bath temperature through a 1-Wire payload, so
/// readings carry the same millidegree resolution as the real sensor.
pub struct SimProbe {
    plant: SimulatedPlant,
}

impl SimProbe {
    fn payload(&self) -> String {
        let millidegrees = (self.plant.temperature_c() * 1000.0).round() as i64;
        format!(
            "4b 01 4b 46 7f ff 05 10 e1 : crc=e1 YES\n4b 01 4b 46 7f ff 05 10 e1 t={millidegrees}\n"
        )
    }
}

impl TemperatureSensor for SimProbe {
    fn id(&self) -> &str {
        "sim-probe"
    }

    fn read_celsius(&mut self) -> ControlResult<f64> {
        parse_w1_payload(self.id(), &self.payload())
    }
}

pub struct SimClock {
    plant: SimulatedPlant,
}

impl Clock for SimClock {
    fn now(&self) -> Timestamp {
        self.plant.now()
    }

    fn sleep(&mut self, duration: Duration) {
        let mut state = self.plant.state.borrow_mut();
        if state.heater_on {
            let power = state.liquid.heater_power();
            state.liquid.apply_heat(power, s(duration.as_secs_f64()));
            state.heated_for += duration;
        } else {
            state.liquid.idle(duration.as_secs_f64());
        }
        state.now += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heater_state_drives_the_bath_during_sleep() {
        let plant = SimulatedPlant::new(&LiquidParams::default());
        let mut heater = plant.heater();
        let mut clock = plant.clock();
        let mut probe = plant.probe();

        heater.enable().unwrap();
        heater.set_state(true).unwrap();
        clock.sleep(Duration::from_secs(35));
        let heated = probe.read_celsius().unwrap();
        assert!(heated > 20.0);

        heater.set_state(false).unwrap();
        clock.sleep(Duration::from_secs(35));
        let idled = probe.read_celsius().unwrap();
        assert!(idled < heated);

        assert_eq!(clock.now(), Duration::from_secs(70));
        assert_eq!(plant.heated_for(), Duration::from_secs(35));
        assert_eq!(plant.heater_writes(), 3);
    }

    #[test]
    fn probe_quantizes_to_millidegrees() {
        let plant = SimulatedPlant::new(&LiquidParams {
            initial_c: 21.56249,
            ..Default::default()
        });
        assert_eq!(plant.probe().read_celsius().unwrap(), 21.562);
    }

    #[test]
    fn injected_fault_fails_writes() {
        let plant = SimulatedPlant::new(&LiquidParams::default());
        plant.fail_heater_after(1);
        let mut heater = plant.heater();

        heater.set_state(true).unwrap();
        assert!(matches!(
            heater.set_state(false),
            Err(ControlError::ActuatorWrite { .. })
        ));
        assert!(plant.heater_on());
    }
}
