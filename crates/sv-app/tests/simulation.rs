//! Closed-loop runs against the simulated water bath.

use std::time::Duration;

use sv_app::{ControllerConfig, Preset, simulate};
use sv_sim::LiquidParams;

const HOUR: Duration = Duration::from_secs(3600);

#[test]
fn two_gallons_reach_pork_setpoint_within_an_hour() {
    let config = ControllerConfig::default();
    let run = simulate(&config, HOUR).unwrap();
    let setpoint = config.setpoint_c();

    // 3600 / 35 rounded up
    assert_eq!(run.reports.len(), 103);
    assert_eq!(run.simulated, Duration::from_secs(103 * 35));

    assert_eq!(run.reports[0].output, 1.0);
    assert!(run.reports.iter().all(|r| (0.0..=1.0).contains(&r.output)));

    let peak = run
        .reports
        .iter()
        .map(|r| r.measured_c)
        .fold(f64::MIN, f64::max);
    assert!(peak < setpoint + 1.5, "overshoot to {peak}");
    assert!(
        (run.final_temperature_c - setpoint).abs() < 1.0,
        "ended at {} for setpoint {}",
        run.final_temperature_c,
        setpoint
    );
}

#[test]
fn heater_idles_while_bath_is_above_setpoint() {
    let config = ControllerConfig {
        plant: LiquidParams {
            initial_c: 80.0,
            ..Default::default()
        },
        ..ControllerConfig::default().with_preset(Preset::Steak)
    };

    let run = simulate(&config, Duration::from_secs(10 * 35)).unwrap();

    assert_eq!(run.reports.len(), 10);
    assert!(run.reports.iter().all(|r| r.output == 0.0));
    assert_eq!(run.heated_for, Duration::ZERO);
    assert!(run.final_temperature_c < 80.0);
}

#[test]
fn readings_are_quantized_like_the_probe() {
    let run = simulate(&ControllerConfig::default(), Duration::from_secs(20 * 35)).unwrap();
    for report in &run.reports {
        let milli = report.measured_c * 1000.0;
        assert!((milli - milli.round()).abs() < 1e-6);
    }
}
