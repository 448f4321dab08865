use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sv_app::{AppError, ControllerConfig, Preset, load_config, save_config};
use sv_controls::ControlError;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

#[test]
fn save_then_load_roundtrip() {
    let dir = unique_temp_dir("sv_config_roundtrip");
    let path = dir.join("controller.yaml");

    let mut config = ControllerConfig::default().with_preset(Preset::Steak);
    config.heater_gpio = 17;
    config.record_file = Some(dir.join("samples.jsonl"));
    save_config(&path, &config).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded, config);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_reports_path() {
    let path = unique_temp_dir("sv_config_missing").join("nope.yaml");
    match load_config(&path) {
        Err(AppError::ConfigFileRead { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn invalid_values_fail_validation_on_load() {
    let dir = unique_temp_dir("sv_config_invalid");
    let path = dir.join("controller.yaml");
    fs::write(&path, "output_limits:\n  min: 0.0\n  max: 1.5\n").unwrap();

    assert!(matches!(
        load_config(&path),
        Err(AppError::Control(ControlError::ConfigValidation { .. }))
    ));

    fs::write(&path, "period_s: [1, 2]\n").unwrap();
    assert!(matches!(
        load_config(&path),
        Err(AppError::ConfigParse { .. })
    ));

    let _ = fs::remove_dir_all(&dir);
}
