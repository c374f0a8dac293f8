use std::io::Write;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use bagscan::DetectorConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "BAGSCAN_CONFIG",
        "BAGSCAN_DEVICE",
        "BAGSCAN_TARGET_FPS",
        "BAGSCAN_MOTION_AREA",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "camera": {
            "device": "/dev/video2",
            "target_fps": 15,
            "width": 800,
            "height": 600
        },
        "gate": {
            "diff_threshold": 25,
            "motion_area": 4000,
            "cooldown_frames": 30
        },
        "shape": {
            "min_contour_area": 2000,
            "wallet_aspect_ratio": 2.0,
            "padding": 12
        }
    }"#;
    file.write_all(json.as_bytes()).expect("write config");

    std::env::set_var("BAGSCAN_CONFIG", file.path());
    std::env::set_var("BAGSCAN_DEVICE", "stub://override");
    std::env::set_var("BAGSCAN_MOTION_AREA", "5000");

    let cfg = DetectorConfig::load().expect("load config");

    assert_eq!(cfg.camera.device, "stub://override");
    assert_eq!(cfg.camera.target_fps, 15);
    assert_eq!(cfg.camera.width, 800);
    assert_eq!(cfg.camera.height, 600);
    assert_eq!(cfg.gate.diff_threshold, 25);
    assert_eq!(cfg.gate.motion_area, 5000);
    assert_eq!(cfg.gate.cooldown_frames, 30);
    assert_eq!(cfg.shape.min_contour_area, 2000);
    assert_eq!(cfg.shape.wallet_aspect_ratio, 2.0);
    assert_eq!(cfg.shape.padding, 12);
    // Unset file keys keep their defaults.
    assert_eq!(cfg.shape.min_width, 70);
    assert_eq!(cfg.shape.min_height, 60);
    assert_eq!(cfg.shape.min_aspect_ratio, 0.4);

    clear_env();
}

#[test]
fn explicit_config_path_loads_without_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{ "camera": { "device": "stub://flag", "target_fps": 10 } }"#;
    file.write_all(json.as_bytes()).expect("write config");

    let cfg = DetectorConfig::load_from(Some(file.path())).expect("load config");

    assert_eq!(cfg.camera.device, "stub://flag");
    assert_eq!(cfg.camera.target_fps, 10);
    // The rest keeps its defaults.
    assert_eq!(cfg.gate.motion_area, 6000);

    clear_env();
}

#[test]
fn file_with_empty_aspect_band_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{ "shape": { "min_aspect_ratio": 3.0, "max_aspect_ratio": 1.0 } }"#;
    file.write_all(json.as_bytes()).expect("write config");

    assert!(DetectorConfig::load_from(Some(file.path())).is_err());

    clear_env();
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = DetectorConfig::load().expect("load config");

    assert_eq!(cfg.camera.device, "/dev/video0");
    assert_eq!(cfg.camera.target_fps, 30);
    assert_eq!(cfg.gate.diff_threshold, 30);
    assert_eq!(cfg.gate.motion_area, 6000);
    assert_eq!(cfg.gate.cooldown_frames, 45);
    assert_eq!(cfg.shape.min_contour_area, 1500);

    clear_env();
}

#[test]
fn invalid_env_value_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("BAGSCAN_TARGET_FPS", "surely-not-a-number");
    assert!(DetectorConfig::load().is_err());

    clear_env();
}
