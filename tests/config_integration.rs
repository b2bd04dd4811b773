//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use serial_test::serial;
use tumble::config::AppConfig;
use tumble_core::SchedulerMode;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("TUMBLE_WINDOW__TITLE", "Test From Env");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.window.title, "Test From Env");
    std::env::remove_var("TUMBLE_WINDOW__TITLE");
}

#[test]
#[serial]
fn test_env_override_nested_section() {
    std::env::set_var("TUMBLE_PHYSICS__SCHEDULER", "single");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.physics.scheduler_mode(), SchedulerMode::Single);
    std::env::remove_var("TUMBLE_PHYSICS__SCHEDULER");
}

#[test]
#[serial]
fn test_default_config_loading() {
    std::env::remove_var("TUMBLE_WINDOW__TITLE");

    let config = AppConfig::load().unwrap();
    assert_eq!(config.window.title, "Tumble");
    assert_eq!(config.scene.ground_y, -2.0);
}

#[test]
fn test_default_toml_is_well_formed() {
    let text = std::fs::read_to_string("config/default.toml").unwrap();
    let config: AppConfig = toml::from_str(&text).unwrap();
    assert_eq!(config.physics.scheduler_mode(), SchedulerMode::Dual);
}

#[test]
#[serial]
fn test_file_values_survive_roundtrip() {
    // The checked-in default.toml must agree with the code defaults, so a
    // missing file changes nothing
    std::env::remove_var("TUMBLE_PHYSICS__SCHEDULER");

    let from_file = AppConfig::load().unwrap();
    let from_code = AppConfig::default();
    assert_eq!(from_file.window.width, from_code.window.width);
    assert_eq!(from_file.physics.max_substeps, from_code.physics.max_substeps);
    assert_eq!(from_file.shadow.mode, from_code.shadow.mode);
}
