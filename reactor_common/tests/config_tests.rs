//! Controller configuration loading tests.
//!
//! Covers file discovery errors, the shipped sample configuration and
//! section-level validation of documents loaded from disk.

use std::fs;
use std::path::{Path, PathBuf};

use reactor_common::config::{ConfigError, ConfigLoader, LogLevel};
use reactor_common::control_unit::config::ControllerConfig;
use tempfile::TempDir;

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("reactor.toml");
    fs::write(&path, body).unwrap();
    path
}

fn load_str(body: &str) -> Result<ControllerConfig, ConfigError> {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), body);
    let config = ControllerConfig::load(&path)?;
    config.validate()?;
    Ok(config)
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = ControllerConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = load_str("[rods\nbank_count = 9").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn wrong_value_type_is_a_parse_error() {
    let err = load_str("[rods]\nbank_count = \"nine\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn shipped_sample_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/reactor.toml");
    let config = ControllerConfig::load(&path).unwrap();
    config.validate().unwrap();

    let defaults = ControllerConfig::default();
    assert_eq!(config.shared.service_name, "reactor-autopilot-01");
    assert_eq!(config.rods.bank_count, defaults.rods.bank_count);
    assert_eq!(config.pid.rods, defaults.pid.rods);
    assert_eq!(config.pid.condenser, defaults.pid.condenser);
    assert_eq!(config.pid.boron, defaults.pid.boron);
    assert_eq!(config.variables, defaults.variables);
}

#[test]
fn overrides_are_applied_per_field() {
    let config = load_str(
        r#"
[shared]
log_level = "debug"

[channel]
base_url = "http://plant.local:9000/"
poll_interval_ms = 100

[chemistry]
cooldown_ticks = 3
iodine_history = 4

[variables]
tick = "SIM_MINUTE"
rod_bank_ordered = "RODS_{i}_CMD"
"#,
    )
    .unwrap();

    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.channel.base_url, "http://plant.local:9000/");
    assert_eq!(config.channel.poll_interval_ms, 100);
    assert_eq!(config.channel.timeout_ms, 2000);
    assert_eq!(config.chemistry.cooldown_ticks, 3);
    assert_eq!(config.chemistry.iodine_history, 4);
    assert_eq!(config.variables.tick, "SIM_MINUTE");
    assert_eq!(config.variables.bank_ordered(7), "RODS_7_CMD");
    assert_eq!(config.variables.bank_actual(7), "ROD_BANK_POS_7_ACTUAL");
}

#[test]
fn bank_template_without_placeholder_is_rejected() {
    let err = load_str("[variables]\nrod_bank_actual = \"ROD_POS\"\n").unwrap_err();
    match err {
        ConfigError::ValidationError(msg) => assert!(msg.contains("rod_bank_actual")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn out_of_range_sections_are_rejected() {
    for (body, field) in [
        ("[rods]\nbank_count = 0\n", "rods.bank_count"),
        ("[rods]\nbank_count = 17\n", "rods.bank_count"),
        ("[chemistry]\ncooldown_ticks = 0\n", "chemistry.cooldown_ticks"),
        ("[chemistry]\nmax_rate = 80.0\n", "chemistry.max_rate"),
        ("[channel]\ntimeout_ms = 5\n", "channel.timeout_ms"),
        ("[condenser]\nmin_speed = 120.0\n", "condenser.min_speed"),
        (
            "[pid.condenser]\nkp = -5.0\nout_min = 50.0\nout_max = 10.0\n",
            "pid.condenser",
        ),
    ] {
        match load_str(body) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(field), "{field}: {msg}");
            }
            other => panic!("{field}: expected validation error, got {other:?}"),
        }
    }
}

#[test]
fn dosing_ceiling_above_hard_ceiling_is_rejected() {
    let err = load_str("[chemistry]\ndosing_ceiling_ppm = 5500.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn empty_service_name_is_rejected() {
    let err = load_str("[shared]\nservice_name = \"\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}
