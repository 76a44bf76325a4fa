//! Configuration structures for the supervisory controller.
//!
//! All config types use `serde::Deserialize` for TOML loading and fall back
//! to defaults for every omitted field, so an empty file is a valid config.
//! Numeric parameters are bounds-checked by [`ControllerConfig::validate`].

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    BORON_RATE_MAX, IODINE_HISTORY_MAX, MAX_SAMPLED_BANKS, PUMP_SPEED_MAX, PUMP_SPEED_MIN,
};
use crate::process::{BANK_PLACEHOLDER, VariableNames};

// ─── Bounds ─────────────────────────────────────────────────────────

/// Channel request deadline bounds [ms].
pub const TIMEOUT_MS_MIN: u64 = 50;
pub const TIMEOUT_MS_MAX: u64 = 60_000;

/// Tick poll interval bounds [ms].
pub const POLL_INTERVAL_MS_MIN: u64 = 10;
pub const POLL_INTERVAL_MS_MAX: u64 = 10_000;

/// Chemistry cooldown bounds [ticks].
pub const COOLDOWN_TICKS_MIN: u32 = 1;
pub const COOLDOWN_TICKS_MAX: u32 = 1_000;

/// Mode hysteresis bounds [°C].
pub const MODE_HYSTERESIS_MIN: f64 = 0.0;
pub const MODE_HYSTERESIS_MAX: f64 = 50.0;

/// Restart delay bounds [ms].
pub const RESTART_DELAY_MS_MIN: u64 = 0;
pub const RESTART_DELAY_MS_MAX: u64 = 600_000;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete controller configuration.
///
/// Loaded from TOML at startup and immutable afterwards. A restart by the
/// supervisor reuses the same configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub shared: SharedConfig,
    pub channel: ChannelConfig,
    pub variables: VariableNames,
    pub planner: PlannerConfig,
    pub rods: RodConfig,
    pub condenser: CondenserConfig,
    pub chemistry: ChemistryConfig,
    pub pid: PidSet,
    pub mode: ModeConfig,
    pub supervisor: SupervisorConfig,
}

impl ControllerConfig {
    /// Validate every section (parameter bounds, ordering, non-empty names).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.channel
            .validate()
            .and_then(|_| validate_variables(&self.variables))
            .and_then(|_| self.planner.validate())
            .and_then(|_| self.rods.validate())
            .and_then(|_| self.condenser.validate())
            .and_then(|_| self.chemistry.validate())
            .and_then(|_| self.pid.rods.validate("pid.rods"))
            .and_then(|_| self.pid.condenser.validate("pid.condenser"))
            .and_then(|_| self.pid.boron.validate("pid.boron"))
            .and_then(|_| self.mode.validate())
            .and_then(|_| self.supervisor.validate())
            .map_err(ConfigError::ValidationError)
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{field} {value} out of range [{min}, {max}]"));
    }
    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{field} must be finite, got {value}"));
    }
    Ok(())
}

fn validate_variables(names: &VariableNames) -> Result<(), String> {
    for (field, name) in names.entries() {
        if name.trim().is_empty() {
            return Err(format!("variables.{field} cannot be empty"));
        }
    }
    for (field, template) in [
        ("rod_bank_actual", &names.rod_bank_actual),
        ("rod_bank_ordered", &names.rod_bank_ordered),
    ] {
        if !template.contains(BANK_PLACEHOLDER) {
            return Err(format!(
                "variables.{field} must contain the {BANK_PLACEHOLDER} placeholder"
            ));
        }
    }
    Ok(())
}

// ─── Channel ────────────────────────────────────────────────────────

/// Process Variable Channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Base URL of the plant's variable endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request deadline [ms] (default: 2000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Wall-clock interval between tick polls [ms] (default: 250).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8785/".to_string()
}
fn default_timeout_ms() -> u64 {
    2000
}
fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("channel.base_url cannot be empty".to_string());
        }
        check_range(
            "channel.timeout_ms",
            self.timeout_ms,
            TIMEOUT_MS_MIN,
            TIMEOUT_MS_MAX,
        )?;
        check_range(
            "channel.poll_interval_ms",
            self.poll_interval_ms,
            POLL_INTERVAL_MS_MIN,
            POLL_INTERVAL_MS_MAX,
        )
    }
}

// ─── Target Planner ─────────────────────────────────────────────────

/// Temperature band, slopes and override thresholds for the target planner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Lower edge of the desired core temperature band [°C].
    pub band_low: f64,
    /// Upper edge of the desired core temperature band [°C].
    pub band_high: f64,
    /// Reactivity requested inside the band.
    pub target_reactivity: f64,
    /// Temperature distance over which the heating slope saturates [°C].
    pub slope_length: f64,
    /// Extra reactivity requested at full slope.
    pub max_extra: f64,
    /// Use a symmetric negative slope above the band instead of zero.
    pub cooling_slope: bool,
    /// Additional reactivity at the low edge of the band, fading to zero at
    /// the high edge.
    pub low_edge_bias: f64,
    /// Xenon level above which the poison boost applies.
    pub poison_threshold: f64,
    /// Xenon span over which the poison boost ramps to full.
    pub poison_span: f64,
    /// Reactivity added at full poison boost.
    pub poison_gain: f64,
    /// Emergency override: xenon strictly above this level.
    pub emergency_xenon: f64,
    /// Emergency override: temperature strictly below this level [°C].
    pub emergency_temperature: f64,
    /// Desired reactivity forced while the emergency holds.
    pub emergency_reactivity: f64,
    /// Unrecoverable-poisoning warning: temperature below [°C].
    pub unrecoverable_temperature: f64,
    /// Unrecoverable-poisoning warning: xenon above.
    pub unrecoverable_xenon: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            band_low: 320.0,
            band_high: 325.0,
            target_reactivity: 0.10,
            slope_length: 50.0,
            max_extra: 1.0,
            cooling_slope: false,
            low_edge_bias: 0.0,
            poison_threshold: 50.0,
            poison_span: 10.0,
            poison_gain: 0.5,
            emergency_xenon: 60.0,
            emergency_temperature: 300.0,
            emergency_reactivity: 1.0,
            unrecoverable_temperature: 100.0,
            unrecoverable_xenon: 200.0,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("planner.band_low", self.band_low),
            ("planner.band_high", self.band_high),
            ("planner.target_reactivity", self.target_reactivity),
            ("planner.max_extra", self.max_extra),
            ("planner.low_edge_bias", self.low_edge_bias),
            ("planner.poison_threshold", self.poison_threshold),
            ("planner.poison_gain", self.poison_gain),
            ("planner.emergency_xenon", self.emergency_xenon),
            ("planner.emergency_temperature", self.emergency_temperature),
            ("planner.emergency_reactivity", self.emergency_reactivity),
        ] {
            check_finite(field, value)?;
        }
        if self.band_low >= self.band_high {
            return Err(format!(
                "planner.band_low {} must be below band_high {}",
                self.band_low, self.band_high
            ));
        }
        if self.slope_length <= 0.0 {
            return Err(format!(
                "planner.slope_length {} must be positive",
                self.slope_length
            ));
        }
        if self.poison_span <= 0.0 {
            return Err(format!(
                "planner.poison_span {} must be positive",
                self.poison_span
            ));
        }
        Ok(())
    }
}

// ─── Rod Actuation ──────────────────────────────────────────────────

/// Quantization, fan-out and gating parameters for the rod engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RodConfig {
    /// Number of rod banks present (sampled). At most 9 are driven.
    pub bank_count: usize,
    /// Smallest quantization step [%].
    pub step_floor: f64,
    /// Reactivity error at which the step reaches 1.0 %.
    pub step_error_span: f64,
    /// Extra banks per unit of negative average reactivity.
    pub negative_bank_gain: f64,
    /// Reactivity deviation tolerated before actuation inside the band.
    pub reactivity_tolerance: f64,
    /// Minimum change before a bank write is issued [%].
    pub write_tolerance: f64,
    /// Per-tick withdrawal during the emergency override [%].
    pub emergency_step: f64,
}

impl Default for RodConfig {
    fn default() -> Self {
        Self {
            bank_count: 9,
            step_floor: 0.1,
            step_error_span: 1.0,
            negative_bank_gain: 5.0,
            reactivity_tolerance: 0.10,
            write_tolerance: 0.01,
            emergency_step: 1.0,
        }
    }
}

impl RodConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range("rods.bank_count", self.bank_count, 1, MAX_SAMPLED_BANKS)?;
        check_range("rods.step_floor", self.step_floor, 0.001, 1.0)?;
        check_range("rods.step_error_span", self.step_error_span, 0.001, 100.0)?;
        check_range("rods.negative_bank_gain", self.negative_bank_gain, 0.0, 100.0)?;
        check_range("rods.reactivity_tolerance", self.reactivity_tolerance, 0.0, 10.0)?;
        check_range("rods.write_tolerance", self.write_tolerance, 0.0, 10.0)?;
        check_range("rods.emergency_step", self.emergency_step, 0.01, 90.0)
    }
}

// ─── Condenser ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CondenserConfig {
    /// Condenser return temperature set-point [°C].
    pub target_temperature: f64,
    /// Pump speed floor applied in normal operation [%].
    pub min_speed: f64,
}

impl Default for CondenserConfig {
    fn default() -> Self {
        Self {
            target_temperature: 65.0,
            min_speed: 1.0,
        }
    }
}

impl CondenserConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_finite("condenser.target_temperature", self.target_temperature)?;
        check_range(
            "condenser.min_speed",
            self.min_speed,
            PUMP_SPEED_MIN,
            PUMP_SPEED_MAX,
        )
    }
}

// ─── Chemistry ──────────────────────────────────────────────────────

/// Boron chemistry rule thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemistryConfig {
    /// Ticks between chemistry decisions.
    pub cooldown_ticks: u32,
    /// Length of the iodine moving average [ticks].
    pub iodine_history: usize,
    /// Cold purge: temperature below [°C].
    pub cold_temperature: f64,
    /// Cold purge: reactivity below.
    pub cold_reactivity: f64,
    /// High-iodine dosing: smoothed iodine above.
    pub iodine_threshold: f64,
    /// High-iodine dosing: temperature above [°C].
    pub iodine_temperature: f64,
    /// High-iodine dosing only below this concentration [PPM].
    pub dosing_ceiling_ppm: f64,
    /// Dosage per unit of iodine excess.
    pub dose_gain: f64,
    /// Above this concentration only filtering is allowed [PPM].
    pub hard_ceiling_ppm: f64,
    /// Maximum dosage and filter rate.
    pub max_rate: f64,
}

impl Default for ChemistryConfig {
    fn default() -> Self {
        Self {
            cooldown_ticks: 5,
            iodine_history: 10,
            cold_temperature: 300.0,
            cold_reactivity: 0.01,
            iodine_threshold: 1.2,
            iodine_temperature: 320.0,
            dosing_ceiling_ppm: 4500.0,
            dose_gain: 25.0,
            hard_ceiling_ppm: 5000.0,
            max_rate: BORON_RATE_MAX,
        }
    }
}

impl ChemistryConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range(
            "chemistry.cooldown_ticks",
            self.cooldown_ticks,
            COOLDOWN_TICKS_MIN,
            COOLDOWN_TICKS_MAX,
        )?;
        check_range(
            "chemistry.iodine_history",
            self.iodine_history,
            1,
            IODINE_HISTORY_MAX,
        )?;
        check_range("chemistry.max_rate", self.max_rate, 0.0, BORON_RATE_MAX)?;
        check_range("chemistry.dose_gain", self.dose_gain, 0.0, 1_000.0)?;
        if self.dosing_ceiling_ppm > self.hard_ceiling_ppm {
            return Err(format!(
                "chemistry.dosing_ceiling_ppm {} exceeds hard_ceiling_ppm {}",
                self.dosing_ceiling_ppm, self.hard_ceiling_ppm
            ));
        }
        Ok(())
    }
}

// ─── PID ────────────────────────────────────────────────────────────

/// Gains and limits for one PID loop.
///
/// Negative gains make a loop reverse-acting (output rises as the
/// measurement rises above the set-point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    pub kp: f64,
    #[serde(default)]
    pub ki: f64,
    #[serde(default)]
    pub kd: f64,
    pub out_min: f64,
    pub out_max: f64,
    /// Differentiate the measurement instead of the error.
    #[serde(default = "default_true")]
    pub derivative_on_measurement: bool,
    /// Clamp the raw integral accumulator to the output range.
    #[serde(default = "default_true")]
    pub clamp_integral: bool,
}

fn default_true() -> bool {
    true
}

impl PidConfig {
    pub fn validate(&self, section: &str) -> Result<(), String> {
        for (field, value) in [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("out_min", self.out_min),
            ("out_max", self.out_max),
        ] {
            check_finite(&format!("{section}.{field}"), value)?;
        }
        if self.out_min >= self.out_max {
            return Err(format!(
                "{section}.out_min {} must be below out_max {}",
                self.out_min, self.out_max
            ));
        }
        Ok(())
    }
}

/// The three PID loops owned by the controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PidSet {
    /// Reactivity → rod position.
    pub rods: PidConfig,
    /// Condenser temperature → pump speed.
    pub condenser: PidConfig,
    /// Reactivity → boron dose (positive) / filter (negative).
    pub boron: PidConfig,
}

impl Default for PidSet {
    fn default() -> Self {
        Self {
            rods: PidConfig {
                kp: -10.0,
                ki: -1.0,
                kd: 0.0,
                out_min: 0.0,
                out_max: 100.0,
                derivative_on_measurement: true,
                clamp_integral: true,
            },
            condenser: PidConfig {
                kp: -5.0,
                ki: -0.5,
                kd: 0.0,
                out_min: PUMP_SPEED_MIN,
                out_max: PUMP_SPEED_MAX,
                derivative_on_measurement: true,
                clamp_integral: true,
            },
            boron: PidConfig {
                kp: -20.0,
                ki: -1.0,
                kd: 0.0,
                out_min: -BORON_RATE_MAX,
                out_max: BORON_RATE_MAX,
                derivative_on_measurement: true,
                clamp_integral: true,
            },
        }
    }
}

// ─── Mode / Supervisor ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Core temperature at which Startup becomes Normal [°C].
    pub normal_entry_temperature: f64,
    /// Normal falls back to Startup only below
    /// `normal_entry_temperature - hysteresis` [°C].
    pub hysteresis: f64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            normal_entry_temperature: 300.0,
            hysteresis: 2.0,
        }
    }
}

impl ModeConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_finite("mode.normal_entry_temperature", self.normal_entry_temperature)?;
        check_range(
            "mode.hysteresis",
            self.hysteresis,
            MODE_HYSTERESIS_MIN,
            MODE_HYSTERESIS_MAX,
        )
    }

    /// Temperature below which Normal falls back to Startup [°C].
    pub fn normal_exit_temperature(&self) -> f64 {
        self.normal_entry_temperature - self.hysteresis
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Delay before the controller is restarted after a tick-fatal error [ms].
    pub restart_delay_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: 5000,
        }
    }
}

impl SupervisorConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range(
            "supervisor.restart_delay_ms",
            self.restart_delay_ms,
            RESTART_DELAY_MS_MIN,
            RESTART_DELAY_MS_MAX,
        )
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
