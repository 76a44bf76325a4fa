//! Condenser loop: return temperature → circulation pump speed.
//!
//! Runs independently of the reactivity loops off its own sampled input.
//! In normal operation the speed is floored at a non-zero minimum so the
//! coolant always circulates.

use reactor_common::control_unit::config::CondenserConfig;
use reactor_common::process::OperationMode;

use crate::control::pid::Pid;

/// One condenser loop pass.
///
/// # Arguments
/// - `pid`: Condenser PID (reverse-acting: hotter return → faster pump).
/// - `timestamp`: Plant tick.
/// - `temperature`: Measured condenser return temperature [°C].
/// - `mode`: Current operating mode; the floor applies in `Normal` only.
///
/// # Returns
/// Pump speed command in `[0, 100]` %.
pub fn condenser_speed(
    pid: &mut Pid,
    cfg: &CondenserConfig,
    timestamp: u64,
    temperature: f64,
    mode: OperationMode,
) -> f64 {
    let speed = pid.step(timestamp, cfg.target_temperature, temperature);
    if mode == OperationMode::Normal {
        speed.max(cfg.min_speed)
    } else {
        speed
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
