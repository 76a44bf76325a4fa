//! Target planner: core temperature → desired reactivity.
//!
//! Layered; each layer may override the previous one:
//! 1. Base slope around the temperature band.
//! 2. Xenon poison boost.
//! 3. Emergency override (xenon-poisoned cold core, negative reactivity).
//! 4. Unrecoverable-poisoning warning (logged only).

use reactor_common::control_unit::config::PlannerConfig;
use tracing::warn;

/// Result of one planning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPlan {
    /// Final desired reactivity after all layers.
    pub desired_reactivity: f64,
    /// Layer-1 value before poison boost and overrides.
    pub base_reactivity: f64,
    /// Reactivity added by the poison boost (0 when inactive).
    pub poison_boost: f64,
    /// Emergency override fired.
    pub emergency: bool,
    /// Unrecoverable-poisoning warning condition holds.
    pub unrecoverable_poison: bool,
}

/// Core temperature inside `[band_low, band_high]`.
#[inline]
pub fn in_band(cfg: &PlannerConfig, temperature: f64) -> bool {
    temperature >= cfg.band_low && temperature <= cfg.band_high
}

/// Emergency condition: xenon above, temperature below and reactivity
/// negative. Derived every tick, never persisted.
#[inline]
pub fn is_emergency(cfg: &PlannerConfig, temperature: f64, xenon: f64, reactivity: f64) -> bool {
    xenon > cfg.emergency_xenon && temperature < cfg.emergency_temperature && reactivity < 0.0
}

/// Layer 1: base slope.
fn base_slope(cfg: &PlannerConfig, temperature: f64) -> f64 {
    if temperature < cfg.band_low {
        let extra =
            ((cfg.band_low - temperature) / cfg.slope_length * cfg.max_extra).clamp(0.0, 1.0);
        cfg.target_reactivity + extra
    } else if temperature > cfg.band_high {
        if cfg.cooling_slope {
            -((temperature - cfg.band_high) / cfg.slope_length * cfg.max_extra).clamp(0.0, 1.0)
        } else {
            0.0
        }
    } else {
        let width = cfg.band_high - cfg.band_low;
        let depth = (cfg.band_high - temperature) / width;
        cfg.target_reactivity + cfg.low_edge_bias * depth
    }
}

/// Layer 2: poison boost, active when xenon exceeds the threshold or the
/// core is already sub-critical.
fn poison_boost(cfg: &PlannerConfig, xenon: f64, reactivity: f64) -> f64 {
    if xenon > cfg.poison_threshold || reactivity < 0.0 {
        ((xenon - cfg.poison_threshold) / cfg.poison_span).clamp(0.0, 1.0) * cfg.poison_gain
    } else {
        0.0
    }
}

/// Compute the desired reactivity for this tick.
pub fn plan_target(
    cfg: &PlannerConfig,
    temperature: f64,
    xenon: f64,
    reactivity: f64,
) -> TargetPlan {
    let base = base_slope(cfg, temperature);
    let boost = poison_boost(cfg, xenon, reactivity);
    let mut desired = base + boost;

    let emergency = is_emergency(cfg, temperature, xenon, reactivity);
    if emergency {
        warn!(
            temperature,
            xenon,
            reactivity,
            "Xenon-poisoned cold core: forcing desired reactivity to {}",
            cfg.emergency_reactivity
        );
        desired = cfg.emergency_reactivity;
    }

    let unrecoverable_poison =
        temperature < cfg.unrecoverable_temperature && xenon > cfg.unrecoverable_xenon;
    if unrecoverable_poison {
        warn!(
            temperature,
            xenon, "Poisoning is likely unrecoverable by rod and boron control alone"
        );
    }

    TargetPlan {
        desired_reactivity: desired,
        base_reactivity: base,
        poison_boost: boost,
        emergency,
        unrecoverable_poison,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
