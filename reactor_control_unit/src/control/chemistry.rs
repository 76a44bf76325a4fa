//! Boron chemistry rule engine.
//!
//! Decides a boron dosage rate and a boron filter rate, each in
//! `[0, max_rate]`, once per cooldown period.
//!
//! ## Rule priority
//! 1. **Cold purge**: cold, sub-critical core → filter at max rate.
//! 2. **Iodine dosing**: smoothed iodine above threshold in a hot core with
//!    headroom below the dosing ceiling → dose proportionally.
//! 3. **Boron PID** fallback when neither rule fired; its signed output is
//!    split into dose (positive) and filter (negative).
//! 4. **Hard ceiling**: above the hard concentration ceiling → filter only,
//!    overriding every rule above.

use reactor_common::control_unit::config::ChemistryConfig;

use crate::control::pid::Pid;
use crate::state::history::IodineHistory;

/// Which rule produced a chemistry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChemistryRule {
    ColdPurge,
    IodineDosing,
    Pid,
    HardCeiling,
}

impl ChemistryRule {
    pub fn label(self) -> &'static str {
        match self {
            Self::ColdPurge => "cold_purge",
            Self::IodineDosing => "iodine_dosing",
            Self::Pid => "pid",
            Self::HardCeiling => "hard_ceiling",
        }
    }
}

/// Boron dosage and filter commands for one decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChemistryDecision {
    /// Dosage rate in `[0, max_rate]`.
    pub dose: f64,
    /// Filter rate in `[0, max_rate]`.
    pub filter: f64,
    pub rule: ChemistryRule,
    /// Boron PID output of this decision tick.
    pub pid_output: f64,
}

/// Signals the chemistry engine reads on a decision tick.
#[derive(Debug, Clone, Copy)]
pub struct ChemistryInput {
    pub timestamp: u64,
    pub temperature: f64,
    pub reactivity: f64,
    pub average_reactivity: f64,
    pub desired_reactivity: f64,
    pub boron_ppm: f64,
}

/// Split a signed boron PID output into `(dose, filter)`.
///
/// Positive output doses, negative output filters; at most one of the two
/// is non-zero.
#[inline]
pub fn split_boron_output(output: f64, max_rate: f64) -> (f64, f64) {
    (output.clamp(0.0, max_rate), (-output).clamp(0.0, max_rate))
}

// ─── Cross-Tick State ───────────────────────────────────────────────

/// Iodine smoothing window and cooldown countdown.
#[derive(Debug, Clone)]
pub struct ChemistryState {
    iodine: IodineHistory,
    /// Ticks left until the next decision; 0 means decide now.
    countdown: u32,
}

impl ChemistryState {
    pub fn new(cfg: &ChemistryConfig) -> Self {
        Self {
            iodine: IodineHistory::with_capacity(cfg.iodine_history),
            countdown: 0,
        }
    }

    /// Record this tick's iodine sample.
    pub fn observe_iodine(&mut self, iodine: f64) {
        self.iodine.push(iodine);
    }

    /// Smoothed iodine level.
    pub fn iodine_average(&self) -> f64 {
        self.iodine.average()
    }

    /// Advance the cooldown by one tick. Returns `true` when this tick is a
    /// decision tick.
    fn take_turn(&mut self, cooldown_ticks: u32) -> bool {
        let due = self.countdown == 0;
        if due {
            self.countdown = cooldown_ticks.max(1);
        }
        self.countdown -= 1;
        due
    }
}

// ─── Rules ──────────────────────────────────────────────────────────

fn evaluate_rules(
    cfg: &ChemistryConfig,
    input: &ChemistryInput,
    iodine_average: f64,
    pid_output: f64,
) -> ChemistryDecision {
    let mut decision = if input.temperature < cfg.cold_temperature
        && input.reactivity < cfg.cold_reactivity
    {
        ChemistryDecision {
            dose: 0.0,
            filter: cfg.max_rate,
            rule: ChemistryRule::ColdPurge,
            pid_output,
        }
    } else if iodine_average > cfg.iodine_threshold
        && input.temperature > cfg.iodine_temperature
        && input.boron_ppm < cfg.dosing_ceiling_ppm
    {
        let dose = ((iodine_average - cfg.iodine_threshold) * cfg.dose_gain).min(cfg.max_rate);
        ChemistryDecision {
            dose,
            filter: 0.0,
            rule: ChemistryRule::IodineDosing,
            pid_output,
        }
    } else {
        let (dose, filter) = split_boron_output(pid_output, cfg.max_rate);
        ChemistryDecision {
            dose,
            filter,
            rule: ChemistryRule::Pid,
            pid_output,
        }
    };

    if input.boron_ppm > cfg.hard_ceiling_ppm {
        decision.dose = 0.0;
        decision.filter = cfg.max_rate;
        decision.rule = ChemistryRule::HardCeiling;
    }
    decision
}

/// One chemistry tick.
///
/// Returns `None` while cooling down. On a decision tick the boron PID is
/// stepped (desired vs average reactivity) and the rules are evaluated.
pub fn decide_chemistry(
    state: &mut ChemistryState,
    pid: &mut Pid,
    cfg: &ChemistryConfig,
    input: &ChemistryInput,
) -> Option<ChemistryDecision> {
    if !state.take_turn(cfg.cooldown_ticks) {
        return None;
    }
    let pid_output = pid.step(
        input.timestamp,
        input.desired_reactivity,
        input.average_reactivity,
    );
    Some(evaluate_rules(cfg, input, state.iodine_average(), pid_output))
}

// ─── Tests ──────────────────────────────────────────────────────────
