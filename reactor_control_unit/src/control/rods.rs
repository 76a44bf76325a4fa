//! Rod actuation engine.
//!
//! Turns the desired-vs-actual reactivity error into a quantized rod
//! position and a number of banks to advance this tick.
//!
//! ## Pipeline
//! 1. Reactivity → rod PID gives a continuous position in `[0, 100]`.
//! 2. The difference to the last applied position feeds a persistent
//!    accumulator; whole steps are taken out of it, the residual carries
//!    over to later ticks.
//! 3. The step size scales with the reactivity error between a floor and
//!    1.0 %.
//! 4. Banks are advanced round-robin from a persistent cursor; a bank is
//!    only written when its command changes by more than the tolerance.
//!
//! The emergency path bypasses quantization and withdraws every driven bank
//! by a fixed step toward the floor.

use heapless::Vec;
use reactor_common::consts::{MAX_DRIVEN_BANKS, ROD_POSITION_MAX, ROD_POSITION_MIN};
use reactor_common::control_unit::config::RodConfig;

use crate::control::pid::Pid;

/// Number of banks the engine drives for a plant with `bank_count` banks.
#[inline]
pub fn driven_banks(bank_count: usize) -> usize {
    bank_count.min(MAX_DRIVEN_BANKS)
}

#[inline]
fn clamp_position(position: f64) -> f64 {
    position.clamp(ROD_POSITION_MIN, ROD_POSITION_MAX)
}

// ─── Cross-Tick State ───────────────────────────────────────────────

/// Rod engine state persisted across ticks.
#[derive(Debug, Clone)]
pub struct RodActuationState {
    /// Last applied (quantized) position [%].
    last_applied: f64,
    /// Unapplied PID movement [%].
    accumulator: f64,
    /// Next bank to move.
    cursor: usize,
    /// Last commanded position per driven bank.
    last_commanded: Vec<f64, MAX_DRIVEN_BANKS>,
}

impl RodActuationState {
    /// Seed from the banks' actual positions so the first tick does not
    /// rewrite every bank.
    pub fn seeded(actual_positions: &[f64]) -> Self {
        let mut last_commanded = Vec::new();
        for &p in actual_positions.iter().take(MAX_DRIVEN_BANKS) {
            // Cannot fail: `take` bounds the length.
            let _ = last_commanded.push(p);
        }
        let last_applied = clamp_position(mean_position(&last_commanded));
        Self {
            last_applied,
            accumulator: 0.0,
            cursor: 0,
            last_commanded,
        }
    }

    /// Drop pending movement and continue quantizing from `position`.
    pub fn reanchor(&mut self, position: f64) {
        self.last_applied = clamp_position(position);
        self.accumulator = 0.0;
    }

    #[inline]
    pub fn last_applied(&self) -> f64 {
        self.last_applied
    }

    #[inline]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of banks driven round-robin.
    #[inline]
    pub fn driven(&self) -> usize {
        self.last_commanded.len()
    }

    pub fn last_commanded(&self) -> &[f64] {
        &self.last_commanded
    }

    /// Record `position` for `bank` unless it is within `tolerance` of the
    /// previous command. Returns `true` when a write is required.
    fn command(&mut self, bank: usize, position: f64, tolerance: f64) -> bool {
        match self.last_commanded.get_mut(bank) {
            Some(last) if (position - *last).abs() > tolerance => {
                *last = position;
                true
            }
            _ => false,
        }
    }

    fn advance_cursor(&mut self) -> usize {
        let bank = self.cursor;
        let driven = self.driven().max(1);
        self.cursor = (self.cursor + 1) % driven;
        bank
    }
}

/// Mean of the given positions; the rod floor when empty.
pub fn mean_position(positions: &[f64]) -> f64 {
    if positions.is_empty() {
        return ROD_POSITION_MIN;
    }
    positions.iter().sum::<f64>() / positions.len() as f64
}

// ─── Per-Tick Result ────────────────────────────────────────────────

/// Command for one bank this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankCommand {
    /// Zero-based bank index.
    pub bank: usize,
    /// Commanded position [%].
    pub position: f64,
    /// `false` when the write was suppressed as redundant.
    pub write: bool,
}

/// Outcome of one rod engine pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RodDecision {
    /// Continuous PID output [%].
    pub raw: f64,
    /// Quantization step used [%].
    pub step_size: f64,
    /// Whole steps taken from the accumulator.
    pub steps: i64,
    /// Quantized position [%].
    pub commanded: f64,
    /// Banks selected this tick.
    pub banks_to_move: usize,
    /// Whether the actuation gate was open (always true in emergency).
    pub actuated: bool,
    /// Emergency withdrawal was applied.
    pub emergency: bool,
    /// Per-bank commands in issue order.
    pub commands: Vec<BankCommand, MAX_DRIVEN_BANKS>,
}

impl RodDecision {
    /// Commands that must be written to the plant.
    pub fn writes(&self) -> impl Iterator<Item = &BankCommand> {
        self.commands.iter().filter(|c| c.write)
    }

    /// Number of redundant writes suppressed.
    pub fn suppressed(&self) -> usize {
        self.commands.iter().filter(|c| !c.write).count()
    }
}

/// Inputs for one normal (non-emergency) pass.
#[derive(Debug, Clone, Copy)]
pub struct RodInput {
    pub timestamp: u64,
    pub desired_reactivity: f64,
    pub actual_reactivity: f64,
    /// Three-sample reactivity average.
    pub average_reactivity: f64,
    /// Core temperature inside the desired band.
    pub in_band: bool,
}

// ─── Building Blocks ────────────────────────────────────────────────

/// Quantization step scaled linearly with the reactivity error.
pub fn step_size(cfg: &RodConfig, error: f64) -> f64 {
    let fraction = error.abs() / cfg.step_error_span;
    (cfg.step_floor + (1.0 - cfg.step_floor) * fraction).clamp(cfg.step_floor, 1.0)
}

/// Actuate only outside the band or when reactivity strays beyond the
/// tolerance.
pub fn should_actuate(cfg: &RodConfig, in_band: bool, average: f64, desired: f64) -> bool {
    !in_band || (average - desired).abs() > cfg.reactivity_tolerance
}

/// Banks to move this tick: at least one, more for large errors or a
/// negative average reactivity, never more than `driven`.
pub fn banks_to_move(cfg: &RodConfig, error: f64, step: f64, average: f64, driven: usize) -> usize {
    let extra = if average < 0.0 {
        -average * cfg.negative_bank_gain
    } else {
        0.0
    };
    let wanted = (error.abs() / step + extra).ceil();
    let wanted = if wanted.is_finite() && wanted > 1.0 {
        wanted as usize
    } else {
        1
    };
    wanted.min(driven.max(1))
}

/// Feed `raw` into the accumulator and take whole steps out of it.
///
/// Returns `(steps, commanded)`. Steps are floored, so the residual left
/// in the accumulator is always in `[0, step)`. When no whole step is
/// available but the PID moved, exactly one step is forced in the direction
/// of the move and the accumulator is cleared.
pub fn quantize(state: &mut RodActuationState, raw: f64, step: f64) -> (i64, f64) {
    let diff = raw - state.last_applied;
    state.accumulator += diff;

    let mut steps = (state.accumulator / step).floor() as i64;
    if steps == 0 && diff.abs() > f64::EPSILON {
        steps = if diff > 0.0 { 1 } else { -1 };
        state.accumulator = 0.0;
    } else {
        state.accumulator -= steps as f64 * step;
    }

    let commanded = clamp_position(state.last_applied + steps as f64 * step);
    state.last_applied = commanded;
    (steps, commanded)
}

// ─── Engine Passes ──────────────────────────────────────────────────

/// Normal rod pass: PID, gate, quantize, round-robin fan-out.
pub fn actuate(
    state: &mut RodActuationState,
    pid: &mut Pid,
    cfg: &RodConfig,
    input: &RodInput,
) -> RodDecision {
    let raw = pid.step(
        input.timestamp,
        input.desired_reactivity,
        input.actual_reactivity,
    );
    let error = input.desired_reactivity - input.average_reactivity;
    let step = step_size(cfg, error);

    let mut decision = RodDecision {
        raw,
        step_size: step,
        steps: 0,
        commanded: state.last_applied,
        banks_to_move: 0,
        actuated: false,
        emergency: false,
        commands: Vec::new(),
    };

    if !should_actuate(
        cfg,
        input.in_band,
        input.average_reactivity,
        input.desired_reactivity,
    ) {
        return decision;
    }

    let (steps, commanded) = quantize(state, raw, step);
    let banks = banks_to_move(cfg, error, step, input.average_reactivity, state.driven());

    decision.steps = steps;
    decision.commanded = commanded;
    decision.banks_to_move = banks;
    decision.actuated = true;

    for _ in 0..banks {
        let bank = state.advance_cursor();
        let write = state.command(bank, commanded, cfg.write_tolerance);
        // Cannot fail: `banks` never exceeds the driven bank count.
        let _ = decision.commands.push(BankCommand {
            bank,
            position: commanded,
            write,
        });
    }

    decision
}

/// Emergency pass: every driven bank is withdrawn by `emergency_step`
/// from its actual position, never below the rod floor.
///
/// The PID is still stepped so its time base stays continuous.
pub fn emergency_withdraw(
    state: &mut RodActuationState,
    pid: &mut Pid,
    cfg: &RodConfig,
    input: &RodInput,
    actual_positions: &[f64],
) -> RodDecision {
    let raw = pid.step(
        input.timestamp,
        input.desired_reactivity,
        input.actual_reactivity,
    );

    let mut commands: Vec<BankCommand, MAX_DRIVEN_BANKS> = Vec::new();
    for (bank, &actual) in actual_positions.iter().take(state.driven()).enumerate() {
        let position = (actual - cfg.emergency_step).max(ROD_POSITION_MIN);
        let write = state.command(bank, position, cfg.write_tolerance);
        let _ = commands.push(BankCommand {
            bank,
            position,
            write,
        });
    }

    if !commands.is_empty() {
        let total: f64 = commands.iter().map(|c| c.position).sum();
        state.reanchor(total / commands.len() as f64);
    }

    RodDecision {
        raw,
        step_size: cfg.emergency_step,
        steps: 0,
        commanded: state.last_applied,
        banks_to_move: commands.len(),
        actuated: true,
        emergency: true,
        commands,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
