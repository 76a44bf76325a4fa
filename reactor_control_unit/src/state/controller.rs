//! Cross-tick controller state.
//!
//! Owned exclusively by the tick loop and passed by mutable reference into
//! each tick. A restart discards it and builds a fresh one from a newly
//! read sample, so no integrator or accumulator survives a failure.

use reactor_common::control_unit::config::ControllerConfig;
use reactor_common::process::OperationMode;
use tracing::info;

use crate::control::chemistry::ChemistryState;
use crate::control::pid::Pid;
use crate::control::rods::RodActuationState;
use crate::cycle::TickStats;
use crate::sample::ProcessSample;
use crate::state::history::ReactivityHistory;
use crate::state::mode::ModeTracker;

/// All state that persists between ticks.
#[derive(Debug, Clone)]
pub struct ControllerState {
    /// Reactivity → rod position.
    pub rods_pid: Pid,
    /// Condenser temperature → pump speed.
    pub condenser_pid: Pid,
    /// Reactivity → boron dose/filter.
    pub boron_pid: Pid,
    pub rods: RodActuationState,
    pub reactivity: ReactivityHistory,
    pub chemistry: ChemistryState,
    pub mode: ModeTracker,
    /// Tick of the last processed sample.
    pub last_tick: u64,
    pub stats: TickStats,
}

impl ControllerState {
    /// Build a fresh state seeded from `sample`.
    ///
    /// PID outputs start at the actuators' actual values: rods at the mean
    /// driven-bank position, the condenser at the sampled pump speed, boron
    /// at zero.
    pub fn new(config: &ControllerConfig, sample: &ProcessSample) -> Self {
        let rods_seed = sample.mean_driven_position();
        let mode = OperationMode::derive(
            sample.external_mode,
            sample.core_temperature,
            config.mode.normal_entry_temperature,
        );

        Self {
            rods_pid: Pid::seeded(&config.pid.rods, sample.tick, rods_seed),
            condenser_pid: Pid::seeded(
                &config.pid.condenser,
                sample.tick,
                sample.condenser_pump_speed,
            ),
            boron_pid: Pid::seeded(&config.pid.boron, sample.tick, 0.0),
            rods: RodActuationState::seeded(sample.driven_positions()),
            reactivity: ReactivityHistory::new(),
            chemistry: ChemistryState::new(&config.chemistry),
            mode: ModeTracker::new(mode, config.mode),
            last_tick: sample.tick,
            stats: TickStats::default(),
        }
    }

    /// Re-anchor every loop after an operating-mode transition.
    pub fn reset_for_transition(&mut self, sample: &ProcessSample) {
        let rods_seed = sample.mean_driven_position();
        self.rods_pid.reset(sample.tick, rods_seed);
        self.condenser_pid
            .reset(sample.tick, sample.condenser_pump_speed);
        self.boron_pid.reset(sample.tick, 0.0);
        self.rods.reanchor(rods_seed);
        info!(
            tick = sample.tick,
            rods_seed,
            condenser_seed = sample.condenser_pump_speed,
            "PID loops reset"
        );
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
