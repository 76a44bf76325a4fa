//! Tick orchestrator: wait → sample → decide → apply → log.
//!
//! ## Tick Sequence
//! 1. Poll the tick counter until it advances (sole suspension point).
//! 2. Read one immutable [`ProcessSample`].
//! 3. [`decide`]: update histories and mode, plan the target, run the rod
//!    engine, the condenser loop and the chemistry rules. No I/O.
//! 4. [`apply`]: issue the actuator writes sequentially, fire-and-forget.
//! 5. Log the [`TickSummary`].
//!
//! Any channel error aborts the tick and propagates to the supervisor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bitflags::bitflags;
use reactor_common::control_unit::config::ControllerConfig;
use reactor_common::process::OperationMode;
use tracing::{debug, info};

use crate::channel::{ChannelError, ProcessChannel};
use crate::control::chemistry::{ChemistryInput, ChemistryRule, decide_chemistry};
use crate::control::condenser::condenser_speed;
use crate::control::planner::{in_band, plan_target};
use crate::control::rods::{RodInput, actuate, emergency_withdraw};
use crate::error::ControlError;
use crate::sample::ProcessSample;
use crate::state::ControllerState;
use crate::state::mode::ModeUpdate;

// ─── Tick Flags ─────────────────────────────────────────────────────

bitflags! {
    /// Conditions observed during one tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TickFlags: u16 {
        /// Emergency override active (xenon-poisoned cold core).
        const EMERGENCY            = 0x0001;
        /// Poison boost added to the desired reactivity.
        const POISON_BOOST         = 0x0002;
        /// Unrecoverable-poisoning warning condition.
        const UNRECOVERABLE_POISON = 0x0004;
        /// Core temperature outside the desired band.
        const OUT_OF_BAND          = 0x0008;
        /// Rod engine gate was open.
        const ACTUATED             = 0x0010;
        /// Chemistry rules were evaluated this tick.
        const CHEMISTRY_DECIDED    = 0x0020;
        /// Operating mode changed; PIDs were reset.
        const MODE_CHANGED         = 0x0040;
    }
}

impl Default for TickFlags {
    fn default() -> Self {
        Self::empty()
    }
}

// ─── Decision & Summary ─────────────────────────────────────────────

/// One actuator write.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorWrite {
    pub name: String,
    pub value: f64,
}

/// Per-tick decision summary for logging and console display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickSummary {
    pub tick: u64,
    pub mode: OperationMode,
    pub temperature: f64,
    pub reactivity: f64,
    pub average_reactivity: f64,
    pub desired_reactivity: f64,
    pub xenon: f64,
    pub boron_ppm: f64,
    /// Continuous rods PID output (`None` when rods are idle in shutdown).
    pub rod_raw: Option<f64>,
    /// Quantized rod position.
    pub rod_command: Option<f64>,
    pub banks_moved: usize,
    pub condenser_speed: f64,
    pub boron_dose: Option<f64>,
    pub boron_filter: Option<f64>,
    pub chemistry_rule: Option<ChemistryRule>,
    pub flags: TickFlags,
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

impl TickSummary {
    /// Plain key/value pairs in display order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("tick", self.tick.to_string()),
            ("mode", self.mode.label().to_string()),
            ("temperature", format!("{:.2}", self.temperature)),
            ("reactivity", format!("{:.4}", self.reactivity)),
            ("avg_reactivity", format!("{:.4}", self.average_reactivity)),
            ("desired_reactivity", format!("{:.4}", self.desired_reactivity)),
            ("xenon", format!("{:.2}", self.xenon)),
            ("boron_ppm", format!("{:.1}", self.boron_ppm)),
            ("rod_raw", fmt_opt(self.rod_raw)),
            ("rod_command", fmt_opt(self.rod_command)),
            ("banks_moved", self.banks_moved.to_string()),
            ("condenser_speed", format!("{:.2}", self.condenser_speed)),
            ("boron_dose", fmt_opt(self.boron_dose)),
            ("boron_filter", fmt_opt(self.boron_filter)),
            (
                "chemistry_rule",
                self.chemistry_rule.map_or("-", ChemistryRule::label).to_string(),
            ),
            (
                "emergency",
                self.flags.contains(TickFlags::EMERGENCY).to_string(),
            ),
        ]
    }
}

/// Everything one tick decided: ordered writes plus the summary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickDecision {
    /// Writes in issue order: rod banks, condenser, boron dose, boron filter.
    pub writes: Vec<ActuatorWrite>,
    /// Bank writes suppressed as redundant.
    pub suppressed: usize,
    pub summary: TickSummary,
}

// ─── Statistics ─────────────────────────────────────────────────────

/// Counters over the life of one controller state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickStats {
    pub ticks: u64,
    pub writes_issued: u64,
    pub writes_suppressed: u64,
    pub emergency_ticks: u64,
    pub mode_transitions: u64,
    pub chemistry_decisions: u64,
}

impl TickStats {
    /// Account for one applied decision.
    pub fn record(&mut self, decision: &TickDecision) {
        let flags = decision.summary.flags;
        self.ticks += 1;
        self.writes_issued += decision.writes.len() as u64;
        self.writes_suppressed += decision.suppressed as u64;
        if flags.contains(TickFlags::EMERGENCY) {
            self.emergency_ticks += 1;
        }
        if flags.contains(TickFlags::MODE_CHANGED) {
            self.mode_transitions += 1;
        }
        if flags.contains(TickFlags::CHEMISTRY_DECIDED) {
            self.chemistry_decisions += 1;
        }
    }

    /// Add another run's counters to these.
    pub fn absorb(&mut self, other: &TickStats) {
        self.ticks += other.ticks;
        self.writes_issued += other.writes_issued;
        self.writes_suppressed += other.writes_suppressed;
        self.emergency_ticks += other.emergency_ticks;
        self.mode_transitions += other.mode_transitions;
        self.chemistry_decisions += other.chemistry_decisions;
    }
}

// ─── Tick Wait ──────────────────────────────────────────────────────

/// Poll the tick counter until it differs from `last_tick`.
///
/// With `last_tick == None` the first successful read is returned. Between
/// polls the thread sleeps `poll_interval`. Returns
/// [`ControlError::Shutdown`] once `running` is cleared.
pub fn wait_for_tick<C: ProcessChannel + ?Sized>(
    channel: &mut C,
    tick_variable: &str,
    last_tick: Option<u64>,
    poll_interval: Duration,
    running: &AtomicBool,
) -> Result<u64, ControlError> {
    loop {
        if !running.load(Ordering::SeqCst) {
            return Err(ControlError::Shutdown);
        }
        let tick = channel.read_u64(tick_variable)?;
        if last_tick != Some(tick) {
            return Ok(tick);
        }
        std::thread::sleep(poll_interval);
    }
}

// ─── Decide ─────────────────────────────────────────────────────────

/// Compute one tick's actuator writes from `sample`, updating `state`.
///
/// Performs no I/O. Normal rod actuation and chemistry are skipped in
/// shutdown mode; emergency withdrawal and the condenser loop always run.
pub fn decide(
    state: &mut ControllerState,
    sample: &ProcessSample,
    config: &ControllerConfig,
) -> TickDecision {
    let names = &config.variables;
    let mut flags = TickFlags::empty();
    let mut writes = Vec::new();
    let mut suppressed = 0;

    state.reactivity.push(sample.reactivity);
    let average_reactivity = state.reactivity.average();
    state.chemistry.observe_iodine(sample.iodine);

    // ── Mode ───────────────────────────────────────────────
    let update = state
        .mode
        .observe(sample.external_mode, sample.core_temperature);
    if let ModeUpdate::Transition { from, to } = update {
        info!(
            tick = sample.tick,
            from = from.label(),
            to = to.label(),
            "Operating mode transition"
        );
        state.reset_for_transition(sample);
        flags |= TickFlags::MODE_CHANGED;
    }
    let mode = update.mode();

    // ── Target ─────────────────────────────────────────────
    let plan = plan_target(
        &config.planner,
        sample.core_temperature,
        sample.xenon,
        sample.reactivity,
    );
    let band = in_band(&config.planner, sample.core_temperature);
    flags.set(TickFlags::EMERGENCY, plan.emergency);
    flags.set(TickFlags::POISON_BOOST, plan.poison_boost > 0.0);
    flags.set(TickFlags::UNRECOVERABLE_POISON, plan.unrecoverable_poison);
    flags.set(TickFlags::OUT_OF_BAND, !band);

    let mut summary = TickSummary {
        tick: sample.tick,
        mode,
        temperature: sample.core_temperature,
        reactivity: sample.reactivity,
        average_reactivity,
        desired_reactivity: plan.desired_reactivity,
        xenon: sample.xenon,
        boron_ppm: sample.boron_ppm,
        ..TickSummary::default()
    };

    // ── Rods ───────────────────────────────────────────────
    // Emergency withdrawal runs in every mode; normal actuation never in
    // shutdown.
    let input = RodInput {
        timestamp: sample.tick,
        desired_reactivity: plan.desired_reactivity,
        actual_reactivity: sample.reactivity,
        average_reactivity,
        in_band: band,
    };
    let rods = if plan.emergency {
        Some(emergency_withdraw(
            &mut state.rods,
            &mut state.rods_pid,
            &config.rods,
            &input,
            sample.driven_positions(),
        ))
    } else if mode != OperationMode::Shutdown {
        Some(actuate(&mut state.rods, &mut state.rods_pid, &config.rods, &input))
    } else {
        None
    };

    if let Some(rods) = rods {
        flags.set(TickFlags::ACTUATED, rods.actuated);
        for command in rods.writes() {
            writes.push(ActuatorWrite {
                name: names.bank_ordered(command.bank),
                value: command.position,
            });
        }
        suppressed = rods.suppressed();
        summary.rod_raw = Some(rods.raw);
        summary.rod_command = Some(rods.commanded);
        summary.banks_moved = rods.banks_to_move;
    }

    // ── Condenser ──────────────────────────────────────────
    let speed = condenser_speed(
        &mut state.condenser_pid,
        &config.condenser,
        sample.tick,
        sample.condenser_temperature,
        mode,
    );
    writes.push(ActuatorWrite {
        name: names.condenser_pump_ordered.clone(),
        value: speed,
    });
    summary.condenser_speed = speed;

    // ── Chemistry ──────────────────────────────────────────
    if mode != OperationMode::Shutdown {
        let input = ChemistryInput {
            timestamp: sample.tick,
            temperature: sample.core_temperature,
            reactivity: sample.reactivity,
            average_reactivity,
            desired_reactivity: plan.desired_reactivity,
            boron_ppm: sample.boron_ppm,
        };
        if let Some(chem) = decide_chemistry(
            &mut state.chemistry,
            &mut state.boron_pid,
            &config.chemistry,
            &input,
        ) {
            flags |= TickFlags::CHEMISTRY_DECIDED;
            writes.push(ActuatorWrite {
                name: names.boron_dosage_ordered.clone(),
                value: chem.dose,
            });
            writes.push(ActuatorWrite {
                name: names.boron_filter_ordered.clone(),
                value: chem.filter,
            });
            summary.boron_dose = Some(chem.dose);
            summary.boron_filter = Some(chem.filter);
            summary.chemistry_rule = Some(chem.rule);
        }
    }

    state.last_tick = sample.tick;
    summary.flags = flags;
    TickDecision {
        writes,
        suppressed,
        summary,
    }
}

// ─── Apply ──────────────────────────────────────────────────────────

/// Issue the decision's writes in order. The first failure aborts.
pub fn apply<C: ProcessChannel + ?Sized>(
    channel: &mut C,
    decision: &TickDecision,
) -> Result<(), ChannelError> {
    for write in &decision.writes {
        debug!(variable = %write.name, value = write.value, "actuator write");
        channel.write(&write.name, write.value)?;
    }
    Ok(())
}

/// Log the per-tick summary as structured fields.
pub fn log_summary(summary: &TickSummary) {
    info!(
        tick = summary.tick,
        mode = summary.mode.label(),
        temperature = summary.temperature,
        reactivity = summary.reactivity,
        avg_reactivity = summary.average_reactivity,
        desired_reactivity = summary.desired_reactivity,
        rod_command = ?summary.rod_command,
        banks_moved = summary.banks_moved,
        condenser_speed = summary.condenser_speed,
        boron_dose = ?summary.boron_dose,
        boron_filter = ?summary.boron_filter,
        emergency = summary.flags.contains(TickFlags::EMERGENCY),
        "tick"
    );
}

/// Sample, decide, apply and log one tick.
///
/// # Arguments
/// - `tick`: Counter value returned by [`wait_for_tick`].
pub fn run_tick<C: ProcessChannel + ?Sized>(
    channel: &mut C,
    state: &mut ControllerState,
    config: &ControllerConfig,
    tick: u64,
) -> Result<TickDecision, ControlError> {
    let sample = ProcessSample::read(channel, config, tick)?;
    let decision = decide(state, &sample, config);
    apply(channel, &decision)?;
    state.stats.record(&decision);
    log_summary(&decision.summary);
    Ok(decision)
}

// ─── Tests ──────────────────────────────────────────────────────────
