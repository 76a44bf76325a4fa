//! Restart supervisor around the tick loop.
//!
//! Each controller run starts from scratch: wait for a tick, read a
//! sample, seed a fresh [`ControllerState`] and process that sample, then
//! loop over subsequent ticks. A tick-fatal error discards the state, waits
//! `restart_delay_ms` and starts over. Clearing the running flag ends the
//! loop cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use reactor_common::control_unit::config::ControllerConfig;
use tracing::{info, warn};

use crate::channel::ProcessChannel;
use crate::cycle::{TickStats, apply, decide, log_summary, run_tick, wait_for_tick};
use crate::error::ControlError;
use crate::sample::ProcessSample;
use crate::state::ControllerState;

/// Granularity of the interruptible restart delay.
const RESTART_SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Restart loop owning the lifetime counters.
#[derive(Debug, Default)]
pub struct Supervisor {
    restarts: u64,
    /// Stop after this many ticks per controller run (`--once`).
    tick_limit: Option<u64>,
    /// Counters accumulated over every controller run.
    stats: TickStats,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop cleanly after `ticks` processed ticks.
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    /// Number of restarts after tick-fatal errors.
    #[inline]
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Counters accumulated over every controller run.
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Run the controller until shutdown or a non-recoverable error.
    ///
    /// # Errors
    /// Only errors that are not tick-fatal (configuration) are returned.
    pub fn run<C: ProcessChannel + ?Sized>(
        &mut self,
        channel: &mut C,
        config: &ControllerConfig,
        running: &AtomicBool,
    ) -> Result<(), ControlError> {
        config.validate()?;
        let restart_delay = Duration::from_millis(config.supervisor.restart_delay_ms);

        loop {
            let mut stats = TickStats::default();
            let outcome = self.run_controller(channel, config, running, &mut stats);
            self.stats.absorb(&stats);

            match outcome {
                Ok(()) | Err(ControlError::Shutdown) => {
                    info!(
                        ticks = self.stats.ticks,
                        restarts = self.restarts,
                        "Controller stopped"
                    );
                    return Ok(());
                }
                Err(e) if e.is_tick_fatal() => {
                    self.restarts += 1;
                    warn!(
                        kind = e.kind(),
                        error = %e,
                        delay_ms = config.supervisor.restart_delay_ms,
                        restarts = self.restarts,
                        "Controller failed, restarting"
                    );
                    if !sleep_while_running(restart_delay, running) {
                        return Ok(());
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One controller lifetime: startup sequence then the tick loop.
    fn run_controller<C: ProcessChannel + ?Sized>(
        &self,
        channel: &mut C,
        config: &ControllerConfig,
        running: &AtomicBool,
        stats: &mut TickStats,
    ) -> Result<(), ControlError> {
        let poll = Duration::from_millis(config.channel.poll_interval_ms);
        let tick_variable = config.variables.tick.as_str();

        // ── Startup ────────────────────────────────────────────
        let tick = wait_for_tick(channel, tick_variable, None, poll, running)?;
        let sample = ProcessSample::read(channel, config, tick)?;
        let mut state = ControllerState::new(config, &sample);
        info!(
            tick,
            mode = state.mode.mode().label(),
            rod_seed = state.rods.last_applied(),
            banks = sample.rod_positions.len(),
            "Controller started"
        );

        let decision = decide(&mut state, &sample, config);
        let outcome = apply(channel, &decision);
        if outcome.is_ok() {
            state.stats.record(&decision);
            log_summary(&decision.summary);
        }
        *stats = state.stats.clone();
        outcome?;

        // ── Tick loop ──────────────────────────────────────────
        loop {
            if self.tick_limit.is_some_and(|limit| state.stats.ticks >= limit) {
                return Ok(());
            }
            let tick = wait_for_tick(channel, tick_variable, Some(state.last_tick), poll, running)?;
            let outcome = run_tick(channel, &mut state, config, tick);
            *stats = state.stats.clone();
            outcome?;
        }
    }
}

/// Sleep for `delay` in slices, returning `false` early if `running` is
/// cleared.
fn sleep_while_running(delay: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep((deadline - now).min(RESTART_SLEEP_SLICE));
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
