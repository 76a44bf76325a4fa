//! Operating mode tracker.
//!
//! Persists the last derived [`OperationMode`] so a change can be reported
//! as a transition. The first observation after startup is not a
//! transition: the PIDs were just seeded from the same sample.
//!
//! Normal is entered at `normal_entry_temperature` but left only below
//! `normal_entry_temperature - hysteresis`, so temperature noise around the
//! entry point does not reset the loops every tick.

use reactor_common::control_unit::config::ModeConfig;
use reactor_common::process::{ExternalMode, OperationMode};

/// Result of observing the mode for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeUpdate {
    /// Mode unchanged.
    Steady(OperationMode),
    /// Mode changed from `from` to `to`.
    Transition {
        from: OperationMode,
        to: OperationMode,
    },
}

impl ModeUpdate {
    /// Mode in force after the update.
    #[inline]
    pub const fn mode(self) -> OperationMode {
        match self {
            Self::Steady(mode) => mode,
            Self::Transition { to, .. } => to,
        }
    }

    #[inline]
    pub const fn is_transition(self) -> bool {
        matches!(self, Self::Transition { .. })
    }
}

/// Last derived operating mode.
#[derive(Debug, Clone)]
pub struct ModeTracker {
    mode: OperationMode,
    config: ModeConfig,
}

impl ModeTracker {
    /// Start in `initial` (derived from the startup sample).
    pub const fn new(initial: OperationMode, config: ModeConfig) -> Self {
        Self {
            mode: initial,
            config,
        }
    }

    #[inline]
    pub const fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Derive this tick's mode and record it.
    pub fn observe(&mut self, external: ExternalMode, temperature: f64) -> ModeUpdate {
        let mut next =
            OperationMode::derive(external, temperature, self.config.normal_entry_temperature);
        if self.mode == OperationMode::Normal
            && next == OperationMode::Startup
            && temperature >= self.config.normal_exit_temperature()
        {
            next = OperationMode::Normal;
        }
        if next == self.mode {
            return ModeUpdate::Steady(next);
        }
        let from = self.mode;
        self.mode = next;
        ModeUpdate::Transition { from, to: next }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
