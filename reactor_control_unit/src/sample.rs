//! Per-tick process snapshot.
//!
//! Every variable is read exactly once per tick and frozen into a
//! [`ProcessSample`] that all decision components receive by reference.
//! The tick counter is not re-read here: the tick wait already read it
//! fresh and passes it in.

use heapless::Vec;
use reactor_common::consts::MAX_SAMPLED_BANKS;
use reactor_common::control_unit::config::ControllerConfig;
use reactor_common::process::ExternalMode;

use crate::channel::{ChannelError, ProcessChannel};
use crate::control::rods::{driven_banks, mean_position};

/// Immutable snapshot of the plant for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    /// Tick counter (one unit per in-simulation minute).
    pub tick: u64,
    /// Core temperature [°C].
    pub core_temperature: f64,
    /// Signed criticality (0 = critical).
    pub reactivity: f64,
    /// Cumulative xenon level.
    pub xenon: f64,
    /// Iodine generation level.
    pub iodine: f64,
    /// Condenser return temperature [°C].
    pub condenser_temperature: f64,
    /// Current condenser circulation pump speed [%].
    pub condenser_pump_speed: f64,
    /// Boron concentration [PPM].
    pub boron_ppm: f64,
    /// External operating-mode signal.
    pub external_mode: ExternalMode,
    /// Actual rod bank positions [%], one per sampled bank.
    pub rod_positions: Vec<f64, MAX_SAMPLED_BANKS>,
}

impl ProcessSample {
    /// Read one snapshot from `channel`.
    ///
    /// # Arguments
    /// - `channel`: Process variable channel.
    /// - `config`: Variable names and bank count.
    /// - `tick`: Tick counter observed by the tick wait.
    ///
    /// # Errors
    /// The first channel failure aborts the snapshot.
    pub fn read<C: ProcessChannel + ?Sized>(
        channel: &mut C,
        config: &ControllerConfig,
        tick: u64,
    ) -> Result<Self, ChannelError> {
        let names = &config.variables;

        let mut rod_positions = Vec::new();
        for bank in 0..config.rods.bank_count.min(MAX_SAMPLED_BANKS) {
            let position = channel.read_f64(&names.bank_actual(bank))?;
            // Cannot fail: the loop is bounded by the capacity.
            let _ = rod_positions.push(position);
        }

        Ok(Self {
            tick,
            core_temperature: channel.read_f64(&names.core_temperature)?,
            reactivity: channel.read_f64(&names.reactivity)?,
            xenon: channel.read_f64(&names.xenon)?,
            iodine: channel.read_f64(&names.iodine)?,
            condenser_temperature: channel.read_f64(&names.condenser_temperature)?,
            condenser_pump_speed: channel.read_f64(&names.condenser_pump_speed)?,
            boron_ppm: channel.read_f64(&names.boron_ppm)?,
            external_mode: channel.read_mode(&names.operation_mode)?,
            rod_positions,
        })
    }

    /// Positions of the banks the controller drives (at most 9).
    pub fn driven_positions(&self) -> &[f64] {
        &self.rod_positions[..driven_banks(self.rod_positions.len())]
    }

    /// Mean actual position of the driven banks.
    pub fn mean_driven_position(&self) -> f64 {
        mean_position(self.driven_positions())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
