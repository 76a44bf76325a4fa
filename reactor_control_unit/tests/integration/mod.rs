//! Shared plant fixtures for the integration scenarios.

mod chemistry;
mod emergency;
mod mode_transitions;
mod restart;
mod stable_band;

use heapless::Vec as HVec;
use reactor_common::control_unit::config::ControllerConfig;
use reactor_common::process::ExternalMode;
use reactor_control_unit::channel::memory::MemoryChannel;
use reactor_control_unit::cycle::TickDecision;
use reactor_control_unit::sample::ProcessSample;

/// Plant conditions for one tick.
#[derive(Debug, Clone)]
pub struct Plant {
    pub temperature: f64,
    pub reactivity: f64,
    pub xenon: f64,
    pub iodine: f64,
    pub condenser_temperature: f64,
    pub pump_speed: f64,
    pub boron_ppm: f64,
    pub mode: ExternalMode,
    pub rods: Vec<f64>,
}

impl Default for Plant {
    fn default() -> Self {
        Self {
            temperature: 322.5,
            reactivity: 0.10,
            xenon: 10.0,
            iodine: 0.5,
            condenser_temperature: 65.0,
            pump_speed: 30.0,
            boron_ppm: 2000.0,
            mode: ExternalMode::Normal,
            rods: vec![50.0; 9],
        }
    }
}

impl Plant {
    /// Snapshot as the sampler would produce it at `tick`.
    pub fn sample(&self, tick: u64) -> ProcessSample {
        let mut rod_positions = HVec::new();
        for &p in &self.rods {
            rod_positions.push(p).unwrap();
        }
        ProcessSample {
            tick,
            core_temperature: self.temperature,
            reactivity: self.reactivity,
            xenon: self.xenon,
            iodine: self.iodine,
            condenser_temperature: self.condenser_temperature,
            condenser_pump_speed: self.pump_speed,
            boron_ppm: self.boron_ppm,
            external_mode: self.mode,
            rod_positions,
        }
    }

    /// Publish every variable on `channel`.
    pub fn publish(&self, channel: &mut MemoryChannel, config: &ControllerConfig) {
        let n = &config.variables;
        channel.set(&n.core_temperature, self.temperature);
        channel.set(&n.reactivity, self.reactivity);
        channel.set(&n.xenon, self.xenon);
        channel.set(&n.iodine, self.iodine);
        channel.set(&n.condenser_temperature, self.condenser_temperature);
        channel.set(&n.condenser_pump_speed, self.pump_speed);
        channel.set(&n.boron_ppm, self.boron_ppm);
        channel.set(&n.operation_mode, self.mode as u8);
        for (i, p) in self.rods.iter().enumerate() {
            channel.set(&n.bank_actual(i), p);
        }
    }
}

/// Config with fast polling and no restart delay.
pub fn fast_config() -> ControllerConfig {
    let mut config = ControllerConfig::default();
    config.channel.poll_interval_ms = 10;
    config.supervisor.restart_delay_ms = 0;
    config
}

/// Bank writes of `decision` as `(bank, position)`.
pub fn bank_writes(decision: &TickDecision, config: &ControllerConfig) -> Vec<(usize, f64)> {
    decision
        .writes
        .iter()
        .filter_map(|w| {
            (0..config.rods.bank_count)
                .find(|&i| config.variables.bank_ordered(i) == w.name)
                .map(|i| (i, w.value))
        })
        .collect()
}

/// Value written to `name` by `decision`.
pub fn written(decision: &TickDecision, name: &str) -> Option<f64> {
    decision
        .writes
        .iter()
        .find(|w| w.name == name)
        .map(|w| w.value)
}
