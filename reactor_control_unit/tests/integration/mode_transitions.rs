//! Operating mode derivation, transitions and PID re-anchoring.

use reactor_common::process::{ExternalMode, OperationMode};
use reactor_control_unit::cycle::{TickFlags, decide};
use reactor_control_unit::state::ControllerState;

use super::{Plant, bank_writes, fast_config, written};

#[test]
fn transition_reanchors_rods_pid_on_actual_positions() {
    let config = fast_config();
    let mut plant = Plant {
        temperature: 290.0,
        reactivity: 0.6,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));
    assert_eq!(state.mode.mode(), OperationMode::Startup);

    for tick in 2..8 {
        let d = decide(&mut state, &plant.sample(tick), &config);
        assert!(!d.summary.flags.contains(TickFlags::MODE_CHANGED));
    }

    plant.temperature = 305.0;
    plant.rods = vec![70.0; 9];
    let decision = decide(&mut state, &plant.sample(8), &config);

    assert!(decision.summary.flags.contains(TickFlags::MODE_CHANGED));
    assert_eq!(decision.summary.mode, OperationMode::Normal);
    // Reset and step share the tick, so the rods loop returns its seed.
    assert_eq!(decision.summary.rod_raw, Some(70.0));
    assert_eq!(state.mode.mode(), OperationMode::Normal);
}

#[test]
fn shutdown_only_drives_the_condenser() {
    let config = fast_config();
    let plant = Plant {
        mode: ExternalMode::Shutdown,
        temperature: 200.0,
        condenser_temperature: 20.0,
        pump_speed: 0.0,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));
    let decision = decide(&mut state, &plant.sample(2), &config);

    assert_eq!(decision.summary.mode, OperationMode::Shutdown);
    assert!(bank_writes(&decision, &config).is_empty());
    assert_eq!(decision.writes.len(), 1);
    assert_eq!(
        written(&decision, &config.variables.condenser_pump_ordered),
        Some(0.0)
    );
}

#[test]
fn normal_operation_keeps_minimum_circulation() {
    let config = fast_config();
    let plant = Plant {
        condenser_temperature: 20.0,
        pump_speed: 0.0,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));
    let decision = decide(&mut state, &plant.sample(2), &config);
    assert_eq!(
        written(&decision, &config.variables.condenser_pump_ordered),
        Some(config.condenser.min_speed)
    );
}

#[test]
fn entering_shutdown_is_a_transition() {
    let config = fast_config();
    let mut plant = Plant::default();
    let mut state = ControllerState::new(&config, &plant.sample(1));
    plant.mode = ExternalMode::Shutdown;
    let decision = decide(&mut state, &plant.sample(2), &config);
    assert!(decision.summary.flags.contains(TickFlags::MODE_CHANGED));
    assert_eq!(decision.summary.rod_command, None);
}

#[test]
fn temperature_noise_at_entry_point_keeps_loops_running() {
    let config = fast_config();
    let mut plant = Plant {
        temperature: 300.05,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));
    let integral_before = state.rods_pid.integral();

    let mut transitions = 0;
    for tick in 2..12 {
        plant.temperature = if tick % 2 == 0 { 299.95 } else { 300.05 };
        let decision = decide(&mut state, &plant.sample(tick), &config);
        if decision.summary.flags.contains(TickFlags::MODE_CHANGED) {
            transitions += 1;
        }
        assert_eq!(decision.summary.mode, OperationMode::Normal);
    }
    assert_eq!(transitions, 0);
    // No reset: the rods integral kept accumulating.
    assert_ne!(state.rods_pid.integral(), integral_before);
}
