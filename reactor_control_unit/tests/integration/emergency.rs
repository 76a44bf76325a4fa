//! Xenon-poisoned cold core: emergency override and uniform withdrawal.

use reactor_common::process::{ExternalMode, OperationMode};
use reactor_control_unit::cycle::{TickFlags, decide};
use reactor_control_unit::state::ControllerState;

use super::{Plant, bank_writes, fast_config};

fn poisoned(rods: Vec<f64>) -> Plant {
    Plant {
        temperature: 295.0,
        xenon: 65.0,
        reactivity: -0.2,
        rods,
        ..Plant::default()
    }
}

#[test]
fn emergency_forces_target_and_withdraws_every_bank() {
    let config = fast_config();
    let rods = vec![80.0, 60.0, 45.5, 30.0, 20.0, 12.0, 10.5, 10.2, 10.0];
    let plant = poisoned(rods.clone());
    let mut state = ControllerState::new(&config, &plant.sample(1));

    let decision = decide(&mut state, &plant.sample(2), &config);

    assert!(decision.summary.flags.contains(TickFlags::EMERGENCY));
    assert_eq!(decision.summary.desired_reactivity, 1.0);

    let writes = bank_writes(&decision, &config);
    for (bank, actual) in rods.iter().enumerate() {
        let expected = (actual - 1.0).max(10.0);
        match writes.iter().find(|(i, _)| *i == bank) {
            Some((_, position)) => assert_eq!(*position, expected, "bank {bank}"),
            // Only a bank already at its target may be skipped.
            None => assert_eq!(*actual, expected, "bank {bank}"),
        }
    }
    assert_eq!(writes.len(), 8);
}

#[test]
fn emergency_withdraws_while_plant_reports_shutdown() {
    let config = fast_config();
    let plant = Plant {
        mode: ExternalMode::Shutdown,
        ..poisoned(vec![50.0; 9])
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));

    let decision = decide(&mut state, &plant.sample(2), &config);

    assert_eq!(decision.summary.mode, OperationMode::Shutdown);
    assert!(decision.summary.flags.contains(TickFlags::EMERGENCY));
    let writes = bank_writes(&decision, &config);
    assert_eq!(writes.len(), 9);
    assert!(writes.iter().all(|&(_, position)| position == 49.0));
    // Chemistry stays idle in shutdown.
    assert_eq!(decision.summary.chemistry_rule, None);
}

#[test]
fn emergency_never_commands_below_floor() {
    let config = fast_config();
    let mut plant = poisoned(vec![12.0; 9]);
    let mut state = ControllerState::new(&config, &plant.sample(1));

    for tick in 2..10 {
        let decision = decide(&mut state, &plant.sample(tick), &config);
        for (_, position) in bank_writes(&decision, &config) {
            assert!(position >= 10.0);
        }
        // The plant follows the command.
        for p in plant.rods.iter_mut() {
            *p = (*p - 1.0).max(10.0);
        }
    }
    assert!(plant.rods.iter().all(|&p| p == 10.0));
}

#[test]
fn emergency_clears_once_reactivity_recovers() {
    let config = fast_config();
    let mut plant = poisoned(vec![50.0; 9]);
    let mut state = ControllerState::new(&config, &plant.sample(1));
    assert!(
        decide(&mut state, &plant.sample(2), &config)
            .summary
            .flags
            .contains(TickFlags::EMERGENCY)
    );

    plant.reactivity = 0.05;
    let decision = decide(&mut state, &plant.sample(3), &config);
    assert!(!decision.summary.flags.contains(TickFlags::EMERGENCY));
    // Cold-core slope (+0.5) and full poison boost (+0.5) on the 0.10 target.
    assert!((decision.summary.desired_reactivity - 1.1).abs() < 1e-9);
}
