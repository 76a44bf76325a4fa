//! Tolerance-gated actuation and chatter suppression.

use reactor_control_unit::cycle::{TickFlags, decide};
use reactor_control_unit::state::ControllerState;

use super::{Plant, bank_writes, fast_config};

#[test]
fn in_band_small_deviation_writes_no_bank() {
    let config = fast_config();
    let plant = Plant {
        temperature: 322.5,
        reactivity: 0.08,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(100));
    let applied_before = state.rods.last_applied();

    let decision = decide(&mut state, &plant.sample(101), &config);

    assert!(bank_writes(&decision, &config).is_empty());
    assert!(!decision.summary.flags.contains(TickFlags::ACTUATED));
    assert!(!decision.summary.flags.contains(TickFlags::OUT_OF_BAND));
    assert_eq!(state.rods.cursor(), 0);
    assert_eq!(state.rods.last_applied(), applied_before);
    assert_eq!(state.rods.accumulator(), 0.0);
}

#[test]
fn steady_pid_output_never_rewrites_banks() {
    let config = fast_config();
    // Above the band with zero reactivity: the gate is open but the
    // reactivity error is zero, so the PID output stays at the seed.
    let plant = Plant {
        temperature: 340.0,
        reactivity: 0.0,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));

    for tick in 2..20 {
        let decision = decide(&mut state, &plant.sample(tick), &config);
        assert!(decision.summary.flags.contains(TickFlags::ACTUATED));
        assert!(bank_writes(&decision, &config).is_empty(), "tick {tick}");
        assert_eq!(decision.summary.rod_command, Some(50.0));
    }
}

#[test]
fn large_excursion_moves_several_banks_round_robin() {
    let config = fast_config();
    let plant = Plant {
        temperature: 322.5,
        reactivity: 1.5,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));

    let first = decide(&mut state, &plant.sample(2), &config);
    let banks = bank_writes(&first, &config);
    assert_eq!(banks.len(), 2);
    let indices: Vec<usize> = banks.iter().map(|(i, _)| *i).collect();
    let expected: Vec<usize> = (0..indices.len()).collect();
    assert_eq!(indices, expected);
    for (_, position) in banks {
        assert!((10.0..=100.0).contains(&position));
        assert!(position > 50.0, "excess reactivity must insert rods");
    }
}
