//! Boron chemistry through the full decision pipeline.

use reactor_control_unit::control::chemistry::ChemistryRule;
use reactor_control_unit::cycle::{TickFlags, decide};
use reactor_control_unit::state::ControllerState;

use super::{Plant, fast_config, written};

#[test]
fn over_concentration_always_filters_at_max_rate() {
    let config = fast_config();
    let dose = config.variables.boron_dosage_ordered.clone();
    let filter = config.variables.boron_filter_ordered.clone();

    for (temperature, reactivity, iodine) in [
        (250.0, -0.4, 0.0),
        (322.5, 0.10, 3.0),
        (330.0, 0.80, 9.0),
        (290.0, 0.00, 2.0),
    ] {
        let plant = Plant {
            temperature,
            reactivity,
            iodine,
            boron_ppm: 5200.0,
            ..Plant::default()
        };
        let mut state = ControllerState::new(&config, &plant.sample(1));
        let decision = decide(&mut state, &plant.sample(2), &config);

        assert_eq!(written(&decision, &dose), Some(0.0));
        assert_eq!(written(&decision, &filter), Some(50.0));
        assert_eq!(decision.summary.chemistry_rule, Some(ChemistryRule::HardCeiling));
    }
}

#[test]
fn fallback_pid_splits_sign_into_filter() {
    let mut config = fast_config();
    config.pid.boron.ki = 0.0;
    let plant = Plant {
        temperature: 322.5,
        reactivity: 0.0385,
        boron_ppm: 3341.2,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));
    let decision = decide(&mut state, &plant.sample(2), &config);

    assert_eq!(decision.summary.chemistry_rule, Some(ChemistryRule::Pid));
    let dose = written(&decision, &config.variables.boron_dosage_ordered).unwrap();
    let filter = written(&decision, &config.variables.boron_filter_ordered).unwrap();
    assert_eq!(dose, 0.0);
    assert!((filter - 1.23).abs() < 1e-9, "filter {filter}");
}

#[test]
fn chemistry_writes_follow_cooldown() {
    let config = fast_config();
    let plant = Plant::default();
    let mut state = ControllerState::new(&config, &plant.sample(1));

    let decided: Vec<u64> = (2..14)
        .filter(|&tick| {
            decide(&mut state, &plant.sample(tick), &config)
                .summary
                .flags
                .contains(TickFlags::CHEMISTRY_DECIDED)
        })
        .collect();
    assert_eq!(decided, vec![2, 7, 12]);
}

#[test]
fn sustained_iodine_triggers_dosing() {
    let mut config = fast_config();
    config.chemistry.cooldown_ticks = 1;
    let mut plant = Plant {
        temperature: 322.5,
        iodine: 0.2,
        boron_ppm: 3000.0,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));
    for tick in 2..12 {
        decide(&mut state, &plant.sample(tick), &config);
    }

    // One spike is smoothed away by the moving average.
    plant.iodine = 3.0;
    let spike = decide(&mut state, &plant.sample(12), &config);
    assert_ne!(spike.summary.chemistry_rule, Some(ChemistryRule::IodineDosing));

    let mut last = None;
    for tick in 13..30 {
        last = Some(decide(&mut state, &plant.sample(tick), &config));
    }
    let decision = last.unwrap();
    assert_eq!(decision.summary.chemistry_rule, Some(ChemistryRule::IodineDosing));
    let dose = written(&decision, &config.variables.boron_dosage_ordered).unwrap();
    assert!(dose > 0.0 && dose <= 50.0);
    assert_eq!(
        written(&decision, &config.variables.boron_filter_ordered),
        Some(0.0)
    );
}

#[test]
fn cold_subcritical_core_purges_boron() {
    let config = fast_config();
    let plant = Plant {
        temperature: 150.0,
        reactivity: -0.05,
        ..Plant::default()
    };
    let mut state = ControllerState::new(&config, &plant.sample(1));
    let decision = decide(&mut state, &plant.sample(2), &config);
    assert_eq!(decision.summary.chemistry_rule, Some(ChemistryRule::ColdPurge));
    assert_eq!(
        written(&decision, &config.variables.boron_filter_ordered),
        Some(50.0)
    );
}
