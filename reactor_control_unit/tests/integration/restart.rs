//! Supervisor behaviour over the full pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use reactor_control_unit::channel::memory::MemoryChannel;
use reactor_control_unit::supervisor::Supervisor;

use super::{Plant, fast_config};

#[test]
fn single_tick_run_writes_actuators() {
    let config = fast_config();
    let mut ch = MemoryChannel::new();
    Plant::default().publish(&mut ch, &config);
    ch.set(&config.variables.tick, 1440);
    let running = AtomicBool::new(true);

    let mut supervisor = Supervisor::new().with_tick_limit(1);
    supervisor.run(&mut ch, &config, &running).unwrap();

    assert_eq!(supervisor.stats().ticks, 1);
    assert!(ch.last_written(&config.variables.condenser_pump_ordered).is_some());
    assert!(ch.last_written(&config.variables.boron_dosage_ordered).is_some());
    assert!(ch.last_written(&config.variables.boron_filter_ordered).is_some());
}

#[test]
fn malformed_payload_restarts_from_fresh_sample() {
    let config = fast_config();
    let mut ch = MemoryChannel::new();
    Plant::default().publish(&mut ch, &config);
    ch.script(&config.variables.tick, [10, 11, 12]);
    ch.script(&config.variables.bank_actual(3), ["fifty", "50"]);
    let running = AtomicBool::new(true);

    let mut supervisor = Supervisor::new().with_tick_limit(2);
    supervisor.run(&mut ch, &config, &running).unwrap();

    assert_eq!(supervisor.restarts(), 1);
    assert_eq!(supervisor.stats().ticks, 2);
}

#[test]
fn rejected_writes_restart_until_shutdown() {
    let config = fast_config();
    let mut ch = MemoryChannel::new();
    Plant::default().publish(&mut ch, &config);
    ch.set(&config.variables.tick, 1);
    ch.reject_writes(&config.variables.condenser_pump_ordered);

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        flag.store(false, Ordering::SeqCst);
    });

    let mut supervisor = Supervisor::new();
    supervisor.run(&mut ch, &config, &running).unwrap();
    stopper.join().unwrap();

    assert!(supervisor.restarts() >= 1);
    assert_eq!(supervisor.stats().ticks, 0);
}

#[test]
fn unreachable_variable_keeps_retrying() {
    let mut config = fast_config();
    config.supervisor.restart_delay_ms = 20;
    let mut ch = MemoryChannel::new();
    Plant::default().publish(&mut ch, &config);
    // Tick variable never published.

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        flag.store(false, Ordering::SeqCst);
    });

    let mut supervisor = Supervisor::new();
    supervisor.run(&mut ch, &config, &running).unwrap();
    stopper.join().unwrap();

    assert!(supervisor.restarts() >= 2);
    assert!(ch.writes().is_empty());
}
