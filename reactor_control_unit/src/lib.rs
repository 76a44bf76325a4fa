//! # Reactor Control Unit Library
//!
//! Tick-driven supervisory controller for a simulated nuclear reactor.
//! Each tick reads a snapshot of named process variables, computes
//! corrective actuator commands and writes them back.
//!
//! ## Control Core
//!
//! 1. **PID primitive**: clamped output, anti-windup, derivative on measurement
//! 2. **Target Planner**: temperature → desired reactivity with overrides
//! 3. **Rod Actuation Engine**: quantized, round-robin rod bank commands
//! 4. **Condenser Loop**: pump speed holding the return temperature
//! 5. **Chemistry Rule Engine**: boron dose/filter rules with PID fallback
//!
//! ## Runtime
//!
//! All cross-tick state lives in one [`state::ControllerState`] owned by the
//! tick loop. The [`supervisor::Supervisor`] discards it and starts over
//! after any channel failure.

pub mod channel;
pub mod control;
pub mod cycle;
pub mod error;
pub mod sample;
pub mod state;
pub mod supervisor;
