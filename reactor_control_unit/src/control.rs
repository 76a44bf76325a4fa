//! Control core.
//!
//! Stateless computation functions and the PID primitive they share. All
//! cross-tick state lives in [`crate::state::ControllerState`] and is passed
//! in by mutable reference.

pub mod chemistry;
pub mod condenser;
pub mod pid;
pub mod planner;
pub mod rods;
