//! Control unit shared types.
//!
//! Configuration structures consumed by the supervisory controller, kept
//! here so tooling can load and validate a controller config without
//! linking the control core.

pub mod config;
