//! Prelude module for common re-exports.
//!
//! ```rust
//! use reactor_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::control_unit::config::{ControllerConfig, PidConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_DRIVEN_BANKS, MAX_SAMPLED_BANKS, ROD_POSITION_MAX, ROD_POSITION_MIN};

// ─── Process ────────────────────────────────────────────────────────
pub use crate::process::{ExternalMode, OperationMode, VariableNames};
