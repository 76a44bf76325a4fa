//! Workspace-wide constants for the reactor controller.
//!
//! Single source of truth for all numeric limits and default paths.

use static_assertions::const_assert;

/// Maximum number of rod banks the controller actuates.
pub const MAX_DRIVEN_BANKS: usize = 9;

/// Maximum number of rod banks that can be sampled per tick.
pub const MAX_SAMPLED_BANKS: usize = 16;

/// Hard floor for commanded rod positions [%].
pub const ROD_POSITION_MIN: f64 = 10.0;

/// Ceiling for commanded rod positions [%].
pub const ROD_POSITION_MAX: f64 = 100.0;

/// Number of reactivity samples averaged by the rod engine.
pub const REACTIVITY_HISTORY_LEN: usize = 3;

/// Storage ceiling for the iodine moving average.
pub const IODINE_HISTORY_MAX: usize = 64;

/// Ceiling for boron dosage and filter rates.
pub const BORON_RATE_MAX: f64 = 50.0;

/// Condenser pump speed range [%].
pub const PUMP_SPEED_MIN: f64 = 0.0;
pub const PUMP_SPEED_MAX: f64 = 100.0;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/reactor.toml";

/// Default service name reported in logs.
pub const DEFAULT_SERVICE_NAME: &str = "reactor_control_unit";

const_assert!(MAX_DRIVEN_BANKS <= MAX_SAMPLED_BANKS);
const_assert!(REACTIVITY_HISTORY_LEN <= IODINE_HISTORY_MAX);
