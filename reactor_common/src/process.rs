//! Operating modes and process-variable names.
//!
//! The controller addresses the plant through a flat namespace of named
//! variables. Every name is configurable; the defaults below match the
//! simulator's built-in web interface.

use serde::{Deserialize, Serialize};

// ─── Operating Mode ─────────────────────────────────────────────────

/// Mode reported by the plant's external mode signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExternalMode {
    /// Reactor is being (or has been) shut down.
    Shutdown = 0,
    /// Reactor is heating up toward operating temperature.
    Startup = 1,
    /// Steady operation.
    Normal = 2,
}

impl ExternalMode {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Shutdown),
            1 => Some(Self::Startup),
            2 => Some(Self::Normal),
            _ => None,
        }
    }

    /// Parse the textual signal value (`SHUTDOWN`/`STARTUP`/`NORMAL`,
    /// case-insensitive, or the numeric codes `0`/`1`/`2`).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_u8(code);
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "SHUTDOWN" => Some(Self::Shutdown),
            "STARTUP" => Some(Self::Startup),
            "NORMAL" => Some(Self::Normal),
            _ => None,
        }
    }
}

/// Operating mode used by the controller, derived from the external signal
/// and core temperature. Persisted across ticks to detect transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum OperationMode {
    /// No rod or chemistry actuation.
    #[default]
    Shutdown = 0,
    /// Core below operating temperature.
    Startup = 1,
    /// Core at operating temperature.
    Normal = 2,
}

impl OperationMode {
    /// Derive the controller mode.
    ///
    /// A `Shutdown` signal always wins; otherwise the core temperature decides
    /// between `Startup` (below `normal_entry_temperature`) and `Normal`.
    pub fn derive(external: ExternalMode, temperature: f64, normal_entry_temperature: f64) -> Self {
        match external {
            ExternalMode::Shutdown => Self::Shutdown,
            ExternalMode::Startup | ExternalMode::Normal => {
                if temperature < normal_entry_temperature {
                    Self::Startup
                } else {
                    Self::Normal
                }
            }
        }
    }

    /// Short uppercase label for summaries.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Shutdown => "SHUTDOWN",
            Self::Startup => "STARTUP",
            Self::Normal => "NORMAL",
        }
    }
}

// ─── Variable Names ─────────────────────────────────────────────────

/// Placeholder replaced by the zero-based bank index in bank templates.
pub const BANK_PLACEHOLDER: &str = "{i}";

/// Names of every process variable the controller reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableNames {
    /// Tick counter (advances once per in-simulation minute).
    pub tick: String,
    pub core_temperature: String,
    pub reactivity: String,
    pub xenon: String,
    pub iodine: String,
    pub condenser_temperature: String,
    pub condenser_pump_speed: String,
    pub boron_ppm: String,
    pub operation_mode: String,
    /// Template for the per-bank actual position (read).
    pub rod_bank_actual: String,
    /// Template for the per-bank ordered position (write).
    pub rod_bank_ordered: String,
    pub condenser_pump_ordered: String,
    pub boron_dosage_ordered: String,
    pub boron_filter_ordered: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            tick: "TIME_STAMP".to_string(),
            core_temperature: "CORE_TEMP".to_string(),
            reactivity: "CORE_STATE_CRITICALITY".to_string(),
            xenon: "CORE_XENON_CUMULATIVE".to_string(),
            iodine: "CORE_IODINE_GENERATION".to_string(),
            condenser_temperature: "CONDENSER_TEMPERATURE".to_string(),
            condenser_pump_speed: "CONDENSER_CIRCULATION_PUMP_SPEED".to_string(),
            boron_ppm: "CHEM_BORON_PPM".to_string(),
            operation_mode: "CORE_OPERATION_MODE".to_string(),
            rod_bank_actual: "ROD_BANK_POS_{i}_ACTUAL".to_string(),
            rod_bank_ordered: "ROD_BANK_POS_{i}_ORDERED".to_string(),
            condenser_pump_ordered: "CONDENSER_CIRCULATION_PUMP_ORDERED_SPEED".to_string(),
            boron_dosage_ordered: "CHEM_BORON_DOSAGE_ORDERED_RATE".to_string(),
            boron_filter_ordered: "CHEM_BORON_FILTER_ORDERED_SPEED".to_string(),
        }
    }
}

impl VariableNames {
    /// Actual-position variable for bank `index`.
    pub fn bank_actual(&self, index: usize) -> String {
        self.rod_bank_actual
            .replace(BANK_PLACEHOLDER, &index.to_string())
    }

    /// Ordered-position variable for bank `index`.
    pub fn bank_ordered(&self, index: usize) -> String {
        self.rod_bank_ordered
            .replace(BANK_PLACEHOLDER, &index.to_string())
    }

    /// Names that must be non-empty, paired with their field names.
    pub fn entries(&self) -> [(&'static str, &str); 14] {
        [
            ("tick", &self.tick),
            ("core_temperature", &self.core_temperature),
            ("reactivity", &self.reactivity),
            ("xenon", &self.xenon),
            ("iodine", &self.iodine),
            ("condenser_temperature", &self.condenser_temperature),
            ("condenser_pump_speed", &self.condenser_pump_speed),
            ("boron_ppm", &self.boron_ppm),
            ("operation_mode", &self.operation_mode),
            ("rod_bank_actual", &self.rod_bank_actual),
            ("rod_bank_ordered", &self.rod_bank_ordered),
            ("condenser_pump_ordered", &self.condenser_pump_ordered),
            ("boron_dosage_ordered", &self.boron_dosage_ordered),
            ("boron_filter_ordered", &self.boron_filter_ordered),
        ]
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
