//! Controller error classification.
//!
//! Channel failures abort the current tick and restart the controller from
//! its startup sequence. Configuration failures end the process.

use reactor_common::config::ConfigError;

use crate::channel::ChannelError;

/// Error returned by the tick loop and the supervisor.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// Process variable channel failure.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The running flag was cleared.
    #[error("shutdown requested")]
    Shutdown,
}

impl ControlError {
    /// Tick-fatal errors are recovered by restarting the controller.
    pub const fn is_tick_fatal(&self) -> bool {
        matches!(self, Self::Channel(_))
    }

    /// Short kind label for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Channel(e) => e.kind(),
            Self::Config(_) => "config",
            Self::Shutdown => "shutdown",
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
