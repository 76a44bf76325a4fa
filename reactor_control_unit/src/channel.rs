//! Process Variable Channel.
//!
//! The plant is addressed through a flat namespace of named variables.
//! Implementations provide raw string reads and numeric writes; typed reads
//! are provided on top so the control core never parses payloads itself.
//!
//! - [`http::HttpChannel`]: the simulator's web endpoint.
//! - [`memory::MemoryChannel`]: in-process table for tests and dry runs.

pub mod http;
pub mod memory;

use reactor_common::process::ExternalMode;

/// Channel failure. Every kind is tick-fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    /// Request exceeded its deadline.
    #[error("reading {name} timed out")]
    Timeout { name: String },

    /// Endpoint unreachable or refused the request.
    #[error("{name} unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    /// Remote end reported failure on write.
    #[error("write of {name} rejected (status {status})")]
    WriteRejected { name: String, status: u16 },

    /// Payload could not be parsed into the expected type.
    #[error("malformed payload for {name}: {payload:?}")]
    ParseFailure { name: String, payload: String },
}

impl ChannelError {
    /// Short kind label for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Unavailable { .. } => "unavailable",
            Self::WriteRejected { .. } => "write_rejected",
            Self::ParseFailure { .. } => "parse_failure",
        }
    }
}

fn parse_failure(name: &str, payload: &str) -> ChannelError {
    ChannelError::ParseFailure {
        name: name.to_string(),
        payload: payload.to_string(),
    }
}

/// Parse a numeric payload; surrounding whitespace and a decimal comma are
/// accepted.
pub fn parse_number(name: &str, payload: &str) -> Result<f64, ChannelError> {
    let normalized = payload.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(parse_failure(name, payload)),
    }
}

/// Named-variable access to the plant.
pub trait ProcessChannel {
    /// Read the raw payload of `name`.
    fn read_raw(&mut self, name: &str) -> Result<String, ChannelError>;

    /// Write `value` to `name`.
    fn write(&mut self, name: &str, value: f64) -> Result<(), ChannelError>;

    /// Read a floating-point variable.
    fn read_f64(&mut self, name: &str) -> Result<f64, ChannelError> {
        let payload = self.read_raw(name)?;
        parse_number(name, &payload)
    }

    /// Read a non-negative integer variable. Integral floats (`"42.0"`) are
    /// accepted.
    fn read_u64(&mut self, name: &str) -> Result<u64, ChannelError> {
        let payload = self.read_raw(name)?;
        if let Ok(value) = payload.trim().parse::<u64>() {
            return Ok(value);
        }
        let value = parse_number(name, &payload)?;
        if value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
            return Err(parse_failure(name, &payload));
        }
        Ok(value as u64)
    }

    /// Read a string variable, trimmed.
    fn read_string(&mut self, name: &str) -> Result<String, ChannelError> {
        Ok(self.read_raw(name)?.trim().to_string())
    }

    /// Read the external operating-mode signal.
    fn read_mode(&mut self, name: &str) -> Result<ExternalMode, ChannelError> {
        let payload = self.read_raw(name)?;
        ExternalMode::parse(&payload).ok_or_else(|| parse_failure(name, &payload))
    }
}

impl<C: ProcessChannel + ?Sized> ProcessChannel for &mut C {
    fn read_raw(&mut self, name: &str) -> Result<String, ChannelError> {
        (**self).read_raw(name)
    }

    fn write(&mut self, name: &str, value: f64) -> Result<(), ChannelError> {
        (**self).write(name, value)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
