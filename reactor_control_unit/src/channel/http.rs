//! HTTP channel to the simulator's variable endpoint.
//!
//! - Read: `GET {base_url}?variable=NAME`, value returned as plain text.
//! - Write: `POST {base_url}?variable=NAME&value=V`.
//!
//! Every request carries the configured deadline.

use std::time::Duration;

use reactor_common::control_unit::config::ChannelConfig;
use reqwest::blocking::Client;
use tracing::debug;

use super::{ChannelError, ProcessChannel};

/// Blocking HTTP implementation of [`ProcessChannel`].
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: Client,
    base_url: String,
}

impl HttpChannel {
    /// Build a client with the configured per-request deadline.
    pub fn new(config: &ChannelConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ChannelError::Unavailable {
                name: config.base_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map a transport error onto the channel's error kinds.
fn transport_error(name: &str, err: reqwest::Error) -> ChannelError {
    if err.is_timeout() {
        ChannelError::Timeout {
            name: name.to_string(),
        }
    } else {
        ChannelError::Unavailable {
            name: name.to_string(),
            reason: err.to_string(),
        }
    }
}

impl ProcessChannel for HttpChannel {
    fn read_raw(&mut self, name: &str) -> Result<String, ChannelError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("variable", name)])
            .send()
            .map_err(|e| transport_error(name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Unavailable {
                name: name.to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        response.text().map_err(|e| transport_error(name, e))
    }

    fn write(&mut self, name: &str, value: f64) -> Result<(), ChannelError> {
        let value_text = value.to_string();
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("variable", name), ("value", value_text.as_str())])
            .send()
            .map_err(|e| transport_error(name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::WriteRejected {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(variable = name, value, "write accepted");
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
