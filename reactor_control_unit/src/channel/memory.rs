//! In-process channel backed by a value table.
//!
//! Used by tests and dry runs. Writes are recorded in order; a written value
//! does not feed back into the readable table (the plant decides what the
//! actual positions become). Per-variable scripts let a test feed a
//! sequence of payloads, e.g. an advancing tick counter.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{ChannelError, ProcessChannel};

/// Table-backed [`ProcessChannel`].
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    values: HashMap<String, String>,
    scripts: HashMap<String, VecDeque<String>>,
    rejected: HashSet<String>,
    writes: Vec<(String, f64)>,
    reads: HashMap<String, usize>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the payload returned for `name`.
    pub fn set(&mut self, name: &str, payload: impl ToString) {
        self.values.insert(name.to_string(), payload.to_string());
    }

    /// Remove `name`; later reads fail with `Unavailable`.
    pub fn unset(&mut self, name: &str) {
        self.values.remove(name);
        self.scripts.remove(name);
    }

    /// Queue payloads returned by successive reads of `name`. Once the
    /// script is exhausted the last scripted payload keeps being returned.
    pub fn script<I, T>(&mut self, name: &str, payloads: I)
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.scripts
            .entry(name.to_string())
            .or_default()
            .extend(payloads.into_iter().map(|p| p.to_string()));
    }

    /// Make writes to `name` fail with `WriteRejected`.
    pub fn reject_writes(&mut self, name: &str) {
        self.rejected.insert(name.to_string());
    }

    /// Every write in issue order.
    pub fn writes(&self) -> &[(String, f64)] {
        &self.writes
    }

    /// Drain the write log.
    pub fn take_writes(&mut self) -> Vec<(String, f64)> {
        std::mem::take(&mut self.writes)
    }

    /// Most recent value written to `name`.
    pub fn last_written(&self, name: &str) -> Option<f64> {
        self.writes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Number of reads of `name` since the last [`reset_read_counts`](Self::reset_read_counts).
    pub fn read_count(&self, name: &str) -> usize {
        self.reads.get(name).copied().unwrap_or(0)
    }

    pub fn reset_read_counts(&mut self) {
        self.reads.clear();
    }
}

impl ProcessChannel for MemoryChannel {
    fn read_raw(&mut self, name: &str) -> Result<String, ChannelError> {
        *self.reads.entry(name.to_string()).or_default() += 1;

        if let Some(next) = self.scripts.get_mut(name).and_then(VecDeque::pop_front) {
            self.values.insert(name.to_string(), next);
        }
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| ChannelError::Unavailable {
                name: name.to_string(),
                reason: "variable not set".to_string(),
            })
    }

    fn write(&mut self, name: &str, value: f64) -> Result<(), ChannelError> {
        if self.rejected.contains(name) {
            return Err(ChannelError::WriteRejected {
                name: name.to_string(),
                status: 500,
            });
        }
        self.writes.push((name.to_string(), value));
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
