//! Fixed-capacity FIFO sample histories.
//!
//! Storage is a `heapless::Deque` sized at compile time; the logical
//! capacity may be smaller (the iodine window is configurable). Once the
//! history is full the oldest sample is evicted before the newest is
//! inserted.

use heapless::Deque;
use reactor_common::consts::{IODINE_HISTORY_MAX, REACTIVITY_HISTORY_LEN};

/// Bounded moving window over the most recent samples.
#[derive(Debug, Clone)]
pub struct SampleHistory<const N: usize> {
    samples: Deque<f64, N>,
    capacity: usize,
}

/// Last three reactivity samples (rod engine average).
pub type ReactivityHistory = SampleHistory<REACTIVITY_HISTORY_LEN>;

/// Iodine samples for the chemistry moving average.
pub type IodineHistory = SampleHistory<IODINE_HISTORY_MAX>;

impl<const N: usize> SampleHistory<N> {
    /// Create an empty history holding at most `capacity` samples
    /// (clamped to `1..=N`).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Deque::new(),
            capacity: capacity.clamp(1, N),
        }
    }

    /// Create an empty history using the full storage.
    pub fn new() -> Self {
        Self::with_capacity(N)
    }

    /// Insert a sample, evicting the oldest one when full.
    pub fn push(&mut self, value: f64) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        // Cannot fail: at least one slot was freed above.
        let _ = self.samples.push_back(value);
    }

    /// Arithmetic mean of the current contents (0.0 when empty).
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<const N: usize> Default for SampleHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
