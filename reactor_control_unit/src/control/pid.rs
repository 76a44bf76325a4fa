//! Tick-timed PID controller with clamped output, integrator anti-windup
//! by clamping the raw accumulator, and optional derivative-on-measurement.
//!
//! Time is the plant's tick counter: `dt` is a whole number of ticks.
//! A step whose timestamp does not advance returns the previous output
//! unchanged.
//!
//! Zero Ki disables integral; zero Kd disables derivative. Negative gains
//! make the loop reverse-acting.

use reactor_common::control_unit::config::PidConfig;

/// PID gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (0 = disabled).
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    pub kd: f64,
}

/// Internal state of the PID controller.
///
/// Owned exclusively by its [`Pid`]. Re-anchored by [`Pid::reset`] on
/// operating-mode transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PidState {
    /// Integral accumulator (sum of error × dt, before Ki).
    integral: f64,
    /// Previous error (derivative-on-error).
    prev_error: f64,
    /// Previous measurement (derivative-on-measurement).
    prev_measurement: f64,
    /// Timestamp of the previous step; `None` before the first step.
    prev_timestamp: Option<u64>,
    /// Last clamped output.
    last_output: f64,
}

/// One PID loop: gains, limits, accumulation mode and state.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    out_min: f64,
    out_max: f64,
    derivative_on_measurement: bool,
    clamp_integral: bool,
    state: PidState,
}

impl Pid {
    /// Create an unseeded controller. The first step only anchors the
    /// derivative history; P and I act immediately.
    pub fn new(config: &PidConfig) -> Self {
        Self {
            gains: PidGains {
                kp: config.kp,
                ki: config.ki,
                kd: config.kd,
            },
            out_min: config.out_min,
            out_max: config.out_max,
            derivative_on_measurement: config.derivative_on_measurement,
            clamp_integral: config.clamp_integral,
            state: PidState::default(),
        }
    }

    /// Create a controller whose output starts at `seed` (typically the
    /// actuator's current value) so that the first steps do not kick.
    pub fn seeded(config: &PidConfig, timestamp: u64, seed: f64) -> Self {
        let mut pid = Self::new(config);
        pid.reset(timestamp, seed);
        pid
    }

    #[inline]
    pub fn last_output(&self) -> f64 {
        self.state.last_output
    }

    #[inline]
    pub fn integral(&self) -> f64 {
        self.state.integral
    }

    /// Bounds of the raw accumulator so that `ki * integral` stays within
    /// the output range. `None` when the integral is disabled.
    fn integral_bounds(&self) -> Option<(f64, f64)> {
        if self.gains.ki == 0.0 {
            return None;
        }
        let a = self.out_min / self.gains.ki;
        let b = self.out_max / self.gains.ki;
        Some((a.min(b), a.max(b)))
    }

    #[inline]
    fn clamp_output(&self, value: f64) -> f64 {
        value.clamp(self.out_min, self.out_max)
    }

    /// Compute one step.
    ///
    /// # Arguments
    /// - `timestamp`: Plant tick of this sample.
    /// - `setpoint`: Desired value.
    /// - `measurement`: Measured value.
    ///
    /// # Returns
    /// Output clamped to `[out_min, out_max]`.
    pub fn step(&mut self, timestamp: u64, setpoint: f64, measurement: f64) -> f64 {
        let error = setpoint - measurement;

        let Some(prev_timestamp) = self.state.prev_timestamp else {
            self.state.prev_timestamp = Some(timestamp);
            self.state.prev_error = error;
            self.state.prev_measurement = measurement;
            let output =
                self.clamp_output(self.gains.kp * error + self.gains.ki * self.state.integral);
            self.state.last_output = output;
            return output;
        };

        // Stalled (or rewound) tick: repeat the last output.
        if timestamp <= prev_timestamp {
            return self.state.last_output;
        }
        let dt = (timestamp - prev_timestamp) as f64;

        // ── P term ──────────────────────────────────────────
        let p_term = self.gains.kp * error;

        // ── I term (anti-windup on the raw accumulator) ─────
        let i_term = match self.integral_bounds() {
            Some((lo, hi)) => {
                self.state.integral += error * dt;
                if self.clamp_integral {
                    self.state.integral = self.state.integral.clamp(lo, hi);
                }
                self.gains.ki * self.state.integral
            }
            None => {
                self.state.integral = 0.0;
                0.0
            }
        };

        // ── D term ──────────────────────────────────────────
        let d_term = if self.gains.kd != 0.0 {
            let rate = if self.derivative_on_measurement {
                -(measurement - self.state.prev_measurement) / dt
            } else {
                (error - self.state.prev_error) / dt
            };
            self.gains.kd * rate
        } else {
            0.0
        };

        self.state.prev_timestamp = Some(timestamp);
        self.state.prev_error = error;
        self.state.prev_measurement = measurement;

        let output = self.clamp_output(p_term + i_term + d_term);
        self.state.last_output = output;
        output
    }

    /// Re-anchor the controller at `seed`.
    ///
    /// Clears the accumulated history, then sets the integral so that the
    /// integral term alone reproduces `seed`; previous measurement and
    /// output become `seed` and the previous timestamp becomes `timestamp`.
    /// A zero-error step afterwards returns `seed`.
    pub fn reset(&mut self, timestamp: u64, seed: f64) {
        let seed = self.clamp_output(seed);
        let integral = match self.integral_bounds() {
            Some((lo, hi)) => (seed / self.gains.ki).clamp(lo, hi),
            None => 0.0,
        };
        self.state = PidState {
            integral,
            prev_error: 0.0,
            prev_measurement: seed,
            prev_timestamp: Some(timestamp),
            last_output: seed,
        };
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
