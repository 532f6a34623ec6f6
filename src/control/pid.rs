//! pid.rs
//! Error-accumulating PID controller with episode scoring.
//!
//! The sampling period is implicit and constant: the derivative is a plain
//! backward difference and the integral a plain running sum (no windup clamp,
//! callers running very long episodes re-init periodically).
//! Squared error is only accumulated once `PID_STARTUP` samples have passed.

use log::trace;

use crate::control::{gains::Gains, PID_STARTUP};

/// PID controller state for one episode.
#[derive(Debug, Clone, Default)]
pub struct Pid {
    gains: Gains,
    p_error: f64,
    i_error: f64,
    d_error: f64,
    steps: u64,
    squared_error: f64, // sum of cte² after startup
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        let mut pid = Self::default();
        pid.init(kp, ki, kd);
        pid
    }

    /// Set gains and start a clean episode.
    pub fn init(&mut self, kp: f64, ki: f64, kd: f64) {
        self.gains = Gains::new(kp, ki, kd);
        self.p_error = 0.0;
        self.i_error = 0.0;
        self.d_error = 0.0;
        self.steps = 0;
        self.squared_error = 0.0;
    }

    /// Feed one cross-track error sample.
    pub fn update_error(&mut self, cte: f64) {
        self.d_error = cte - self.p_error;
        self.p_error = cte;
        self.i_error += cte;

        self.steps += 1;
        if self.steps > PID_STARTUP {
            self.squared_error += cte * cte;
        }

        trace!(
            "STEP {} error [{}, {}, {}]={}",
            self.steps,
            self.p_error,
            self.d_error,
            self.i_error,
            self.guess()
        );
    }

    /// Unclamped control value; the caller bounds it to the actuator range.
    #[inline]
    pub fn guess(&self) -> f64 {
        -self.gains.kp * self.p_error - self.gains.kd * self.d_error - self.gains.ki * self.i_error
    }

    /// Mean squared error over the post-startup part of the episode, 0 before that.
    pub fn total_error(&self) -> f64 {
        if self.steps <= PID_STARTUP {
            return 0.0;
        }
        self.squared_error / (self.steps - PID_STARTUP) as f64
    }

    #[inline]
    pub fn gains(&self) -> Gains {
        self.gains
    }

    #[inline]
    pub fn p_error(&self) -> f64 {
        self.p_error
    }

    #[inline]
    pub fn i_error(&self) -> f64 {
        self.i_error
    }

    #[inline]
    pub fn d_error(&self) -> f64 {
        self.d_error
    }

    /// Samples processed since the last init.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Sum of squared samples past the grace period.
    #[inline]
    pub fn cumulative_error(&self) -> f64 {
        self.squared_error
    }
}
