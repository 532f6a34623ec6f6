//! episode.rs
//! Episode boundaries and scoring, plus shaping of raw controller output into commands.

use crate::config::SessionConfig;
use crate::control::{gains::Gains, twiddle::StepOutcome, PID_STARTUP};

/// Steering command in [-1, 1].
#[inline]
pub fn steering_command(guess: f64) -> f64 {
    guess.clamp(-1.0, 1.0)
}

/// Throttle command: clamped output shifted into [-0.2, 0.8], centred on 0.3.
#[inline]
pub fn throttle_command(guess: f64) -> f64 {
    -0.2 + (guess.clamp(-1.0, 1.0) + 1.0) / 2.0
}

/// Lower is better: accurate, long and fast episodes win.
#[inline]
pub fn episode_score(total_error: f64, steps: u64, max_speed: f64) -> f64 {
    total_error - steps as f64 - max_speed
}

/// When an episode is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodePolicy {
    pub max_steps: u64,
    pub off_track_cte: f64,
    pub min_speed: f64,
}

impl Default for EpisodePolicy {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl EpisodePolicy {
    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self {
            max_steps: cfg.max_steps,
            off_track_cte: cfg.off_track_cte,
            min_speed: cfg.min_speed,
        }
    }

    /// Never ends during startup; afterwards off track, too slow or out of steps.
    pub fn is_finished(&self, steps: u64, cte: f64, speed: f64) -> bool {
        steps > PID_STARTUP
            && (cte.abs() > self.off_track_cte || speed < self.min_speed || steps > self.max_steps)
    }
}

/// Result of one finished episode.
#[derive(Debug, Clone)]
pub struct EpisodeReport {
    pub episode: usize,
    pub steps: u64,
    pub total_error: f64,
    pub max_speed: f64,
    pub score: f64,
    /// Gains the episode was driven with.
    pub steering_gains: Gains,
    pub throttle_gains: Gains,
    pub steering_outcome: Option<StepOutcome>,
    pub throttle_outcome: Option<StepOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn commands_are_clamped() {
        assert_eq!(steering_command(4.0), 1.0);
        assert_eq!(steering_command(-4.0), -1.0);
        assert_eq!(steering_command(0.25), 0.25);

        assert_relative_eq!(throttle_command(0.0), 0.3);
        assert_relative_eq!(throttle_command(10.0), 0.8);
        assert_relative_eq!(throttle_command(-10.0), -0.2);
    }

    #[test]
    fn score_rewards_length_and_speed() {
        assert_relative_eq!(episode_score(0.5, 1000, 30.0), -1029.5);
        assert!(episode_score(0.5, 2000, 30.0) < episode_score(0.5, 1000, 30.0));
    }

    #[test]
    fn policy_waits_for_startup() {
        let p = EpisodePolicy::default();
        assert!(!p.is_finished(PID_STARTUP, 100.0, 0.0));
        assert!(p.is_finished(PID_STARTUP + 1, 3.6, 20.0));
        assert!(p.is_finished(PID_STARTUP + 1, -3.6, 20.0));
        assert!(p.is_finished(PID_STARTUP + 1, 0.0, 2.0));
        assert!(!p.is_finished(PID_STARTUP + 1, 0.0, 20.0));
        assert!(p.is_finished(p.max_steps + 1, 0.0, 20.0));
    }
}
