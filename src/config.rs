//! config.rs
//! Session configuration: episode termination policy, tuning flags, output location.
//!
//! Defaults are the values used for the track runs. `from_env()` lets each field be
//! overridden with a `TWIDDLE_*` variable; bad values are logged and ignored.

use std::{env, path::PathBuf, str::FromStr};

use log::warn;
use serde::Serialize;

use crate::control::PID_STARTUP;

pub const DEFAULT_EPISODES: usize = 20;
pub const DEFAULT_MAX_STEPS: u64 = 10_000;
pub const DEFAULT_OFF_TRACK_CTE: f64 = 3.5;
pub const DEFAULT_MIN_SPEED: f64 = 3.0;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_OUTPUT_DIR: &str = "data/tuning";

#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    /// Episodes to run in one session.
    pub episodes: usize,
    /// Step cap of one episode.
    pub max_steps: u64,
    /// |cte| beyond which the car is off track.
    pub off_track_cte: f64,
    /// Speed below which the episode is abandoned.
    pub min_speed: f64,
    pub tune_steering: bool,
    pub tune_throttle: bool,
    /// Start from the recorded presets instead of zero gains.
    pub use_presets: bool,
    /// Track noise seed.
    pub seed: u64,
    pub output_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            episodes: DEFAULT_EPISODES,
            max_steps: DEFAULT_MAX_STEPS,
            off_track_cte: DEFAULT_OFF_TRACK_CTE,
            min_speed: DEFAULT_MIN_SPEED,
            tune_steering: true,
            tune_throttle: false,
            use_presets: true,
            seed: DEFAULT_SEED,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `TWIDDLE_EPISODES`, `TWIDDLE_MAX_STEPS`,
    /// `TWIDDLE_OFF_TRACK`, `TWIDDLE_MIN_SPEED`, `TWIDDLE_TUNE_STEERING`,
    /// `TWIDDLE_TUNE_THROTTLE`, `TWIDDLE_PRESETS`, `TWIDDLE_SEED`, `TWIDDLE_OUTPUT_DIR`.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            episodes: env_or("TWIDDLE_EPISODES", d.episodes),
            max_steps: env_or("TWIDDLE_MAX_STEPS", d.max_steps),
            off_track_cte: env_or("TWIDDLE_OFF_TRACK", d.off_track_cte),
            min_speed: env_or("TWIDDLE_MIN_SPEED", d.min_speed),
            tune_steering: env_or("TWIDDLE_TUNE_STEERING", d.tune_steering),
            tune_throttle: env_or("TWIDDLE_TUNE_THROTTLE", d.tune_throttle),
            use_presets: env_or("TWIDDLE_PRESETS", d.use_presets),
            seed: env_or("TWIDDLE_SEED", d.seed),
            output_dir: env::var("TWIDDLE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(d.output_dir),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.episodes == 0 {
            return Err("episodes must be at least 1".into());
        }
        if self.max_steps <= PID_STARTUP {
            return Err(format!(
                "max_steps ({}) must exceed the startup period ({})",
                self.max_steps, PID_STARTUP
            ));
        }
        if self.off_track_cte.is_nan() || self.off_track_cte <= 0.0 {
            return Err(format!("off_track_cte must be positive, got {}", self.off_track_cte));
        }
        if self.min_speed.is_nan() || self.min_speed < 0.0 {
            return Err(format!("min_speed must not be negative, got {}", self.min_speed));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("Ignoring {}={:?}: not a valid value", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_step_cap_inside_startup() {
        let cfg = SessionConfig {
            max_steps: PID_STARTUP,
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_bad_thresholds() {
        let cfg = SessionConfig {
            off_track_cte: f64::NAN,
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SessionConfig {
            min_speed: -1.0,
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SessionConfig {
            episodes: 0,
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_or_falls_back_on_garbage() {
        // SAFETY: test-local variable name, not read by other tests.
        unsafe { env::set_var("TWIDDLE_TEST_GARBAGE", "not-a-number") };
        assert_eq!(env_or("TWIDDLE_TEST_GARBAGE", 7u64), 7);
        unsafe { env::set_var("TWIDDLE_TEST_GARBAGE", " 12 ") };
        assert_eq!(env_or("TWIDDLE_TEST_GARBAGE", 7u64), 12);
        unsafe { env::remove_var("TWIDDLE_TEST_GARBAGE") };
    }
}
