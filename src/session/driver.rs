//! driver.rs
//! Closed loop: track telemetry → steering/throttle controllers → commands → track.
//!
//! Both controllers see the same cross-track error. The steering controller's
//! step count, read before the current sample is fed in, is what the episode
//! policy and the score use. At every episode boundary the enabled searches
//! take a step, both controllers get their next gains and the car restarts.

use log::info;

use crate::config::SessionConfig;
use crate::control::{
    presets,
    twiddle::TunedPid,
};
use crate::session::{
    episode::{episode_score, steering_command, throttle_command, EpisodePolicy, EpisodeReport},
    track::{Telemetry, TrackSim},
};

pub struct DrivingSession {
    config: SessionConfig,
    policy: EpisodePolicy,
    steering: TunedPid,
    throttle: TunedPid,
    track: TrackSim,
    telemetry: Telemetry,
    episode: usize,
    max_speed: f64,
}

impl DrivingSession {
    pub fn new(config: SessionConfig) -> Self {
        let (steering, throttle) = if config.use_presets {
            (
                TunedPid::from_preset(&presets::STEERING),
                TunedPid::from_preset(&presets::THROTTLE),
            )
        } else {
            (TunedPid::new(), TunedPid::new())
        };

        let mut track = TrackSim::new(config.seed);
        let telemetry = track.telemetry();

        Self {
            policy: EpisodePolicy::from_config(&config),
            config,
            steering,
            throttle,
            track,
            telemetry,
            episode: 0,
            max_speed: 0.0,
        }
    }

    /// Process one telemetry sample. Returns a report when the sample ended the episode.
    pub fn step(&mut self) -> Option<EpisodeReport> {
        let Telemetry { cte, speed, .. } = self.telemetry;
        self.max_speed = self.max_speed.max(speed);
        let n = self.steering.pid().steps();

        self.steering.update_error(cte);
        self.throttle.update_error(cte);
        let steer = steering_command(self.steering.guess());
        let throttle = throttle_command(self.throttle.guess());

        if self.policy.is_finished(n, cte, speed) {
            return Some(self.finish_episode(n));
        }

        self.telemetry = self.track.advance(steer, throttle);
        None
    }

    pub fn run_episode(&mut self) -> EpisodeReport {
        loop {
            if let Some(report) = self.step() {
                return report;
            }
        }
    }

    pub fn run(&mut self, episodes: usize) -> Vec<EpisodeReport> {
        (0..episodes).map(|_| self.run_episode()).collect()
    }

    fn finish_episode(&mut self, n: u64) -> EpisodeReport {
        let total_error = self.steering.total_error();
        let score = episode_score(total_error, n, self.max_speed);

        info!(
            "Episode {} over at n={} max_speed={:.2} error={:.4} score={:.2}",
            self.episode, n, self.max_speed, total_error, score
        );

        let steering_gains = self.steering.pid().gains();
        let throttle_gains = self.throttle.pid().gains();

        let steering_outcome = self
            .config
            .tune_steering
            .then(|| self.steering.twiddle_step(score));
        let throttle_outcome = self
            .config
            .tune_throttle
            .then(|| self.throttle.twiddle_step(score));

        self.steering.twiddle_update();
        self.throttle.twiddle_update();

        self.track.reset();
        self.telemetry = self.track.telemetry();

        let report = EpisodeReport {
            episode: self.episode,
            steps: n,
            total_error,
            max_speed: self.max_speed,
            score,
            steering_gains,
            throttle_gains,
            steering_outcome,
            throttle_outcome,
        };

        self.episode += 1;
        self.max_speed = 0.0;
        report
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn steering(&self) -> &TunedPid {
        &self.steering
    }

    pub fn throttle(&self) -> &TunedPid {
        &self.throttle
    }

    /// Episodes completed so far.
    pub fn episodes_run(&self) -> usize {
        self.episode
    }
}
