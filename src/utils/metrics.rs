//! Metrics collected over a tuning session.
//!
//! Bounded histories (1000 most recent episodes) of score, error, length and
//! speed, plus the best score seen and the gains that produced it.
//! Shared behind a mutex so parallel sessions can report into one place.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use statrs::statistics::Statistics;

use crate::control::{gains::Gains, twiddle::StepOutcome};
use crate::session::episode::EpisodeReport;

pub const MAX_POINTS: usize = 1_000;

#[derive(Debug, Default, Clone)]
pub struct TuningMetrics {
    pub scores: VecDeque<f64>,
    pub total_errors: VecDeque<f64>,
    pub steps: VecDeque<u64>,
    pub max_speeds: VecDeque<f64>,

    pub episodes: u64,
    /// Episodes where a search accepted a new best score.
    pub improvements: u64,
    /// Times a search moved on to the next gain.
    pub advances: u64,

    pub best_score: Option<f64>,
    pub best_steering: Option<Gains>,
    pub best_throttle: Option<Gains>,
}

impl TuningMetrics {
    pub fn record_episode(&mut self, report: &EpisodeReport) {
        push_capped(&mut self.scores, report.score);
        push_capped(&mut self.total_errors, report.total_error);
        push_capped_u64(&mut self.steps, report.steps);
        push_capped(&mut self.max_speeds, report.max_speed);
        self.episodes += 1;

        for outcome in [report.steering_outcome, report.throttle_outcome].into_iter().flatten() {
            match outcome {
                StepOutcome::Improved => self.improvements += 1,
                StepOutcome::Advanced { improved, .. } => {
                    self.advances += 1;
                    if improved {
                        self.improvements += 1;
                    }
                }
                _ => {}
            }
        }

        if self.best_score.is_none_or(|best| report.score < best) {
            self.best_score = Some(report.score);
            self.best_steering = Some(report.steering_gains);
            self.best_throttle = Some(report.throttle_gains);
        }
    }
}

pub type SharedTuningMetrics = Arc<Mutex<TuningMetrics>>;

pub fn shared_metrics() -> SharedTuningMetrics {
    Arc::new(Mutex::new(TuningMetrics::default()))
}

/// Appends value; drops the oldest once at capacity.
#[inline]
pub fn push_capped(buf: &mut VecDeque<f64>, val: f64) {
    if buf.len() >= MAX_POINTS {
        buf.pop_front();
    }
    buf.push_back(val);
}

#[inline]
pub fn push_capped_u64(buf: &mut VecDeque<u64>, val: u64) {
    if buf.len() >= MAX_POINTS {
        buf.pop_front();
    }
    buf.push_back(val);
}

#[derive(Debug, Clone)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

pub fn calculate_stats(data: &VecDeque<f64>) -> Option<Stats> {
    if data.is_empty() {
        return None;
    }

    let count = data.len();
    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = data.iter().mean();
    // sample std dev is undefined for a single point
    let std_dev = if count > 1 { data.iter().std_dev() } else { 0.0 };

    Some(Stats { min, max, mean, std_dev })
}

pub fn calculate_stats_u64(data: &VecDeque<u64>) -> Option<Stats> {
    let as_f64: VecDeque<f64> = data.iter().map(|&x| x as f64).collect();
    calculate_stats(&as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn report(score: f64, kp: f64, outcome: Option<StepOutcome>) -> EpisodeReport {
        EpisodeReport {
            episode: 0,
            steps: 500,
            total_error: 0.1,
            max_speed: 20.0,
            score,
            steering_gains: Gains::new(kp, 0.0, 0.0),
            throttle_gains: Gains::default(),
            steering_outcome: outcome,
            throttle_outcome: None,
        }
    }

    #[test]
    fn keeps_lowest_score_and_its_gains() {
        let mut m = TuningMetrics::default();
        m.record_episode(&report(-100.0, 1.0, Some(StepOutcome::Seeded)));
        m.record_episode(&report(-300.0, 2.0, Some(StepOutcome::Improved)));
        m.record_episode(&report(
            -200.0,
            3.0,
            Some(StepOutcome::Advanced {
                index: 1,
                improved: false,
            }),
        ));
        m.record_episode(&report(
            -250.0,
            4.0,
            Some(StepOutcome::Advanced {
                index: 2,
                improved: true,
            }),
        ));

        assert_eq!(m.episodes, 4);
        assert_eq!(m.improvements, 2);
        assert_eq!(m.advances, 2);
        assert_eq!(m.best_score, Some(-300.0));
        assert_eq!(m.best_steering, Some(Gains::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn history_is_capped() {
        let mut buf = VecDeque::new();
        for i in 0..(MAX_POINTS + 10) {
            push_capped(&mut buf, i as f64);
        }
        assert_eq!(buf.len(), MAX_POINTS);
        assert_eq!(buf.front().copied(), Some(10.0));
    }

    #[test]
    fn stats_over_scores() {
        let data: VecDeque<f64> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
        let s = calculate_stats(&data).expect("non-empty");
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.std_dev, (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);

        assert!(calculate_stats(&VecDeque::new()).is_none());
        let one: VecDeque<u64> = [3].into_iter().collect();
        let s = calculate_stats_u64(&one).expect("non-empty");
        assert_eq!((s.min, s.max, s.std_dev), (3.0, 3.0, 0.0));
    }
}
