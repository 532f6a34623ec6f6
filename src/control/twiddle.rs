//! twiddle.rs
//! Coordinate-ascent ("Twiddle") search over the PID gains.
//!
//! One gain is refined at a time. After each episode the active gain is
//! 1) moved further in the same direction when the score improved (step x1.1),
//! 2) moved to the other side when going UP did not help,
//! 3) restored with a finer step (x0.9) when going DOWN did not help either.
//!
//! Once the active step drops below `MIN_RESOLUTION` the search moves on to the
//! next gain, round-robin. The best score is kept across gains, so later gains
//! are judged against the best result of earlier ones.

use log::{debug, info};

use crate::control::{
    gains::{Gains, Phase},
    pid::Pid,
    presets::Preset,
    GAIN_COUNT, MIN_RESOLUTION, PID_STARTUP, STEP_GROW, STEP_SHRINK,
};

/// Transition taken by one [`Twiddle::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// First score of the session recorded, UP trial applied.
    Seeded,
    /// Score improved, kept moving in the same direction with a larger step.
    Improved,
    /// UP trial failed, now trying DOWN.
    Reversed,
    /// Both directions failed, value restored and a finer UP trial applied.
    Refined,
    /// Moved on to the gain at `index` and applied its UP trial.
    /// `improved` is set when the score that triggered the move was a new best.
    Advanced { index: usize, improved: bool },
}

/// Search state; lives for a whole tuning session.
#[derive(Debug, Clone)]
pub struct Twiddle {
    p: [f64; GAIN_COUNT],
    dp: [f64; GAIN_COUNT],
    index: usize,
    phase: Phase,
    best: Option<f64>,
}

impl Default for Twiddle {
    fn default() -> Self {
        Self::new()
    }
}

impl Twiddle {
    pub fn new() -> Self {
        Self {
            p: [0.0; GAIN_COUNT],
            dp: [1.0; GAIN_COUNT],
            index: 0,
            phase: Phase::Up,
            best: None,
        }
    }

    /// Search starting from explicit gain and step vectors.
    pub fn with_vectors(p: [f64; GAIN_COUNT], dp: [f64; GAIN_COUNT]) -> Self {
        Self { p, dp, ..Self::new() }
    }

    /// Back to zero gains, unit steps, index 0, UP, no best score.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Evaluate a finished episode and pick the gains for the next one.
    ///
    /// `episode_steps` is the controller step count of the scored episode;
    /// an improvement is only trusted once the episode got past startup.
    pub fn step(&mut self, score: f64, episode_steps: u64) -> StepOutcome {
        debug!(
            "Twiddle step err={} n={} best={:?} index={} phase={}",
            score,
            episode_steps,
            self.best,
            self.index,
            self.phase.name()
        );

        let i = self.index;
        // frozen gain
        if self.dp[i] == 0.0 {
            return self.advance(false);
        }

        let Some(best) = self.best else {
            self.best = Some(score);
            self.phase = Phase::Up;
            self.p[i] += self.dp[i];
            return StepOutcome::Seeded;
        };

        if score < best && episode_steps > PID_STARTUP {
            info!("New best score: {} (gain {} = {})", score, i, self.p[i]);
            self.best = Some(score);
            self.dp[i] *= STEP_GROW;
            if self.dp[i].abs() < MIN_RESOLUTION {
                return self.advance(true);
            }
            self.p[i] += self.phase.sign() * self.dp[i];
            return StepOutcome::Improved;
        }

        match self.phase {
            Phase::Up => {
                self.p[i] -= 2.0 * self.dp[i];
                self.phase = Phase::Down;
                StepOutcome::Reversed
            }
            Phase::Down => {
                self.p[i] += self.dp[i];
                self.dp[i] *= STEP_SHRINK;
                if self.dp[i].abs() < MIN_RESOLUTION {
                    return self.advance(false);
                }
                self.phase = Phase::Up;
                self.p[i] += self.dp[i];
                StepOutcome::Refined
            }
        }
    }

    fn advance(&mut self, improved: bool) -> StepOutcome {
        self.index = (self.index + 1) % GAIN_COUNT;
        self.p[self.index] += self.dp[self.index];
        self.phase = Phase::Up;
        debug!("Twiddle advancing to gain {}", self.index);
        StepOutcome::Advanced {
            index: self.index,
            improved,
        }
    }

    /// Gains for the next episode, in controller order.
    pub fn gains(&self) -> Gains {
        Gains::from_search_vector(&self.p)
    }

    pub fn gain_vector(&self) -> [f64; GAIN_COUNT] {
        self.p
    }

    pub fn step_vector(&self) -> [f64; GAIN_COUNT] {
        self.dp
    }

    pub fn set_gain_vector(&mut self, p: [f64; GAIN_COUNT]) {
        self.p = p;
    }

    pub fn set_step_vector(&mut self, dp: [f64; GAIN_COUNT]) {
        self.dp = dp;
    }

    pub fn active_index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best
    }
}

/// A controller bundled with the search that tunes it.
#[derive(Debug, Clone)]
pub struct TunedPid {
    pid: Pid,
    twiddle: Twiddle,
}

impl Default for TunedPid {
    fn default() -> Self {
        Self::new()
    }
}

impl TunedPid {
    /// Fresh search with zero gains applied.
    pub fn new() -> Self {
        let mut tuned = Self {
            pid: Pid::default(),
            twiddle: Twiddle::new(),
        };
        tuned.twiddle_init();
        tuned
    }

    /// Search seeded from previously tuned vectors.
    pub fn from_preset(preset: &Preset) -> Self {
        let mut tuned = Self::new();
        tuned.twiddle.set_gain_vector(preset.p);
        tuned.twiddle.set_step_vector(preset.dp);
        tuned.twiddle_update();
        tuned
    }

    pub fn twiddle_init(&mut self) {
        self.twiddle.reset();
        self.twiddle_update();
    }

    /// Push the search gains into the controller and start a clean episode.
    pub fn twiddle_update(&mut self) {
        let p = self.twiddle.gain_vector();
        let dp = self.twiddle.step_vector();
        debug!("UPDATE p = {{{}, {}, {}}}", p[0], p[1], p[2]);
        debug!("UPDATE dp = {{{}, {}, {}}}", dp[0], dp[1], dp[2]);
        debug!(
            "UPDATE phase {} index {}",
            self.twiddle.phase().name(),
            self.twiddle.active_index()
        );

        let g = self.twiddle.gains();
        self.pid.init(g.kp, g.ki, g.kd);
    }

    /// Score the episode that just ended. Call [`TunedPid::twiddle_update`] to apply.
    pub fn twiddle_step(&mut self, score: f64) -> StepOutcome {
        self.twiddle.step(score, self.pid.steps())
    }

    #[inline]
    pub fn update_error(&mut self, cte: f64) {
        self.pid.update_error(cte);
    }

    #[inline]
    pub fn guess(&self) -> f64 {
        self.pid.guess()
    }

    #[inline]
    pub fn total_error(&self) -> f64 {
        self.pid.total_error()
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn twiddle(&self) -> &Twiddle {
        &self.twiddle
    }

    pub fn twiddle_mut(&mut self) -> &mut Twiddle {
        &mut self.twiddle
    }
}
