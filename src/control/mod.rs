//! Control core: error-accumulating PID controller + Twiddle gain search.
//!
//! - `pid`: converts cross-track error samples into a control value and scores an episode.
//! - `twiddle`: coordinate-ascent search over the three gains between episodes.
//! - `gains`: gain triple and search phase shared by both.
//! - `presets`: gain/step vectors found by earlier tuning runs.

pub mod gains;
pub mod pid;
pub mod twiddle;
pub mod presets;

/// Samples per episode excluded from scoring (transient settling).
pub const PID_STARTUP: u64 = 300;

/// Step magnitude below which the search moves on to the next gain.
pub const MIN_RESOLUTION: f64 = 0.1;

/// Step multiplier after an accepted improvement.
pub const STEP_GROW: f64 = 1.1;

/// Step multiplier after both directions failed.
pub const STEP_SHRINK: f64 = 0.9;

/// Number of tuned gains (P, I, D).
pub const GAIN_COUNT: usize = 3;
