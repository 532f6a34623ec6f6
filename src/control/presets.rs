//! presets.rs
//! Search vectors recorded from earlier tuning runs on the track.

use crate::control::GAIN_COUNT;

/// Gain vector `p` and step vector `dp` in search order (kp, kd, ki).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub p: [f64; GAIN_COUNT],
    pub dp: [f64; GAIN_COUNT],
}

pub const STEERING: Preset = Preset {
    p: [0.158161, 1.69977, 0.000489072],
    dp: [2.45227e-05, 2.68442e-05, 2.23031e-05],
};

pub const THROTTLE: Preset = Preset {
    p: [-0.353402, 3.80884, -0.000491255],
    dp: [6.25688e-08, 2.601e-07, 6.78076e-08],
};
