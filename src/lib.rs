//! # twiddle_pid
//! PID controller for a car following a track, with online Twiddle gain tuning.
//!
//! - `control`: the controller and the coordinate-ascent search (the core).
//! - `session`: simulated track, episode policy/score, single and parallel tuning sessions.
//! - `utils`: metrics, CSV export, SVG charts.
//! - `config`: session configuration with environment overrides.

pub mod config;
pub mod control;
pub mod session;
pub mod utils;
