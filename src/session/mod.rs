//! Tuning session: stands in for the external simulator and transport.
//! Feeds cross-track error to the controllers, ends episodes and hands scores to Twiddle.

pub mod track;
pub mod episode;
pub mod driver;
pub mod parallel;
