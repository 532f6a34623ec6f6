//! gains.rs
//! Gain triple and search phase.

use crate::control::GAIN_COUNT;

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Maps a search vector onto the gains: `p[0] → kp`, `p[1] → kd`, `p[2] → ki`.
    ///
    /// The search vector is NOT in (P, I, D) order. Tuned vectors recorded by
    /// earlier runs depend on this layout, so it must not be "fixed".
    pub fn from_search_vector(p: &[f64; GAIN_COUNT]) -> Self {
        Self {
            kp: p[0],
            kd: p[1],
            ki: p[2],
        }
    }

    /// Inverse of [`Gains::from_search_vector`].
    pub fn to_search_vector(&self) -> [f64; GAIN_COUNT] {
        [self.kp, self.kd, self.ki]
    }
}

/// Direction of the current trial relative to the last accepted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Up,
    Down,
}

impl Phase {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Phase::Up => 1.0,
            Phase::Down => -1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Up => "UP",
            Phase::Down => "DOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_vector_maps_index_one_to_derivative() {
        let g = Gains::from_search_vector(&[1.0, 2.0, 3.0]);
        assert_eq!(g, Gains::new(1.0, 3.0, 2.0));
        assert_eq!(g.to_search_vector(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn phase_sign() {
        assert_eq!(Phase::Up.sign(), 1.0);
        assert_eq!(Phase::Down.sign(), -1.0);
        assert_eq!(Phase::default(), Phase::Up);
    }
}
