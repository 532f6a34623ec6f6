//! track.rs
//! Simulated car on a gently curving road, producing one telemetry sample per step.
//!
//! Kinematic bicycle model, fixed sampling period. Noise on the reported cte
//! is uniform and seeded so runs are reproducible.

use std::f64::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};

const DT: f64 = 0.05; // s per sample
const WHEELBASE: f64 = 2.67; // m
const MAX_STEER_RAD: f64 = 25.0 * std::f64::consts::PI / 180.0;
const ACCEL_PER_THROTTLE: f64 = 10.0; // m/s² at full throttle
const DRAG: f64 = 0.1; // 1/s
const CURVE_AMPLITUDE: f64 = 0.01; // 1/m
const CURVE_PERIOD: f64 = 300.0; // m of road per curvature cycle
const CTE_NOISE: f64 = 0.02; // m

/// One sample as the simulator reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub cte: f64,
    pub speed: f64,
}

pub struct TrackSim {
    rng: StdRng,
    cte: f64,
    heading: f64, // relative to road
    speed: f64,
    distance: f64,
}

impl TrackSim {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cte: 0.0,
            heading: 0.0,
            speed: 0.0,
            distance: 0.0,
        }
    }

    /// Car back at the start line, standing still. The noise stream continues.
    pub fn reset(&mut self) {
        self.cte = 0.0;
        self.heading = 0.0;
        self.speed = 0.0;
        self.distance = 0.0;
    }

    pub fn telemetry(&mut self) -> Telemetry {
        let noise = self.rng.random_range(-CTE_NOISE..CTE_NOISE);
        Telemetry {
            cte: self.cte + noise,
            speed: self.speed,
        }
    }

    /// Apply one step of commands. `steering` in [-1, 1], throttle in [-1, 1].
    pub fn advance(&mut self, steering: f64, throttle: f64) -> Telemetry {
        let steer = steering.clamp(-1.0, 1.0) * MAX_STEER_RAD;
        let throttle = throttle.clamp(-1.0, 1.0);

        self.speed = (self.speed + (throttle * ACCEL_PER_THROTTLE - DRAG * self.speed) * DT).max(0.0);

        let curvature = CURVE_AMPLITUDE * (self.distance / CURVE_PERIOD * TAU).sin();
        self.heading += (self.speed * steer.tan() / WHEELBASE - self.speed * curvature) * DT;
        self.cte += self.speed * self.heading.sin() * DT;
        self.distance += self.speed * DT;

        self.telemetry()
    }
}
