//! Theoretical reference curves for a 2-D lattice walk

use serde::Serialize;

use crate::utils::constants::{RAYLEIGH_INTERVALS, RAYLEIGH_WINDOW};

/// Expected distance from the origin after `steps` steps: sqrt(t)
pub fn expected_distance(steps: usize) -> f64 {
    (steps as f64).sqrt()
}

/// Rayleigh density `(r/t)·exp(-r²/2t)`; zero when `t = 0`
pub fn rayleigh_density(r: f64, steps: usize) -> f64 {
    if steps == 0 {
        return 0.0;
    }
    let t = steps as f64;
    (r / t) * (-(r * r) / (2.0 * t)).exp()
}

/// Sampled distance distribution at a fixed step count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RayleighCurve {
    pub steps: usize,
    /// Right edge of the window: 4·sqrt(t)
    pub max_r: f64,
    /// (r, density) pairs, evenly spaced from 0 to `max_r`
    pub points: Vec<(f64, f64)>,
    pub peak: f64,
}

impl RayleighCurve {
    pub fn new(steps: usize) -> Self {
        let max_r = RAYLEIGH_WINDOW * expected_distance(steps);
        let points: Vec<(f64, f64)> = (0..=RAYLEIGH_INTERVALS)
            .map(|i| {
                let r = max_r * i as f64 / RAYLEIGH_INTERVALS as f64;
                (r, rayleigh_density(r, steps))
            })
            .collect();
        let peak = points.iter().map(|&(_, p)| p).fold(0.0, f64::max);

        Self {
            steps,
            max_r,
            points,
            peak,
        }
    }

    /// Where `distance` falls in the window, as a fraction clamped to [0, 1]
    pub fn position_of(&self, distance: f64) -> f64 {
        if self.max_r <= 0.0 {
            return 0.0;
        }
        (distance / self.max_r).clamp(0.0, 1.0)
    }
}
