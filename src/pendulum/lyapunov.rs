//! Divergence history and the one-shot Lyapunov exponent estimate
//!
//! The ensemble records the RMS phase-space distance between its pendulums
//! every tick. Once that distance first climbs past the distance expected of
//! two unrelated random states, the whole history up to that point is fitted
//! with `ln d(t) = ln d0 + λ t`. The fit runs exactly once; its outcome
//! (exponent or failure) sticks until reset.

use serde::Serialize;
use std::collections::VecDeque;

use crate::utils::constants::{
    LYAPUNOV_MAX_EXPONENT, LYAPUNOV_MIN_DIVERGENCE, LYAPUNOV_MIN_FIT_POINTS, LYAPUNOV_MIN_SAMPLES,
};

/// One point of the divergence series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergenceSample {
    pub time: f64,
    pub divergence: f64,
    pub max_divergence: f64,
    pub random_expected: f64,
}

impl DivergenceSample {
    #[inline]
    fn is_random(&self) -> bool {
        self.divergence >= self.random_expected
    }
}

/// State of the exponent estimate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LyapunovFit {
    /// Divergence has not yet reached the random-expected level
    #[default]
    NotYetCrossed,
    /// Fit succeeded at the crossing
    #[serde(rename_all = "camelCase")]
    Fitted { exponent: f64, crossover_index: usize },
    /// Crossing happened but the data did not support an exponent
    #[serde(rename_all = "camelCase")]
    FitFailed { crossover_index: usize },
}

impl LyapunovFit {
    pub fn exponent(&self) -> Option<f64> {
        match self {
            LyapunovFit::Fitted { exponent, .. } => Some(*exponent),
            _ => None,
        }
    }

    pub fn crossover_index(&self) -> Option<usize> {
        match self {
            LyapunovFit::NotYetCrossed => None,
            LyapunovFit::Fitted { crossover_index, .. }
            | LyapunovFit::FitFailed { crossover_index } => Some(*crossover_index),
        }
    }

    /// The crossing has been seen; no further transitions happen
    pub fn is_settled(&self) -> bool {
        !matches!(self, LyapunovFit::NotYetCrossed)
    }

    /// Inspect the newest sample and fit once the crossing is seen
    ///
    /// Returns `true` on the tick the state changes.
    pub fn observe(&mut self, history: &VecDeque<DivergenceSample>) -> bool {
        if self.is_settled() || history.len() < LYAPUNOV_MIN_SAMPLES {
            return false;
        }

        let last = history.len() - 1;
        let crossed = !history[last - 1].is_random() && history[last].is_random();
        if !crossed {
            return false;
        }

        let points = history.iter().map(|s| (s.time, s.divergence));
        *self = match fit_exponential(points) {
            Some(exponent) => {
                tracing::info!(exponent, crossover_index = last, "Lyapunov exponent fitted");
                LyapunovFit::Fitted {
                    exponent,
                    crossover_index: last,
                }
            }
            None => {
                tracing::warn!(crossover_index = last, "Lyapunov fit rejected");
                LyapunovFit::FitFailed {
                    crossover_index: last,
                }
            }
        };
        true
    }
}

/// Least-squares growth rate of `ln d` against `t`
///
/// Points with `d <= 1e-10` are discarded. Returns `None` with fewer than five
/// usable points, a degenerate time spread, or a slope outside [0, 10].
pub fn fit_exponential<I>(points: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut n = 0usize;
    let (mut sum_t, mut sum_y, mut sum_tt, mut sum_ty) = (0.0, 0.0, 0.0, 0.0);

    for (t, d) in points {
        if d > LYAPUNOV_MIN_DIVERGENCE {
            let y = d.ln();
            n += 1;
            sum_t += t;
            sum_y += y;
            sum_tt += t * t;
            sum_ty += t * y;
        }
    }

    if n < LYAPUNOV_MIN_FIT_POINTS {
        return None;
    }

    let nf = n as f64;
    let denominator = nf * sum_tt - sum_t * sum_t;
    if denominator.abs() < 1e-10 {
        return None;
    }

    let slope = (nf * sum_ty - sum_t * sum_y) / denominator;
    (0.0..=LYAPUNOV_MAX_EXPONENT)
        .contains(&slope)
        .then_some(slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(time: f64, divergence: f64) -> DivergenceSample {
        DivergenceSample {
            time,
            divergence,
            max_divergence: 20.0,
            random_expected: 4.0,
        }
    }

    #[test]
    fn test_fit_recovers_rate() {
        let points = (0..20).map(|i| {
            let t = i as f64 * 0.06;
            (t, 0.01 * (1.5 * t).exp())
        });
        let lambda = fit_exponential(points).unwrap();
        assert_relative_eq!(lambda, 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_needs_five_positive_points() {
        let points = vec![(0.0, 0.0), (0.1, 1.0), (0.2, 2.0), (0.3, 4.0), (0.4, 8.0)];
        assert!(fit_exponential(points).is_none());
    }

    #[test]
    fn test_fit_rejects_decay_and_degenerate_time() {
        let decaying = (0..10).map(|i| (i as f64, (-0.5 * i as f64).exp()));
        assert!(fit_exponential(decaying).is_none());

        let same_time = (0..10).map(|i| (1.0, 1.0 + i as f64));
        assert!(fit_exponential(same_time).is_none());
    }

    #[test]
    fn test_fit_rejects_implausible_rate() {
        let points = (0..10).map(|i| {
            let t = i as f64 * 0.01;
            (t, (20.0 * t).exp())
        });
        assert!(fit_exponential(points).is_none());
    }

    #[test]
    fn test_crossing_fits_once() {
        let mut history = VecDeque::new();
        let mut fit = LyapunovFit::default();

        // Growth from 0.01 crossing 4.0 at t = ln(400)/0.8 ≈ 7.49
        let mut changed_at = None;
        for i in 0..200 {
            let t = i as f64 * 0.1;
            history.push_back(sample(t, 0.01 * (0.8 * t).exp()));
            if fit.observe(&history) {
                assert!(changed_at.is_none(), "fit must transition once");
                changed_at = Some(i);
            }
        }

        assert_eq!(changed_at, Some(75));
        assert_eq!(fit.crossover_index(), Some(75));
        assert_relative_eq!(fit.exponent().unwrap(), 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_no_crossing_before_minimum_samples() {
        let mut history = VecDeque::new();
        let mut fit = LyapunovFit::default();
        for i in 0..10 {
            let d = if i < 9 { 1.0 } else { 5.0 };
            history.push_back(sample(i as f64, d));
            assert!(!fit.observe(&history));
        }
        assert_eq!(fit, LyapunovFit::NotYetCrossed);
    }

    #[test]
    fn test_late_jump_is_fitted() {
        let mut history: VecDeque<_> = (0..15).map(|i| sample(i as f64 * 0.1, 1.0)).collect();
        let mut fit = LyapunovFit::default();
        assert!(!fit.observe(&history));

        history.push_back(sample(1.5, 4.5));
        assert!(fit.observe(&history));
        assert_eq!(fit.crossover_index(), Some(15));
        assert!(fit.exponent().unwrap() > 0.0);
    }

    #[test]
    fn test_decaying_history_fails_fit() {
        let mut history: VecDeque<_> = (0..15)
            .map(|i| sample(i as f64, 3.9 * (-0.2 * i as f64).exp()))
            .collect();
        history.push_back(sample(15.0, 4.1));

        let mut fit = LyapunovFit::default();
        assert!(fit.observe(&history));
        assert_eq!(fit, LyapunovFit::FitFailed { crossover_index: 15 });

        // Settled: further crossings are ignored
        history.push_back(sample(16.0, 1.0));
        history.push_back(sample(17.0, 5.0));
        assert!(!fit.observe(&history));
    }
}
