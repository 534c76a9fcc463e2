//! Ensemble of nearly-identical double pendulums
//!
//! Pendulum 0 starts exactly at the configured angles; every other pendulum
//! gets an independent uniform perturbation on each angle. All members share
//! the timestep and are held at their own starting energy.

use nalgebra::Point2;
use serde::Serialize;
use std::collections::VecDeque;

use vizsim_types::PendulumSettings;

use super::dynamics::{PendulumParams, PendulumState};
use super::lyapunov::{DivergenceSample, LyapunovFit};
use crate::error::{
    require_finite, require_non_negative, require_positive, ConfigError, ConfigResult,
};
use crate::noise::UniformNoise;
use crate::simulator::{Simulator, StepOutcome};
use crate::utils::constants::{DIVERGENCE_HISTORY_MAX, PENDULUM_BASE_DT, PHASE_HISTORY_DIVISOR};

/// One member of the ensemble
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pendulum {
    pub id: usize,
    pub state: PendulumState,
    /// Energy recorded on the first tick; velocities are rescaled toward it
    pub initial_energy: Option<f64>,
    /// Display hue in degrees, spread evenly around the wheel
    pub hue: f64,
    /// Recent outer-bob positions (unit arm length, y down), oldest first
    pub trail: VecDeque<Point2<f64>>,
}

/// Per-tick snapshot of every pendulum's angles
pub type PhaseSnapshot = Vec<(f64, f64)>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendulumMetrics {
    pub time: f64,
    pub energies: Vec<f64>,
    pub mean_energy: f64,
    /// Mean energy of the initial configuration, for plot scaling
    pub reference_energy: f64,
    pub divergence: f64,
    pub max_divergence: f64,
    pub random_expected: f64,
    pub lyapunov: LyapunovFit,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct PendulumEnsemble {
    settings: PendulumSettings,
    params: PendulumParams,
    noise: UniformNoise,
    pendulums: Vec<Pendulum>,
    phase_history: VecDeque<PhaseSnapshot>,
    divergence_history: VecDeque<DivergenceSample>,
    lyapunov: LyapunovFit,
    reference_energy: f64,
    time: f64,
}

impl PendulumEnsemble {
    pub fn new(settings: PendulumSettings) -> ConfigResult<Self> {
        Self::with_params(settings, PendulumParams::default())
    }

    pub fn with_params(settings: PendulumSettings, params: PendulumParams) -> ConfigResult<Self> {
        validate(&settings)?;
        require_positive("l1", params.l1)?;
        require_positive("l2", params.l2)?;
        require_positive("m1", params.m1)?;
        require_positive("m2", params.m2)?;
        require_non_negative("g", params.g)?;

        let noise = UniformNoise::new(settings.seed);
        let mut ensemble = Self {
            settings,
            params,
            noise,
            pendulums: Vec::new(),
            phase_history: VecDeque::new(),
            divergence_history: VecDeque::new(),
            lyapunov: LyapunovFit::NotYetCrossed,
            reference_energy: 0.0,
            time: 0.0,
        };
        ensemble.initialize();
        Ok(ensemble)
    }

    fn initialize(&mut self) {
        let count = self.settings.pendulum_count;
        let noise_level = self.settings.noise_level;

        self.pendulums = (0..count)
            .map(|i| {
                let (d1, d2) = if i == 0 {
                    (0.0, 0.0)
                } else {
                    (self.noise.centered(noise_level), self.noise.centered(noise_level))
                };
                Pendulum {
                    id: i,
                    state: PendulumState::at_rest(
                        self.settings.initial_angle1 + d1,
                        self.settings.initial_angle2 + d2,
                    ),
                    initial_energy: None,
                    hue: i as f64 * 360.0 / count as f64,
                    trail: VecDeque::new(),
                }
            })
            .collect();

        let energies = self.pendulums.iter().map(|p| self.params.total_energy(&p.state));
        self.reference_energy = mean(energies);
        self.phase_history.clear();
        self.divergence_history.clear();
        self.lyapunov = LyapunovFit::NotYetCrossed;
        self.time = 0.0;
    }

    /// Timestep per tick
    pub fn dt(&self) -> f64 {
        PENDULUM_BASE_DT * self.settings.simulation_speed
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn params(&self) -> &PendulumParams {
        &self.params
    }

    pub fn settings(&self) -> &PendulumSettings {
        &self.settings
    }

    pub fn pendulums(&self) -> &[Pendulum] {
        &self.pendulums
    }

    pub fn phase_history(&self) -> &VecDeque<PhaseSnapshot> {
        &self.phase_history
    }

    pub fn divergence_history(&self) -> &VecDeque<DivergenceSample> {
        &self.divergence_history
    }

    pub fn lyapunov(&self) -> LyapunovFit {
        self.lyapunov
    }

    /// RMS phase-space distance of every pendulum from pendulum 0
    pub fn divergence(&self) -> f64 {
        let Some((reference, rest)) = self.pendulums.split_first() else {
            return 0.0;
        };
        if rest.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = rest
            .iter()
            .map(|p| reference.state.phase_distance(&p.state).powi(2))
            .sum();
        (sum_sq / rest.len() as f64).sqrt()
    }

    /// Change the timestep multiplier without resetting
    pub fn set_simulation_speed(&mut self, speed: f64) -> ConfigResult<()> {
        self.settings.simulation_speed = require_positive("simulationSpeed", speed)?;
        Ok(())
    }

    /// Change the trail length, trimming stored trails and phase history now
    pub fn set_trail_length(&mut self, trail_length: usize) {
        self.settings.trail_length = trail_length;
        for p in &mut self.pendulums {
            trim_front(&mut p.trail, trail_length);
        }
        let capacity = self.phase_capacity();
        trim_front(&mut self.phase_history, capacity);
    }

    /// Apply new settings; initial conditions take effect through a reset
    pub fn reconfigure(&mut self, settings: PendulumSettings) -> ConfigResult<()> {
        validate(&settings)?;
        if settings.seed != self.settings.seed {
            self.noise = UniformNoise::new(settings.seed);
        }
        self.settings = settings;
        self.reset();
        Ok(())
    }

    fn phase_capacity(&self) -> usize {
        self.settings.trail_length.div_ceil(PHASE_HISTORY_DIVISOR)
    }

    fn energies(&self) -> Vec<f64> {
        self.pendulums
            .iter()
            .map(|p| self.params.total_energy(&p.state))
            .collect()
    }
}

impl Simulator for PendulumEnsemble {
    type Metrics = PendulumMetrics;

    fn step(&mut self) -> StepOutcome {
        let dt = self.dt();
        let trail_length = self.settings.trail_length;
        let params = self.params;

        let mut advanced = false;
        for p in &mut self.pendulums {
            let target = *p
                .initial_energy
                .get_or_insert_with(|| params.total_energy(&p.state));

            if let Some(next) = params.step(&p.state, dt, Some(target)) {
                p.state = next;
                advanced = true;
                if trail_length > 0 {
                    p.trail.push_back(params.bob_positions(&next).1);
                }
                trim_front(&mut p.trail, trail_length);
            }
        }

        let snapshot = self
            .pendulums
            .iter()
            .map(|p| (p.state.angle1, p.state.angle2))
            .collect();
        let capacity = self.phase_capacity();
        self.phase_history.push_back(snapshot);
        trim_front(&mut self.phase_history, capacity);

        if self.pendulums.len() > 1 {
            let energy = mean(self.energies().into_iter());
            self.divergence_history.push_back(DivergenceSample {
                time: self.time,
                divergence: self.divergence(),
                max_divergence: params.max_divergence(energy),
                random_expected: params.random_expected_divergence(energy),
            });
            trim_front(&mut self.divergence_history, DIVERGENCE_HISTORY_MAX);
            self.lyapunov.observe(&self.divergence_history);
        }

        self.time += dt;

        if advanced {
            StepOutcome::Advanced
        } else {
            StepOutcome::Unchanged
        }
    }

    fn metrics(&self) -> PendulumMetrics {
        let energies = self.energies();
        let mean_energy = mean(energies.iter().copied());
        PendulumMetrics {
            time: self.time,
            mean_energy,
            reference_energy: self.reference_energy,
            divergence: self.divergence(),
            max_divergence: self.params.max_divergence(mean_energy),
            random_expected: self.params.random_expected_divergence(mean_energy),
            lyapunov: self.lyapunov,
            samples: self.divergence_history.len(),
            energies,
        }
    }

    fn reset(&mut self) {
        tracing::info!(pendulums = self.settings.pendulum_count, "pendulum ensemble reset");
        self.initialize();
    }
}

fn validate(settings: &PendulumSettings) -> ConfigResult<()> {
    if settings.pendulum_count == 0 {
        return Err(ConfigError::NoPendulums);
    }
    require_non_negative("noiseLevel", settings.noise_level)?;
    require_finite("initialAngle1", settings.initial_angle1)?;
    require_finite("initialAngle2", settings.initial_angle2)?;
    require_positive("simulationSpeed", settings.simulation_speed)?;
    Ok(())
}

fn trim_front<T>(buf: &mut VecDeque<T>, capacity: usize) {
    while buf.len() > capacity {
        buf.pop_front();
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn settings(count: usize, noise: f64) -> PendulumSettings {
        PendulumSettings {
            pendulum_count: count,
            noise_level: noise,
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_pendulum_is_unperturbed() {
        let ensemble = PendulumEnsemble::new(settings(5, 0.5)).unwrap();
        let first = ensemble.pendulums()[0].state;
        let s = ensemble.settings();
        assert_eq!(first, PendulumState::at_rest(s.initial_angle1, s.initial_angle2));

        for p in &ensemble.pendulums()[1..] {
            assert!((p.state.angle1 - first.angle1).abs() <= 0.25);
            assert!((p.state.angle2 - first.angle2).abs() <= 0.25);
        }
        assert_relative_eq!(ensemble.pendulums()[4].hue, 288.0);
    }

    #[test]
    fn test_initial_energy_recorded_on_first_tick() {
        let mut ensemble = PendulumEnsemble::new(settings(2, 0.0)).unwrap();
        assert!(ensemble.pendulums()[0].initial_energy.is_none());
        assert_relative_eq!(ensemble.metrics().reference_energy, 4.0, epsilon = 1e-12);

        ensemble.step();
        assert_relative_eq!(ensemble.pendulums()[0].initial_energy.unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trail_and_phase_history_bounded() {
        let mut s = settings(3, 0.01);
        s.trail_length = 12;
        let mut ensemble = PendulumEnsemble::new(s).unwrap();
        ensemble.advance(50);

        assert_eq!(ensemble.pendulums()[0].trail.len(), 12);
        assert_eq!(ensemble.phase_history().len(), 3);

        ensemble.set_trail_length(4);
        assert_eq!(ensemble.pendulums()[1].trail.len(), 4);
        assert_eq!(ensemble.phase_history().len(), 1);

        ensemble.set_trail_length(0);
        ensemble.step();
        assert!(ensemble.pendulums()[2].trail.is_empty());
        assert!(ensemble.phase_history().is_empty());
    }

    #[test]
    fn test_single_pendulum_records_no_divergence() {
        let mut ensemble = PendulumEnsemble::new(settings(1, 0.0)).unwrap();
        ensemble.advance(20);
        assert!(ensemble.divergence_history().is_empty());
        assert_eq!(ensemble.divergence(), 0.0);
        assert_eq!(ensemble.lyapunov(), LyapunovFit::NotYetCrossed);
    }

    #[test]
    fn test_time_advances_by_dt() {
        let mut s = settings(2, 0.0);
        s.simulation_speed = 0.5;
        let mut ensemble = PendulumEnsemble::new(s).unwrap();
        assert_relative_eq!(ensemble.dt(), 0.03);

        ensemble.advance(10);
        assert_relative_eq!(ensemble.time(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(ensemble.divergence_history()[0].time, 0.0);
        assert_relative_eq!(ensemble.divergence_history()[9].time, 0.27, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_settings() {
        assert_eq!(
            PendulumEnsemble::new(settings(0, 0.1)).unwrap_err(),
            ConfigError::NoPendulums
        );

        let mut s = settings(2, 0.1);
        s.simulation_speed = 0.0;
        assert!(matches!(
            PendulumEnsemble::new(s),
            Err(ConfigError::NonPositive { name: "simulationSpeed", .. })
        ));

        assert!(matches!(
            PendulumEnsemble::new(settings(2, f64::INFINITY)),
            Err(ConfigError::NonFinite { name: "noiseLevel", .. })
        ));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut ensemble = PendulumEnsemble::new(settings(3, 0.05)).unwrap();
        ensemble.advance(30);
        ensemble.reset();

        assert_eq!(ensemble.time(), 0.0);
        assert!(ensemble.divergence_history().is_empty());
        assert!(ensemble.phase_history().is_empty());
        assert!(ensemble
            .pendulums()
            .iter()
            .all(|p| p.trail.is_empty() && p.initial_energy.is_none()));
    }
}
