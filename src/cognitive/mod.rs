//! Coupled cognitive maps on a square agent grid
//!
//! Each agent owns a `concepts × dimensions` matrix of unit Frobenius norm.
//! Neighbours pull on each other in proportion to how much they already
//! agree, and an optional self-drift either amplifies an agent's own map or
//! pulls it toward a shared guidance target. Agents update in place in index
//! order, so an agent already sees the new maps of lower-indexed neighbours.

pub mod metrics;

pub use metrics::*;

use nalgebra::DMatrix;
use tracing::info;

use vizsim_types::{CognitiveSettings, DriftMode};

use crate::error::{require_finite, ConfigError, ConfigResult};
use crate::noise::UniformNoise;
use crate::simulator::{Simulator, StepOutcome};
use crate::utils::constants::COGNITIVE_DT;

/// One agent of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: usize,
    pub row: usize,
    pub col: usize,
    /// Display hue in degrees
    pub hue: f64,
    /// Cognitive map, `concepts × dimensions`
    pub map: DMatrix<f64>,
}

#[derive(Debug, Clone)]
pub struct CognitiveModel {
    settings: CognitiveSettings,
    noise: UniformNoise,
    side: usize,
    agents: Vec<Agent>,
    guidance: DMatrix<f64>,
    neighbors: Vec<Vec<usize>>,
    time: f64,
    metrics: CognitiveMetrics,
}

impl CognitiveModel {
    pub fn new(settings: CognitiveSettings) -> ConfigResult<Self> {
        let side = validate(&settings)?;
        let mut model = Self {
            noise: UniformNoise::new(settings.seed),
            side,
            agents: Vec::new(),
            guidance: DMatrix::zeros(settings.concepts, settings.dimensions),
            neighbors: grid_neighbors(side),
            time: 0.0,
            metrics: CognitiveMetrics::default(),
            settings,
        };
        model.initialize();
        Ok(model)
    }

    pub fn settings(&self) -> &CognitiveSettings {
        &self.settings
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Grid side length (√A)
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn guidance(&self) -> &DMatrix<f64> {
        &self.guidance
    }

    /// Indices of the up/down/left/right neighbours of agent `id`
    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.neighbors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_drift(&mut self, mode: DriftMode, strength: f64) -> ConfigResult<()> {
        self.settings.drift_strength = require_finite("drift_strength", strength)?;
        self.settings.self_drift = mode;
        Ok(())
    }

    pub fn set_interaction_strength(&mut self, strength: f64) -> ConfigResult<()> {
        self.settings.interaction_strength = require_finite("interaction_strength", strength)?;
        Ok(())
    }

    /// Replace the settings and reinitialize every agent
    pub fn reconfigure(&mut self, settings: CognitiveSettings) -> ConfigResult<()> {
        let side = validate(&settings)?;
        if settings.seed != self.settings.seed {
            self.noise = UniformNoise::new(settings.seed);
        }
        self.side = side;
        self.neighbors = grid_neighbors(side);
        self.settings = settings;
        self.initialize();
        Ok(())
    }

    fn initialize(&mut self) {
        let CognitiveSettings {
            num_agents,
            dimensions,
            concepts,
            ..
        } = self.settings;
        let half = self.side as f64 / 2.0;

        let noise = &mut self.noise;
        let mut guidance = DMatrix::from_fn(concepts, dimensions, |_, _| 0.5 * noise.unit());
        normalize_frobenius(&mut guidance);
        self.guidance = guidance;

        self.agents = (0..num_agents)
            .map(|id| {
                let row = id / self.side;
                let col = id % self.side;
                let region_bias = if (row as f64) < half { 1.0 } else { -1.0 };
                let column_bias = if (col as f64) < half { 0.5 } else { -0.5 };
                let noise = &mut self.noise;
                let mut map = DMatrix::from_fn(concepts, dimensions, |c, _| {
                    let weight = if c == 0 { 1.0 } else { 0.5 };
                    (region_bias + column_bias) * weight * noise.unit() + 0.3 * noise.unit()
                });
                normalize_frobenius(&mut map);
                Agent {
                    id,
                    row,
                    col,
                    hue: id as f64 * 360.0 / num_agents as f64,
                    map,
                }
            })
            .collect();

        self.time = 0.0;
        self.refresh_metrics();
    }

    fn refresh_metrics(&mut self) {
        self.metrics = CognitiveMetrics::compute(self.agents.iter().map(|a| &a.map), self.time);
    }

    /// Rate of change of agent `i`'s map given the current maps
    fn derivative(&self, i: usize) -> DMatrix<f64> {
        let x = &self.agents[i].map;
        let kappa = self.settings.interaction_strength;
        let mut dx = DMatrix::zeros(x.nrows(), x.ncols());

        for &j in self.neighbors(i) {
            let xj = &self.agents[j].map;
            let weight = kappa * frobenius_product(x, xj);
            dx += (xj - x) * weight;
        }

        let lambda = self.settings.drift_strength;
        match self.settings.self_drift {
            DriftMode::None => {}
            DriftMode::Echo => dx += x * lambda,
            DriftMode::Guidance => dx += (&self.guidance - x) * lambda,
        }
        dx
    }
}

impl Simulator for CognitiveModel {
    type Metrics = CognitiveMetrics;

    fn step(&mut self) -> StepOutcome {
        for i in 0..self.agents.len() {
            let dx = self.derivative(i);
            let map = &mut self.agents[i].map;
            *map += dx * COGNITIVE_DT;
            normalize_frobenius(map);
        }

        self.time += COGNITIVE_DT;
        self.refresh_metrics();
        StepOutcome::Advanced
    }

    fn metrics(&self) -> CognitiveMetrics {
        self.metrics
    }

    fn reset(&mut self) {
        info!(agents = self.settings.num_agents, "Resetting cognitive model");
        self.initialize();
    }
}

/// Side length of the agent grid, or the reason the settings are rejected
fn validate(settings: &CognitiveSettings) -> ConfigResult<usize> {
    let side = integer_sqrt(settings.num_agents)
        .filter(|&s| s > 0)
        .ok_or(ConfigError::NotPerfectSquare(settings.num_agents))?;
    if settings.dimensions == 0 {
        return Err(ConfigError::EmptyMap("dimension"));
    }
    if settings.concepts == 0 {
        return Err(ConfigError::EmptyMap("concept"));
    }
    require_finite("drift_strength", settings.drift_strength)?;
    require_finite("interaction_strength", settings.interaction_strength)?;
    Ok(side)
}

fn integer_sqrt(n: usize) -> Option<usize> {
    let mut side = (n as f64).sqrt().round() as usize;
    // Guard against float rounding for large n
    while side * side > n {
        side -= 1;
    }
    while (side + 1) * (side + 1) <= n {
        side += 1;
    }
    (side * side == n).then_some(side)
}

/// 4-connected neighbour lists of a `side × side` grid, in row-major order
fn grid_neighbors(side: usize) -> Vec<Vec<usize>> {
    (0..side * side)
        .map(|i| {
            let (row, col) = (i / side, i % side);
            let mut list = Vec::with_capacity(4);
            if row > 0 {
                list.push(i - side);
            }
            if row + 1 < side {
                list.push(i + side);
            }
            if col > 0 {
                list.push(i - 1);
            }
            if col + 1 < side {
                list.push(i + 1);
            }
            list
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn settings(num_agents: usize) -> CognitiveSettings {
        CognitiveSettings {
            num_agents,
            seed: Some(11),
            ..Default::default()
        }
    }

    #[test]
    fn test_grid_layout() {
        let model = CognitiveModel::new(settings(9)).unwrap();
        assert_eq!(model.side(), 3);
        assert_eq!(model.agents().len(), 9);

        let agent = &model.agents()[5];
        assert_eq!((agent.row, agent.col), (1, 2));
        assert_relative_eq!(agent.hue, 200.0, epsilon = 1e-12);

        // Corner, edge and centre
        assert_eq!(model.neighbors(0), &[3, 1]);
        assert_eq!(model.neighbors(5), &[2, 8, 4]);
        assert_eq!(model.neighbors(4).len(), 4);
    }

    #[test]
    fn test_maps_start_normalized() {
        let model = CognitiveModel::new(settings(16)).unwrap();
        for agent in model.agents() {
            assert_eq!(agent.map.shape(), (2, 3));
            assert_relative_eq!(agent.map.norm(), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(model.guidance().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_preserved_under_echo() {
        let mut model = CognitiveModel::new(CognitiveSettings {
            self_drift: DriftMode::Echo,
            drift_strength: 0.5,
            interaction_strength: 0.3,
            ..settings(25)
        })
        .unwrap();

        for _ in 0..50 {
            model.step();
            for agent in model.agents() {
                assert_relative_eq!(agent.map.norm(), 1.0, epsilon = 1e-10);
            }
        }
        assert_relative_eq!(model.time(), 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_no_coupling_no_drift() {
        let mut model = CognitiveModel::new(CognitiveSettings {
            interaction_strength: 0.0,
            self_drift: DriftMode::None,
            ..settings(16)
        })
        .unwrap();
        let before: Vec<_> = model.agents().iter().map(|a| a.map.clone()).collect();

        model.advance(200);

        for (agent, initial) in model.agents().iter().zip(&before) {
            assert_relative_eq!(agent.map, *initial, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_agents_update_in_index_order() {
        let mut model = CognitiveModel::new(CognitiveSettings {
            interaction_strength: 5.0,
            self_drift: DriftMode::None,
            ..settings(4)
        })
        .unwrap();
        let before: Vec<_> = model.agents().iter().map(|a| a.map.clone()).collect();

        let advance_agent = |maps: &[DMatrix<f64>], i: usize| {
            let mut dx = DMatrix::zeros(maps[i].nrows(), maps[i].ncols());
            for &j in model.neighbors(i) {
                let weight = 5.0 * frobenius_product(&maps[i], &maps[j]);
                dx += (&maps[j] - &maps[i]) * weight;
            }
            let mut next = &maps[i] + dx * COGNITIVE_DT;
            normalize_frobenius(&mut next);
            next
        };

        let mut sequential = before.clone();
        for i in 0..4 {
            sequential[i] = advance_agent(&sequential, i);
        }
        // Agent 3 neighbours agents 1 and 2, which move first
        let from_snapshot = advance_agent(&before, 3);

        model.step();

        for (agent, expected) in model.agents().iter().zip(&sequential) {
            assert_relative_eq!(agent.map, *expected, epsilon = 1e-12);
        }
        assert!((&from_snapshot - &sequential[3]).norm() > 1e-9);
    }

    #[test]
    fn test_guidance_pulls_toward_target() {
        let mut model = CognitiveModel::new(CognitiveSettings {
            interaction_strength: 0.0,
            self_drift: DriftMode::Guidance,
            drift_strength: 5.0,
            ..settings(4)
        })
        .unwrap();
        let target = model.guidance().clone();
        let start = frobenius_product(&model.agents()[0].map, &target);

        model.advance(300);

        let end = frobenius_product(&model.agents()[0].map, &target);
        assert!(end > start);
        assert!(end > 0.99);
    }

    #[test]
    fn test_metrics_refreshed_each_step() {
        let mut model = CognitiveModel::new(settings(9)).unwrap();
        assert_eq!(model.metrics().time, 0.0);
        model.step();
        let metrics = model.metrics();
        assert_relative_eq!(metrics.time, COGNITIVE_DT, epsilon = 1e-15);
        assert!(metrics.average_rank >= 1.0 - 1e-9);
        assert!((0.0..=1.0).contains(&metrics.domain_walls));
        assert!(!model.is_terminal());
    }

    #[test]
    fn test_invalid_settings() {
        assert_eq!(
            CognitiveModel::new(settings(10)).unwrap_err(),
            ConfigError::NotPerfectSquare(10)
        );
        assert_eq!(
            CognitiveModel::new(settings(0)).unwrap_err(),
            ConfigError::NotPerfectSquare(0)
        );
        assert_eq!(
            CognitiveModel::new(CognitiveSettings {
                dimensions: 0,
                ..settings(4)
            })
            .unwrap_err(),
            ConfigError::EmptyMap("dimension")
        );
        assert!(CognitiveModel::new(CognitiveSettings {
            drift_strength: f64::NAN,
            ..settings(4)
        })
        .is_err());
    }

    #[test]
    fn test_seeded_reset_is_reproducible() {
        let a = CognitiveModel::new(settings(9)).unwrap();
        let b = CognitiveModel::new(settings(9)).unwrap();
        assert_eq!(a.agents(), b.agents());

        let mut c = CognitiveModel::new(settings(9)).unwrap();
        c.advance(10);
        c.reset();
        assert_eq!(c.time(), 0.0);
        for agent in c.agents() {
            assert_relative_eq!(agent.map.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_integer_sqrt() {
        assert_eq!(integer_sqrt(0), Some(0));
        assert_eq!(integer_sqrt(1), Some(1));
        assert_eq!(integer_sqrt(100), Some(10));
        assert_eq!(integer_sqrt(99), None);
    }
}
