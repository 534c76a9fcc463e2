//! Side-by-side optimizer runs on one loss surface
//!
//! Launching from a start point creates one run per selected optimizer. All
//! runs share the landscape, learning rate and gradient noise, and advance in
//! lockstep: one update per active run per tick.

use nalgebra::Vector2;
use serde::Serialize;

use vizsim_types::{LandscapeType, OptimizerKind, OptimizerSettings};

use super::landscape::LossSurface;
use super::rules::{build_rule, UpdateRule};
use crate::error::{require_non_negative, require_positive, ConfigError, ConfigResult};
use crate::noise::UniformNoise;
use crate::simulator::{Simulator, StepOutcome, TerminalReason};
use crate::utils::constants::{
    CONVERGENCE_RADIUS, DIVERGENCE_LOSS, GRADIENT_NOISE_SCALE, MAX_RUN_STEPS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Active,
    /// Came within the convergence radius of the optimum
    Converged,
    /// Loss exceeded the divergence threshold or stopped being finite
    Diverged,
    /// Hit the update cap without converging or diverging
    Stalled,
}

/// One optimizer's trajectory
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerRun {
    pub kind: OptimizerKind,
    pub start: Vector2<f64>,
    /// Visited positions, start point first
    pub path: Vec<Vector2<f64>>,
    /// Loss at each path point
    pub losses: Vec<f64>,
    pub status: RunStatus,
    #[serde(skip)]
    rule: Box<dyn UpdateRule>,
}

impl OptimizerRun {
    pub fn is_active(&self) -> bool {
        self.status == RunStatus::Active
    }

    pub fn is_diverged(&self) -> bool {
        self.status == RunStatus::Diverged
    }

    pub fn position(&self) -> Vector2<f64> {
        self.path.last().copied().unwrap_or(self.start)
    }

    pub fn loss(&self) -> f64 {
        self.losses.last().copied().unwrap_or(f64::NAN)
    }

    /// Updates applied so far
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn rule(&self) -> &dyn UpdateRule {
        self.rule.as_ref()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub kind: OptimizerKind,
    pub name: &'static str,
    pub position: Vector2<f64>,
    pub loss: f64,
    pub steps: usize,
    pub status: RunStatus,
    pub distance_to_optimum: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerMetrics {
    pub landscape: LandscapeType,
    pub learning_rate: f64,
    pub start: Option<Vector2<f64>>,
    pub runs: Vec<RunSummary>,
}

#[derive(Debug)]
pub struct OptimizerBank {
    settings: OptimizerSettings,
    noise: UniformNoise,
    start: Option<Vector2<f64>>,
    runs: Vec<OptimizerRun>,
}

impl OptimizerBank {
    pub fn new(settings: OptimizerSettings) -> ConfigResult<Self> {
        validate(&settings)?;
        let noise = UniformNoise::new(settings.seed);
        Ok(Self {
            settings,
            noise,
            start: None,
            runs: Vec::new(),
        })
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    pub fn landscape(&self) -> LandscapeType {
        self.settings.landscape_type
    }

    pub fn runs(&self) -> &[OptimizerRun] {
        &self.runs
    }

    pub fn run(&self, kind: OptimizerKind) -> Option<&OptimizerRun> {
        self.runs.iter().find(|r| r.kind == kind)
    }

    pub fn start(&self) -> Option<Vector2<f64>> {
        self.start
    }

    /// Replace all runs with fresh ones starting at `start`
    pub fn launch(&mut self, start: Vector2<f64>) {
        let landscape = self.settings.landscape_type;
        let loss = landscape.loss(start);
        self.runs = self
            .settings
            .optimizers
            .iter()
            .map(|&kind| OptimizerRun {
                kind,
                start,
                path: vec![start],
                losses: vec![loss],
                status: RunStatus::Active,
                rule: build_rule(kind, &self.settings.hyperparams),
            })
            .collect();
        self.start = Some(start);
        tracing::debug!(
            %landscape,
            x = start.x,
            y = start.y,
            runs = self.runs.len(),
            "optimizers launched"
        );
    }

    /// Noisy gradient oracle: central differences plus uniform jitter
    pub fn gradient(&mut self, p: Vector2<f64>) -> Vector2<f64> {
        let clean = self.settings.landscape_type.gradient(p);
        let width = self.settings.noise_level * GRADIENT_NOISE_SCALE;
        if width == 0.0 {
            return clean;
        }
        clean + Vector2::new(self.noise.centered(width), self.noise.centered(width))
    }

    /// Switch surfaces; existing runs are discarded
    pub fn set_landscape(&mut self, landscape: LandscapeType) {
        self.settings.landscape_type = landscape;
        self.clear();
    }

    /// Takes effect on the next tick of the current runs
    pub fn set_learning_rate(&mut self, lr: f64) -> ConfigResult<()> {
        self.settings.shared_learning_rate = require_positive("sharedLearningRate", lr)?;
        Ok(())
    }

    pub fn set_noise_level(&mut self, noise_level: f64) -> ConfigResult<()> {
        self.settings.noise_level = require_non_negative("noiseLevel", noise_level)?;
        Ok(())
    }

    /// Apply new settings; runs restart from the current start point, if any
    pub fn reconfigure(&mut self, settings: OptimizerSettings) -> ConfigResult<()> {
        validate(&settings)?;
        if settings.seed != self.settings.seed {
            self.noise = UniformNoise::new(settings.seed);
        }
        let landscape_changed = settings.landscape_type != self.settings.landscape_type;
        self.settings = settings;
        match self.start {
            Some(start) if !landscape_changed => self.launch(start),
            _ => self.clear(),
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.runs.clear();
        self.start = None;
    }

    fn terminal_reason(&self) -> TerminalReason {
        let all = |status: RunStatus| {
            !self.runs.is_empty() && self.runs.iter().all(|r| r.status == status)
        };
        if all(RunStatus::Converged) {
            TerminalReason::Converged
        } else if all(RunStatus::Diverged) {
            TerminalReason::Diverged
        } else {
            TerminalReason::Finished
        }
    }
}

impl Simulator for OptimizerBank {
    type Metrics = OptimizerMetrics;

    fn step(&mut self) -> StepOutcome {
        if self.is_terminal() {
            return StepOutcome::Terminal(self.terminal_reason());
        }

        let landscape = self.settings.landscape_type;
        let optimum = landscape.optimum();
        let lr = self.settings.shared_learning_rate;

        for i in 0..self.runs.len() {
            if !self.runs[i].is_active() {
                continue;
            }
            let position = self.runs[i].position();
            let grad = self.gradient(position);

            let run = &mut self.runs[i];
            let iteration = run.path.len();
            let next = run.rule.update(position, grad, lr, iteration);
            let loss = landscape.loss(next);
            run.path.push(next);
            run.losses.push(loss);

            let distance = (next - optimum).norm();
            if distance < CONVERGENCE_RADIUS {
                run.status = RunStatus::Converged;
                tracing::debug!(
                    optimizer = %run.kind,
                    steps = run.steps(),
                    distance,
                    "run converged"
                );
            } else if !loss.is_finite() || loss > DIVERGENCE_LOSS {
                run.status = RunStatus::Diverged;
                tracing::debug!(optimizer = %run.kind, steps = run.steps(), loss, "run diverged");
            } else if run.steps() >= MAX_RUN_STEPS {
                run.status = RunStatus::Stalled;
                tracing::warn!(
                    optimizer = %run.kind,
                    steps = run.steps(),
                    "run stopped at update cap"
                );
            }
        }

        if self.is_terminal() {
            StepOutcome::Terminal(self.terminal_reason())
        } else {
            StepOutcome::Advanced
        }
    }

    /// True when no run is active, including before the first launch
    fn is_terminal(&self) -> bool {
        self.runs.iter().all(|r| !r.is_active())
    }

    fn metrics(&self) -> OptimizerMetrics {
        let optimum = self.settings.landscape_type.optimum();
        OptimizerMetrics {
            landscape: self.settings.landscape_type,
            learning_rate: self.settings.shared_learning_rate,
            start: self.start,
            runs: self
                .runs
                .iter()
                .map(|r| RunSummary {
                    kind: r.kind,
                    name: r.kind.display_name(),
                    position: r.position(),
                    loss: r.loss(),
                    steps: r.steps(),
                    status: r.status,
                    distance_to_optimum: (r.position() - optimum).norm(),
                })
                .collect(),
        }
    }

    fn reset(&mut self) {
        tracing::info!(landscape = %self.settings.landscape_type, "optimizer runs cleared");
        self.clear();
    }
}

fn validate(settings: &OptimizerSettings) -> ConfigResult<()> {
    require_positive("sharedLearningRate", settings.shared_learning_rate)?;
    require_non_negative("noiseLevel", settings.noise_level)?;
    if settings.optimizers.is_empty() {
        return Err(ConfigError::NoOptimizers);
    }
    if settings.hyperparams.shampoo.update_freq == 0 {
        return Err(ConfigError::ZeroUpdateFrequency);
    }
    Ok(())
}
