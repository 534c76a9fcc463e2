//! Simulator settings types.
//!
//! Field names serialize in camelCase so that a host can hand over the same
//! parameter objects its controls already use (`pendulumCount`,
//! `sharedLearningRate`, ...). Every section falls back to the demo defaults
//! for fields it does not mention.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

/// Double-pendulum ensemble settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendulumSettings {
    /// Number of pendulums in the ensemble
    pub pendulum_count: usize,

    /// Width of the uniform angle perturbation applied to every pendulum but the first
    pub noise_level: f64,

    /// Initial angle of the inner arm (radians, 0 = hanging down)
    pub initial_angle1: f64,

    /// Initial angle of the outer arm (radians)
    pub initial_angle2: f64,

    /// Number of outer-bob positions kept per pendulum (0 disables trails)
    pub trail_length: usize,

    /// Multiplier on the base timestep
    pub simulation_speed: f64,

    /// Seed for the perturbation source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for PendulumSettings {
    fn default() -> Self {
        Self {
            pendulum_count: 8,
            noise_level: 0.05,
            initial_angle1: FRAC_PI_2,
            initial_angle2: FRAC_PI_2,
            trail_length: 500,
            simulation_speed: 1.0,
            seed: None,
        }
    }
}

/// Closed-form 2-D loss surfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandscapeType {
    /// Rotated elliptical quadratic bowl
    #[default]
    Convex,
    /// Rosenbrock banana valley
    Rosenbrock,
    /// Beale function, x axis compressed by 3
    Beale,
    /// Rastrigin with shallow local minima
    Rastrigin,
}

impl LandscapeType {
    pub const ALL: [LandscapeType; 4] = [
        LandscapeType::Convex,
        LandscapeType::Rosenbrock,
        LandscapeType::Beale,
        LandscapeType::Rastrigin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandscapeType::Convex => "convex",
            LandscapeType::Rosenbrock => "rosenbrock",
            LandscapeType::Beale => "beale",
            LandscapeType::Rastrigin => "rastrigin",
        }
    }
}

impl fmt::Display for LandscapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandscapeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LandscapeType::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown landscape `{}`", s))
    }
}

/// The optimizer update rules available for comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizerKind {
    #[serde(rename = "sgd")]
    Sgd,
    #[serde(rename = "sgdMomentum")]
    SgdMomentum,
    #[serde(rename = "rmsprop")]
    RmsProp,
    #[serde(rename = "adam")]
    Adam,
    #[serde(rename = "adamw")]
    AdamW,
    #[serde(rename = "muon")]
    Muon,
    #[serde(rename = "shampoo")]
    Shampoo,
}

impl OptimizerKind {
    pub const ALL: [OptimizerKind; 7] = [
        OptimizerKind::Sgd,
        OptimizerKind::SgdMomentum,
        OptimizerKind::RmsProp,
        OptimizerKind::Adam,
        OptimizerKind::AdamW,
        OptimizerKind::Muon,
        OptimizerKind::Shampoo,
    ];

    /// Identifier used in settings files
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::SgdMomentum => "sgdMomentum",
            OptimizerKind::RmsProp => "rmsprop",
            OptimizerKind::Adam => "adam",
            OptimizerKind::AdamW => "adamw",
            OptimizerKind::Muon => "muon",
            OptimizerKind::Shampoo => "shampoo",
        }
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "SGD",
            OptimizerKind::SgdMomentum => "SGD+Momentum",
            OptimizerKind::RmsProp => "RMSprop",
            OptimizerKind::Adam => "Adam",
            OptimizerKind::AdamW => "AdamW",
            OptimizerKind::Muon => "Muon",
            OptimizerKind::Shampoo => "Shampoo",
        }
    }

    /// Trace color (hex string)
    pub fn color(&self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "#3b82f6",
            OptimizerKind::SgdMomentum => "#10b981",
            OptimizerKind::RmsProp => "#8b5cf6",
            OptimizerKind::Adam => "#f59e0b",
            OptimizerKind::AdamW => "#ec4899",
            OptimizerKind::Muon => "#ef4444",
            OptimizerKind::Shampoo => "#06b6d4",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptimizerKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown optimizer `{}`", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumParams {
    pub momentum: f64,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self { momentum: 0.9 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmsPropParams {
    /// Smoothing constant for the squared-gradient average
    pub alpha: f64,
    pub epsilon: f64,
}

impl Default for RmsPropParams {
    fn default() -> Self {
        Self {
            alpha: 0.99,
            epsilon: 1e-8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamParams {
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for AdamParams {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamWParams {
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub weight_decay: f64,
}

impl Default for AdamWParams {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuonParams {
    pub momentum: f64,
}

impl Default for MuonParams {
    fn default() -> Self {
        Self { momentum: 0.95 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShampooParams {
    /// Initial diagonal of the preconditioner
    pub epsilon: f64,
    /// Iterations between preconditioner refreshes
    pub update_freq: usize,
}

impl Default for ShampooParams {
    fn default() -> Self {
        Self {
            epsilon: 1e-4,
            update_freq: 1,
        }
    }
}

/// Per-optimizer hyperparameters (PyTorch defaults unless noted)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hyperparameters {
    pub sgd_momentum: MomentumParams,
    pub rmsprop: RmsPropParams,
    pub adam: AdamParams,
    pub adamw: AdamWParams,
    pub muon: MuonParams,
    pub shampoo: ShampooParams,
}

/// Optimizer comparison settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerSettings {
    pub landscape_type: LandscapeType,

    /// Learning rate shared by every optimizer
    pub shared_learning_rate: f64,

    /// Gradient noise level (0 = exact gradients)
    pub noise_level: f64,

    /// Host tick rate in steps per second
    pub speed: u32,

    /// Optimizers launched on each start point
    pub optimizers: Vec<OptimizerKind>,

    pub hyperparams: Hyperparameters,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            landscape_type: LandscapeType::Convex,
            shared_learning_rate: 0.003,
            noise_level: 0.0,
            speed: 20,
            optimizers: vec![OptimizerKind::Sgd, OptimizerKind::Adam],
            hyperparams: Hyperparameters::default(),
            seed: None,
        }
    }
}

/// Lattice random-walk settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalkSettings {
    pub steps_per_second: u32,

    /// Steps added by one bulk request
    pub bulk_steps: usize,

    /// Path length above which the performance warning is shown
    pub warn_limit: usize,

    /// Hard ceiling on the path length (origin included)
    pub max_limit: usize,

    /// How long the cap warning stays visible
    pub warning_duration_ms: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            steps_per_second: 10,
            bulk_steps: 1000,
            warn_limit: 100_000,
            max_limit: 200_000,
            warning_duration_ms: 3000,
            seed: None,
        }
    }
}

/// Self-drift term applied to every agent's cognitive map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftMode {
    #[default]
    None,
    /// Amplify the agent's current direction
    Echo,
    /// Pull toward a shared guidance map
    Guidance,
}

impl FromStr for DriftMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(DriftMode::None),
            "echo" => Ok(DriftMode::Echo),
            "guidance" => Ok(DriftMode::Guidance),
            _ => Err(format!("unknown drift mode `{}`", s)),
        }
    }
}

/// Cognitive-dynamics agent model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CognitiveSettings {
    /// Number of agents; must be a perfect square
    pub num_agents: usize,

    /// Columns of each cognitive map (D)
    pub dimensions: usize,

    /// Rows of each cognitive map (C)
    pub concepts: usize,

    pub self_drift: DriftMode,
    pub drift_strength: f64,
    pub interaction_strength: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CognitiveSettings {
    fn default() -> Self {
        Self {
            num_agents: 100,
            dimensions: 3,
            concepts: 2,
            self_drift: DriftMode::None,
            drift_strength: 0.02,
            interaction_strength: 0.05,
            seed: None,
        }
    }
}

/// Chinchilla-style scaling-law coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScalingSettings {
    /// Irreducible loss
    pub l0: f64,
    /// Parameter-count scale
    pub nc: f64,
    /// Data-token scale
    pub dc: f64,
    pub alpha_n: f64,
    pub alpha_d: f64,

    /// Compute budgets (FLOPs) drawn as fixed-compute curves
    pub fixed_compute: Vec<f64>,
}

impl Default for ScalingSettings {
    fn default() -> Self {
        Self {
            l0: 1.69,
            nc: 4.714e7,
            dc: 2.158e9,
            alpha_n: 0.34,
            alpha_d: 0.28,
            fixed_compute: vec![1e20, 1e21, 1e22],
        }
    }
}

/// Goal-directed agent arena settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalSettings {
    /// Weight of the utility gradient in the velocity update
    pub optimization_strength: f64,

    /// How strongly mesa-optimizers favour their own goals
    pub mesa_emergence: f64,

    pub noise_level: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            optimization_strength: 0.5,
            mesa_emergence: 0.3,
            noise_level: 0.2,
            seed: None,
        }
    }
}

/// Settings for every simulator, as loaded from a single JSON file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VizConfig {
    pub pendulum: PendulumSettings,
    pub optimizer: OptimizerSettings,
    pub walk: WalkSettings,
    pub cognitive: CognitiveSettings,
    pub scaling: ScalingSettings,
    pub goals: GoalSettings,
}

impl VizConfig {
    /// Parse a configuration document; missing sections use defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = VizConfig::from_json(
            r#"{
                "pendulum": { "pendulumCount": 3 },
                "optimizer": { "landscapeType": "rosenbrock" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.pendulum.pendulum_count, 3);
        assert_eq!(config.pendulum.trail_length, 500);
        assert_eq!(config.optimizer.landscape_type, LandscapeType::Rosenbrock);
        assert_eq!(config.optimizer.shared_learning_rate, 0.003);
        assert_eq!(config.walk.max_limit, 200_000);
    }

    #[test]
    fn test_optimizer_kind_names() {
        let settings: OptimizerSettings = serde_json::from_str(
            r#"{ "optimizers": ["sgdMomentum", "rmsprop", "adamw", "shampoo"] }"#,
        )
        .unwrap();

        assert_eq!(
            settings.optimizers,
            vec![
                OptimizerKind::SgdMomentum,
                OptimizerKind::RmsProp,
                OptimizerKind::AdamW,
                OptimizerKind::Shampoo
            ]
        );
        assert_eq!("muon".parse::<OptimizerKind>().unwrap(), OptimizerKind::Muon);
        assert!("lion".parse::<OptimizerKind>().is_err());
    }

    #[test]
    fn test_hyperparameter_defaults() {
        let hp = Hyperparameters::default();
        assert_eq!(hp.sgd_momentum.momentum, 0.9);
        assert_eq!(hp.rmsprop.alpha, 0.99);
        assert_eq!(hp.adamw.weight_decay, 0.01);
        assert_eq!(hp.muon.momentum, 0.95);
        assert_eq!(hp.shampoo.update_freq, 1);
    }

    #[test]
    fn test_landscape_defaults_to_convex() {
        assert_eq!(LandscapeType::default(), LandscapeType::Convex);
        let s: OptimizerSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s.landscape_type, LandscapeType::Convex);
    }

    #[test]
    fn test_drift_mode_roundtrip_names() {
        let s: CognitiveSettings = serde_json::from_str(r#"{ "selfDrift": "echo" }"#).unwrap();
        assert_eq!(s.self_drift, DriftMode::Echo);
        assert_eq!("Guidance".parse::<DriftMode>().unwrap(), DriftMode::Guidance);
    }
}
