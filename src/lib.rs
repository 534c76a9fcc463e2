//! VizSim - frame-stepped simulators for interactive visualizations
//!
//! Headless cores for a set of teaching visualizations: a chaotic
//! double-pendulum ensemble, an optimizer race over 2-D loss surfaces, a
//! lattice random walk, coupled cognitive maps on an agent grid,
//! goal-directed agents and a closed-form scaling-law frontier.
//!
//! # Architecture
//!
//! Every stateful simulator implements [`Simulator`]:
//! - `new(settings)` validates its settings once and returns [`ConfigError`] on rejection
//! - `step()` advances exactly one host tick and never fails
//! - `metrics()` returns a serializable snapshot for display
//!
//! Randomness is injected through a seeded [`UniformNoise`] owned by each
//! simulator, so a fixed seed reproduces a run exactly. Settings types live in
//! the `vizsim-types` crate and are re-exported here.
//!
//! # Example
//!
//! ```rust,ignore
//! use vizsim::prelude::*;
//!
//! let mut bank = OptimizerBank::new(OptimizerSettings {
//!     landscape_type: LandscapeType::Rosenbrock,
//!     optimizers: vec![OptimizerKind::SgdMomentum, OptimizerKind::Adam],
//!     ..Default::default()
//! })?;
//! bank.launch(Vector2::new(-1.0, 1.0));
//!
//! while !bank.is_terminal() {
//!     bank.step();
//! }
//! for run in bank.metrics().runs {
//!     println!("{}: {:?} after {} steps", run.name, run.status, run.steps);
//! }
//! ```

pub mod cognitive;
pub mod error;
pub mod goals;
pub mod noise;
pub mod optim;
pub mod pendulum;
pub mod scaling;
pub mod simulator;
pub mod utils;
pub mod walk;

pub use error::{ConfigError, ConfigResult};
pub use noise::UniformNoise;
pub use simulator::{Simulator, StepOutcome, TerminalReason};
pub use vizsim_types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cognitive::{CognitiveMetrics, CognitiveModel};
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::goals::{GoalArena, GoalMetrics, Objective};
    pub use crate::optim::{OptimizerBank, OptimizerMetrics, RunStatus};
    pub use crate::pendulum::{PendulumEnsemble, PendulumMetrics};
    pub use crate::scaling::{FrontierPoint, ScalingLaw};
    pub use crate::simulator::{Simulator, StepOutcome, TerminalReason};
    pub use crate::walk::{Direction, RandomWalk, WalkMetrics};
    pub use nalgebra::Vector2;
    pub use vizsim_types::{
        CognitiveSettings, DriftMode, GoalSettings, LandscapeType, OptimizerKind,
        OptimizerSettings, PendulumSettings, ScalingSettings, VizConfig, WalkSettings,
    };
}
