//! Simulation constants and defaults

// --- Double pendulum ---

/// Base timestep, multiplied by the simulation speed
pub const PENDULUM_BASE_DT: f64 = 0.06;

/// Angular accelerations are clamped to ±this value
pub const PENDULUM_MAX_ACCELERATION: f64 = 1000.0;

/// Kinetic energy below which velocities are not rescaled
pub const PENDULUM_MIN_KINETIC_ENERGY: f64 = 0.001;

/// One phase-space snapshot is kept per this many trail points
pub const PHASE_HISTORY_DIVISOR: usize = 5;

/// Upper bound on stored divergence samples (oldest dropped first)
pub const DIVERGENCE_HISTORY_MAX: usize = 20_000;

/// Samples required before the random-crossing check runs
pub const LYAPUNOV_MIN_SAMPLES: usize = 11;

/// Points required for the log-linear fit
pub const LYAPUNOV_MIN_FIT_POINTS: usize = 5;

/// Largest exponent accepted as physical
pub const LYAPUNOV_MAX_EXPONENT: f64 = 10.0;

/// Divergences at or below this are excluded from the fit
pub const LYAPUNOV_MIN_DIVERGENCE: f64 = 1e-10;

// --- Optimizer comparison ---

/// Central-difference step for landscape gradients
pub const GRADIENT_STEP: f64 = 1e-4;

/// Gradient noise is (U - 0.5) * noise_level * this
pub const GRADIENT_NOISE_SCALE: f64 = 0.1;

/// Distance to the known optimum that counts as converged
pub const CONVERGENCE_RADIUS: f64 = 0.05;

/// Loss above which a run is declared diverged
pub const DIVERGENCE_LOSS: f64 = 1e6;

/// Runs stop after this many updates without converging or diverging
pub const MAX_RUN_STEPS: usize = 200_000;

/// Norm guard in the Muon update
pub const MUON_NORM_EPSILON: f64 = 1e-8;

/// Decay of the diagonal Shampoo statistics
pub const SHAMPOO_DECAY: f64 = 0.99;

// --- Cognitive dynamics ---

/// Euler step of the cognitive-map update
pub const COGNITIVE_DT: f64 = 0.01;

/// Neighbour overlap below which a pair counts as a domain wall
pub const DOMAIN_WALL_OVERLAP: f64 = 0.1;

// --- Random walk ---

/// Intervals in the sampled Rayleigh curve (the curve has one more point)
pub const RAYLEIGH_INTERVALS: usize = 50;

/// The Rayleigh curve spans [0, this * sqrt(t)]
pub const RAYLEIGH_WINDOW: f64 = 4.0;

// --- Goal-directed agents ---

/// Forward-difference step for the utility gradient
pub const GOAL_GRADIENT_STEP: f64 = 1.0;

/// Length scale of goal attraction: value * exp(-distance / this)
pub const GOAL_FALLOFF: f64 = 100.0;

/// Velocity retained each tick
pub const GOAL_DAMPING: f64 = 0.9;

/// Agent speed limit (arena units per tick)
pub const GOAL_MAX_SPEED: f64 = 5.0;

/// Trail points kept per agent
pub const GOAL_TRAIL_LENGTH: usize = 30;

/// Small tolerance for numerical comparisons
pub const TOLERANCE: f64 = 1e-16;
