//! Double-pendulum chaos ensemble
//!
//! - [`dynamics`]: equations of motion, energy and the integrator step
//! - [`ensemble`]: the perturbed ensemble, trails and divergence history
//! - [`lyapunov`]: the log-linear growth-rate fit triggered at randomization

pub mod dynamics;
pub mod ensemble;
pub mod lyapunov;

pub use dynamics::*;
pub use ensemble::*;
pub use lyapunov::*;
