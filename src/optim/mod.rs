//! Optimizer comparison on 2-D loss landscapes
//!
//! Provides the closed-form landscapes, finite-difference gradients, the
//! seven update rules and the lockstep run bank.

pub mod bank;
pub mod gradient;
pub mod landscape;
pub mod rules;

pub use bank::*;
pub use gradient::*;
pub use landscape::*;
pub use rules::*;
