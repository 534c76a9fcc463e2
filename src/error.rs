//! Construction-time validation errors.
//!
//! Simulators are validated once, when they are built or reconfigured.
//! Runtime numeric trouble (non-finite updates, exploding losses) is reported
//! through [`StepOutcome`](crate::simulator::StepOutcome) instead.

use thiserror::Error;

/// Invalid simulator settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("`{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("`{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("`{name}` must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("At least one pendulum is required")]
    NoPendulums,

    #[error("No optimizers selected")]
    NoOptimizers,

    #[error("Shampoo update frequency must be at least 1")]
    ZeroUpdateFrequency,

    #[error("Agent count {0} is not a positive perfect square")]
    NotPerfectSquare(usize),

    #[error("Cognitive maps need at least one {0}")]
    EmptyMap(&'static str),

    #[error("Walk limits out of order: warn limit {warn} exceeds max limit {max}")]
    LimitsInverted { warn: usize, max: usize },

    #[error("Walk max limit must leave room for the origin")]
    ZeroLimit,

    #[error("Sample range for `{name}` is empty: [{min}, {max}]")]
    EmptyRange { name: &'static str, min: f64, max: f64 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub(crate) fn require_finite(name: &'static str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> ConfigResult<f64> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

pub(crate) fn require_non_negative(name: &'static str, value: f64) -> ConfigResult<f64> {
    require_finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
