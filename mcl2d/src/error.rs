//! Error types for filter configuration and the filter cycle.

use thiserror::Error;

/// Errors reported when a [`FilterConfig`](crate::FilterConfig) is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The population must hold at least one particle.
    #[error("number of particles must be positive")]
    ZeroParticles,
    /// A standard deviation was negative.
    #[error("standard deviation `{field}` must not be negative")]
    NegativeStd { field: &'static str },
    /// The likelihood coefficient divides by the measurement standard deviations.
    #[error("measurement standard deviations must be strictly positive")]
    NonPositiveMeasurementStd,
    /// Landmarks can only be observed inside a positive range.
    #[error("sensor range must be strictly positive")]
    NonPositiveSensorRange,
    /// A configuration value was NaN or infinite.
    #[error("configuration value `{field}` must be finite")]
    NonFinite { field: &'static str },
}

/// Errors that can occur while drawing a new population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResampleError {
    /// There is nothing to draw from.
    #[error("cannot resample an empty weight sequence")]
    Empty,
    /// A weight was negative or not finite.
    #[error("weight at index {index} is negative or not finite")]
    InvalidWeight { index: usize },
    /// Every weight is zero, so no particle explains the observations.
    #[error("weights sum to zero")]
    ZeroWeightSum,
}

/// Errors that can occur during a filter cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterError {
    /// `predict`, `update_weights` or `resample` was called before `init`.
    #[error("particle filter has not been initialized")]
    NotInitialized,
    /// The elapsed time of a prediction must be finite and positive.
    #[error("time step must be finite and positive")]
    InvalidTimeStep,
    /// The weight vector cannot be used as resampling probabilities.
    #[error("degenerate particle weights: {0}")]
    DegenerateWeights(#[from] ResampleError),
}
