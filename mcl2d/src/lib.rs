//! Monte Carlo localization of a planar vehicle against a known landmark map
//!
//! A [`ParticleFilter`] keeps a fixed-size population of weighted pose hypotheses and runs
//! the cycle predict, weigh, resample after a single initialization.

pub mod config;
pub mod error;
pub mod filter;
pub mod math;
pub mod measurement;
pub mod motion;
pub mod resample;
pub mod summary;
pub mod types;

pub use config::{FilterConfig, MeasurementStd, PoseStd};
pub use error::{ConfigError, FilterError, ResampleError};
pub use filter::ParticleFilter;
pub use motion::{CtrvModel, MotionModel};
pub use resample::{Resampler, ResamplingStrategy};
pub use summary::{HighestWeight, PoseEstimator, WeightedMeanPose};
pub use types::{Control, Landmark, Map, Observation, Particle, Pose};
