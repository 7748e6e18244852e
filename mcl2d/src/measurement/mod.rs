//! Measurement model: body-to-map transform, data association and landmark likelihood.

pub mod association;
pub mod likelihood;
pub mod transform;

pub use association::{associate, nearest_landmark};
pub use likelihood::GaussianLikelihood;
pub use transform::{body_to_map, transform_observations};
