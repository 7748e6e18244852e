//! Motion models and process noise.
//!
//! A [`MotionModel`] is the deterministic part of the prediction step. The filter
//! perturbs its output with independent zero-mean Gaussian noise per axis afterwards,
//! see [`perturb`].

mod ctrv;

pub use ctrv::CtrvModel;

use nalgebra::RealField;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::PoseStd;
use crate::math::scalar;
use crate::types::{Control, Pose};

/// Deterministic kinematic update of a pose.
///
/// Models are shared across worker threads when the `parallel` feature is enabled.
pub trait MotionModel<T: RealField + Copy>: Send + Sync {
    /// Advance `pose` by `control` applied for `dt`.
    fn propagate(&self, pose: &Pose<T>, control: &Control<T>, dt: T) -> Pose<T>;
}

/// Draw one sample from `Normal(0, std)`.
///
/// A zero deviation returns exactly zero without touching the generator state.
pub fn sample_gaussian<T, R>(rng: &mut R, std: T) -> T
where
    T: RealField + Copy,
    R: Rng + ?Sized,
{
    if std == T::zero() {
        return T::zero();
    }
    let unit: f64 = rng.sample(StandardNormal);
    scalar::<T>(unit) * std
}

/// Add independent Gaussian noise to each axis of `pose`.
pub fn perturb<T, R>(pose: &Pose<T>, std: &PoseStd<T>, rng: &mut R) -> Pose<T>
where
    T: RealField + Copy,
    R: Rng + ?Sized,
{
    Pose::new(
        pose.x + sample_gaussian(rng, std.x),
        pose.y + sample_gaussian(rng, std.y),
        pose.theta + sample_gaussian(rng, std.theta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_std_leaves_pose_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let pose = Pose::new(4.0, -2.0, 0.75);
        let noisy = perturb(&pose, &PoseStd::zero(), &mut rng);
        assert_eq!(noisy, pose);
    }

    #[test]
    fn sample_moments_match_std() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let std = 0.5_f64;
        let samples: Vec<f64> = (0..n).map(|_| sample_gaussian(&mut rng, std)).collect();

        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        assert!(mean.abs() < 0.02, "mean {}", mean);
        assert!((var.sqrt() - std).abs() < 0.02, "std {}", var.sqrt());
    }

    #[test]
    fn axes_receive_independent_draws() {
        let mut rng = StdRng::seed_from_u64(11);
        let pose = Pose::new(0.0, 0.0, 0.0);
        let noisy = perturb(&pose, &PoseStd::new(1.0, 1.0, 1.0), &mut rng);
        assert_ne!(noisy.x, noisy.y);
        assert_ne!(noisy.y, noisy.theta);
    }
}
