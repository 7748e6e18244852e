//! Point estimates derived from a particle population.
//!
//! The filter itself never collapses its sample set; these strategies are for callers
//! that need a single pose, e.g. for control or for plotting a trajectory.

use nalgebra::RealField;

use crate::types::{Particle, Pose};

/// Strategy for reducing a population to one pose.
pub trait PoseEstimator<T: RealField + Copy> {
    /// `None` for an empty population.
    fn estimate(&self, particles: &[Particle<T>]) -> Option<Pose<T>>;
}

/// Weighted mean of positions, circular weighted mean of headings.
///
/// Falls back to the unweighted mean when the weights sum to zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedMeanPose;

impl<T: RealField + Copy> PoseEstimator<T> for WeightedMeanPose {
    fn estimate(&self, particles: &[Particle<T>]) -> Option<Pose<T>> {
        if particles.is_empty() {
            return None;
        }

        let total: T = particles.iter().fold(T::zero(), |acc, p| acc + p.weight);
        let uniform = total <= T::zero();

        let mut x = T::zero();
        let mut y = T::zero();
        let mut sin = T::zero();
        let mut cos = T::zero();
        let mut norm = T::zero();
        for p in particles {
            let w = if uniform { T::one() } else { p.weight };
            x += w * p.x;
            y += w * p.y;
            sin += w * p.theta.sin();
            cos += w * p.theta.cos();
            norm += w;
        }

        Some(Pose::new(x / norm, y / norm, sin.atan2(cos)))
    }
}

/// Pose of the particle with the highest weight. Ties go to the first such particle.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighestWeight;

impl<T: RealField + Copy> PoseEstimator<T> for HighestWeight {
    fn estimate(&self, particles: &[Particle<T>]) -> Option<Pose<T>> {
        let mut best: Option<&Particle<T>> = None;
        for p in particles {
            match best {
                Some(b) if p.weight <= b.weight => {}
                _ => best = Some(p),
            }
        }
        best.map(Particle::pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::PI;

    fn particle(id: usize, x: f64, y: f64, theta: f64, weight: f64) -> Particle<f64> {
        let mut p = Particle::new(id, Pose::new(x, y, theta));
        p.weight = weight;
        p
    }

    #[test]
    fn weighted_mean_of_positions() {
        let particles = [
            particle(0, 0.0, 0.0, 0.0, 1.0),
            particle(1, 4.0, 2.0, 0.0, 3.0),
        ];
        let pose = WeightedMeanPose.estimate(&particles).unwrap();
        assert_relative_eq!(pose.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(pose.y, 1.5, epsilon = 1e-12);
        assert_relative_eq!(pose.theta, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn heading_mean_wraps_across_pi() {
        let particles = [
            particle(0, 0.0, 0.0, PI - 0.1, 1.0),
            particle(1, 0.0, 0.0, -PI + 0.1, 1.0),
        ];
        let pose = WeightedMeanPose.estimate(&particles).unwrap();
        assert_relative_eq!(pose.theta.abs(), PI, epsilon = 1e-9);
    }

    #[test]
    fn zero_weights_fall_back_to_plain_mean() {
        let particles = [
            particle(0, 1.0, 1.0, 0.0, 0.0),
            particle(1, 3.0, 5.0, 0.0, 0.0),
        ];
        let pose = WeightedMeanPose.estimate(&particles).unwrap();
        assert_relative_eq!(pose.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(pose.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn highest_weight_picks_first_maximum() {
        let particles = [
            particle(0, 1.0, 0.0, 0.0, 0.2),
            particle(1, 2.0, 0.0, 0.0, 0.5),
            particle(2, 3.0, 0.0, 0.0, 0.5),
        ];
        let pose = HighestWeight.estimate(&particles).unwrap();
        assert_eq!(pose.x, 2.0);
    }

    #[test]
    fn empty_population_has_no_estimate() {
        let empty: [Particle<f64>; 0] = [];
        assert!(WeightedMeanPose.estimate(&empty).is_none());
        assert!(HighestWeight.estimate(&empty).is_none());
    }
}
