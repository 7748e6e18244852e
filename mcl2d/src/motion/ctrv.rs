use nalgebra::RealField;

use super::MotionModel;
use crate::math::{scalar, YAW_RATE_EPSILON};
use crate::types::{Control, Pose};

/// Constant turn rate and velocity (unicycle) model.
///
/// The closed-form arc divides by the yaw rate, so rates with magnitude below
/// `yaw_rate_epsilon` fall back to straight-line motion, which is the limit of the arc
/// as the rate goes to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CtrvModel<T> {
    yaw_rate_epsilon: T,
}

impl<T: RealField + Copy> Default for CtrvModel<T> {
    fn default() -> Self {
        Self {
            yaw_rate_epsilon: scalar(YAW_RATE_EPSILON),
        }
    }
}

impl<T: RealField + Copy> CtrvModel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the straight-line threshold.
    pub fn with_yaw_rate_epsilon(mut self, epsilon: T) -> Self {
        self.yaw_rate_epsilon = epsilon.abs();
        self
    }

    pub fn yaw_rate_epsilon(&self) -> T {
        self.yaw_rate_epsilon
    }
}

impl<T: RealField + Copy> MotionModel<T> for CtrvModel<T> {
    fn propagate(&self, pose: &Pose<T>, control: &Control<T>, dt: T) -> Pose<T> {
        let v = control.velocity;
        let yaw_rate = control.yaw_rate;
        let theta = pose.theta;

        if yaw_rate.abs() < self.yaw_rate_epsilon {
            let distance = v * dt;
            return Pose::new(
                pose.x + distance * theta.cos(),
                pose.y + distance * theta.sin(),
                theta,
            );
        }

        let radius = v / yaw_rate;
        let theta_next = theta + yaw_rate * dt;
        Pose::new(
            pose.x + radius * (theta_next.sin() - theta.sin()),
            pose.y + radius * (theta.cos() - theta_next.cos()),
            theta_next,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn straight_line_with_zero_yaw_rate() {
        let model = CtrvModel::new();
        let pose = Pose::new(1.0, 2.0, 0.3);
        let next = model.propagate(&pose, &Control::new(2.0, 0.0), 0.5);

        assert_eq!(next.x, 1.0 + 2.0 * 0.5 * 0.3_f64.cos());
        assert_eq!(next.y, 2.0 + 2.0 * 0.5 * 0.3_f64.sin());
        assert_eq!(next.theta, 0.3);
    }

    #[test]
    fn quarter_circle_turn() {
        // v / ω = 1 m radius, ω·dt = π/2
        let model = CtrvModel::new();
        let pose = Pose::new(0.0, 0.0, 0.0);
        let next = model.propagate(&pose, &Control::new(FRAC_PI_2, FRAC_PI_2), 1.0);

        assert_relative_eq!(next.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(next.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(next.theta, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn full_circle_returns_to_start() {
        let model = CtrvModel::new();
        let pose = Pose::new(3.0, -1.0, 0.7);
        let next = model.propagate(&pose, &Control::new(5.0, 2.0 * PI), 1.0);

        assert_relative_eq!(next.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(next.y, -1.0, epsilon = 1e-9);
        assert_relative_eq!(next.theta, 0.7 + 2.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn curved_regime_converges_to_straight_line() {
        let model = CtrvModel::new();
        let control_straight = Control::new(3.0, 0.0);
        let dt = 0.1;

        for &theta in &[0.0, 0.4, -1.2, 2.9, PI] {
            let pose = Pose::new(0.5, -0.5, theta);
            let straight = model.propagate(&pose, &control_straight, dt);

            let mut omega = 1e-1;
            while omega > YAW_RATE_EPSILON {
                for signed in [omega, -omega] {
                    let curved = model.propagate(&pose, &Control::new(3.0, signed), dt);
                    // the arc deviates from the chord by O(v·ω·dt²)
                    let tolerance = 3.0 * omega * dt * dt;
                    assert!(
                        (curved.x - straight.x).abs() <= tolerance,
                        "x mismatch at ω={} θ={}",
                        signed,
                        theta
                    );
                    assert!(
                        (curved.y - straight.y).abs() <= tolerance,
                        "y mismatch at ω={} θ={}",
                        signed,
                        theta
                    );
                }
                omega /= 2.0;
            }
        }
    }

    #[test]
    fn regime_switch_is_continuous_at_epsilon() {
        let model = CtrvModel::new();
        let pose = Pose::new(0.0, 0.0, 1.0);
        let below = model.propagate(&pose, &Control::new(10.0, 0.99e-5), 1.0);
        let above = model.propagate(&pose, &Control::new(10.0, 1.01e-5), 1.0);

        assert_relative_eq!(below.x, above.x, epsilon = 1e-4);
        assert_relative_eq!(below.y, above.y, epsilon = 1e-4);
    }

    #[test]
    fn custom_epsilon() {
        let model = CtrvModel::<f32>::new().with_yaw_rate_epsilon(-0.5);
        assert_eq!(model.yaw_rate_epsilon(), 0.5);
        let pose = Pose::new(0.0, 0.0, 0.0);
        let next = model.propagate(&pose, &Control::new(1.0, 0.4), 1.0);
        assert_eq!(next.theta, 0.0);
        assert_eq!(next.x, 1.0);
    }
}
