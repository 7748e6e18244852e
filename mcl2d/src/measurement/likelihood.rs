//! Uncorrelated bivariate Gaussian likelihood of a landmark residual.

use nalgebra::RealField;

use crate::config::MeasurementStd;

/// Precomputed normalisation terms for the landmark likelihood
///
/// `p(dx, dy) = 1/(2π σx σy) · exp(−(dx²/(2σx²) + dy²/(2σy²)))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianLikelihood<T> {
    coefficient: T,
    log_coefficient: T,
    x_denom: T,
    y_denom: T,
}

impl<T: RealField + Copy> GaussianLikelihood<T> {
    /// Deviations are expected to be strictly positive (see `FilterConfig::validate`).
    pub fn new(std: MeasurementStd<T>) -> Self {
        let two = T::one() + T::one();
        let coefficient = T::one() / (T::two_pi() * std.x * std.y);
        Self {
            coefficient,
            log_coefficient: coefficient.ln(),
            x_denom: two * std.x * std.x,
            y_denom: two * std.y * std.y,
        }
    }

    /// Peak density, reached at zero residual.
    pub fn coefficient(&self) -> T {
        self.coefficient
    }

    /// The Gaussian exponent, always `<= 0`.
    #[inline]
    pub fn exponent(&self, dx: T, dy: T) -> T {
        -(dx * dx / self.x_denom + dy * dy / self.y_denom)
    }

    #[inline]
    pub fn density(&self, dx: T, dy: T) -> T {
        self.coefficient * self.exponent(dx, dy).exp()
    }

    #[inline]
    pub fn log_density(&self, dx: T, dy: T) -> T {
        self.log_coefficient + self.exponent(dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::PI;

    #[test]
    fn zero_residual_is_the_coefficient() {
        let likelihood = GaussianLikelihood::new(MeasurementStd::new(0.3, 0.3));
        assert_eq!(likelihood.density(0.0, 0.0), 1.0 / (2.0 * PI * 0.3 * 0.3));
        assert_eq!(likelihood.coefficient(), 1.0 / (2.0 * PI * 0.3 * 0.3));
    }

    #[test]
    fn matches_closed_form() {
        let (sx, sy) = (0.3, 0.5);
        let likelihood = GaussianLikelihood::new(MeasurementStd::new(sx, sy));
        let (dx, dy) = (1.0, 2.0);

        let expected = 1.0 / (2.0 * PI * sx * sy)
            * (-(dx * dx / (2.0 * sx * sx) + dy * dy / (2.0 * sy * sy))).exp();
        assert_relative_eq!(likelihood.density(dx, dy), expected, max_relative = 1e-12);
        assert_relative_eq!(
            likelihood.log_density(dx, dy),
            expected.ln(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn symmetric_and_decreasing() {
        let likelihood = GaussianLikelihood::new(MeasurementStd::new(1.0_f32, 2.0));
        assert_eq!(likelihood.density(0.5, -1.0), likelihood.density(-0.5, 1.0));
        assert!(likelihood.density(0.5, 0.0) > likelihood.density(1.0, 0.0));
        assert!(likelihood.density(0.0, 1.0) > likelihood.density(1.0, 0.0));
    }

    #[test]
    fn log_density_survives_underflow() {
        let likelihood = GaussianLikelihood::new(MeasurementStd::new(0.1_f64, 0.1));
        assert_eq!(likelihood.density(100.0, 100.0), 0.0);
        assert!(likelihood.log_density(100.0, 100.0).is_finite());
    }
}
