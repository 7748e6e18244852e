//! Small scalar helpers shared by the motion and measurement models.

use nalgebra::RealField;

/// Yaw rates below this magnitude use the straight-line motion regime.
pub const YAW_RATE_EPSILON: f64 = 1e-5;

/// Convert an `f64` constant into the filter scalar.
#[inline(always)]
pub fn scalar<T: RealField + Copy>(value: f64) -> T {
    T::from_subset(&value)
}

/// Convert a filter scalar back to `f64` (used for sampling and weighted draws).
#[inline(always)]
pub fn to_f64<T: RealField + Copy>(value: T) -> f64 {
    nalgebra::try_convert(value).unwrap_or(f64::NAN)
}

/// Wrap an angle into `(-π, π]`.
///
/// Only used for presentation: every trigonometric computation in the filter is
/// periodic, so headings are stored unwrapped.
pub fn normalize_angle<T: RealField + Copy>(angle: T) -> T {
    let pi = T::pi();
    let two_pi = T::two_pi();
    let mut wrapped = angle % two_pi;
    if wrapped > pi {
        wrapped -= two_pi;
    } else if wrapped <= -pi {
        wrapped += two_pi;
    }
    wrapped
}

/// Squared Euclidean distance between two planar points.
#[inline]
pub fn squared_distance<T: RealField + Copy>(ax: T, ay: T, bx: T, by: T) -> T {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}
