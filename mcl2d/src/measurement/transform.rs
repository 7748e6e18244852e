//! Rigid transform of observations from the vehicle body frame into the map frame.

use nalgebra::{Isometry2, Point2, RealField, Vector2};

use crate::types::{Observation, Pose};

/// The isometry that maps body-frame coordinates into the map frame for `pose`.
#[inline]
pub fn body_to_map<T: RealField + Copy>(pose: &Pose<T>) -> Isometry2<T> {
    Isometry2::new(Vector2::new(pose.x, pose.y), pose.theta)
}

/// Transform `observations` with the pose of one particle, writing into `out`.
///
/// `out` is cleared first; its length equals `observations.len()` afterwards and every
/// entry starts unassociated.
pub fn transform_observations<T: RealField + Copy>(
    pose: &Pose<T>,
    observations: &[Observation<T>],
    out: &mut Vec<Observation<T>>,
) {
    let iso = body_to_map(pose);
    out.clear();
    out.extend(observations.iter().map(|obs| {
        let p = iso.transform_point(&Point2::new(obs.x, obs.y));
        Observation::new(p.x, p.y)
    }));
}
