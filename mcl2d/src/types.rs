//! Plain data carried through the filter cycle.

use nalgebra::{Point2, RealField};

use crate::math::squared_distance;

/// A planar pose in the map frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose<T> {
    pub x: T,
    pub y: T,
    /// Heading in radians.
    pub theta: T,
}

impl<T: RealField + Copy> Pose<T> {
    pub fn new(x: T, y: T, theta: T) -> Self {
        Self { x, y, theta }
    }

    pub fn position(&self) -> Point2<T> {
        Point2::new(self.x, self.y)
    }
}

/// Control input applied over one prediction interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control<T> {
    pub velocity: T,
    pub yaw_rate: T,
}

impl<T> Control<T> {
    pub fn new(velocity: T, yaw_rate: T) -> Self {
        Self { velocity, yaw_rate }
    }
}

/// One pose hypothesis and its plausibility.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle<T> {
    pub id: usize,
    pub x: T,
    pub y: T,
    pub theta: T,
    pub weight: T,
    /// Map ids of the landmarks matched during the last weighing pass, one per observation.
    pub associations: Vec<i32>,
    /// Map-frame x of each observation during the last weighing pass.
    pub sense_x: Vec<T>,
    /// Map-frame y of each observation during the last weighing pass.
    pub sense_y: Vec<T>,
}

impl<T: RealField + Copy> Particle<T> {
    /// Create a particle with unit weight and no recorded associations.
    pub fn new(id: usize, pose: Pose<T>) -> Self {
        Self {
            id,
            x: pose.x,
            y: pose.y,
            theta: pose.theta,
            weight: T::one(),
            associations: Vec::new(),
            sense_x: Vec::new(),
            sense_y: Vec::new(),
        }
    }

    pub fn pose(&self) -> Pose<T> {
        Pose::new(self.x, self.y, self.theta)
    }

    pub fn set_pose(&mut self, pose: Pose<T>) {
        self.x = pose.x;
        self.y = pose.y;
        self.theta = pose.theta;
    }

    pub(crate) fn clear_associations(&mut self) {
        self.associations.clear();
        self.sense_x.clear();
        self.sense_y.clear();
    }
}

/// A landmark observation.
///
/// Coordinates are in the vehicle body frame as delivered by the sensor, or in the map
/// frame once transformed by a particle's pose. `id` holds the association result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation<T> {
    pub id: Option<usize>,
    pub x: T,
    pub y: T,
}

impl<T> Observation<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { id: None, x, y }
    }
}

/// A landmark with a known, fixed position in the map frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark<T> {
    pub id: i32,
    pub x: T,
    pub y: T,
}

impl<T> Landmark<T> {
    pub fn new(id: i32, x: T, y: T) -> Self {
        Self { id, x, y }
    }
}

/// The known landmark map. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map<T> {
    landmarks: Vec<Landmark<T>>,
}

impl<T: RealField + Copy> Map<T> {
    pub fn new(landmarks: Vec<Landmark<T>>) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Landmark<T>] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Collect the landmarks within `range` of `(x, y)`, inclusive, in map order.
    pub fn within_range_into(&self, x: T, y: T, range: T, out: &mut Vec<Landmark<T>>) {
        out.clear();
        let range_sq = range * range;
        out.extend(
            self.landmarks
                .iter()
                .filter(|l| squared_distance(l.x, l.y, x, y) <= range_sq)
                .copied(),
        );
    }
}

impl<T: RealField + Copy> From<Vec<Landmark<T>>> for Map<T> {
    fn from(landmarks: Vec<Landmark<T>>) -> Self {
        Self::new(landmarks)
    }
}

impl<T: RealField + Copy> FromIterator<Landmark<T>> for Map<T> {
    fn from_iter<I: IntoIterator<Item = Landmark<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
