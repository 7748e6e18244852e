//! Nearest-neighbour data association.

use nalgebra::RealField;

use crate::math::squared_distance;
use crate::types::{Landmark, Observation};

/// Index of the landmark closest to `(x, y)` by squared Euclidean distance.
///
/// Ties go to the first landmark encountered. Returns `None` for an empty slice.
pub fn nearest_landmark<T: RealField + Copy>(
    x: T,
    y: T,
    candidates: &[Landmark<T>],
) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, landmark) in candidates.iter().enumerate() {
        let d = squared_distance(x, y, landmark.x, landmark.y);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Associate every map-frame observation with its nearest candidate.
///
/// The result is stored in `Observation::id` as an index into `candidates`, not as the
/// landmark's map id. Observations stay unassociated when `candidates` is empty.
pub fn associate<T: RealField + Copy>(
    candidates: &[Landmark<T>],
    observations: &mut [Observation<T>],
) {
    for obs in observations.iter_mut() {
        obs.id = nearest_landmark(obs.x, obs.y, candidates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmarks() -> Vec<Landmark<f64>> {
        vec![
            Landmark::new(10, 8.0, 0.0),
            Landmark::new(20, 1.0, 1.0),
            Landmark::new(30, -4.0, 3.0),
            Landmark::new(40, 0.0, -2.5),
        ]
    }

    #[test]
    fn picks_nearest_of_several() {
        let candidates = landmarks();
        assert_eq!(nearest_landmark(0.0, 0.0, &candidates), Some(1));
        assert_eq!(nearest_landmark(7.0, 0.5, &candidates), Some(0));
        assert_eq!(nearest_landmark(-3.0, 2.0, &candidates), Some(2));
        assert_eq!(nearest_landmark(0.2, -3.0, &candidates), Some(3));
    }

    #[test]
    fn tie_goes_to_first_encountered() {
        let candidates = vec![
            Landmark::new(1, 1.0, 0.0),
            Landmark::new(2, -1.0, 0.0),
            Landmark::new(3, 0.0, 1.0),
        ];
        assert_eq!(nearest_landmark(0.0, 0.0, &candidates), Some(0));
    }

    #[test]
    fn empty_candidates() {
        assert_eq!(nearest_landmark::<f64>(0.0, 0.0, &[]), None);

        let mut observations = vec![Observation::new(1.0, 1.0)];
        associate(&[], &mut observations);
        assert_eq!(observations[0].id, None);
    }

    #[test]
    fn associate_records_candidate_index() {
        let candidates = landmarks();
        let mut observations = vec![
            Observation::new(-4.5, 3.2),
            Observation::new(1.1, 0.9),
            Observation::new(9.0, 0.0),
        ];
        associate(&candidates, &mut observations);

        let ids: Vec<Option<usize>> = observations.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![Some(2), Some(1), Some(0)]);
    }
}
