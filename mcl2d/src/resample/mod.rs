//! Importance resampling.
//!
//! A [`Resampler`] turns a weight sequence into the source indices of a new population.
//! Weights need not be normalised but must be finite, non-negative and not all zero;
//! a zero sum is reported as [`ResampleError::ZeroWeightSum`] instead of falling back to
//! uniform sampling.

mod multinomial;
mod systematic;

pub use multinomial::Multinomial;
pub use systematic::Systematic;

use nalgebra::RealField;
use rand::Rng;

use crate::error::ResampleError;
use crate::math::to_f64;

/// Draws population indices with probability proportional to weight.
pub trait Resampler {
    /// Draw `count` indices into `weights`, with replacement.
    fn resample_indices<T, R>(
        &self,
        weights: &[T],
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, ResampleError>
    where
        T: RealField + Copy,
        R: Rng + ?Sized;
}

/// Resampling scheme selected in [`FilterConfig`](crate::FilterConfig).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResamplingStrategy {
    /// Independent categorical draws.
    #[default]
    Multinomial,
    /// One uniform offset, evenly spaced pointers (low variance).
    Systematic,
}

impl Resampler for ResamplingStrategy {
    fn resample_indices<T, R>(
        &self,
        weights: &[T],
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, ResampleError>
    where
        T: RealField + Copy,
        R: Rng + ?Sized,
    {
        match self {
            ResamplingStrategy::Multinomial => Multinomial.resample_indices(weights, count, rng),
            ResamplingStrategy::Systematic => Systematic.resample_indices(weights, count, rng),
        }
    }
}

/// Convert `weights` to `f64`, rejecting empty, negative, non-finite and zero-sum input.
///
/// Returns the converted weights and their sum.
pub(crate) fn checked_weights<T: RealField + Copy>(
    weights: &[T],
) -> Result<(Vec<f64>, f64), ResampleError> {
    if weights.is_empty() {
        return Err(ResampleError::Empty);
    }

    let mut converted = Vec::with_capacity(weights.len());
    let mut sum = 0.0;
    for (index, &w) in weights.iter().enumerate() {
        let w = to_f64(w);
        if !w.is_finite() || w < 0.0 {
            return Err(ResampleError::InvalidWeight { index });
        }
        sum += w;
        converted.push(w);
    }

    if sum <= 0.0 {
        return Err(ResampleError::ZeroWeightSum);
    }
    Ok((converted, sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const STRATEGIES: [ResamplingStrategy; 2] =
        [ResamplingStrategy::Multinomial, ResamplingStrategy::Systematic];

    #[test]
    fn single_nonzero_weight_takes_everything() {
        let mut weights = vec![0.0_f64; 500];
        weights[0] = 1.0;

        for strategy in STRATEGIES {
            let mut rng = StdRng::seed_from_u64(3);
            let indices = strategy.resample_indices(&weights, 500, &mut rng).unwrap();
            assert_eq!(indices.len(), 500);
            assert!(indices.iter().all(|&i| i == 0), "{:?}", strategy);
        }
    }

    #[test]
    fn zero_sum_is_an_error() {
        let weights = vec![0.0_f64; 10];
        for strategy in STRATEGIES {
            let mut rng = StdRng::seed_from_u64(3);
            assert_eq!(
                strategy.resample_indices(&weights, 10, &mut rng),
                Err(ResampleError::ZeroWeightSum)
            );
        }
    }

    #[test]
    fn rejects_empty_and_invalid_weights() {
        let mut rng = StdRng::seed_from_u64(3);
        let empty: [f64; 0] = [];
        assert_eq!(
            ResamplingStrategy::Multinomial.resample_indices(&empty, 4, &mut rng),
            Err(ResampleError::Empty)
        );
        assert_eq!(
            ResamplingStrategy::Systematic.resample_indices(&[1.0, -0.5], 4, &mut rng),
            Err(ResampleError::InvalidWeight { index: 1 })
        );
        assert_eq!(
            ResamplingStrategy::Multinomial.resample_indices(&[f64::NAN, 1.0], 4, &mut rng),
            Err(ResampleError::InvalidWeight { index: 0 })
        );
    }

    #[test]
    fn frequencies_track_weights() {
        let weights = [1.0_f64, 2.0, 0.0, 7.0];
        let draws = 40_000;

        for strategy in STRATEGIES {
            let mut rng = StdRng::seed_from_u64(99);
            let indices = strategy.resample_indices(&weights, draws, &mut rng).unwrap();

            let mut counts = [0usize; 4];
            for i in indices {
                counts[i] += 1;
            }
            assert_eq!(counts[2], 0, "{:?}", strategy);
            for (k, expected) in [(0, 0.1), (1, 0.2), (3, 0.7)] {
                let observed = counts[k] as f64 / draws as f64;
                assert!(
                    (observed - expected).abs() < 0.01,
                    "{:?}: index {} drawn {} (expected {})",
                    strategy,
                    k,
                    observed,
                    expected
                );
            }
        }
    }

    #[test]
    fn zero_count_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        let indices = ResamplingStrategy::Systematic
            .resample_indices(&[1.0_f32, 1.0], 0, &mut rng)
            .unwrap();
        assert!(indices.is_empty());
    }
}
