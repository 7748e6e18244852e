use nalgebra::RealField;
use rand::Rng;

use super::{checked_weights, Resampler};
use crate::error::ResampleError;

/// Low-variance systematic resampling.
///
/// A single offset `u ~ U[0, 1/count)` and `count` pointers spaced `1/count` apart are
/// walked along the cumulative normalised weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Systematic;

impl Resampler for Systematic {
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
        let (weights, sum) = checked_weights(weights)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        // checked_weights guarantees at least one positive entry
        let last = weights.iter().rposition(|&w| w > 0.0).unwrap_or(0);
        let step = 1.0 / count as f64;
        let mut pointer = rng.random::<f64>() * step;
        let mut cumulative = weights[0] / sum;
        let mut idx = 0;

        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            while idx < last && (pointer >= cumulative || weights[idx] == 0.0) {
                idx += 1;
                cumulative += weights[idx] / sum;
            }
            indices.push(idx);
            pointer += step;
        }
        Ok(indices)
    }
}
