use nalgebra::RealField;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use super::{checked_weights, Resampler};
use crate::error::ResampleError;

/// Multinomial resampling: `count` independent categorical draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Multinomial;

impl Resampler for Multinomial {
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
        let (weights, _) = checked_weights(weights)?;
        let categorical = WeightedIndex::new(&weights).map_err(|_| ResampleError::ZeroWeightSum)?;
        Ok((0..count).map(|_| categorical.sample(rng)).collect())
    }
}
