//! The particle filter: population state and the four stages of the cycle.
//!
//! ```rust,ignore
//! let config = FilterConfig::default().with_seed(7);
//! let mut filter = ParticleFilter::new(config)?;
//!
//! filter.init(Pose::new(6.0, 1.9, 0.0));
//! loop {
//!     filter.predict(dt, Control::new(velocity, yaw_rate))?;
//!     filter.update_weights(&observations, &map)?;
//!     filter.resample()?;
//! }
//! ```

use log::{debug, trace, warn};
use nalgebra::RealField;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FilterConfig;
use crate::error::{ConfigError, FilterError};
use crate::math::scalar;
use crate::measurement::{associate, transform_observations, GaussianLikelihood};
use crate::motion::{perturb, CtrvModel, MotionModel};
use crate::resample::Resampler;
use crate::types::{Control, Landmark, Map, Observation, Particle, Pose};


/// Sequential Monte Carlo estimator of a planar pose against a known landmark map.
///
/// The population size is fixed at construction. The generator `R` is owned by the
/// filter and is the only source of randomness; seeding it makes a run reproducible.
#[derive(Debug, Clone)]
pub struct ParticleFilter<T, R = StdRng, M = CtrvModel<T>>
where
    T: RealField + Copy,
{
    config: FilterConfig<T>,
    motion: M,
    likelihood: GaussianLikelihood<T>,
    rng: R,
    initialized: bool,
    particles: Vec<Particle<T>>,
    /// `exp(lw - max lw)`, parallel to `particles`.
    weights: Vec<T>,
    /// Sum of log-likelihoods, parallel to `particles`.
    log_weights: Vec<T>,
    in_range: Vec<Landmark<T>>,
    transformed: Vec<Observation<T>>,
}

impl<T: RealField + Copy> ParticleFilter<T> {
    /// Build a filter with the CTRV motion model and a `StdRng` seeded from
    /// `config.seed`, or from the OS when no seed is set.
    pub fn new(config: FilterConfig<T>) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, CtrvModel::default(), rng)
    }
}

impl<T, R, M> ParticleFilter<T, R, M>
where
    T: RealField + Copy,
    R: Rng,
    M: MotionModel<T>,
{
    /// Build a filter from explicit parts. `config.seed` is ignored.
    pub fn with_rng(config: FilterConfig<T>, motion: M, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let n = config.num_particles;
        Ok(Self {
            likelihood: GaussianLikelihood::new(config.measurement_noise_std),
            config,
            motion,
            rng,
            initialized: false,
            particles: Vec::with_capacity(n),
            weights: Vec::with_capacity(n),
            log_weights: Vec::with_capacity(n),
            in_range: Vec::new(),
            transformed: Vec::new(),
        })
    }

    pub fn config(&self) -> &FilterConfig<T> {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn num_particles(&self) -> usize {
        self.config.num_particles
    }

    /// Current population, in particle order. Empty before `init`.
    pub fn particles(&self) -> &[Particle<T>] {
        &self.particles
    }

    /// Weights parallel to [`particles`](Self::particles), relative to the most likely
    /// particle of the last weighing pass and therefore in `[0, 1]`.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Unscaled log-likelihoods parallel to [`particles`](Self::particles). The raw
    /// likelihood product of a particle is `exp` of its entry.
    pub fn log_weights(&self) -> &[T] {
        &self.log_weights
    }

    /// The posterior sample set as poses, in particle order.
    pub fn poses(&self) -> impl Iterator<Item = Pose<T>> + '_ {
        self.particles.iter().map(Particle::pose)
    }

    /// `(Σw)² / Σw²` over the current weights, `0` when every weight is zero.
    pub fn effective_sample_size(&self) -> T {
        let (sum, sum_sq) = self
            .weights
            .iter()
            .fold((T::zero(), T::zero()), |(s, sq), &w| (s + w, sq + w * w));
        if sum_sq > T::zero() {
            sum * sum / sum_sq
        } else {
            T::zero()
        }
    }

    /// Seed the population around `pose` with `config.initial_pose_std`.
    ///
    /// Runs once. Later calls are ignored so that accumulated evidence is not discarded.
    pub fn init(&mut self, pose: Pose<T>) {
        if self.initialized {
            debug!("particle filter already initialized, ignoring init");
            return;
        }

        let n = self.config.num_particles;
        let std = self.config.initial_pose_std;
        self.particles = (0..n)
            .map(|id| Particle::new(id, perturb(&pose, &std, &mut self.rng)))
            .collect();
        self.weights = vec![T::one(); n];
        self.log_weights = vec![T::zero(); n];
        self.initialized = true;

        debug!(
            "initialized {} particles around ({}, {}, {})",
            n, pose.x, pose.y, pose.theta
        );
    }

    /// Advance every particle by the motion model, then add process noise.
    pub fn predict(&mut self, dt: T, control: Control<T>) -> Result<(), FilterError> {
        self.ensure_initialized()?;
        if !dt.is_finite() || dt <= T::zero() {
            return Err(FilterError::InvalidTimeStep);
        }

        let std = self.config.process_noise_std;

        #[cfg(not(feature = "parallel"))]
        for particle in &mut self.particles {
            let moved = self.motion.propagate(&particle.pose(), &control, dt);
            particle.set_pose(perturb(&moved, &std, &mut self.rng));
        }

        #[cfg(feature = "parallel")]
        {
            let seeds: Vec<u64> = (0..self.particles.len())
                .map(|_| self.rng.random())
                .collect();
            let motion = &self.motion;
            self.particles
                .par_iter_mut()
                .zip(seeds.par_iter())
                .for_each(|(particle, &seed)| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let moved = motion.propagate(&particle.pose(), &control, dt);
                    particle.set_pose(perturb(&moved, &std, &mut rng));
                });
        }

        trace!(
            "predicted {} particles over dt={} with v={} yaw_rate={}",
            self.particles.len(),
            dt,
            control.velocity,
            control.yaw_rate
        );
        Ok(())
    }

    /// Re-weight every particle by the likelihood of `observations` given `map`.
    ///
    /// Observations are in the vehicle body frame; caller-provided ids are ignored.
    pub fn update_weights(
        &mut self,
        observations: &[Observation<T>],
        map: &Map<T>,
    ) -> Result<(), FilterError> {
        self.ensure_initialized()?;

        let range = self.config.sensor_range;
        let likelihood = self.likelihood;

        #[cfg(not(feature = "parallel"))]
        for (particle, log_weight) in self.particles.iter_mut().zip(&mut self.log_weights) {
            *log_weight = weigh_particle(
                particle,
                observations,
                map,
                range,
                &likelihood,
                &mut self.in_range,
                &mut self.transformed,
            );
        }

        #[cfg(feature = "parallel")]
        self.particles
            .par_iter_mut()
            .zip(self.log_weights.par_iter_mut())
            .for_each_init(
                || (Vec::new(), Vec::new()),
                |(in_range, transformed), (particle, log_weight)| {
                    *log_weight = weigh_particle(
                        particle,
                        observations,
                        map,
                        range,
                        &likelihood,
                        in_range,
                        transformed,
                    );
                },
            );

        let max = max_log_weight(&self.log_weights);
        for ((weight, particle), &lw) in self
            .weights
            .iter_mut()
            .zip(&mut self.particles)
            .zip(&self.log_weights)
        {
            *weight = relative_weight(lw, max);
            particle.weight = *weight;
        }

        if !max.is_finite() && !observations.is_empty() {
            warn!(
                "no particle explains any of the {} observations",
                observations.len()
            );
        }
        trace!(
            "weighed {} particles against {} observations, ess={}",
            self.particles.len(),
            observations.len(),
            self.effective_sample_size()
        );
        Ok(())
    }

    /// Draw a new population with replacement, proportional to weight.
    ///
    /// Drawn particles keep their source id and weight. Fails with
    /// [`FilterError::DegenerateWeights`] when every weight is zero.
    pub fn resample(&mut self) -> Result<(), FilterError> {
        self.ensure_initialized()?;

        let n = self.config.num_particles;
        let probabilities = self.resampling_probabilities();
        let indices = self
            .config
            .resampling
            .resample_indices(&probabilities, n, &mut self.rng)
            .map_err(|e| {
                warn!("resampling failed: {}", e);
                FilterError::from(e)
            })?;

        self.particles = indices.iter().map(|&i| self.particles[i].clone()).collect();
        self.weights = indices.iter().map(|&i| self.weights[i]).collect();
        self.log_weights = indices.iter().map(|&i| self.log_weights[i]).collect();

        trace!("resampled {} particles", n);
        Ok(())
    }

    /// Predict, weigh and resample in order.
    pub fn step(
        &mut self,
        dt: T,
        control: Control<T>,
        observations: &[Observation<T>],
        map: &Map<T>,
    ) -> Result<(), FilterError> {
        self.predict(dt, control)?;
        self.update_weights(observations, map)?;
        self.resample()
    }

    fn ensure_initialized(&self) -> Result<(), FilterError> {
        if self.initialized {
            Ok(())
        } else {
            Err(FilterError::NotInitialized)
        }
    }

    /// Resampling probabilities taken from the log-weights, so that they cannot all
    /// underflow to zero while some particle still has a finite likelihood.
    fn resampling_probabilities(&self) -> Vec<T> {
        let max = max_log_weight(&self.log_weights);
        self.log_weights
            .iter()
            .map(|&lw| relative_weight(lw, max))
            .collect()
    }
}

/// Largest log-weight, `-inf` for an empty or fully degenerate population.
fn max_log_weight<T: RealField + Copy>(log_weights: &[T]) -> T {
    log_weights
        .iter()
        .copied()
        .fold(scalar(f64::NEG_INFINITY), |acc, lw| if lw > acc { lw } else { acc })
}

/// `exp(lw - max)`, in `[0, 1]`. Zero everywhere when `max` is not finite.
#[inline]
fn relative_weight<T: RealField + Copy>(lw: T, max: T) -> T {
    if max.is_finite() {
        (lw - max).exp()
    } else {
        T::zero()
    }
}

/// Weigh a single particle and record its associations. Returns the log-likelihood of
/// `observations`.
///
/// `in_range` and `transformed` are scratch buffers.
fn weigh_particle<T: RealField + Copy>(
    particle: &mut Particle<T>,
    observations: &[Observation<T>],
    map: &Map<T>,
    sensor_range: T,
    likelihood: &GaussianLikelihood<T>,
    in_range: &mut Vec<Landmark<T>>,
    transformed: &mut Vec<Observation<T>>,
) -> T {
    particle.clear_associations();
    let pose = particle.pose();

    map.within_range_into(pose.x, pose.y, sensor_range, in_range);
    transform_observations(&pose, observations, transformed);
    associate(in_range, transformed);

    let mut log_weight = T::zero();
    for obs in transformed.iter() {
        particle.sense_x.push(obs.x);
        particle.sense_y.push(obs.y);

        match obs.id {
            Some(idx) => {
                let landmark = in_range[idx];
                log_weight += likelihood.log_density(obs.x - landmark.x, obs.y - landmark.y);
                particle.associations.push(landmark.id);
            }
            // nothing in range can explain this observation
            None => log_weight = scalar(f64::NEG_INFINITY),
        }
    }
    log_weight
}
