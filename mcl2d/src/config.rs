//! Filter configuration, fixed for the lifetime of a filter.

use nalgebra::RealField;

use crate::error::ConfigError;
use crate::math::scalar;
use crate::resample::ResamplingStrategy;

/// Per-axis standard deviations of a pose `(x, y, theta)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseStd<T> {
    pub x: T,
    pub y: T,
    pub theta: T,
}

impl<T: RealField + Copy> PoseStd<T> {
    pub fn new(x: T, y: T, theta: T) -> Self {
        Self { x, y, theta }
    }

    /// No noise on any axis.
    pub fn zero() -> Self {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        for value in [self.x, self.y, self.theta] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
            if value < T::zero() {
                return Err(ConfigError::NegativeStd { field });
            }
        }
        Ok(())
    }
}

/// Landmark measurement standard deviations in the map frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementStd<T> {
    pub x: T,
    pub y: T,
}

impl<T: RealField + Copy> MeasurementStd<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

/// Configuration for [`ParticleFilter`](crate::ParticleFilter).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig<T> {
    /// Population size `N`.
    pub num_particles: usize,
    /// Spread of the initial population around the seed pose.
    pub initial_pose_std: PoseStd<T>,
    /// Noise added to every particle after the deterministic motion.
    pub process_noise_std: PoseStd<T>,
    /// Measurement noise used by the Gaussian likelihood.
    pub measurement_noise_std: MeasurementStd<T>,
    /// Landmarks farther than this from a particle are not considered for association.
    pub sensor_range: T,
    pub resampling: ResamplingStrategy,
    /// Seed for the owned generator. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl<T: RealField + Copy> Default for FilterConfig<T> {
    fn default() -> Self {
        let std_xy = scalar(0.3);
        let std_theta = scalar(0.01);
        Self {
            num_particles: 100,
            initial_pose_std: PoseStd::new(std_xy, std_xy, std_theta),
            process_noise_std: PoseStd::new(std_xy, std_xy, std_theta),
            measurement_noise_std: MeasurementStd::new(std_xy, std_xy),
            sensor_range: scalar(50.0),
            resampling: ResamplingStrategy::default(),
            seed: None,
        }
    }
}

impl<T: RealField + Copy> FilterConfig<T> {
    pub fn with_num_particles(mut self, num_particles: usize) -> Self {
        self.num_particles = num_particles;
        self
    }

    pub fn with_initial_pose_std(mut self, std: PoseStd<T>) -> Self {
        self.initial_pose_std = std;
        self
    }

    pub fn with_process_noise_std(mut self, std: PoseStd<T>) -> Self {
        self.process_noise_std = std;
        self
    }

    pub fn with_measurement_noise_std(mut self, std: MeasurementStd<T>) -> Self {
        self.measurement_noise_std = std;
        self
    }

    pub fn with_sensor_range(mut self, sensor_range: T) -> Self {
        self.sensor_range = sensor_range;
        self
    }

    pub fn with_resampling(mut self, resampling: ResamplingStrategy) -> Self {
        self.resampling = resampling;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every field. Initial and process deviations may be zero, measurement
    /// deviations and the sensor range may not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_particles == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        self.initial_pose_std.validate("initial_pose_std")?;
        self.process_noise_std.validate("process_noise_std")?;

        let meas = self.measurement_noise_std;
        if !meas.x.is_finite() || !meas.y.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "measurement_noise_std",
            });
        }
        if meas.x < T::zero() || meas.y < T::zero() {
            return Err(ConfigError::NegativeStd {
                field: "measurement_noise_std",
            });
        }
        if meas.x == T::zero() || meas.y == T::zero() {
            return Err(ConfigError::NonPositiveMeasurementStd);
        }

        if !self.sensor_range.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "sensor_range",
            });
        }
        if self.sensor_range <= T::zero() {
            return Err(ConfigError::NonPositiveSensorRange);
        }
        Ok(())
    }
}
