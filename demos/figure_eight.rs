//! Figure-eight drive through a landmark field, comparing resampling schemes and
//! point estimators.
use log::info;
use mcl2d::{
    Control, CtrvModel, FilterConfig, HighestWeight, Landmark, Map, MotionModel, Observation,
    ParticleFilter, Pose, PoseEstimator, ResamplingStrategy, WeightedMeanPose,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const DT: f64 = 0.05;
const STEPS: usize = 1200;
const SENSOR_RANGE: f64 = 25.0;

struct Sensor {
    noise: Normal<f64>,
    range: f64,
}

impl Sensor {
    fn observe(
        &self,
        truth: &Pose<f64>,
        map: &Map<f64>,
        rng: &mut StdRng,
    ) -> Vec<Observation<f64>> {
        let (s, c) = truth.theta.sin_cos();
        map.landmarks()
            .iter()
            .filter(|l| (l.x - truth.x).hypot(l.y - truth.y) <= self.range)
            .map(|l| {
                let dx = l.x - truth.x;
                let dy = l.y - truth.y;
                Observation::new(
                    c * dx + s * dy + self.noise.sample(rng),
                    -s * dx + c * dy + self.noise.sample(rng),
                )
            })
            .collect()
    }
}

fn scattered_map(rng: &mut StdRng) -> Result<Map<f64>, rand_distr::NormalError> {
    let jitter = Normal::new(0.0, 2.0)?;
    Ok((0..60)
        .map(|id| {
            let (i, j) = (id % 10, id / 10);
            Landmark::new(
                id,
                10.0 * i as f64 - 45.0 + jitter.sample(rng),
                10.0 * j as f64 - 25.0 + jitter.sample(rng),
            )
        })
        .collect())
}

/// Turn left for one loop, then right for the next.
fn command(step: usize) -> Control<f64> {
    let loop_steps = STEPS / 2;
    let yaw_rate = 2.0 * core::f64::consts::PI / (loop_steps as f64 * DT);
    if step < loop_steps {
        Control::new(3.0, yaw_rate)
    } else {
        Control::new(3.0, -yaw_rate)
    }
}

fn run(
    strategy: ResamplingStrategy,
    map: &Map<f64>,
) -> Result<(f64, f64), Box<dyn std::error::Error>> {
    let config = FilterConfig::default()
        .with_num_particles(300)
        .with_sensor_range(SENSOR_RANGE)
        .with_resampling(strategy)
        .with_seed(11);
    let mut filter = ParticleFilter::new(config)?;

    let model = CtrvModel::default();
    let sensor = Sensor {
        noise: Normal::new(0.0, 0.3)?,
        range: SENSOR_RANGE,
    };
    let odom_noise = Normal::new(0.0, 0.05)?;
    let mut rng = StdRng::seed_from_u64(99);

    let mut truth = Pose::new(0.0, 0.0, 0.0);
    filter.init(Pose::new(0.3, -0.2, 0.02));

    let mut sq_mean = 0.0;
    let mut sq_best = 0.0;
    for step in 0..STEPS {
        let control = command(step);
        truth = model.propagate(&truth, &control, DT);

        let odometry = Control::new(
            control.velocity + odom_noise.sample(&mut rng),
            control.yaw_rate + 0.2 * odom_noise.sample(&mut rng),
        );
        let observations = sensor.observe(&truth, map, &mut rng);

        filter.predict(DT, odometry)?;
        filter.update_weights(&observations, map)?;
        let ess = filter.effective_sample_size();

        let best = HighestWeight
            .estimate(filter.particles())
            .ok_or("empty population")?;
        filter.resample()?;
        let mean = WeightedMeanPose
            .estimate(filter.particles())
            .ok_or("empty population")?;

        sq_mean += (mean.x - truth.x).powi(2) + (mean.y - truth.y).powi(2);
        sq_best += (best.x - truth.x).powi(2) + (best.y - truth.y).powi(2);

        if step % 200 == 0 {
            info!(
                "{:?} step {:04}: {} observations, ess {:.1}, mean error {:.3} m",
                strategy,
                step,
                observations.len(),
                ess,
                (mean.x - truth.x).hypot(mean.y - truth.y)
            );
        }
    }

    let n = STEPS as f64;
    Ok(((sq_mean / n).sqrt(), (sq_best / n).sqrt()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(5);
    let map = scattered_map(&mut rng)?;

    for strategy in [ResamplingStrategy::Multinomial, ResamplingStrategy::Systematic] {
        let (rmse_mean, rmse_best) = run(strategy, &map)?;
        println!(
            "{:<12} rmse weighted mean = {:.3} m, rmse highest weight = {:.3} m",
            format!("{:?}", strategy),
            rmse_mean,
            rmse_best
        );
    }
    Ok(())
}
