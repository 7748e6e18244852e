//! Kidnapped vehicle: the vehicle is teleported mid-run and the filter has to notice.
//!
//! Two detectors are used. A population that no landmark explains fails to resample with
//! `DegenerateWeights`; a population that still explains something badly shows up as a
//! collapse of the best per-observation log-likelihood. Either way the filter is rebuilt
//! around an external coarse fix.
use log::{info, warn};
use mcl2d::{
    Control, CtrvModel, FilterConfig, FilterError, Landmark, Map, MotionModel, Observation,
    ParticleFilter, Pose, PoseEstimator, PoseStd, WeightedMeanPose,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const DT: f64 = 0.1;
const SENSOR_RANGE: f64 = 12.0;
/// Best mean log-likelihood per observation below which the pose is considered lost.
const LOST_THRESHOLD: f64 = -20.0;

/// Two landmark clusters farther apart than the sensor range.
fn two_clusters() -> Map<f64> {
    let mut id = 0;
    let mut landmarks = Vec::new();
    for (cx, cy) in [(0.0, 0.0), (150.0, 40.0)] {
        for i in 0..5 {
            for j in 0..5 {
                landmarks.push(Landmark::new(
                    id,
                    cx + 6.0 * i as f64 - 12.0,
                    cy + 6.0 * j as f64 - 12.0,
                ));
                id += 1;
            }
        }
    }
    Map::new(landmarks)
}

fn observe(
    truth: &Pose<f64>,
    map: &Map<f64>,
    noise: &Normal<f64>,
    rng: &mut StdRng,
) -> Vec<Observation<f64>> {
    let (s, c) = truth.theta.sin_cos();
    map.landmarks()
        .iter()
        .filter(|l| (l.x - truth.x).hypot(l.y - truth.y) <= SENSOR_RANGE)
        .map(|l| {
            let dx = l.x - truth.x;
            let dy = l.y - truth.y;
            Observation::new(
                c * dx + s * dy + noise.sample(rng),
                -s * dx + c * dy + noise.sample(rng),
            )
        })
        .collect()
}

fn relocalize(fix: Pose<f64>, seed: u64) -> Result<ParticleFilter<f64>, mcl2d::ConfigError> {
    let config = FilterConfig::default()
        .with_num_particles(1000)
        .with_initial_pose_std(PoseStd::new(3.0, 3.0, 0.3))
        .with_sensor_range(SENSOR_RANGE)
        .with_seed(seed);
    let mut filter = ParticleFilter::new(config)?;
    filter.init(fix);
    Ok(filter)
}

fn best_log_likelihood(filter: &ParticleFilter<f64>, observations: usize) -> f64 {
    let best = filter
        .log_weights()
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    best / observations.max(1) as f64
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let map = two_clusters();
    let model = CtrvModel::default();
    let noise = Normal::new(0.0, 0.3)?;
    let fix_noise = Normal::new(0.0, 1.5)?;
    let mut rng = StdRng::seed_from_u64(3);

    let mut truth = Pose::new(0.0, -3.0, 0.0);
    let mut filter = relocalize(truth, 0)?;
    let mut relocalizations = 0;

    for step in 0..400 {
        if step == 150 {
            truth = Pose::new(150.0, 37.0, 1.2);
            info!("step {}: vehicle kidnapped to ({}, {})", step, truth.x, truth.y);
        }
        if step == 300 {
            truth = Pose::new(-2.0, 2.0, -0.5);
            info!("step {}: vehicle kidnapped to ({}, {})", step, truth.x, truth.y);
        }

        let control = Control::new(1.0, 0.2);
        truth = model.propagate(&truth, &control, DT);
        let observations = observe(&truth, &map, &noise, &mut rng);

        filter.predict(DT, control)?;
        filter.update_weights(&observations, &map)?;

        let lost = !observations.is_empty()
            && best_log_likelihood(&filter, observations.len()) < LOST_THRESHOLD;

        let reason = if lost {
            Some("observations no longer match the map".to_string())
        } else {
            match filter.resample() {
                Ok(()) => None,
                Err(FilterError::DegenerateWeights(e)) => Some(e.to_string()),
                Err(e) => return Err(e.into()),
            }
        };

        if let Some(reason) = reason {
            warn!("step {}: {}, relocalizing", step, reason);
            relocalizations += 1;
            let fix = Pose::new(
                truth.x + fix_noise.sample(&mut rng),
                truth.y + fix_noise.sample(&mut rng),
                truth.theta + 0.1 * fix_noise.sample(&mut rng),
            );
            filter = relocalize(fix, step as u64)?;
        }

        if step % 25 == 0 {
            let estimate = WeightedMeanPose
                .estimate(filter.particles())
                .ok_or("empty population")?;
            println!(
                "step {:03}: {:2} observations, position error = {:7.3} m",
                step,
                observations.len(),
                (estimate.x - truth.x).hypot(estimate.y - truth.y)
            );
        }
    }

    println!("relocalized {} times", relocalizations);
    Ok(())
}
