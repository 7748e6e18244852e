use mcl2d::math::normalize_angle;
use mcl2d::{
    Control, CtrvModel, FilterConfig, Landmark, Map, MotionModel, Observation, ParticleFilter, Pose,
    PoseEstimator, WeightedMeanPose,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

#[cfg(feature = "rerun")]
struct Visualizer {
    rec: rerun::RecordingStream,
}

#[cfg(feature = "rerun")]
impl Visualizer {
    fn new(name: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = rerun::RecordingStreamBuilder::new(name).spawn()?;
        Ok(Self { rec })
    }

    fn set_step(&self, step: i64) {
        self.rec.set_time_sequence("step", step);
    }

    fn log_landmarks(&self, map: &Map<f64>) -> Result<(), Box<dyn std::error::Error>> {
        use rerun::{archetypes::Points2D, Color};
        let points = map.landmarks().iter().map(|l| [l.x as f32, l.y as f32]);
        self.rec.log_static(
            "world/landmarks",
            &Points2D::new(points)
                .with_radii([0.4])
                .with_colors([Color::from_rgb(255, 200, 0)]),
        )?;
        Ok(())
    }

    fn log_population(
        &self,
        filter: &ParticleFilter<f64>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        use rerun::{archetypes::Points2D, Color};
        let points = filter.poses().map(|p| [p.x as f32, p.y as f32]);
        self.rec.log(
            "world/particles",
            &Points2D::new(points)
                .with_radii([0.05])
                .with_colors([Color::from_rgb(120, 120, 255)]),
        )?;
        Ok(())
    }

    fn log_pose(
        &self,
        path: &str,
        pose: &Pose<f64>,
        color: [u8; 3],
    ) -> Result<(), Box<dyn std::error::Error>> {
        use rerun::{archetypes::Arrows2D, Color};
        let heading = [pose.theta.cos() as f32, pose.theta.sin() as f32];
        self.rec.log(
            path,
            &Arrows2D::from_vectors([heading])
                .with_origins([[pose.x as f32, pose.y as f32]])
                .with_colors([Color::from_rgb(color[0], color[1], color[2])]),
        )?;
        Ok(())
    }
}

fn landmark_grid() -> Map<f64> {
    (0..49)
        .map(|id| {
            let (i, j) = (id % 7, id / 7);
            Landmark::new(id, 8.0 * i as f64 - 20.0, 8.0 * j as f64 - 10.0)
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "rerun")]
    let viz = Visualizer::new("mcl2d_particle_cloud")?;

    let dt = 0.1;
    let sensor_range = 20.0;
    let obs_noise = 0.3;
    let odom_velocity_noise = 0.05;
    let odom_yaw_rate_noise = 0.01;

    let map = landmark_grid();
    #[cfg(feature = "rerun")]
    viz.log_landmarks(&map)?;

    let config = FilterConfig::default()
        .with_num_particles(500)
        .with_sensor_range(sensor_range)
        .with_seed(2024);
    let mut filter = ParticleFilter::new(config)?;

    let model = CtrvModel::default();
    let mut rng = StdRng::seed_from_u64(7);
    let obs_dist = Normal::new(0.0, obs_noise)?;
    let velocity_dist = Normal::new(0.0, odom_velocity_noise)?;
    let yaw_rate_dist = Normal::new(0.0, odom_yaw_rate_noise)?;

    let mut truth = Pose::new(0.0, 0.0, 0.0);
    filter.init(Pose::new(0.5, -0.4, 0.05));

    for step in 0..600 {
        #[cfg(feature = "rerun")]
        viz.set_step(step as i64);

        let t = step as f64 * dt;
        let command = Control::new(2.0, 0.4 * (0.2 * t).sin());
        truth = model.propagate(&truth, &command, dt);

        let odometry = Control::new(
            command.velocity + velocity_dist.sample(&mut rng),
            command.yaw_rate + yaw_rate_dist.sample(&mut rng),
        );

        let (s, c) = truth.theta.sin_cos();
        let observations: Vec<Observation<f64>> = map
            .landmarks()
            .iter()
            .filter(|l| (l.x - truth.x).hypot(l.y - truth.y) <= sensor_range)
            .map(|l| {
                let dx = l.x - truth.x;
                let dy = l.y - truth.y;
                Observation::new(
                    c * dx + s * dy + obs_dist.sample(&mut rng),
                    -s * dx + c * dy + obs_dist.sample(&mut rng),
                )
            })
            .collect();

        filter.predict(dt, odometry)?;
        filter.update_weights(&observations, &map)?;

        #[cfg(feature = "rerun")]
        viz.log_population(&filter)?;

        filter.resample()?;

        let estimate = WeightedMeanPose
            .estimate(filter.particles())
            .ok_or("empty population")?;
        let position_error = (estimate.x - truth.x).hypot(estimate.y - truth.y);
        let heading_error = normalize_angle(estimate.theta - truth.theta);

        if step % 50 == 0 {
            println!(
                "step {:04}: {:2} landmarks, position error = {:6.3} m, heading error = {:7.4} rad",
                step,
                observations.len(),
                position_error,
                heading_error
            );
        }

        #[cfg(feature = "rerun")]
        {
            viz.log_pose("world/truth", &truth, [0, 200, 0])?;
            viz.log_pose("world/estimate", &estimate, [255, 0, 0])?;
        }
    }

    Ok(())
}
