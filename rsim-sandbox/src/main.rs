use log::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rsim_core::nalgebra::{Point3, UnitQuaternion, Vector3};
use rsim_core::{Camera, ReconstructionModel};
use rsim_dataset::{DatasetBuilder, LandmarkSource, OrientationSource, PositionSource};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Clone)]
#[structopt(
    name = "rsim-sandbox",
    about = "A tool for building and sampling synthetic ground-truth datasets"
)]
struct Opt {
    /// The number of reconstruction cameras.
    #[structopt(long, default_value = "90")]
    cameras: usize,
    /// The camera frame rate in frames per second.
    #[structopt(long, default_value = "30.0")]
    frame_rate: f64,
    /// The gyroscope sample rate in Hz.
    #[structopt(long, default_value = "100.0")]
    gyro_rate: f64,
    /// The number of random landmarks in the synthetic point cloud.
    #[structopt(long, default_value = "500")]
    landmarks: usize,
    /// The yaw rate of the synthetic motion in radians per second.
    #[structopt(long, default_value = "0.3")]
    yaw_rate: f64,
    /// The number of trajectory samples to log.
    #[structopt(long, default_value = "20")]
    samples: usize,
    /// Take orientation from the synthetic gyroscope instead of the cameras.
    #[structopt(long)]
    gyro_orientation: bool,
    /// Output JSON file for the built dataset.
    #[structopt(short, long)]
    output: Option<PathBuf>,
}

/// Generates a reconstruction of a camera circling the landmark cloud at a constant
/// yaw rate, plus the matching gyroscope stream.
fn synthetic_scene(opt: &Opt) -> (ReconstructionModel, Vec<Vector3<f64>>, Vec<f64>) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);

    let cameras = (0..opt.cameras)
        .map(|frame_number| {
            let t = frame_number as f64 / opt.frame_rate;
            let yaw = opt.yaw_rate * t;
            // The model stores world-to-camera rotations.
            let camera_to_world = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw);
            Camera {
                frame_number,
                position: Point3::new(4.0 * yaw.cos(), 4.0 * yaw.sin(), 1.5),
                orientation: camera_to_world.conjugate(),
            }
        })
        .collect();

    let points = (0..opt.landmarks)
        .map(|_| {
            Point3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(0.0..3.0),
            )
        })
        .collect();

    let duration = opt.cameras as f64 / opt.frame_rate;
    let gyro_samples = (duration * opt.gyro_rate) as usize;
    let rates = vec![Vector3::new(0.0, 0.0, opt.yaw_rate); gyro_samples];
    let timestamps = (0..gyro_samples)
        .map(|i| i as f64 / opt.gyro_rate)
        .collect();

    (ReconstructionModel { cameras, points }, rates, timestamps)
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let (model, gyro_rates, gyro_times) = synthetic_scene(&opt);
    info!(
        "synthesized scene with {} cameras, {} points, {} gyro samples",
        model.cameras.len(),
        model.points.len(),
        gyro_rates.len()
    );

    let mut builder = DatasetBuilder::new();
    builder
        .add_source_reconstruction(model, opt.frame_rate)
        .expect("failed to register the reconstruction");
    builder
        .add_source_gyro(gyro_rates, gyro_times)
        .expect("failed to register the gyroscope stream");
    builder.set_orientation_source(if opt.gyro_orientation {
        OrientationSource::Gyroscope
    } else {
        OrientationSource::Reconstruction
    });
    builder.set_position_source(PositionSource::Reconstruction);
    builder.set_landmark_source(LandmarkSource::Reconstruction);

    let dataset = builder.build().expect("failed to build the dataset");
    let trajectory = dataset.trajectory().expect("dataset has no trajectory");
    info!(
        "trajectory spans [{}, {}) s with {} landmarks",
        trajectory.start_time(),
        trajectory.end_time(),
        dataset.landmarks().len()
    );

    let start = trajectory.start_time();
    let end = trajectory.end_time();
    for ix in 0..opt.samples {
        let t = start + (end - start) * ix as f64 / opt.samples as f64;
        let position = trajectory.position(t).expect("position query failed");
        let rotation = trajectory.rotation(t).expect("rotation query failed");
        info!(
            "t = {:7.3} s  position = [{:7.3}, {:7.3}, {:7.3}]  yaw = {:6.3} rad",
            t,
            position.x,
            position.y,
            position.z,
            rotation.euler_angles().2
        );
    }

    if let Some(path) = opt.output {
        info!("saving the dataset to {}", path.display());
        match std::fs::File::create(&path) {
            Ok(file) => {
                if let Err(e) = serde_json::to_writer_pretty(file, &dataset) {
                    error!("unable to save the dataset: {}", e);
                }
            }
            Err(e) => error!("unable to create {}: {}", path.display(), e),
        }
    }
}
