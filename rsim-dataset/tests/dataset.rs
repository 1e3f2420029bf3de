use rsim_core::nalgebra::{Point3, UnitQuaternion, Vector3};
use rsim_core::{Camera, ReconstructionModel};
use rsim_dataset::{
    Dataset, DatasetBuilder, DatasetError, LandmarkSource, OrientationSource, PositionSource,
};

const CAMERA_FRAME_RATE: f64 = 30.0;
const GYRO_DT: f64 = 0.01;
const GYRO_SAMPLES: usize = 200;

fn rot_z(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle)
}

/// Three cameras at frames 0, 30, 60, mapping to 0, 1, 2 seconds at 30 fps.
fn sample_model() -> ReconstructionModel {
    let cameras = [0usize, 30, 60]
        .iter()
        .enumerate()
        .map(|(ix, &frame_number)| Camera {
            frame_number,
            position: Point3::new(ix as f64, 0.5 * ix as f64, 0.0),
            orientation: rot_z(0.3 + 0.2 * ix as f64),
        })
        .collect();
    let points = (0..40)
        .map(|ix| Point3::new(ix as f64 * 0.1, (ix % 7) as f64, -(ix as f64)))
        .collect();
    ReconstructionModel { cameras, points }
}

fn gyro_stream(rate: Vector3<f64>) -> (Vec<Vector3<f64>>, Vec<f64>) {
    let rates = vec![rate; GYRO_SAMPLES];
    let timestamps = (0..GYRO_SAMPLES).map(|i| i as f64 * GYRO_DT).collect();
    (rates, timestamps)
}

fn gyro_builder(rate: Vector3<f64>) -> DatasetBuilder {
    let mut builder = DatasetBuilder::new();
    builder
        .add_source_reconstruction(sample_model(), CAMERA_FRAME_RATE)
        .unwrap();
    let (rates, timestamps) = gyro_stream(rate);
    builder.add_source_gyro(rates, timestamps).unwrap();
    builder.set_orientation_source(OrientationSource::Gyroscope);
    builder.set_position_source(PositionSource::Reconstruction);
    builder.set_landmark_source(LandmarkSource::Reconstruction);
    builder
}

#[test]
fn rejects_dual_time_mapping() {
    let model = sample_model();
    let mut dataset = Dataset::new();
    let identity_mapping = |frame: usize| frame as f64;
    let err = dataset
        .position_from_reconstruction(&model, Some(&identity_mapping), Some(CAMERA_FRAME_RATE))
        .unwrap_err();
    assert_eq!(err, DatasetError::AmbiguousTimeMapping);
    let err = dataset
        .orientation_from_reconstruction(&model, Some(&identity_mapping), Some(CAMERA_FRAME_RATE))
        .unwrap_err();
    assert_eq!(err, DatasetError::AmbiguousTimeMapping);
}

#[test]
fn rejects_absent_time_mapping() {
    let model = sample_model();
    let mut dataset = Dataset::new();
    let err = dataset
        .position_from_reconstruction(&model, None, None)
        .unwrap_err();
    assert_eq!(err, DatasetError::AmbiguousTimeMapping);
}

#[test]
fn rejects_non_uniform_gyro() {
    let mut builder = DatasetBuilder::new();
    let err = builder
        .add_source_gyro(vec![Vector3::zeros(); 3], vec![0.0, 0.01, 0.03])
        .unwrap_err();
    assert_eq!(err, DatasetError::NonUniformGyro);
}

#[test]
fn rejects_mismatched_gyro_lengths() {
    let mut builder = DatasetBuilder::new();
    let err = builder
        .add_source_gyro(vec![Vector3::zeros(); 3], vec![0.0, 0.01])
        .unwrap_err();
    assert_eq!(
        err,
        DatasetError::GyroLengthMismatch {
            samples: 3,
            timestamps: 2
        }
    );
}

#[test]
fn rejects_duplicate_sources() {
    let mut builder = DatasetBuilder::new();
    builder
        .add_source_reconstruction(sample_model(), CAMERA_FRAME_RATE)
        .unwrap();
    let err = builder
        .add_source_reconstruction(sample_model(), CAMERA_FRAME_RATE)
        .unwrap_err();
    assert_eq!(err, DatasetError::DuplicateReconstruction);

    let (rates, timestamps) = gyro_stream(Vector3::zeros());
    builder
        .add_source_gyro(rates.clone(), timestamps.clone())
        .unwrap();
    let err = builder.add_source_gyro(rates, timestamps).unwrap_err();
    assert_eq!(err, DatasetError::DuplicateGyro);
}

#[test]
fn rejects_incomplete_configuration() {
    let mut builder = DatasetBuilder::new();
    builder
        .add_source_reconstruction(sample_model(), CAMERA_FRAME_RATE)
        .unwrap();
    builder.set_orientation_source(OrientationSource::Reconstruction);
    builder.set_position_source(PositionSource::Reconstruction);
    // Landmark source left unset.
    let err = builder.build().unwrap_err();
    assert_eq!(err, DatasetError::IncompleteConfiguration);
}

#[test]
fn rejects_position_from_gyro() {
    let mut builder = gyro_builder(Vector3::zeros());
    builder.set_position_source(PositionSource::Gyroscope);
    let err = builder.build().unwrap_err();
    assert_eq!(err, DatasetError::UnsupportedPositionSource);
}

#[test]
fn rejects_missing_referenced_sources() {
    let mut builder = DatasetBuilder::new();
    builder.set_orientation_source(OrientationSource::Reconstruction);
    builder.set_position_source(PositionSource::Reconstruction);
    builder.set_landmark_source(LandmarkSource::Reconstruction);
    let err = builder.build().unwrap_err();
    assert_eq!(err, DatasetError::MissingReconstruction);

    let mut builder = DatasetBuilder::new();
    builder
        .add_source_reconstruction(sample_model(), CAMERA_FRAME_RATE)
        .unwrap();
    builder.set_orientation_source(OrientationSource::Gyroscope);
    builder.set_position_source(PositionSource::Reconstruction);
    builder.set_landmark_source(LandmarkSource::Reconstruction);
    let err = builder.build().unwrap_err();
    assert_eq!(err, DatasetError::MissingGyro);
}

#[test]
fn selected_sources_reflect_the_setters() {
    let mut builder = DatasetBuilder::new();
    assert_eq!(builder.selected_sources().orientation, None);
    builder.set_orientation_source(OrientationSource::Gyroscope);
    builder.set_landmark_source(LandmarkSource::Reconstruction);
    let sources = builder.selected_sources();
    assert_eq!(sources.orientation, Some(OrientationSource::Gyroscope));
    assert_eq!(sources.position, None);
    assert_eq!(sources.landmark, Some(LandmarkSource::Reconstruction));
}

#[test]
fn end_to_end_gyro_orientation_with_reconstruction_position() {
    let model = sample_model();
    let builder = gyro_builder(Vector3::new(0.0, 0.0, 0.4));
    // The gyroscope stream was integrated eagerly at registration.
    assert_eq!(builder.gyro_orientations().unwrap().len(), GYRO_SAMPLES);
    let dataset = builder.build().unwrap();

    // The orientation series starts at or after the first camera's mapped time and
    // keeps the gyroscope's sampling.
    let orientation = dataset.orientation_series().unwrap();
    assert!(orientation.start_time() >= 0.0);
    assert_eq!(orientation.len(), GYRO_SAMPLES);

    // Position spans the camera times and interpolates between them.
    let position = dataset.position_series().unwrap();
    assert_eq!(position.timestamps(), &[0.0, 1.0, 2.0]);
    let trajectory = dataset.trajectory().unwrap();
    for t in [0.0, 0.5, 1.0, 1.5, 1.9] {
        let p = trajectory.position(t).unwrap();
        let expected = Point3::new(t, 0.5 * t, 0.0);
        assert!(
            (p - expected).norm() < 1e-9,
            "position at {} was {:?}, expected {:?}",
            t,
            p,
            expected
        );
    }

    assert_eq!(dataset.landmarks().len(), model.points.len());
}

#[test]
fn gyro_alignment_starts_in_the_reference_camera() {
    let model = sample_model();
    // With zero angular velocity the aligned stream must hold the reference camera's
    // orientation for its entire span; this pins the conjugation conventions of the
    // alignment step.
    let dataset = gyro_builder(Vector3::zeros()).build().unwrap();
    let orientation = dataset.orientation_series().unwrap();
    let reference = model.cameras[0].orientation;
    for (t, q) in orientation.iter() {
        assert!(
            q.angle_to(&reference) < 1e-9,
            "orientation at {} s drifted from the reference camera",
            t
        );
    }
}

#[test]
fn gyro_alignment_preserves_relative_rotation() {
    let rate = Vector3::new(0.0, 0.0, 0.4);
    let dataset = gyro_builder(rate).build().unwrap();
    let orientation = dataset.orientation_series().unwrap();
    // Conjugating the whole stream leaves relative angles intact, so the angle from
    // the first sample must grow with the integrated rate.
    let first = orientation.values()[0];
    let k = 150;
    let expected = rate.norm() * GYRO_DT * k as f64;
    let angle = first.angle_to(&orientation.values()[k]);
    assert!(
        (angle - expected).abs() < 1e-6,
        "angle after {} samples was {}, expected {}",
        k,
        angle,
        expected
    );
}

#[test]
fn all_reconstruction_build_matches_the_camera_poses() {
    let model = sample_model();
    let mut builder = DatasetBuilder::new();
    builder
        .add_source_reconstruction(model.clone(), CAMERA_FRAME_RATE)
        .unwrap();
    builder.set_orientation_source(OrientationSource::Reconstruction);
    builder.set_position_source(PositionSource::Reconstruction);
    builder.set_landmark_source(LandmarkSource::Reconstruction);
    let dataset = builder.build().unwrap();

    let position = dataset.position_series().unwrap();
    let orientation = dataset.orientation_series().unwrap();
    assert_eq!(position.timestamps(), &[0.0, 1.0, 2.0]);
    // Camera times are already uniform here, so resampling keeps them.
    assert_eq!(orientation.timestamps(), &[0.0, 1.0, 2.0]);
    for (camera, value) in model.cameras.iter().zip(orientation.values()) {
        assert!(value.angle_to(&camera.orientation) < 1e-9);
    }

    assert_eq!(dataset.landmarks().len(), model.points.len());
    for (landmark, point) in dataset.landmarks().iter().zip(&model.points) {
        assert_eq!(landmark.position(), *point);
    }

    let trajectory = dataset.trajectory().unwrap();
    assert_eq!(trajectory.start_time(), 0.0);
    assert_eq!(trajectory.end_time(), 2.0);
    assert!(trajectory.rotation(1.5).is_ok());
}
