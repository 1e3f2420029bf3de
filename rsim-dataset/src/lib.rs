//! Assembly of synthetic ground-truth datasets for rolling-shutter camera/IMU
//! simulation.
//!
//! The inputs are heterogeneous and asynchronous: a structure-from-motion
//! reconstruction contributes discrete camera poses on a frame-indexed clock, while a
//! gyroscope contributes high-rate angular velocity on its own clock. A [`Dataset`]
//! fuses one position source and one orientation source into sampled series plus a
//! continuous [`Trajectory`] the downstream simulator can query at arbitrary times,
//! together with the [`Landmark`] map from the reconstruction's point cloud.
//!
//! [`DatasetBuilder`] is the entry point: register the sources, pick where each of
//! orientation, position, and landmarks comes from, and call
//! [`build`](DatasetBuilder::build). When orientation comes from the gyroscope while
//! position and landmarks come from the reconstruction, the builder rotates and
//! truncates the integrated gyro stream into the reconstruction's reference frame
//! before ingestion.

mod trajectory;

pub use trajectory::*;

use float_ord::FloatOrd;
use itertools::Itertools;
use log::{debug, info};
use rsim_core::nalgebra::{Point3, UnitQuaternion, Vector3};
use rsim_core::{Camera, Landmark, ReconstructionModel, TimeSeries, TimeSeriesError};
use rsim_geom::integrate::integrate_gyro_uniform;
use rsim_geom::quat;
use rsim_geom::sampling::uniform_spacing;
use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A frame-number-to-seconds mapping supplied by the caller.
pub type FrameTimeFn<'a> = &'a dyn Fn(usize) -> f64;

/// Errors produced while assembling a [`Dataset`].
///
/// All of these are configuration or validation failures detected synchronously at
/// the offending call, before any state of the receiver is mutated. None of them are
/// transient: retrying the same configuration fails the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// Exactly one of the frame time function and the camera frame rate must be given.
    #[error("exactly one of a frame time function or a camera frame rate must be supplied")]
    AmbiguousTimeMapping,
    /// Gyroscope samples and timestamps must pair one to one.
    #[error("gyroscope stream has {samples} samples but {timestamps} timestamps")]
    GyroLengthMismatch { samples: usize, timestamps: usize },
    /// At least two samples are needed to establish the sample interval.
    #[error("gyroscope stream needs at least two samples, got {samples}")]
    GyroTooShort { samples: usize },
    /// The integrator only accepts uniformly sampled streams.
    #[error("gyroscope timestamps must be uniformly spaced")]
    NonUniformGyro,
    /// Only one reconstruction source may be registered per builder.
    #[error("a reconstruction source was already added")]
    DuplicateReconstruction,
    /// Only one gyroscope source may be registered per builder.
    #[error("a gyroscope source was already added")]
    DuplicateGyro,
    /// Deriving position from the gyroscope is not supported.
    #[error("position can only be sourced from the reconstruction")]
    UnsupportedPositionSource,
    /// All three source selectors must be set before building.
    #[error("orientation, position, and landmark sources must all be selected before building")]
    IncompleteConfiguration,
    /// A selector refers to the reconstruction but none was registered.
    #[error("no reconstruction source was added")]
    MissingReconstruction,
    /// The orientation selector refers to the gyroscope but none was registered.
    #[error("no gyroscope source was added")]
    MissingGyro,
    /// The gyroscope stream ends before the first camera, leaving nothing to anchor on.
    #[error("no camera at or after the first gyroscope timestamp")]
    AlignmentFailed,
    /// A series failed its construction invariants.
    #[error(transparent)]
    TimeSeries(#[from] TimeSeriesError),
}

/// Raw gyroscope input for [`Dataset::orientation_from_gyro`].
#[derive(Debug, Clone, PartialEq)]
pub enum GyroSamples {
    /// Body-frame angular velocities in radians per second.
    ///
    /// Must be uniformly sampled; the stream is integrated into orientations.
    AngularVelocity(Vec<Vector3<f64>>),
    /// Already-integrated orientation samples, used as-is.
    Orientation(Vec<UnitQuaternion<f64>>),
}

/// The assembled ground-truth dataset.
///
/// Holds at most one position series and one orientation series, the [`Landmark`]
/// map, and the derived [`Trajectory`]. The ingestion methods replace their series
/// wholesale; after any series change the owner calls
/// [`rebuild_trajectory`](Self::rebuild_trajectory) to re-derive the trajectory.
/// Once built by a
/// [`DatasetBuilder`] the dataset is treated as immutable and may be shared read-only.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Dataset {
    position: Option<TimeSeries<Point3<f64>>>,
    orientation: Option<TimeSeries<UnitQuaternion<f64>>>,
    trajectory: Option<Trajectory>,
    landmarks: Vec<Landmark>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the position series with camera positions from a reconstruction.
    ///
    /// Exactly one of `frame_to_time` and `frame_rate` maps frame numbers to seconds;
    /// supplying both or neither is [`DatasetError::AmbiguousTimeMapping`]. Cameras
    /// are sorted by frame number first, so sources need not be pre-sorted. The
    /// resulting series keeps the mapped camera times, which may be non-uniform.
    pub fn position_from_reconstruction(
        &mut self,
        model: &ReconstructionModel,
        frame_to_time: Option<FrameTimeFn>,
        frame_rate: Option<f64>,
    ) -> Result<(), DatasetError> {
        let frame_time = resolve_frame_time(frame_to_time, frame_rate)?;
        let cameras = cameras_by_frame(model);
        let times = cameras.iter().map(|c| frame_time(c.frame_number)).collect();
        let positions = cameras.iter().map(|c| c.position).collect();
        self.position = Some(TimeSeries::new(times, positions)?);
        Ok(())
    }

    /// Replaces the orientation series with camera orientations from a reconstruction.
    ///
    /// Same time-mapping precondition as
    /// [`position_from_reconstruction`](Self::position_from_reconstruction). The
    /// orientations are made sign-continuous
    /// and then resampled onto a uniform grid of the same length, because the spline
    /// stage downstream requires uniform sample times and mapped camera times are not
    /// uniform in general.
    pub fn orientation_from_reconstruction(
        &mut self,
        model: &ReconstructionModel,
        frame_to_time: Option<FrameTimeFn>,
        frame_rate: Option<f64>,
    ) -> Result<(), DatasetError> {
        let frame_time = resolve_frame_time(frame_to_time, frame_rate)?;
        let cameras = cameras_by_frame(model);
        let times = cameras.iter().map(|c| frame_time(c.frame_number)).collect();
        let orientations: Vec<UnitQuaternion<f64>> =
            cameras.iter().map(|c| c.orientation).collect();
        let series = TimeSeries::new(times, quat::unflipped(&orientations))?;
        self.orientation = Some(quat::resample(&series, None)?);
        Ok(())
    }

    /// Replaces the orientation series from a gyroscope stream.
    ///
    /// Angular velocity input is validated for pairing and uniform spacing and then
    /// integrated from the identity; orientation input is taken as-is. Either way the
    /// result is made sign-continuous before assignment.
    pub fn orientation_from_gyro(
        &mut self,
        samples: GyroSamples,
        timestamps: &[f64],
    ) -> Result<(), DatasetError> {
        let orientations = match samples {
            GyroSamples::AngularVelocity(rates) => {
                if rates.len() != timestamps.len() {
                    return Err(DatasetError::GyroLengthMismatch {
                        samples: rates.len(),
                        timestamps: timestamps.len(),
                    });
                }
                if timestamps.len() < 2 {
                    return Err(DatasetError::GyroTooShort {
                        samples: timestamps.len(),
                    });
                }
                let dt = uniform_spacing(timestamps).ok_or(DatasetError::NonUniformGyro)?;
                integrate_gyro_uniform(&rates, dt, None)
            }
            GyroSamples::Orientation(orientations) => {
                if orientations.len() != timestamps.len() {
                    return Err(DatasetError::GyroLengthMismatch {
                        samples: orientations.len(),
                        timestamps: timestamps.len(),
                    });
                }
                orientations
            }
        };
        self.orientation = Some(TimeSeries::new(
            timestamps.to_vec(),
            quat::unflipped(&orientations),
        )?);
        Ok(())
    }

    /// Appends one [`Landmark`] per reconstruction point, preserving source order.
    ///
    /// Additive: repeated calls accumulate rather than replace.
    pub fn landmarks_from_reconstruction(&mut self, model: &ReconstructionModel) {
        self.landmarks
            .extend(model.points.iter().copied().map(Landmark));
    }

    /// Re-derives the continuous trajectory from whichever series are present.
    ///
    /// Invoked by the owning aggregate after any series assignment so that the
    /// trigger is visible at the call site. Produces the position-only,
    /// rotation-only, or combined [`Trajectory`] variant, or none when no series is
    /// present. Rotation samples are interpolated exactly; smoothing stays disabled.
    pub fn rebuild_trajectory(&mut self) {
        self.trajectory = match (&self.position, &self.orientation) {
            (Some(position), None) => Some(Trajectory::Position(position.clone())),
            (None, Some(rotation)) => Some(Trajectory::Rotation(rotation.clone())),
            (Some(position), Some(rotation)) => Some(Trajectory::Combined {
                position: position.clone(),
                rotation: rotation.clone(),
            }),
            (None, None) => None,
        };
    }

    /// The derived trajectory, if any series has been ingested and
    /// [`rebuild_trajectory`](Self::rebuild_trajectory) has run since.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// The landmark map.
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// The raw position series, if ingested.
    pub fn position_series(&self) -> Option<&TimeSeries<Point3<f64>>> {
        self.position.as_ref()
    }

    /// The raw orientation series, if ingested.
    pub fn orientation_series(&self) -> Option<&TimeSeries<UnitQuaternion<f64>>> {
        self.orientation.as_ref()
    }
}

/// Where the orientation series of a dataset under construction comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationSource {
    /// Camera orientations from the reconstruction.
    Reconstruction,
    /// The integrated and aligned gyroscope stream.
    Gyroscope,
}

/// Where the position series of a dataset under construction comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    /// Camera positions from the reconstruction.
    Reconstruction,
    /// Selectable for symmetry, but rejected by [`DatasetBuilder::build`]: deriving
    /// position from a gyroscope is unsupported.
    Gyroscope,
}

/// Where the landmark map comes from. The reconstruction is the only provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkSource {
    /// The reconstruction's point cloud.
    Reconstruction,
}

/// The selector slots of a [`DatasetBuilder`], each unset until chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectedSources {
    pub orientation: Option<OrientationSource>,
    pub position: Option<PositionSource>,
    pub landmark: Option<LandmarkSource>,
}

#[derive(Debug, Clone)]
struct ReconstructionSource {
    model: ReconstructionModel,
    camera_frame_rate: f64,
}

#[derive(Debug, Clone)]
struct GyroSource {
    rates: Vec<Vector3<f64>>,
    timestamps: Vec<f64>,
    /// Integrated eagerly at registration so malformed streams fail fast.
    orientations: Vec<UnitQuaternion<f64>>,
}

/// Builds a [`Dataset`] from registered sources and per-channel source selections.
///
/// A builder accepts at most one reconstruction source and at most one gyroscope
/// source, plus one selection for each of the orientation, position, and landmark
/// channels. [`build`](Self::build) validates the configuration, aligns the gyroscope
/// stream to the reconstruction's reference frame when the two are combined, and
/// produces the finished dataset. The builder is consumed by `build` and is not
/// reusable afterwards.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    reconstruction: Option<ReconstructionSource>,
    gyro: Option<GyroSource>,
    sources: SelectedSources,
}

impl DatasetBuilder {
    /// Creates a builder with no sources registered or selected.
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers the reconstruction source and its camera frame rate in frames per
    /// second. A second registration is rejected.
    pub fn add_source_reconstruction(
        &mut self,
        model: ReconstructionModel,
        camera_frame_rate: f64,
    ) -> Result<(), DatasetError> {
        if self.reconstruction.is_some() {
            return Err(DatasetError::DuplicateReconstruction);
        }
        info!(
            "registered reconstruction source with {} cameras and {} points",
            model.cameras.len(),
            model.points.len()
        );
        self.reconstruction = Some(ReconstructionSource {
            model,
            camera_frame_rate,
        });
        Ok(())
    }

    /// Registers the gyroscope source: body-frame angular velocities in radians per
    /// second and their timestamps in seconds.
    ///
    /// The stream is validated (pairing, at least two samples, uniform spacing) and
    /// integrated immediately, so a malformed stream fails here rather than at build
    /// time. A second registration is rejected.
    pub fn add_source_gyro(
        &mut self,
        rates: Vec<Vector3<f64>>,
        timestamps: Vec<f64>,
    ) -> Result<(), DatasetError> {
        if self.gyro.is_some() {
            return Err(DatasetError::DuplicateGyro);
        }
        if rates.len() != timestamps.len() {
            return Err(DatasetError::GyroLengthMismatch {
                samples: rates.len(),
                timestamps: timestamps.len(),
            });
        }
        if timestamps.len() < 2 {
            return Err(DatasetError::GyroTooShort {
                samples: timestamps.len(),
            });
        }
        let dt = uniform_spacing(&timestamps).ok_or(DatasetError::NonUniformGyro)?;
        let orientations = integrate_gyro_uniform(&rates, dt, None);
        debug!(
            "integrated {} gyroscope samples at {} s intervals",
            rates.len(),
            dt
        );
        self.gyro = Some(GyroSource {
            rates,
            timestamps,
            orientations,
        });
        Ok(())
    }

    /// Selects where the orientation series comes from.
    pub fn set_orientation_source(&mut self, source: OrientationSource) {
        self.sources.orientation = Some(source);
    }

    /// Selects where the position series comes from.
    pub fn set_position_source(&mut self, source: PositionSource) {
        self.sources.position = Some(source);
    }

    /// Selects where the landmark map comes from.
    pub fn set_landmark_source(&mut self, source: LandmarkSource) {
        self.sources.landmark = Some(source);
    }

    /// The current selector slots.
    pub fn selected_sources(&self) -> SelectedSources {
        self.sources
    }

    /// The eagerly integrated gyroscope orientation stream, if a gyroscope source was
    /// registered.
    ///
    /// This is the raw integration from the identity, before any alignment to the
    /// reconstruction's reference frame.
    pub fn gyro_orientations(&self) -> Option<&[UnitQuaternion<f64>]> {
        self.gyro.as_ref().map(|gyro| gyro.orientations.as_slice())
    }

    /// Validates the configuration and produces the dataset.
    ///
    /// Landmarks always come from the reconstruction, which must therefore be
    /// registered. When every channel selects the reconstruction, orientation and
    /// position are taken directly from the camera poses. When orientation selects
    /// the gyroscope, the integrated stream is first aligned to the reconstruction's
    /// reference frame and clock; position still comes from the reconstruction.
    pub fn build(self) -> Result<Dataset, DatasetError> {
        let (orientation_source, position_source) =
            match (self.sources.orientation, self.sources.position, self.sources.landmark) {
                (Some(orientation), Some(position), Some(LandmarkSource::Reconstruction)) => {
                    (orientation, position)
                }
                _ => return Err(DatasetError::IncompleteConfiguration),
            };
        if position_source == PositionSource::Gyroscope {
            return Err(DatasetError::UnsupportedPositionSource);
        }
        let recon = self
            .reconstruction
            .as_ref()
            .ok_or(DatasetError::MissingReconstruction)?;

        let mut dataset = Dataset::new();
        dataset.landmarks_from_reconstruction(&recon.model);
        info!(
            "ingested {} landmarks from the reconstruction",
            dataset.landmarks().len()
        );

        match orientation_source {
            OrientationSource::Reconstruction => {
                dataset.orientation_from_reconstruction(
                    &recon.model,
                    None,
                    Some(recon.camera_frame_rate),
                )?;
            }
            OrientationSource::Gyroscope => {
                let gyro = self.gyro.as_ref().ok_or(DatasetError::MissingGyro)?;
                let (orientations, timestamps) = aligned_gyro_orientations(recon, gyro)?;
                dataset.orientation_from_gyro(GyroSamples::Orientation(orientations), &timestamps)?;
            }
        }
        dataset.position_from_reconstruction(&recon.model, None, Some(recon.camera_frame_rate))?;
        dataset.rebuild_trajectory();
        info!(
            "built dataset spanning [{}, {}) s",
            dataset.trajectory().map(Trajectory::start_time).unwrap_or(0.0),
            dataset.trajectory().map(Trajectory::end_time).unwrap_or(0.0),
        );
        Ok(dataset)
    }
}

/// Rotates and truncates the integrated gyroscope stream into the reconstruction's
/// reference frame.
///
/// The gyroscope orientation is only known up to an arbitrary initial rotation and
/// runs on its own clock. The reconstruction defines the world frame and a
/// frame-indexed clock, so the first camera inside the gyroscope's time span anchors
/// the alignment: integration restarts at the gyroscope sample nearest that camera,
/// seeded with the camera's camera-to-world rotation. The reconstruction stores
/// world-to-camera, so the seed is conjugated going in and the integrated stream is
/// conjugated coming back out. Samples before the anchor are discarded, not
/// backfilled.
fn aligned_gyro_orientations(
    recon: &ReconstructionSource,
    gyro: &GyroSource,
) -> Result<(Vec<UnitQuaternion<f64>>, Vec<f64>), DatasetError> {
    let cameras = cameras_by_frame(&recon.model);
    let camera_times: Vec<f64> = cameras
        .iter()
        .map(|c| c.frame_number as f64 / recon.camera_frame_rate)
        .collect();

    let cam_ix = camera_times
        .iter()
        .position(|&t| t >= gyro.timestamps[0])
        .ok_or(DatasetError::AlignmentFailed)?;
    let cam_ref = &cameras[cam_ix];
    let t_ref = camera_times[cam_ix];

    let start = gyro
        .timestamps
        .iter()
        .enumerate()
        .min_by_key(|(_, &t)| FloatOrd((t - t_ref).abs()))
        .map(|(ix, _)| ix)
        .ok_or(DatasetError::AlignmentFailed)?;

    let rates = &gyro.rates[start..];
    let timestamps = &gyro.timestamps[start..];
    // Spacing was validated at registration, so the interval of the full stream holds
    // for the truncated one.
    let dt = gyro.timestamps[1] - gyro.timestamps[0];
    let initial = cam_ref.orientation.conjugate();
    let integrated = integrate_gyro_uniform(rates, dt, Some(initial));
    let orientations = integrated.iter().map(UnitQuaternion::conjugate).collect();
    debug!(
        "aligned gyroscope stream to camera frame {} at {} s, keeping {} of {} samples",
        cam_ref.frame_number,
        t_ref,
        timestamps.len(),
        gyro.timestamps.len()
    );
    Ok((orientations, timestamps.to_vec()))
}

/// Cameras sorted ascending by frame number; sources are not assumed pre-sorted.
fn cameras_by_frame(model: &ReconstructionModel) -> Vec<Camera> {
    model
        .cameras
        .iter()
        .copied()
        .sorted_by_key(|c| c.frame_number)
        .collect()
}

fn resolve_frame_time<'a>(
    frame_to_time: Option<FrameTimeFn<'a>>,
    frame_rate: Option<f64>,
) -> Result<Box<dyn Fn(usize) -> f64 + 'a>, DatasetError> {
    match (frame_to_time, frame_rate) {
        (Some(frame_to_time), None) => Ok(Box::new(frame_to_time)),
        (None, Some(frame_rate)) => Ok(Box::new(move |frame| frame as f64 / frame_rate)),
        _ => Err(DatasetError::AmbiguousTimeMapping),
    }
}
