use rsim_core::nalgebra::{Point3, UnitQuaternion};
use rsim_core::TimeSeries;
use rsim_geom::quat::{self, InterpolationError};
use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The ways a trajectory query can fail.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TrajectoryError {
    /// The query time is outside the trajectory domain.
    ///
    /// The domain is half-open: queries at or after `end` are rejected, and the query
    /// is never clamped on the caller's behalf.
    #[error("query time {t} s outside the trajectory domain [{start}, {end}) s")]
    OutOfRange { t: f64, start: f64, end: f64 },
    /// The trajectory was derived without a position series.
    #[error("this trajectory has no position channel")]
    NoPosition,
    /// The trajectory was derived without an orientation series.
    #[error("this trajectory has no rotation channel")]
    NoRotation,
}

impl From<InterpolationError> for TrajectoryError {
    fn from(err: InterpolationError) -> Self {
        let InterpolationError::OutOfRange { t, start, end } = err;
        TrajectoryError::OutOfRange { t, start, end }
    }
}

/// A continuous-time pose function derived from the sampled series of a
/// [`Dataset`](crate::Dataset).
///
/// This is derived state: it is rebuilt by
/// [`Dataset::rebuild_trajectory`](crate::Dataset::rebuild_trajectory) whenever a
/// series is replaced, and is not meant to be assembled by consumers. Which variant is
/// produced depends on which series the dataset holds. Interpolation passes exactly through the samples
/// (piecewise linear for position, spherical for rotation); rotation smoothing is
/// disabled by policy.
///
/// Queries are valid over the half-open interval `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Trajectory {
    /// Position channel only.
    Position(TimeSeries<Point3<f64>>),
    /// Rotation channel only.
    Rotation(TimeSeries<UnitQuaternion<f64>>),
    /// Both channels, each keeping its own sampling.
    Combined {
        position: TimeSeries<Point3<f64>>,
        rotation: TimeSeries<UnitQuaternion<f64>>,
    },
}

impl Trajectory {
    /// The earliest queryable time in seconds.
    ///
    /// For a combined trajectory this is the later of the two channel starts, so that
    /// every queryable time can answer for both channels.
    pub fn start_time(&self) -> f64 {
        match self {
            Trajectory::Position(position) => position.start_time(),
            Trajectory::Rotation(rotation) => rotation.start_time(),
            Trajectory::Combined { position, rotation } => {
                position.start_time().max(rotation.start_time())
            }
        }
    }

    /// The exclusive end of the queryable span in seconds.
    pub fn end_time(&self) -> f64 {
        match self {
            Trajectory::Position(position) => position.end_time(),
            Trajectory::Rotation(rotation) => rotation.end_time(),
            Trajectory::Combined { position, rotation } => {
                position.end_time().min(rotation.end_time())
            }
        }
    }

    /// The interpolated position at time `t`.
    pub fn position(&self, t: f64) -> Result<Point3<f64>, TrajectoryError> {
        let series = match self {
            Trajectory::Position(position) => position,
            Trajectory::Combined { position, .. } => position,
            Trajectory::Rotation(_) => return Err(TrajectoryError::NoPosition),
        };
        let times = series.timestamps();
        let i = times.partition_point(|&ts| ts <= t);
        if i == 0 || i == times.len() {
            return Err(TrajectoryError::OutOfRange {
                t,
                start: series.start_time(),
                end: series.end_time(),
            });
        }
        let t0 = times[i - 1];
        let t1 = times[i];
        let tau = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
        let p0 = series.values()[i - 1];
        let p1 = series.values()[i];
        Ok(p0 + (p1 - p0) * tau)
    }

    /// The interpolated rotation at time `t`.
    pub fn rotation(&self, t: f64) -> Result<UnitQuaternion<f64>, TrajectoryError> {
        let series = match self {
            Trajectory::Rotation(rotation) => rotation,
            Trajectory::Combined { rotation, .. } => rotation,
            Trajectory::Position(_) => return Err(TrajectoryError::NoRotation),
        };
        Ok(quat::interpolate_at(series, t)?)
    }
}
