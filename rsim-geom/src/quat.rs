//! Sign-continuity correction and spherical interpolation over quaternion sequences.

use crate::sampling::TIMESTAMP_EQ_TOLERANCE;
use rsim_core::nalgebra::UnitQuaternion;
use rsim_core::{TimeSeries, TimeSeriesError};
use thiserror::Error;

/// Cosine threshold past which a quaternion pair is treated as coincident and the
/// slerp arc degenerates to the first endpoint.
const SLERP_PARALLEL_THRESHOLD: f64 = 1.0 - 1e-12;

/// The ways a single-point interpolation query can fail.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum InterpolationError {
    /// The query time is outside the interpolable span of the series.
    ///
    /// The span is half-open: queries at or after the last sample are rejected, and
    /// no clamping is performed on the caller's behalf.
    #[error("query time {t} s outside the interpolable range [{start}, {end}) s")]
    OutOfRange { t: f64, start: f64, end: f64 },
}

/// Returns a sign-continuous copy of a quaternion sequence.
///
/// Each quaternion is replaced by its negation whenever that brings it closer to its
/// predecessor, eliminating the double-cover sign hops of unit quaternions. Any slerp
/// chain or spline fit over the sequence must run on the unflipped form or it can
/// take the long way around the rotation. Idempotent.
pub fn unflipped(quaternions: &[UnitQuaternion<f64>]) -> Vec<UnitQuaternion<f64>> {
    let mut out: Vec<UnitQuaternion<f64>> = Vec::with_capacity(quaternions.len());
    for &q in quaternions {
        let q = match out.last() {
            Some(prev) if prev.coords.dot(&q.coords) < 0.0 => {
                UnitQuaternion::new_unchecked(-q.into_inner())
            }
            _ => q,
        };
        out.push(q);
    }
    out
}

/// Spherical linear interpolation between two unit quaternions.
///
/// `tau` runs from 0 (`q0`) to 1 (`q1`) along the geodesic arc connecting the pair.
/// The pair is assumed sign-continuous (see [`unflipped`]); an antipodal pair has no
/// unique short arc. Nearly coincident pairs short-circuit to `q0`, so interpolating
/// between two equal quaternions is exact for every `tau`.
pub fn slerp(
    q0: UnitQuaternion<f64>,
    q1: UnitQuaternion<f64>,
    tau: f64,
) -> UnitQuaternion<f64> {
    let dot = q0.coords.dot(&q1.coords).clamp(-1.0, 1.0);
    if dot.abs() >= SLERP_PARALLEL_THRESHOLD {
        return q0;
    }
    let theta = dot.acos();
    let sin_theta = theta.sin();
    let a = ((1.0 - tau) * theta).sin() / sin_theta;
    let b = (tau * theta).sin() / sin_theta;
    UnitQuaternion::new_normalize(q0.into_inner() * a + q1.into_inner() * b)
}

/// Resamples a quaternion series onto a uniform time grid.
///
/// The grid spans the input's first to last timestamp with `target_count` points
/// (defaulting to the input length, which keeps the endpoints fixed). Grid points
/// that coincide with an original timestamp within
/// [`TIMESTAMP_EQ_TOLERANCE`](crate::sampling::TIMESTAMP_EQ_TOLERANCE) copy that
/// sample; all others slerp between the bracketing samples at the time-ratio `tau`.
/// The first grid point always coincides with the first sample.
///
/// Spline fitting downstream requires uniform sample times, which neither
/// gyro-aligned nor camera-derived orientation series have by construction.
pub fn resample(
    series: &TimeSeries<UnitQuaternion<f64>>,
    target_count: Option<usize>,
) -> Result<TimeSeries<UnitQuaternion<f64>>, TimeSeriesError> {
    let n = target_count.unwrap_or_else(|| series.len());
    let times = series.timestamps();
    let quats = series.values();
    let first = series.start_time();
    let last = series.end_time();

    let mut new_times = Vec::with_capacity(n);
    let mut new_quats = Vec::with_capacity(n);
    for k in 0..n {
        let t = if k == 0 {
            first
        } else if k + 1 == n {
            last
        } else {
            first + (last - first) * k as f64 / (n - 1) as f64
        };
        // First original timestamp at or after t; the end of the grid can overshoot
        // the last sample by a rounding error, so clamp the index.
        let i = times.partition_point(|&ts| ts < t).min(times.len() - 1);
        if (times[i] - t).abs() <= TIMESTAMP_EQ_TOLERANCE {
            new_quats.push(quats[i]);
        } else {
            let t0 = times[i - 1];
            let tau = (t - t0) / (times[i] - t0);
            new_quats.push(slerp(quats[i - 1], quats[i], tau));
        }
        new_times.push(t);
    }
    TimeSeries::new(new_times, new_quats)
}

/// Interpolates a quaternion series at a single query time.
///
/// Finds the first sample strictly after `t` and slerps from its predecessor using
/// the time-ratio `tau` clamped to `[0, 1]`. The query domain is the half-open
/// interval from the first to the last timestamp; anything outside it is an
/// [`InterpolationError::OutOfRange`].
pub fn interpolate_at(
    series: &TimeSeries<UnitQuaternion<f64>>,
    t: f64,
) -> Result<UnitQuaternion<f64>, InterpolationError> {
    let times = series.timestamps();
    let i = times.partition_point(|&ts| ts <= t);
    if i == 0 || i == times.len() {
        return Err(InterpolationError::OutOfRange {
            t,
            start: series.start_time(),
            end: series.end_time(),
        });
    }
    let t0 = times[i - 1];
    let t1 = times[i];
    let tau = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
    Ok(slerp(series.values()[i - 1], series.values()[i], tau))
}
