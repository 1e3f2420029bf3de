//! Timestamp spacing checks shared by the resampling and integration paths.

/// Absolute tolerance in seconds when testing two timestamps for coincidence.
pub const TIMESTAMP_EQ_TOLERANCE: f64 = 1e-8;

/// Relative tolerance when validating uniform sample spacing.
pub const UNIFORM_SPACING_RTOL: f64 = 1e-5;

/// Absolute tolerance in seconds when validating uniform sample spacing.
pub const UNIFORM_SPACING_ATOL: f64 = 1e-8;

/// Returns the common sample interval in seconds if `timestamps` are uniformly spaced.
///
/// The interval is taken from the first pair and every consecutive delta must match it
/// within [`UNIFORM_SPACING_RTOL`] and [`UNIFORM_SPACING_ATOL`]. Returns `None` for
/// fewer than two samples, for a non-positive interval, and for non-uniform spacing.
pub fn uniform_spacing(timestamps: &[f64]) -> Option<f64> {
    if timestamps.len() < 2 {
        return None;
    }
    let dt = timestamps[1] - timestamps[0];
    if dt <= 0.0 {
        return None;
    }
    let uniform = timestamps
        .windows(2)
        .all(|w| ((w[1] - w[0]) - dt).abs() <= UNIFORM_SPACING_ATOL + UNIFORM_SPACING_RTOL * dt);
    uniform.then(|| dt)
}
