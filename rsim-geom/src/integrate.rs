//! Gyroscope-to-orientation integration.

use rsim_core::nalgebra::{UnitQuaternion, Vector3};

/// Integrates a uniformly sampled angular velocity stream into an orientation stream.
///
/// `rates` are body-frame angular velocities in radians per second spaced `dt` seconds
/// apart. The output has the same length as the input: the first element is `initial`
/// (the identity when `None`) and each subsequent element composes the rotation
/// increment of one sample interval on the right. The propagated quaternion is the
/// camera-to-world rotation, so a world-to-camera initial orientation must be
/// conjugated before it is passed in and the stream conjugated back afterwards.
///
/// Uniform spacing is a precondition, not checked here; validate the timestamps with
/// [`crate::sampling::uniform_spacing`] before calling.
pub fn integrate_gyro_uniform(
    rates: &[Vector3<f64>],
    dt: f64,
    initial: Option<UnitQuaternion<f64>>,
) -> Vec<UnitQuaternion<f64>> {
    let mut out = Vec::with_capacity(rates.len());
    let mut q = initial.unwrap_or_else(UnitQuaternion::identity);
    if !rates.is_empty() {
        out.push(q);
    }
    for rate in &rates[..rates.len().saturating_sub(1)] {
        q *= UnitQuaternion::from_scaled_axis(rate * dt);
        q.renormalize();
        out.push(q);
    }
    out
}
