//! This crate contains the pure computational routines used to build ground-truth
//! trajectories for rsim.
//!
//! ## Quaternion sequences
//!
//! Unit quaternions double-cover the rotation group: `q` and `-q` describe the same
//! rotation. A sequence sampled from a continuous motion can therefore hop between the
//! two sheets from one sample to the next, and any interpolation across such a hop
//! takes the long way around the rotation sphere. [`quat::unflipped`] removes the sign
//! hops so that [`quat::slerp`], [`quat::resample`], and [`quat::interpolate_at`]
//! always travel the short arc.
//!
//! ## Gyroscope integration
//!
//! [`integrate::integrate_gyro_uniform`] turns a uniformly sampled angular velocity
//! stream into an orientation stream by integrating the rotation ODE one sample
//! interval at a time. Uniform sampling is a precondition; callers validate it with
//! [`sampling::uniform_spacing`] first.

pub mod integrate;
pub mod quat;
pub mod sampling;
