//! # rsim-core
//!
//! This library provides the shared data types for building synthetic ground-truth
//! datasets for rolling-shutter camera/IMU simulation. All the crates in the rsim
//! workspace that have or depend on dataset types depend on this crate. This includes
//! the sampled [`TimeSeries`], the [`Landmark`] map entries, and the types describing
//! a structure-from-motion [`ReconstructionModel`] source. The crate is designed to be
//! very small so that it adds negligible build time. Any code that performs actual
//! computation over these types belongs in `rsim-geom` or `rsim-dataset`, not here.

mod landmark;
mod reconstruction;
mod time_series;

pub use landmark::*;
pub use nalgebra;
pub use reconstruction::*;
pub use time_series::*;
