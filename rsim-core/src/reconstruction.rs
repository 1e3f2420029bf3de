use nalgebra::{Point3, UnitQuaternion};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A single camera pose recovered by a structure-from-motion reconstruction.
///
/// The orientation is the world-to-camera rotation, which is the convention of the
/// NVM-style sources this type models. Consumers that need the camera-to-world
/// rotation (such as the gyroscope alignment step) take the conjugate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Camera {
    /// The frame number this camera was reconstructed from.
    ///
    /// Frame numbers are mapped to timestamps by the dataset ingestion step. Cameras
    /// are not assumed to arrive sorted by frame number.
    pub frame_number: usize,
    /// The optical center in the world frame.
    pub position: Point3<f64>,
    /// The world-to-camera rotation.
    pub orientation: UnitQuaternion<f64>,
}

/// A structure-from-motion reconstruction, treated as an opaque source.
///
/// How the model was computed or loaded is not this crate's concern; it only exposes
/// the per-frame camera poses and the sparse point cloud that dataset construction
/// consumes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ReconstructionModel {
    /// The reconstructed cameras, in source order.
    pub cameras: Vec<Camera>,
    /// The sparse 3d point cloud in the world frame.
    pub points: Vec<Point3<f64>>,
}
