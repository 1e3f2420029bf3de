use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::Point3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A 3d landmark in the world frame of the reconstruction.
///
/// Landmarks are created in bulk from a reconstruction's point list and never mutated
/// afterwards. Their order is the insertion order from the source, which carries no
/// spatial meaning.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Landmark(pub Point3<f64>);

impl Landmark {
    /// The landmark position in the world frame.
    pub fn position(&self) -> Point3<f64> {
        self.0
    }
}
