use glam::Affine3A;
use serde::{Deserialize, Serialize};

/// One joint of a [`Skeleton`](crate::skeleton::Skeleton): an immutable node
/// in a rigid hierarchy.
///
/// The inverse bind pose takes a point from model space into this joint's
/// local bind space. It is fixed at authoring time; everything a pose
/// computes is measured against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    /// Position of this joint in the skeleton's joint array.
    #[serde(default)]
    pub index: i16,
    /// Position of the parent joint, or [`Joint::NO_PARENT`] for a root.
    /// Must reference a strictly earlier array position.
    #[serde(default)]
    pub parent_index: i16,
    #[serde(default)]
    pub inverse_bind_pose: Affine3A,
}

impl Joint {
    /// Sentinel parent index for root joints.
    pub const NO_PARENT: i16 = -1;

    #[must_use]
    pub fn new(
        name: impl Into<String>,
        index: i16,
        parent_index: i16,
        inverse_bind_pose: Affine3A,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            parent_index,
            inverse_bind_pose,
        }
    }

    /// A joint with no parent.
    #[must_use]
    pub fn root(name: impl Into<String>, index: i16, inverse_bind_pose: Affine3A) -> Self {
        Self::new(name, index, Self::NO_PARENT, inverse_bind_pose)
    }

    /// Parent position in the joint array, if this joint has one.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        usize::try_from(self.parent_index).ok()
    }
}
