use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::skeleton::Joint;

/// An immutable joint hierarchy, shared by reference across any number of
/// [`SkeletonPose`](crate::skeleton::SkeletonPose)s.
///
/// The joint array is topologically ordered: every non-root joint's
/// `parent_index` refers to a strictly earlier position. Pose evaluation
/// walks the array in order and relies on this; it is the authoring side's
/// job to uphold it, and a violation silently yields stale parent
/// transforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skeleton {
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub joints: Vec<Joint>,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: impl Into<String>, joints: Vec<Joint>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            joints,
        }
    }

    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Linear scan by joint name.
    #[must_use]
    pub fn find_joint_by_name(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|joint| joint.name == name)
    }
}
