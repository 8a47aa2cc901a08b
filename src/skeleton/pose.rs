use std::fmt;
use std::sync::Arc;

use glam::{Affine3A, Mat4};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use slotmap::SlotMap;

use crate::animation::JointData;
use crate::errors::MarrowError;
use crate::skeleton::Skeleton;
use crate::transform::Transform;

slotmap::new_key_type! {
    /// Handle returned by [`SkeletonPose::add_pose_listener`], used to
    /// unregister.
    pub struct PoseListenerKey;
}

/// Observer notified every time a pose finishes recomputing its derived
/// transforms. Notification order across listeners is unspecified.
pub trait PoseListener {
    fn pose_updated(&mut self, pose: &SkeletonPose);
}

/// Joins a [`Skeleton`] with a set of per-joint transforms, so one skeleton
/// can be reused between any number of simultaneously posed instances.
///
/// Three parallel arrays are indexed by joint position:
/// - `local_transforms`: the animation/authoring input, parent-relative
/// - `global_transforms`: derived, local-to-model space
/// - `matrix_palette`: derived, `global * inverse_bind_pose` per joint; the
///   quantity a mesh-skinning consumer reads to deform bind-pose vertices
///   into the current pose
///
/// External code writes local transforms (typically from sampled
/// [`JointData`]) and calls [`update_transforms`](Self::update_transforms)
/// once per frame. Evaluation is single-threaded per pose; sharing a pose
/// across threads is the caller's problem.
pub struct SkeletonPose {
    skeleton: Arc<Skeleton>,
    local_transforms: Vec<Transform>,
    global_transforms: Vec<Affine3A>,
    matrix_palette: Vec<Mat4>,
    listeners: SlotMap<PoseListenerKey, Box<dyn PoseListener>>,
}

impl SkeletonPose {
    /// Construct a pose over the given skeleton, starting in bind pose.
    #[must_use]
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        let joint_count = skeleton.joint_count();
        let mut pose = Self {
            skeleton,
            local_transforms: vec![Transform::IDENTITY; joint_count],
            global_transforms: vec![Affine3A::IDENTITY; joint_count],
            matrix_palette: vec![Mat4::IDENTITY; joint_count],
            listeners: SlotMap::default(),
        };
        pose.set_to_bind_pose();
        pose
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.skeleton.joint_count()
    }

    /// Parent-relative transforms, one per joint. This is the input side:
    /// write here, then call [`update_transforms`](Self::update_transforms).
    #[inline]
    #[must_use]
    pub fn local_transforms(&self) -> &[Transform] {
        &self.local_transforms
    }

    #[inline]
    #[must_use]
    pub fn local_transforms_mut(&mut self) -> &mut [Transform] {
        &mut self.local_transforms
    }

    /// Local-to-model transforms derived by the last
    /// [`update_transforms`](Self::update_transforms) call.
    #[inline]
    #[must_use]
    pub fn global_transforms(&self) -> &[Affine3A] {
        &self.global_transforms
    }

    /// Skin matrices, one per joint, indexed identically to the skeleton's
    /// joint array.
    #[inline]
    #[must_use]
    pub fn matrix_palette(&self) -> &[Mat4] {
        &self.matrix_palette
    }

    /// Copy a sampled joint state into the local transform it targets.
    /// Out-of-range joint indices are ignored.
    pub fn apply_joint_data(&mut self, data: &JointData) {
        let Ok(index) = usize::try_from(data.joint_index) else {
            return;
        };
        if let Some(slot) = self.local_transforms.get_mut(index) {
            *slot = data.transform;
        }
    }

    /// Recompute global transforms and the matrix palette from the current
    /// local transforms, then notify pose listeners.
    ///
    /// Joints are walked in ascending array order; the topological-order
    /// invariant on [`Skeleton`] guarantees each parent's global transform
    /// is final before its children compose against it.
    pub fn update_transforms(&mut self) {
        for index in 0..self.skeleton.joints.len() {
            let joint = &self.skeleton.joints[index];
            let local = self.local_transforms[index].to_affine();
            let global = match joint.parent() {
                Some(parent) => self.global_transforms[parent] * local,
                None => local,
            };
            self.global_transforms[index] = global;
            self.matrix_palette[index] = Mat4::from(global * joint.inverse_bind_pose);
        }
        self.fire_pose_updated();
    }

    /// Rebuild local transforms so the pose reproduces the authored bind
    /// pose, then recompute the derived arrays.
    pub fn set_to_bind_pose(&mut self) {
        for index in 0..self.skeleton.joints.len() {
            let joint = &self.skeleton.joints[index];
            // Inverting the inverse bind pose puts the joint in model space;
            // composing with the parent's inverse bind pose removes the
            // parent's contribution, leaving a parent-relative local.
            let mut local = joint.inverse_bind_pose.inverse();
            if let Some(parent) = joint.parent() {
                local = self.skeleton.joints[parent].inverse_bind_pose * local;
            }
            self.local_transforms[index] = Transform::from_affine(&local);
        }
        self.update_transforms();
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    pub fn add_pose_listener(&mut self, listener: Box<dyn PoseListener>) -> PoseListenerKey {
        self.listeners.insert(listener)
    }

    pub fn remove_pose_listener(&mut self, key: PoseListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Notify all registered listeners that this pose has been updated.
    pub fn fire_pose_updated(&mut self) {
        // Take the listeners out for the duration of the callbacks so they
        // can read the pose without a borrow conflict.
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_key, listener) in &mut listeners {
            listener.pose_updated(self);
        }
        self.listeners = listeners;
    }

    /// Deep-copy the transform arrays into a fresh pose sharing the same
    /// skeleton. Listeners are not copied.
    #[must_use]
    pub fn make_copy(&self) -> Self {
        Self {
            skeleton: Arc::clone(&self.skeleton),
            local_transforms: self.local_transforms.clone(),
            global_transforms: self.global_transforms.clone(),
            matrix_palette: self.matrix_palette.clone(),
            listeners: SlotMap::default(),
        }
    }
}

impl fmt::Debug for SkeletonPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkeletonPose")
            .field("skeleton", &self.skeleton.name)
            .field("joint_count", &self.joint_count())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Persistence
//
// Only the skeleton reference and the local transforms are persisted; the
// derived arrays are rebuilt on load by running update_transforms().
// ============================================================================

impl Serialize for SkeletonPose {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Record<'a> {
            skeleton: &'a Skeleton,
            local_transforms: &'a [Transform],
        }
        Record {
            skeleton: &self.skeleton,
            local_transforms: &self.local_transforms,
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct PoseRecord {
    skeleton: Skeleton,
    #[serde(default)]
    local_transforms: Vec<Transform>,
}

impl TryFrom<PoseRecord> for SkeletonPose {
    type Error = MarrowError;

    fn try_from(record: PoseRecord) -> Result<Self, MarrowError> {
        let joint_count = record.skeleton.joint_count();
        if record.local_transforms.len() != joint_count {
            return Err(MarrowError::Deserialization(format!(
                "pose for skeleton '{}' stores {} local transforms for {} joints",
                record.skeleton.name,
                record.local_transforms.len(),
                joint_count
            )));
        }
        let mut pose = Self::new(Arc::new(record.skeleton));
        pose.local_transforms = record.local_transforms;
        pose.update_transforms();
        Ok(pose)
    }
}

impl<'de> Deserialize<'de> for SkeletonPose {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = PoseRecord::deserialize(deserializer)?;
        Self::try_from(record).map_err(D::Error::custom)
    }
}
