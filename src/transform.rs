use glam::{Affine3A, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A rigid TRS transform: the placement of one joint relative to its parent
/// (or to model space, once composed).
///
/// This is the authoring-side representation: animation channels sample
/// into it and pose evaluation reads from it. Hierarchy composition happens
/// on the [`Affine3A`] form, so non-uniform scale composes the same way the
/// scene-graph math does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "scale_one")]
    pub scale: Vec3,
}

fn scale_one() -> Vec3 {
    Vec3::ONE
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Build the TRS components back from an affine matrix.
    ///
    /// Shear does not survive the decomposition; inputs are expected to be
    /// rigid transforms with (possibly non-uniform) scale.
    #[must_use]
    pub fn from_affine(matrix: &Affine3A) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// The 4×4 homogeneous form, for consumers that want a matrix.
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from(self.to_affine())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
