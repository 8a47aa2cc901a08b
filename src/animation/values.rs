use glam::{Quat, Vec3};

/// Sample types a keyframe channel knows how to blend between two
/// bracketing keyframes.
pub trait Interpolatable: Copy {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for f64 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * f64::from(t)
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

/// Rotations blend by shortest-arc spherical interpolation, not
/// componentwise.
impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }
}
