//! Persistence Tests
//!
//! Tests for:
//! - Skeleton / pose / clip JSON round trips
//! - Derived state (globals, palette, max time) rederived on load
//! - Joint-index recovery from the channel-name prefix
//! - Hard failures on malformed or semantically invalid data
//! - Field defaults for absent values

use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec3};

use marrow::animation::{
    AnimationChannel, AnimationClip, DoubleChannel, FloatChannel, JointChannel, TransformChannel,
    TriggerChannel,
};
use marrow::persist;
use marrow::skeleton::{Joint, Skeleton, SkeletonPose};
use marrow::transform::Transform;

const EPSILON: f32 = 1e-4;

fn approx_affine(a: &Affine3A, b: &Affine3A) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array())
        .all(|(x, y)| (x - y).abs() < EPSILON)
}

fn approx_mat4(a: &Mat4, b: &Mat4) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array())
        .all(|(x, y)| (x - y).abs() < EPSILON)
}

fn chain_skeleton() -> Skeleton {
    let world_root = Affine3A::from_translation(Vec3::new(1.0, 0.0, 0.0));
    let world_spine = world_root * Affine3A::from_translation(Vec3::new(0.0, 1.0, 0.0));
    Skeleton::new(
        "chain",
        vec![
            Joint::root("root", 0, world_root.inverse()),
            Joint::new("spine", 1, 0, world_spine.inverse()),
        ],
    )
}

fn full_clip() -> AnimationClip {
    AnimationClip::with_channels(
        "walk",
        vec![
            AnimationChannel::Transform(
                TransformChannel::new(
                    "prop",
                    vec![0.0, 1.0],
                    vec![Quat::IDENTITY, Quat::from_rotation_y(0.5)],
                    vec![Vec3::ZERO, Vec3::X],
                    vec![Vec3::ONE; 2],
                )
                .unwrap(),
            ),
            AnimationChannel::Joint(
                JointChannel::with_joint(
                    "spine",
                    1,
                    vec![0.0, 3.0],
                    vec![Quat::IDENTITY; 2],
                    vec![Vec3::ZERO, Vec3::Y],
                    vec![Vec3::ONE; 2],
                )
                .unwrap(),
            ),
            AnimationChannel::Float(
                FloatChannel::new("fade", vec![0.0, 1.0], vec![0.0, 1.0]).unwrap(),
            ),
            AnimationChannel::Double(
                DoubleChannel::new("clock", vec![0.0, 1.0], vec![0.0_f64, 9.0]).unwrap(),
            ),
            AnimationChannel::Trigger(
                TriggerChannel::new("events", vec![0.0, 2.0], vec![None, Some("end".into())])
                    .unwrap(),
            ),
            AnimationChannel::GuaranteedTrigger(
                TriggerChannel::new(
                    "footsteps",
                    vec![0.0, 0.5],
                    vec![Some("left".into()), Some("right".into())],
                )
                .unwrap(),
            ),
        ],
    )
    .unwrap()
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn skeleton_round_trips_through_json() {
    let skeleton = chain_skeleton();
    let json = persist::to_json(&skeleton).unwrap();
    let restored: Skeleton = persist::from_json(&json).unwrap();

    assert_eq!(restored.name, "chain");
    assert_eq!(restored.joint_count(), 2);
    for (a, b) in skeleton.joints.iter().zip(&restored.joints) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.index, b.index);
        assert_eq!(a.parent_index, b.parent_index);
        assert!(approx_affine(&a.inverse_bind_pose, &b.inverse_bind_pose));
    }
}

#[test]
fn pose_round_trip_rederives_globals_and_palette() {
    let mut pose = SkeletonPose::new(Arc::new(chain_skeleton()));
    pose.local_transforms_mut()[1] = Transform::new(
        Vec3::new(0.0, 2.0, 0.0),
        Quat::from_rotation_x(0.7),
        Vec3::ONE,
    );
    pose.update_transforms();

    let json = persist::to_json(&pose).unwrap();
    let restored: SkeletonPose = persist::from_json(&json).unwrap();

    assert_eq!(restored.joint_count(), pose.joint_count());
    for i in 0..pose.joint_count() {
        assert!(approx_affine(
            &restored.global_transforms()[i],
            &pose.global_transforms()[i]
        ));
        assert!(approx_mat4(
            &restored.matrix_palette()[i],
            &pose.matrix_palette()[i]
        ));
    }
}

#[test]
fn clip_round_trips_every_channel_kind() {
    let clip = full_clip();
    let json = persist::to_json(&clip).unwrap();
    let restored: AnimationClip = persist::from_json(&json).unwrap();

    assert_eq!(restored.name(), "walk");
    assert_eq!(restored.channels().len(), 6);
    assert!((restored.max_time() - 3.0).abs() < EPSILON);

    // Kinds survive, including the trigger/guaranteed-trigger split.
    assert!(matches!(
        restored.find_channel("events"),
        Some(AnimationChannel::Trigger(_))
    ));
    assert!(matches!(
        restored.find_channel("footsteps"),
        Some(AnimationChannel::GuaranteedTrigger(_))
    ));

    // The joint index is recovered from the channel-name prefix.
    let Some(AnimationChannel::Joint(joint)) = restored.find_channel("joint.1") else {
        panic!("joint channel lost its kind");
    };
    assert_eq!(joint.joint_index(), 1);
    assert_eq!(joint.joint_name(), "spine");
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn pose_with_wrong_transform_count_fails_to_load() {
    let pose = SkeletonPose::new(Arc::new(chain_skeleton()));
    let json = persist::to_json(&pose).unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["local_transforms"].as_array_mut().unwrap().pop();

    let result = persist::from_json::<SkeletonPose>(&value.to_string());
    assert!(result.is_err());
}

#[test]
fn clip_with_mismatched_channel_arrays_fails_to_load() {
    let json = persist::to_json(&full_clip()).unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["channels"][0]["rotations"]
        .as_array_mut()
        .unwrap()
        .pop();

    let result = persist::from_json::<AnimationClip>(&value.to_string());
    assert!(result.is_err());
}

#[test]
fn joint_channel_without_index_prefix_fails_to_load() {
    let json = persist::to_json(&full_clip()).unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["channels"][1]["channel_name"] = serde_json::Value::from("spine");

    let result = persist::from_json::<AnimationClip>(&value.to_string());
    assert!(result.is_err());
}

#[test]
fn duplicate_channel_names_fail_to_load() {
    let json = persist::to_json(&full_clip()).unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["channels"][2]["channel_name"] = serde_json::Value::from("clock");

    let result = persist::from_json::<AnimationClip>(&value.to_string());
    assert!(result.is_err());
}

#[test]
fn scalar_channel_missing_values_fails_to_load() {
    let result =
        persist::from_json::<FloatChannel>(r#"{"channel_name":"x","times":[0.0,1.0]}"#);
    assert!(result.is_err());
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn absent_joint_fields_take_defaults() {
    let joint: Joint = persist::from_json(r#"{"name":"solo"}"#).unwrap();
    assert_eq!(joint.index, 0);
    assert_eq!(joint.parent_index, 0);
    assert!(approx_affine(&joint.inverse_bind_pose, &Affine3A::IDENTITY));
}

#[test]
fn absent_transform_fields_take_identity() {
    let transform: Transform = persist::from_json("{}").unwrap();
    assert_eq!(transform, Transform::IDENTITY);
}
