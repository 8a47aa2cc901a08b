//! Animation Channel Tests
//!
//! Tests for:
//! - The shared sampling protocol (hold semantics, single sample, brackets)
//! - Transform channel slerp/lerp and exact-keyframe copies
//! - Scalar channel linear interpolation (f32 and f64)
//! - Joint channel naming and joint-index stamping
//! - Sub-ranging by sample and by time, including error cases

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Quat, Vec3};

use marrow::animation::{
    AnimationChannel, ChannelState, DoubleChannel, FloatChannel, JointChannel, TransformChannel,
};
use marrow::errors::MarrowError;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

/// Quaternions compare up to sign.
fn approx_quat(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

/// Three keyframes: a translation ramp with a quarter-turn about Z in the
/// first span.
fn transform_channel() -> TransformChannel {
    TransformChannel::new(
        "bone",
        vec![0.0, 1.0, 2.0],
        vec![
            Quat::IDENTITY,
            Quat::from_rotation_z(FRAC_PI_2),
            Quat::from_rotation_z(FRAC_PI_2),
        ],
        vec![
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 20.0, 0.0),
        ],
        vec![Vec3::ONE; 3],
    )
    .unwrap()
}

fn float_channel() -> FloatChannel {
    FloatChannel::new("fade", vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 40.0]).unwrap()
}

// ============================================================================
// Construction validation
// ============================================================================

#[test]
fn transform_channel_rejects_mismatched_arrays() {
    let result = TransformChannel::new(
        "broken",
        vec![0.0, 1.0],
        vec![Quat::IDENTITY],
        vec![Vec3::ZERO; 2],
        vec![Vec3::ONE; 2],
    );
    assert!(matches!(
        result,
        Err(MarrowError::MismatchedSampleArrays { payload: "rotations", .. })
    ));
}

#[test]
fn scalar_channel_rejects_mismatched_arrays() {
    let result = FloatChannel::new("broken", vec![0.0, 1.0], vec![1.0]);
    assert!(matches!(
        result,
        Err(MarrowError::MismatchedSampleArrays { payload: "values", .. })
    ));
}

// ============================================================================
// Hold semantics and degenerate channels
// ============================================================================

#[test]
fn sampling_before_first_keyframe_holds_sample_zero() {
    let channel = transform_channel();
    let sampled = channel.sample(-0.5);
    assert!(approx_vec3(sampled.translation, Vec3::ZERO));
    assert!(approx_quat(sampled.rotation, Quat::IDENTITY));

    assert!(approx(float_channel().sample(-3.0).unwrap(), 0.0));
}

#[test]
fn sampling_at_or_past_last_keyframe_holds_last_sample() {
    let channel = transform_channel();
    for clock in [2.0, 2.5, 100.0] {
        let sampled = channel.sample(clock);
        assert!(approx_vec3(sampled.translation, Vec3::new(10.0, 20.0, 0.0)));
    }
    assert!(approx(float_channel().sample(99.0).unwrap(), 40.0));
}

#[test]
fn single_sample_channel_always_yields_it() {
    let channel = FloatChannel::new("solo", vec![0.5], vec![7.0]).unwrap();
    for clock in [-1.0, 0.0, 0.5, 3.0] {
        assert!(approx(channel.sample(clock).unwrap(), 7.0));
    }
}

#[test]
fn empty_channel_is_a_no_op() {
    let channel = AnimationChannel::Float(FloatChannel::new("empty", vec![], vec![]).unwrap());
    let mut state = channel.create_state();
    channel.update_sample(1.0, &mut state);
    assert!(approx(state.as_float().unwrap(), 0.0));
}

// ============================================================================
// Interpolation
// ============================================================================

#[test]
fn transform_samples_on_keyframes_are_copied_exactly() {
    let channel = transform_channel();
    for (i, &time) in channel.times().iter().enumerate() {
        let sampled = channel.sample(f64::from(time));
        assert!(
            approx_vec3(sampled.translation, channel.translations()[i]),
            "keyframe {i} translation blurred"
        );
        assert!(
            approx_quat(sampled.rotation, channel.rotations()[i]),
            "keyframe {i} rotation blurred"
        );
    }
}

#[test]
fn transform_midpoint_slerps_and_lerps() {
    let channel = transform_channel();
    let sampled = channel.sample(0.5);
    assert!(approx_quat(sampled.rotation, Quat::from_rotation_z(FRAC_PI_4)));
    assert!(approx_vec3(sampled.translation, Vec3::new(5.0, 0.0, 0.0)));
    assert!(approx_vec3(sampled.scale, Vec3::ONE));
}

#[test]
fn float_channel_interpolates_linearly() {
    let channel = float_channel();
    assert!(approx(channel.sample(0.5).unwrap(), 5.0));
    assert!(approx(channel.sample(1.5).unwrap(), 25.0));
    assert!(approx(channel.sample(1.0).unwrap(), 10.0));
}

#[test]
fn double_channel_interpolates_in_f64() {
    let channel =
        DoubleChannel::new("precise", vec![0.0, 1.0], vec![0.0_f64, 1.0e9]).unwrap();
    let value = channel.sample(0.25).unwrap();
    assert!((value - 2.5e8).abs() < 1.0);
}

// ============================================================================
// Joint channels
// ============================================================================

#[test]
fn joint_channel_derives_its_name_from_the_index() {
    let channel = JointChannel::with_joint(
        "hip",
        3,
        vec![0.0],
        vec![Quat::IDENTITY],
        vec![Vec3::ZERO],
        vec![Vec3::ONE],
    )
    .unwrap();
    assert_eq!(channel.name(), "joint.3");
    assert_eq!(channel.joint_name(), "hip");
    assert_eq!(channel.joint_index(), 3);
}

#[test]
fn joint_channel_stamps_the_joint_index_into_state() {
    let channel = AnimationChannel::Joint(
        JointChannel::with_joint(
            "hip",
            3,
            vec![0.0, 1.0],
            vec![Quat::IDENTITY; 2],
            vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)],
            vec![Vec3::ONE; 2],
        )
        .unwrap(),
    );

    let mut state = channel.create_state();
    channel.update_sample(0.5, &mut state);

    let ChannelState::Joint(data) = &state else {
        panic!("joint channel must create joint state");
    };
    assert_eq!(data.joint_index, 3);
    assert!(approx_vec3(data.transform.translation, Vec3::new(2.0, 0.0, 0.0)));
}

// ============================================================================
// Sub-ranging
// ============================================================================

#[test]
fn subchannel_by_sample_copies_the_slice() {
    let channel = float_channel();
    let sub = channel.subchannel_by_sample("fade_tail", 1, 2).unwrap();
    assert_eq!(sub.name(), "fade_tail");
    assert_eq!(sub.times(), &[1.0, 2.0]);
    assert_eq!(sub.values(), &[10.0, 40.0]);
}

#[test]
fn subchannel_by_sample_validates_bounds() {
    let channel = float_channel();
    assert!(matches!(
        channel.subchannel_by_sample("x", 2, 1),
        Err(MarrowError::InvalidSampleRange { .. })
    ));
    assert!(matches!(
        channel.subchannel_by_sample("x", 0, 3),
        Err(MarrowError::InvalidSampleRange { .. })
    ));
}

#[test]
fn subchannel_by_time_validates_bounds() {
    let channel = float_channel();
    assert!(matches!(
        channel.subchannel_by_time("x", 1.5, 0.5),
        Err(MarrowError::InvalidTimeRange { .. })
    ));
}

#[test]
fn subchannel_by_time_matches_source_curve_at_the_edges() {
    let channel = transform_channel();
    let sub = channel.subchannel_by_time("window", 0.5, 1.5).unwrap();

    // Local 0 equals the source at the window start.
    let start = sub.sample(0.0);
    let expected_start = channel.sample(0.5);
    assert!(approx_vec3(start.translation, expected_start.translation));
    assert!(approx_quat(start.rotation, expected_start.rotation));

    // Local (t1 - t0) equals the source at the window end.
    let end = sub.sample(1.0);
    let expected_end = channel.sample(1.5);
    assert!(approx_vec3(end.translation, expected_end.translation));
    assert!(approx_quat(end.rotation, expected_end.rotation));

    // Interior keyframes survive verbatim, rebased.
    let mid = sub.sample(0.5);
    let expected_mid = channel.sample(1.0);
    assert!(approx_vec3(mid.translation, expected_mid.translation));
    assert!(approx_quat(mid.rotation, expected_mid.rotation));
}

#[test]
fn scalar_subchannel_by_time_matches_source_curve() {
    let channel = float_channel();
    let sub = channel.subchannel_by_time("window", 0.5, 1.5).unwrap();

    assert_eq!(sub.sample_count(), 3);
    assert!(approx(sub.sample(0.0).unwrap(), channel.sample(0.5).unwrap()));
    assert!(approx(sub.sample(0.5).unwrap(), channel.sample(1.0).unwrap()));
    assert!(approx(sub.sample(1.0).unwrap(), channel.sample(1.5).unwrap()));
}

#[test]
fn joint_subchannel_keeps_the_derived_name() {
    let channel = JointChannel::with_joint(
        "hip",
        2,
        vec![0.0, 1.0, 2.0],
        vec![Quat::IDENTITY; 3],
        vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        vec![Vec3::ONE; 3],
    )
    .unwrap();

    let sub = channel.subchannel_by_sample(0, 1).unwrap();
    assert_eq!(sub.name(), "joint.2");
    assert_eq!(sub.joint_index(), 2);

    let timed = channel.subchannel_by_time(0.25, 1.75).unwrap();
    assert_eq!(timed.name(), "joint.2");
}

// ============================================================================
// Max time
// ============================================================================

#[test]
fn max_time_is_the_last_sample_or_zero() {
    assert!(approx(
        AnimationChannel::Float(float_channel()).max_time(),
        2.0
    ));
    let empty = AnimationChannel::Float(FloatChannel::new("empty", vec![], vec![]).unwrap());
    assert!(approx(empty.max_time(), 0.0));
}
