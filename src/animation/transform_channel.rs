use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::channel::{
    check_payload_len, check_sample_range, check_time_range, sample_position,
};
use crate::animation::state::JointData;
use crate::animation::values::Interpolatable;
use crate::errors::{MarrowError, Result};
use crate::skeleton::Joint;
use crate::transform::Transform;

/// Prefix a joint channel derives its name from: `joint.<index>`.
///
/// The joint index is recovered by parsing it back out of the name on load,
/// so it is never stored twice.
pub const JOINT_CHANNEL_PREFIX: &str = "joint.";

/// A channel of rigid transforms keyed over time.
///
/// Rotation samples interpolate by shortest-arc slerp, translation and
/// scale per component. Samples landing exactly on a keyframe are copied
/// verbatim, with no interpolation cost and no numerical drift at authored
/// poses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TransformChannelRecord")]
pub struct TransformChannel {
    channel_name: String,
    times: Vec<f32>,
    rotations: Vec<Quat>,
    translations: Vec<Vec3>,
    scales: Vec<Vec3>,
}

impl TransformChannel {
    /// Construct a new channel. Every payload array must match `times` in
    /// length.
    pub fn new(
        channel_name: impl Into<String>,
        times: Vec<f32>,
        rotations: Vec<Quat>,
        translations: Vec<Vec3>,
        scales: Vec<Vec3>,
    ) -> Result<Self> {
        let channel_name = channel_name.into();
        check_payload_len(&channel_name, "rotations", times.len(), rotations.len())?;
        check_payload_len(&channel_name, "translations", times.len(), translations.len())?;
        check_payload_len(&channel_name, "scales", times.len(), scales.len())?;
        Ok(Self {
            channel_name,
            times,
            rotations,
            translations,
            scales,
        })
    }

    /// Construct from whole transforms, splitting them into components.
    pub fn from_transforms(
        channel_name: impl Into<String>,
        times: Vec<f32>,
        transforms: &[Transform],
    ) -> Result<Self> {
        let rotations = transforms.iter().map(|t| t.rotation).collect();
        let translations = transforms.iter().map(|t| t.translation).collect();
        let scales = transforms.iter().map(|t| t.scale).collect();
        Self::new(channel_name, times, rotations, translations, scales)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.channel_name
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn rotations(&self) -> &[Quat] {
        &self.rotations
    }

    #[must_use]
    pub fn translations(&self) -> &[Vec3] {
        &self.translations
    }

    #[must_use]
    pub fn scales(&self) -> &[Vec3] {
        &self.scales
    }

    /// The authored transform at a specific sample index.
    #[must_use]
    pub fn transform_data(&self, index: usize) -> Transform {
        Transform::new(
            self.translations[index],
            self.rotations[index],
            self.scales[index],
        )
    }

    pub(crate) fn set_current_sample(&self, index: usize, progress: f64, out: &mut Transform) {
        // Exactly on a keyframe: copy the sample, skip the (s)lerp.
        if progress == 0.0 {
            *out = self.transform_data(index);
            return;
        }
        if progress == 1.0 {
            *out = self.transform_data(index + 1);
            return;
        }

        let t = progress as f32;
        out.rotation = Quat::interpolate_linear(self.rotations[index], self.rotations[index + 1], t);
        out.translation =
            Vec3::interpolate_linear(self.translations[index], self.translations[index + 1], t);
        out.scale = Vec3::interpolate_linear(self.scales[index], self.scales[index + 1], t);
    }

    /// Evaluate this channel at an arbitrary clock time. Empty channels
    /// yield the identity transform.
    #[must_use]
    pub fn sample(&self, clock_time: f64) -> Transform {
        let mut out = Transform::IDENTITY;
        if let Some((index, progress)) = sample_position(&self.times, clock_time) {
            self.set_current_sample(index, progress, &mut out);
        }
        out
    }

    /// A new channel holding the inclusive `[start_sample, end_sample]`
    /// slice, renamed to `name`.
    pub fn subchannel_by_sample(
        &self,
        name: impl Into<String>,
        start_sample: usize,
        end_sample: usize,
    ) -> Result<Self> {
        check_sample_range(&self.channel_name, start_sample, end_sample, self.sample_count())?;
        Ok(Self {
            channel_name: name.into(),
            times: self.times[start_sample..=end_sample].to_vec(),
            rotations: self.rotations[start_sample..=end_sample].to_vec(),
            translations: self.translations[start_sample..=end_sample].to_vec(),
            scales: self.scales[start_sample..=end_sample].to_vec(),
        })
    }

    /// A new channel covering `[start_time, end_time]`, rebased to local
    /// time 0. Boundary samples are synthesized by evaluating this channel
    /// at the window edges; keyframes strictly inside the window are copied.
    pub fn subchannel_by_time(
        &self,
        name: impl Into<String>,
        start_time: f32,
        end_time: f32,
    ) -> Result<Self> {
        check_time_range(&self.channel_name, start_time, end_time)?;
        let name = name.into();
        if self.times.is_empty() {
            return Ok(Self {
                channel_name: name,
                times: Vec::new(),
                rotations: Vec::new(),
                translations: Vec::new(),
                scales: Vec::new(),
            });
        }

        let start = self.sample(f64::from(start_time));
        let mut times = vec![0.0_f32];
        let mut rotations = vec![start.rotation];
        let mut translations = vec![start.translation];
        let mut scales = vec![start.scale];

        for (i, &time) in self.times.iter().enumerate() {
            if time > start_time && time < end_time {
                times.push(time - start_time);
                rotations.push(self.rotations[i]);
                translations.push(self.translations[i]);
                scales.push(self.scales[i]);
            }
        }

        let end = self.sample(f64::from(end_time));
        times.push(end_time - start_time);
        rotations.push(end.rotation);
        translations.push(end.translation);
        scales.push(end.scale);

        Ok(Self {
            channel_name: name,
            times,
            rotations,
            translations,
            scales,
        })
    }
}

#[derive(Deserialize)]
struct TransformChannelRecord {
    channel_name: String,
    #[serde(default)]
    times: Vec<f32>,
    #[serde(default)]
    rotations: Vec<Quat>,
    #[serde(default)]
    translations: Vec<Vec3>,
    #[serde(default)]
    scales: Vec<Vec3>,
}

impl TryFrom<TransformChannelRecord> for TransformChannel {
    type Error = MarrowError;

    fn try_from(record: TransformChannelRecord) -> Result<Self> {
        Self::new(
            record.channel_name,
            record.times,
            record.rotations,
            record.translations,
            record.scales,
        )
    }
}

// ============================================================================
// Joint channel
// ============================================================================

/// A transform channel geared towards driving one skeleton joint.
///
/// The channel name is derived from [`JOINT_CHANNEL_PREFIX`] and the joint
/// index; sampling additionally stamps that index into the output
/// [`JointData`] so a driver knows which local transform to write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "JointChannelRecord")]
pub struct JointChannel {
    /// Human-readable joint name, kept alongside the index-derived channel
    /// name.
    joint_name: String,
    #[serde(skip)]
    joint_index: i16,
    #[serde(flatten)]
    channel: TransformChannel,
}

impl JointChannel {
    /// Construct a channel for the given joint.
    pub fn new(
        joint: &Joint,
        times: Vec<f32>,
        rotations: Vec<Quat>,
        translations: Vec<Vec3>,
        scales: Vec<Vec3>,
    ) -> Result<Self> {
        Self::with_joint(
            joint.name.clone(),
            joint.index,
            times,
            rotations,
            translations,
            scales,
        )
    }

    /// Construct from a joint name and index directly.
    pub fn with_joint(
        joint_name: impl Into<String>,
        joint_index: i16,
        times: Vec<f32>,
        rotations: Vec<Quat>,
        translations: Vec<Vec3>,
        scales: Vec<Vec3>,
    ) -> Result<Self> {
        let channel = TransformChannel::new(
            format!("{JOINT_CHANNEL_PREFIX}{joint_index}"),
            times,
            rotations,
            translations,
            scales,
        )?;
        Ok(Self {
            joint_name: joint_name.into(),
            joint_index,
            channel,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.channel.name()
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        self.channel.times()
    }

    #[inline]
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.channel.sample_count()
    }

    #[must_use]
    pub fn joint_name(&self) -> &str {
        &self.joint_name
    }

    #[must_use]
    pub fn joint_index(&self) -> i16 {
        self.joint_index
    }

    /// The underlying transform samples.
    #[must_use]
    pub fn transform_channel(&self) -> &TransformChannel {
        &self.channel
    }

    pub(crate) fn create_joint_data(&self) -> JointData {
        JointData::new(self.joint_index)
    }

    pub(crate) fn set_current_sample(&self, index: usize, progress: f64, out: &mut JointData) {
        self.channel.set_current_sample(index, progress, &mut out.transform);
        out.joint_index = self.joint_index;
    }

    /// The authored sample at `index`, stamped with the joint index.
    #[must_use]
    pub fn joint_data(&self, index: usize) -> JointData {
        JointData {
            joint_index: self.joint_index,
            transform: self.channel.transform_data(index),
        }
    }

    /// Evaluate this channel at an arbitrary clock time.
    #[must_use]
    pub fn sample(&self, clock_time: f64) -> JointData {
        JointData {
            joint_index: self.joint_index,
            transform: self.channel.sample(clock_time),
        }
    }

    /// Like [`TransformChannel::subchannel_by_sample`]; the index-derived
    /// channel name is kept.
    pub fn subchannel_by_sample(&self, start_sample: usize, end_sample: usize) -> Result<Self> {
        Ok(Self {
            joint_name: self.joint_name.clone(),
            joint_index: self.joint_index,
            channel: self.channel.subchannel_by_sample(
                self.channel.name().to_owned(),
                start_sample,
                end_sample,
            )?,
        })
    }

    /// Like [`TransformChannel::subchannel_by_time`]; the index-derived
    /// channel name is kept.
    pub fn subchannel_by_time(&self, start_time: f32, end_time: f32) -> Result<Self> {
        Ok(Self {
            joint_name: self.joint_name.clone(),
            joint_index: self.joint_index,
            channel: self.channel.subchannel_by_time(
                self.channel.name().to_owned(),
                start_time,
                end_time,
            )?,
        })
    }
}

#[derive(Deserialize)]
struct JointChannelRecord {
    joint_name: String,
    #[serde(flatten)]
    channel: TransformChannel,
}

impl TryFrom<JointChannelRecord> for JointChannel {
    type Error = MarrowError;

    fn try_from(record: JointChannelRecord) -> Result<Self> {
        let joint_index = record
            .channel
            .name()
            .strip_prefix(JOINT_CHANNEL_PREFIX)
            .and_then(|suffix| suffix.parse::<i16>().ok())
            .ok_or_else(|| {
                MarrowError::Deserialization(format!(
                    "joint channel '{}' does not encode a joint index",
                    record.channel.name()
                ))
            })?;
        Ok(Self {
            joint_name: record.joint_name,
            joint_index,
            channel: record.channel,
        })
    }
}
