use serde::{Deserialize, Serialize};

use crate::animation::scalar_channel::{DoubleChannel, FloatChannel};
use crate::animation::state::{ChannelState, TriggerData};
use crate::animation::transform_channel::{JointChannel, TransformChannel};
use crate::animation::trigger_channel::TriggerChannel;
use crate::errors::{MarrowError, Result};
use crate::transform::Transform;

/// A time-indexed keyframe channel: one value type, one sampling policy.
///
/// Channels are a closed set; dispatch is by match, and each kind carries
/// its own strongly-typed sample arrays and manufactures its own
/// strongly-typed per-instance [`ChannelState`].
///
/// Time indices are strictly increasing and non-negative, with exactly one
/// payload entry per time entry (enforced at construction).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimationChannel {
    Transform(TransformChannel),
    Joint(JointChannel),
    Float(FloatChannel),
    Double(DoubleChannel),
    Trigger(TriggerChannel),
    /// Trigger channel that never loses an event when sampling skips over
    /// several keyframes.
    GuaranteedTrigger(TriggerChannel),
}

impl AnimationChannel {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Transform(channel) => channel.name(),
            Self::Joint(channel) => channel.name(),
            Self::Float(channel) => channel.name(),
            Self::Double(channel) => channel.name(),
            Self::Trigger(channel) | Self::GuaranteedTrigger(channel) => channel.name(),
        }
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        match self {
            Self::Transform(channel) => channel.times(),
            Self::Joint(channel) => channel.times(),
            Self::Float(channel) => channel.times(),
            Self::Double(channel) => channel.times(),
            Self::Trigger(channel) | Self::GuaranteedTrigger(channel) => channel.times(),
        }
    }

    #[inline]
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.times().len()
    }

    /// Local time of the last sample, or 0 for an empty channel.
    #[must_use]
    pub fn max_time(&self) -> f32 {
        self.times().last().copied().unwrap_or(0.0)
    }

    /// Manufacture the state object this channel samples into. The clip
    /// instance caches it per channel name.
    #[must_use]
    pub fn create_state(&self) -> ChannelState {
        match self {
            Self::Transform(_) => ChannelState::Transform(Transform::IDENTITY),
            Self::Joint(channel) => ChannelState::Joint(channel.create_joint_data()),
            Self::Float(_) => ChannelState::Float(0.0),
            Self::Double(_) => ChannelState::Double(0.0),
            Self::Trigger(_) | Self::GuaranteedTrigger(_) => {
                ChannelState::Trigger(TriggerData::default())
            }
        }
    }

    /// Update the given state object from this channel at the given clock
    /// time (seconds, where 0 is the start of the clip).
    ///
    /// Times before the first sample hold sample 0; times at or past the
    /// last sample hold the last sample; anything between brackets a pair
    /// of keyframes and delegates to the channel kind's sampling policy.
    /// An empty channel is a no-op.
    pub fn update_sample(&self, clock_time: f64, state: &mut ChannelState) {
        let Some((index, progress)) = sample_position(self.times(), clock_time) else {
            return;
        };
        match (self, state) {
            (Self::Transform(channel), ChannelState::Transform(out)) => {
                channel.set_current_sample(index, progress, out);
            }
            (Self::Joint(channel), ChannelState::Joint(out)) => {
                channel.set_current_sample(index, progress, out);
            }
            (Self::Float(channel), ChannelState::Float(out)) => {
                *out = channel.value_for(index, progress);
            }
            (Self::Double(channel), ChannelState::Double(out)) => {
                *out = channel.value_for(index, progress);
            }
            (Self::Trigger(channel), ChannelState::Trigger(data)) => {
                channel.set_current_sample(index, progress, data);
            }
            (Self::GuaranteedTrigger(channel), ChannelState::Trigger(data)) => {
                channel.set_current_sample_guaranteed(index, progress, data);
            }
            (channel, _) => {
                log::warn!(
                    "state object kind does not match channel '{}'; sample dropped",
                    channel.name()
                );
            }
        }
    }

    /// A new, independent channel of the same kind covering the inclusive
    /// sample range `[start_sample, end_sample]`, renamed to `name`.
    ///
    /// Joint channels keep their index-derived name regardless of `name`.
    pub fn subchannel_by_sample(
        &self,
        name: impl Into<String>,
        start_sample: usize,
        end_sample: usize,
    ) -> Result<Self> {
        let name = name.into();
        Ok(match self {
            Self::Transform(channel) => {
                Self::Transform(channel.subchannel_by_sample(name, start_sample, end_sample)?)
            }
            Self::Joint(channel) => {
                Self::Joint(channel.subchannel_by_sample(start_sample, end_sample)?)
            }
            Self::Float(channel) => {
                Self::Float(channel.subchannel_by_sample(name, start_sample, end_sample)?)
            }
            Self::Double(channel) => {
                Self::Double(channel.subchannel_by_sample(name, start_sample, end_sample)?)
            }
            Self::Trigger(channel) => {
                Self::Trigger(channel.subchannel_by_sample(name, start_sample, end_sample)?)
            }
            Self::GuaranteedTrigger(channel) => Self::GuaranteedTrigger(
                channel.subchannel_by_sample(name, start_sample, end_sample)?,
            ),
        })
    }

    /// A new, independent channel of the same kind covering the time window
    /// `[start_time, end_time]`, rebased to local time 0.
    ///
    /// The boundary samples are synthesized by evaluating this channel at
    /// the window edges, so the result reproduces the original interpolated
    /// curve exactly across the window even when the edges fall between
    /// keyframes.
    pub fn subchannel_by_time(
        &self,
        name: impl Into<String>,
        start_time: f32,
        end_time: f32,
    ) -> Result<Self> {
        let name = name.into();
        Ok(match self {
            Self::Transform(channel) => {
                Self::Transform(channel.subchannel_by_time(name, start_time, end_time)?)
            }
            Self::Joint(channel) => Self::Joint(channel.subchannel_by_time(start_time, end_time)?),
            Self::Float(channel) => {
                Self::Float(channel.subchannel_by_time(name, start_time, end_time)?)
            }
            Self::Double(channel) => {
                Self::Double(channel.subchannel_by_time(name, start_time, end_time)?)
            }
            Self::Trigger(channel) => {
                Self::Trigger(channel.subchannel_by_time(name, start_time, end_time)?)
            }
            Self::GuaranteedTrigger(channel) => {
                Self::GuaranteedTrigger(channel.subchannel_by_time(name, start_time, end_time)?)
            }
        })
    }
}

// ============================================================================
// Shared sampling protocol
// ============================================================================

/// Bracketing sample position for a clock time: `(start_index, progress)`.
///
/// Returns `None` for an empty channel. Out-of-range times clamp to the
/// first or last sample with zero progress (hold, no extrapolation).
/// Otherwise `times[start] < clock_time <= times[start + 1]` and progress
/// is the normalized position inside that span.
pub(crate) fn sample_position(times: &[f32], clock_time: f64) -> Option<(usize, f64)> {
    if times.is_empty() {
        return None;
    }
    let last = times.len() - 1;
    if times.len() == 1 || clock_time <= f64::from(times[0]) {
        return Some((0, 0.0));
    }
    if clock_time >= f64::from(times[last]) {
        return Some((last, 0.0));
    }
    let next = times.partition_point(|&t| f64::from(t) < clock_time);
    let start = next - 1;
    let t0 = f64::from(times[start]);
    let t1 = f64::from(times[start + 1]);
    Some((start, (clock_time - t0) / (t1 - t0)))
}

// ============================================================================
// Construction-time validation helpers
// ============================================================================

pub(crate) fn check_payload_len(
    channel: &str,
    payload: &'static str,
    times_len: usize,
    payload_len: usize,
) -> Result<()> {
    if times_len == payload_len {
        Ok(())
    } else {
        Err(MarrowError::MismatchedSampleArrays {
            channel: channel.to_owned(),
            payload,
            times_len,
            payload_len,
        })
    }
}

pub(crate) fn check_sample_range(
    channel: &str,
    start: usize,
    end: usize,
    count: usize,
) -> Result<()> {
    if start > end || end >= count {
        Err(MarrowError::InvalidSampleRange {
            channel: channel.to_owned(),
            start,
            end,
            count,
        })
    } else {
        Ok(())
    }
}

pub(crate) fn check_time_range(channel: &str, start: f32, end: f32) -> Result<()> {
    if start > end {
        Err(MarrowError::InvalidTimeRange {
            channel: channel.to_owned(),
            start,
            end,
        })
    } else {
        Ok(())
    }
}
