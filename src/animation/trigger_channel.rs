use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::animation::channel::{
    check_payload_len, check_sample_range, check_time_range, sample_position,
};
use crate::animation::state::TriggerData;
use crate::errors::{MarrowError, Result};
use crate::skeleton::SkeletonPose;

/// Callback interface for collaborators reacting to armed triggers; the
/// playback orchestrator invokes it while an armed [`TriggerData`] is
/// dispatched.
pub trait TriggerCallback {
    fn do_trigger(&mut self, pose: &SkeletonPose);
}

/// A channel of discrete, named events keyed over time.
///
/// Nothing is interpolated: crossing a sample index arms that sample's key
/// (if any) exactly once. A `None` key disarms. Correct for monotonically
/// advancing, non-looping playback; time moving backwards across an index
/// boundary produces no new arm event.
///
/// The same payload also backs the guaranteed variant
/// ([`AnimationChannel::GuaranteedTrigger`](crate::animation::AnimationChannel::GuaranteedTrigger)),
/// which catches up over skipped keyframes instead of sampling only the
/// landing index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TriggerChannelRecord")]
pub struct TriggerChannel {
    channel_name: String,
    times: Vec<f32>,
    keys: Vec<Option<String>>,
}

impl TriggerChannel {
    /// Construct a new channel. `keys` must match `times` in length.
    pub fn new(
        channel_name: impl Into<String>,
        times: Vec<f32>,
        keys: Vec<Option<String>>,
    ) -> Result<Self> {
        let channel_name = channel_name.into();
        check_payload_len(&channel_name, "keys", times.len(), keys.len())?;
        Ok(Self {
            channel_name,
            times,
            keys,
        })
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
    pub fn keys(&self) -> &[Option<String>] {
        &self.keys
    }

    /// The sample index a bracketing position lands on: the start frame,
    /// or the next one when progress has fully reached it.
    fn armed_index(index: usize, progress: f64) -> usize {
        if progress == 1.0 { index + 1 } else { index }
    }

    pub(crate) fn set_current_sample(&self, index: usize, progress: f64, data: &TriggerData) {
        let armed = Self::armed_index(index, progress);
        match self.keys[armed].as_deref() {
            Some(key) => data.arm(armed, [key]),
            None => data.arm(armed, []),
        }
    }

    /// Sampling policy of the guaranteed variant: when the armed index
    /// advances by more than one since the last evaluation, every non-empty
    /// key in the skipped span `(old, new]` is armed as a batch, so a long
    /// frame interval never swallows an event.
    ///
    /// Intended for forward, non-looping playback; a backward step arms
    /// nothing and the skipped keys are not re-delivered.
    pub(crate) fn set_current_sample_guaranteed(
        &self,
        index: usize,
        progress: f64,
        data: &TriggerData,
    ) {
        let new_index = Self::armed_index(index, progress);
        let old_index = data.current_index();
        if old_index == Some(new_index) {
            return;
        }
        if let Some(old) = old_index {
            if old > new_index {
                log::warn!(
                    "guaranteed trigger channel '{}' sampled backwards ({old} -> {new_index}); \
                     skipped keys are not re-armed",
                    self.channel_name
                );
            }
        }
        let from = old_index.map_or(0, |old| old + 1);
        let keys: SmallVec<[&str; 2]> = (from..=new_index)
            .filter_map(|i| self.keys.get(i).and_then(|key| key.as_deref()))
            .collect();
        data.arm(new_index, keys);
    }

    /// The key that would be armed at an arbitrary clock time; `None` for
    /// an empty channel or an unkeyed sample.
    #[must_use]
    pub fn key_at(&self, clock_time: f64) -> Option<String> {
        let (index, progress) = sample_position(&self.times, clock_time)?;
        self.keys[Self::armed_index(index, progress)].clone()
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
            keys: self.keys[start_sample..=end_sample].to_vec(),
        })
    }

    /// A new channel covering `[start_time, end_time]`, rebased to local
    /// time 0. The boundary samples take whatever key is armed at the
    /// window edges.
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
                keys: Vec::new(),
            });
        }

        let mut times = vec![0.0_f32];
        let mut keys = vec![self.key_at(f64::from(start_time))];
        for (i, &time) in self.times.iter().enumerate() {
            if time > start_time && time < end_time {
                times.push(time - start_time);
                keys.push(self.keys[i].clone());
            }
        }
        times.push(end_time - start_time);
        keys.push(self.key_at(f64::from(end_time)));

        Ok(Self {
            channel_name: name,
            times,
            keys,
        })
    }
}

#[derive(Deserialize)]
struct TriggerChannelRecord {
    channel_name: String,
    #[serde(default)]
    times: Vec<f32>,
    #[serde(default)]
    keys: Vec<Option<String>>,
}

impl TryFrom<TriggerChannelRecord> for TriggerChannel {
    type Error = MarrowError;

    fn try_from(record: TriggerChannelRecord) -> Result<Self> {
        Self::new(record.channel_name, record.times, record.keys)
    }
}
