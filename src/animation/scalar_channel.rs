use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::animation::channel::{
    check_payload_len, check_sample_range, check_time_range, sample_position,
};
use crate::animation::values::Interpolatable;
use crate::errors::{MarrowError, Result};

/// Single-precision scalar channel.
pub type FloatChannel = ScalarChannel<f32>;

/// Double-precision scalar channel.
pub type DoubleChannel = ScalarChannel<f64>;

/// A channel of scalar values keyed over time.
///
/// Always interpolates linearly between the bracketing values; unlike the
/// transform channel there is no keyframe-copy shortcut, a sample exactly
/// on a keyframe is just a lerp at progress 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "ScalarChannelRecord<T>",
    bound(deserialize = "T: Interpolatable + DeserializeOwned")
)]
pub struct ScalarChannel<T: Interpolatable> {
    channel_name: String,
    times: Vec<f32>,
    values: Vec<T>,
}

impl<T: Interpolatable> ScalarChannel<T> {
    /// Construct a new channel. `values` must match `times` in length.
    pub fn new(channel_name: impl Into<String>, times: Vec<f32>, values: Vec<T>) -> Result<Self> {
        let channel_name = channel_name.into();
        check_payload_len(&channel_name, "values", times.len(), values.len())?;
        Ok(Self {
            channel_name,
            times,
            values,
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
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub(crate) fn value_for(&self, index: usize, progress: f64) -> T {
        let next = (index + 1).min(self.values.len() - 1);
        T::interpolate_linear(self.values[index], self.values[next], progress as f32)
    }

    /// Evaluate this channel at an arbitrary clock time; `None` for an
    /// empty channel.
    #[must_use]
    pub fn sample(&self, clock_time: f64) -> Option<T> {
        sample_position(&self.times, clock_time)
            .map(|(index, progress)| self.value_for(index, progress))
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
            values: self.values[start_sample..=end_sample].to_vec(),
        })
    }

    /// A new channel covering `[start_time, end_time]`, rebased to local
    /// time 0, with synthesized boundary samples.
    pub fn subchannel_by_time(
        &self,
        name: impl Into<String>,
        start_time: f32,
        end_time: f32,
    ) -> Result<Self> {
        check_time_range(&self.channel_name, start_time, end_time)?;
        let name = name.into();
        let Some(start) = self.sample(f64::from(start_time)) else {
            return Ok(Self {
                channel_name: name,
                times: Vec::new(),
                values: Vec::new(),
            });
        };

        let mut times = vec![0.0_f32];
        let mut values = vec![start];
        for (i, &time) in self.times.iter().enumerate() {
            if time > start_time && time < end_time {
                times.push(time - start_time);
                values.push(self.values[i]);
            }
        }
        // The channel is non-empty, so the end evaluation always exists.
        if let Some(end) = self.sample(f64::from(end_time)) {
            times.push(end_time - start_time);
            values.push(end);
        }

        Ok(Self {
            channel_name: name,
            times,
            values,
        })
    }
}

#[derive(Deserialize)]
struct ScalarChannelRecord<T> {
    channel_name: String,
    #[serde(default)]
    times: Vec<f32>,
    #[serde(default = "Vec::new")]
    values: Vec<T>,
}

impl<T: Interpolatable> TryFrom<ScalarChannelRecord<T>> for ScalarChannel<T> {
    type Error = MarrowError;

    fn try_from(record: ScalarChannelRecord<T>) -> Result<Self> {
        Self::new(record.channel_name, record.times, record.values)
    }
}
