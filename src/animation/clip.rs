use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::animation::channel::AnimationChannel;
use crate::animation::instance::AnimationClipInstance;
use crate::errors::{MarrowError, Result};

/// A named, ordered bundle of channels describing one complete animation.
///
/// A clip holds no playback state of its own; it fans a clock time out to
/// every channel against a given [`AnimationClipInstance`], which owns the
/// per-playback bookkeeping. Channel names must be unique within a clip
/// because instance state is keyed by name; [`add_channel`](Self::add_channel)
/// enforces this.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    channels: Vec<AnimationChannel>,
    max_time: f32,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
            max_time: 0.0,
        }
    }

    /// Build a clip from a channel list, rejecting duplicate channel names.
    pub fn with_channels(
        name: impl Into<String>,
        channels: Vec<AnimationChannel>,
    ) -> Result<Self> {
        let mut clip = Self::new(name);
        for channel in channels {
            clip.add_channel(channel)?;
        }
        Ok(clip)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[AnimationChannel] {
        &self.channels
    }

    /// Largest last-sample time across all channels, 0 when empty. Kept
    /// current by [`add_channel`](Self::add_channel) /
    /// [`remove_channel`](Self::remove_channel).
    #[inline]
    #[must_use]
    pub fn max_time(&self) -> f32 {
        self.max_time
    }

    #[must_use]
    pub fn find_channel(&self, name: &str) -> Option<&AnimationChannel> {
        self.channels.iter().find(|channel| channel.name() == name)
    }

    /// Update every channel's state on `instance` for the given clock time.
    /// Channels are independent; their evaluation order never changes the
    /// numeric result.
    pub fn update(&self, clock_time: f64, instance: &mut AnimationClipInstance) {
        for channel in &self.channels {
            let state = instance.state_mut(channel);
            channel.update_sample(clock_time, state);
        }
    }

    pub fn add_channel(&mut self, channel: AnimationChannel) -> Result<()> {
        if self.find_channel(channel.name()).is_some() {
            return Err(MarrowError::DuplicateChannel {
                clip: self.name.clone(),
                channel: channel.name().to_owned(),
            });
        }
        self.channels.push(channel);
        self.update_max_time();
        Ok(())
    }

    /// Remove a channel by name, returning it if present.
    pub fn remove_channel(&mut self, name: &str) -> Option<AnimationChannel> {
        let index = self.channels.iter().position(|c| c.name() == name)?;
        let channel = self.channels.remove(index);
        self.update_max_time();
        Some(channel)
    }

    fn update_max_time(&mut self) {
        self.max_time = self
            .channels
            .iter()
            .map(AnimationChannel::max_time)
            .fold(0.0_f32, f32::max);
    }
}

impl fmt::Display for AnimationClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnimationClip '{}' ({} channels, max time {})",
            self.name,
            self.channels.len(),
            self.max_time
        )
    }
}

// ============================================================================
// Persistence. max_time is derived, so only name and channels are stored.
// ============================================================================

impl Serialize for AnimationClip {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Record<'a> {
            name: &'a str,
            channels: &'a [AnimationChannel],
        }
        Record {
            name: &self.name,
            channels: &self.channels,
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct ClipRecord {
    name: String,
    #[serde(default)]
    channels: Vec<AnimationChannel>,
}

impl<'de> Deserialize<'de> for AnimationClip {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let record = ClipRecord::deserialize(deserializer)?;
        Self::with_channels(record.name, record.channels).map_err(D::Error::custom)
    }
}
