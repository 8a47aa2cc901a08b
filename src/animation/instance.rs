use std::fmt;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::animation::channel::AnimationChannel;
use crate::animation::state::{ChannelState, TriggerData};

slotmap::new_key_type! {
    /// Handle returned by
    /// [`AnimationClipInstance::add_animation_listener`], used to
    /// unregister.
    pub struct AnimationListenerKey;
}

/// Observer notified when the driver declares a playback finished.
/// Notification order across listeners is unspecified.
pub trait AnimationListener {
    fn animation_finished(&mut self, instance: &AnimationClipInstance);
}

/// Per-playback bookkeeping for one active playback of a clip: timing
/// parameters, cached per-channel sampling state, and finish listeners.
///
/// The core only reads and writes channel state through this type; deciding
/// when a playback is finished (from the clip's max time, `loop_count` and
/// the sign of `time_scale`) belongs to the external driver.
pub struct AnimationClipInstance {
    pub active: bool,
    /// Number of times the driver intends to play the clip through.
    pub loop_count: i32,
    /// Playback rate multiplier; a negative value reverses direction.
    pub time_scale: f64,
    /// Global clock time at which this playback started.
    pub start_time: f64,
    channel_states: FxHashMap<String, ChannelState>,
    listeners: SlotMap<AnimationListenerKey, Box<dyn AnimationListener>>,
}

impl Default for AnimationClipInstance {
    fn default() -> Self {
        Self {
            active: true,
            loop_count: 1,
            time_scale: 1.0,
            start_time: 0.0,
            channel_states: FxHashMap::default(),
            listeners: SlotMap::default(),
        }
    }
}

impl AnimationClipInstance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch-or-create the state object for `channel`.
    ///
    /// The channel manufactures the state on first evaluation (only it
    /// knows the shape its samples write); it is cached here by channel
    /// name and reused every subsequent frame.
    pub fn state_mut(&mut self, channel: &AnimationChannel) -> &mut ChannelState {
        self.channel_states
            .entry(channel.name().to_owned())
            .or_insert_with(|| channel.create_state())
    }

    /// Read a channel's cached state, if that channel has been evaluated
    /// against this instance.
    #[must_use]
    pub fn channel_state(&self, name: &str) -> Option<&ChannelState> {
        self.channel_states.get(name)
    }

    /// Armed-trigger state for a trigger channel. This is the read side a
    /// gameplay/event thread polls; [`TriggerData`] carries its own lock.
    #[must_use]
    pub fn trigger_data(&self, name: &str) -> Option<&TriggerData> {
        self.channel_states.get(name)?.as_trigger()
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    pub fn add_animation_listener(
        &mut self,
        listener: Box<dyn AnimationListener>,
    ) -> AnimationListenerKey {
        self.listeners.insert(listener)
    }

    pub fn remove_animation_listener(&mut self, key: AnimationListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Notify listeners that this playback reached its end. The core never
    /// calls this itself; the driver decides when a clip has finished.
    pub fn fire_animation_finished(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_key, listener) in &mut listeners {
            listener.animation_finished(self);
        }
        self.listeners = listeners;
    }
}

impl fmt::Debug for AnimationClipInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationClipInstance")
            .field("active", &self.active)
            .field("loop_count", &self.loop_count)
            .field("time_scale", &self.time_scale)
            .field("start_time", &self.start_time)
            .field("channel_states", &self.channel_states.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
