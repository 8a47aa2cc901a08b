use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::transform::Transform;

/// Sampled output of a joint channel: a TRS pose plus the joint it targets,
/// so a driver can route it into
/// [`SkeletonPose::apply_joint_data`](crate::skeleton::SkeletonPose::apply_joint_data).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointData {
    /// Index of the targeted joint, or -1 before the first sample stamps it.
    pub joint_index: i16,
    pub transform: Transform,
}

impl JointData {
    #[must_use]
    pub fn new(joint_index: i16) -> Self {
        Self {
            joint_index,
            transform: Transform::IDENTITY,
        }
    }
}

impl Default for JointData {
    fn default() -> Self {
        Self::new(-1)
    }
}

/// Per-instance, per-channel sampling state.
///
/// The channel manufactures its own state object (only it knows the shape
/// its samples write), and the clip instance caches it by channel name for
/// every subsequent frame.
#[derive(Debug)]
pub enum ChannelState {
    Transform(Transform),
    Joint(JointData),
    Float(f32),
    Double(f64),
    Trigger(TriggerData),
}

impl ChannelState {
    #[must_use]
    pub fn as_transform(&self) -> Option<&Transform> {
        match self {
            Self::Transform(transform) => Some(transform),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_joint(&self) -> Option<&JointData> {
        match self {
            Self::Joint(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_trigger(&self) -> Option<&TriggerData> {
        match self {
            Self::Trigger(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct TriggerArm {
    current_triggers: SmallVec<[String; 2]>,
    current_index: Option<usize>,
    armed: bool,
}

/// Armed-trigger state for one trigger channel on one playback instance.
///
/// The armed list sits behind a mutex (the one piece of internal
/// synchronization in the crate) so a gameplay thread may poll
/// [`is_armed`](Self::is_armed) / [`current_triggers`](Self::current_triggers)
/// and disarm while a separate update thread advances the clip.
#[derive(Debug, Default)]
pub struct TriggerData {
    state: Mutex<TriggerArm>,
}

impl TriggerData {
    /// Arm the given sample index with the given trigger keys.
    ///
    /// A repeated index leaves the armed state untouched, so an event fires
    /// once per index no matter how many frames the clock sits on it. A new
    /// index replaces the armed list; arming with no keys disarms.
    pub fn arm<'a, I>(&self, index: usize, triggers: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = self.state.lock();
        if state.current_index == Some(index) {
            return;
        }
        state.current_index = Some(index);
        state.current_triggers.clear();
        state
            .current_triggers
            .extend(triggers.into_iter().map(str::to_owned));
        state.armed = !state.current_triggers.is_empty();
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.state.lock().armed
    }

    /// Typically called with `false` by the consumer once the armed
    /// triggers have been dispatched.
    pub fn set_armed(&self, armed: bool) {
        self.state.lock().armed = armed;
    }

    /// Sample index most recently armed, if any sample has been reached.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.state.lock().current_index
    }

    /// Snapshot of the armed trigger keys, in channel order.
    #[must_use]
    pub fn current_triggers(&self) -> Vec<String> {
        self.state.lock().current_triggers.to_vec()
    }
}
