pub mod channel;
pub mod clip;
pub mod instance;
pub mod scalar_channel;
pub mod state;
pub mod transform_channel;
pub mod trigger_channel;
pub mod values;

pub use channel::AnimationChannel;
pub use clip::AnimationClip;
pub use instance::{AnimationClipInstance, AnimationListener, AnimationListenerKey};
pub use scalar_channel::{DoubleChannel, FloatChannel, ScalarChannel};
pub use state::{ChannelState, JointData, TriggerData};
pub use transform_channel::{JOINT_CHANNEL_PREFIX, JointChannel, TransformChannel};
pub use trigger_channel::{TriggerCallback, TriggerChannel};
pub use values::Interpolatable;
