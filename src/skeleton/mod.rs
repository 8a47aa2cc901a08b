mod joint;
mod pose;
mod skeleton;

pub use joint::Joint;
pub use pose::{PoseListener, PoseListenerKey, SkeletonPose};
pub use skeleton::Skeleton;
