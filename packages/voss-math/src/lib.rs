//! Math utilities & types.

mod angle;
mod interval;
mod pose;
mod state;

pub use angle::{Angle, IntoAngle};
pub use glam::DVec2 as Vec2;
pub use interval::Interval;
pub use pose::{Pose, Twist};
pub use state::{MotionState, PoseState};
