use crate::{Pose, Twist};

/// Position, velocity, and acceleration along a 1-D path coordinate.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    /// Distance from the start of the path.
    pub position: f64,

    /// Velocity at this state.
    pub velocity: f64,

    /// Acceleration at this state.
    pub acceleration: f64,
}

impl MotionState {
    /// Creates a new `MotionState`.
    #[must_use]
    pub const fn new(position: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// Extrapolates this state forward by `dt` seconds under constant
    /// acceleration.
    #[must_use]
    pub fn after(&self, dt: f64) -> Self {
        Self {
            position: self.position + self.velocity * dt + 0.5 * self.acceleration * dt * dt,
            velocity: self.velocity + self.acceleration * dt,
            acceleration: self.acceleration,
        }
    }
}

/// A pose together with its first and second time derivatives.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct PoseState {
    /// Pose to track at this instant.
    pub pose: Pose,

    /// Velocity of the pose, in field frame.
    pub velocity: Twist,

    /// Acceleration of the pose, in field frame.
    pub acceleration: Twist,
}

impl PoseState {
    /// Creates a new `PoseState`.
    #[must_use]
    pub const fn new(pose: Pose, velocity: Twist, acceleration: Twist) -> Self {
        Self {
            pose,
            velocity,
            acceleration,
        }
    }
}
