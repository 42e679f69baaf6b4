//! Drive-model algebra.
//!
//! This crate relates the three vector spaces a wheeled robot's motion
//! lives in (bot velocity `(vx, vy, ω)`, per-motor angular velocity, and
//! per-motor voltage) as a handful of matrices. Constraint evaluation
//! composes these matrices to turn physical limits (motor speed, voltage,
//! wheel slip) into bounds on path traversal.

mod model;
mod motor;

pub use model::{DriveModel, DriveModelError, Wheel};
pub use motor::MotorModel;
