use nalgebra::{DMatrix, DVector, Vector3};
use thiserror::Error;
use voss_curve::PathPoint;
use voss_drive::DriveModel;
use voss_math::Interval;

/// Errors raised while constructing a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintError {
    /// A per-motor limit list had the wrong length for the drive model.
    #[error("expected {expected} limits, got {got}")]
    LimitCountMismatch {
        /// Motor count of the drive model.
        expected: usize,
        /// Length of the supplied list.
        got: usize,
    },

    /// A limit was zero, negative, or NaN.
    #[error("limits must be positive (got {0})")]
    NonPositiveLimit(f64),
}

/// Limits for a constraint, either shared by every axis or listed per axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Limits {
    /// The same bound on every motor/wheel.
    Uniform(f64),
    /// One bound per motor/wheel, in model order.
    PerAxis(Vec<f64>),
}

impl Limits {
    fn into_vector(self, expected: usize) -> Result<DVector<f64>, ConstraintError> {
        let values = match self {
            Self::Uniform(value) => vec![value; expected],
            Self::PerAxis(values) => {
                if values.len() != expected {
                    return Err(ConstraintError::LimitCountMismatch {
                        expected,
                        got: values.len(),
                    });
                }
                values
            }
        };

        for &value in &values {
            if !(value > 0.0) {
                return Err(ConstraintError::NonPositiveLimit(value));
            }
        }

        Ok(DVector::from_vec(values))
    }
}

impl From<f64> for Limits {
    fn from(value: f64) -> Self {
        Self::Uniform(value)
    }
}

impl From<Vec<f64>> for Limits {
    fn from(values: Vec<f64>) -> Self {
        Self::PerAxis(values)
    }
}

impl From<&[f64]> for Limits {
    fn from(values: &[f64]) -> Self {
        Self::PerAxis(values.to_vec())
    }
}

/// Bot-frame direction of travel: `rot(-θ)` applied to the pose derivative.
fn direction_vector(point: &PathPoint) -> Vector3<f64> {
    let d = point.pose_derivative().rotated(-point.heading);
    Vector3::new(d.linear.x, d.linear.y, d.angular)
}

/// Bot-frame coefficient of `v²` in the acceleration expansion.
///
/// Expanding `d/dt [rot(-θ(t)) · p′ · v]` leaves, next to the `p″·v²` term,
/// a `-θ′·perp(rot(-θ)·p′)·v²` term from the rotating frame itself.
fn curvature_vector(point: &PathPoint) -> Vector3<f64> {
    let tangent = point.pose_derivative().rotated(-point.heading).linear;
    let second = point.pose_second_derivative().rotated(-point.heading).linear
        - tangent.perp() * point.heading_derivative;

    Vector3::new(second.x, second.y, point.heading_second_derivative)
}

/// A pointwise bound on path velocity of the canonical form
/// `|M · rot(-θ) · poseDeriv · ṡ|ᵢ ≤ maxᵢ`.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityConstraint {
    transform: DMatrix<f64>,
    maxes: DVector<f64>,
}

impl VelocityConstraint {
    /// Builds a velocity constraint from a raw bot-velocity transform.
    ///
    /// `transform` must be k×3 (bot velocity on the right); `maxes` must
    /// have one positive entry per row.
    #[must_use]
    pub fn from_transform(transform: DMatrix<f64>, maxes: DVector<f64>) -> Self {
        Self { transform, maxes }
    }

    /// Largest `|ds/dt|` this constraint admits at a path point.
    #[must_use]
    pub fn max_velocity(&self, point: &PathPoint) -> f64 {
        let rates = &self.transform * direction_vector(point);

        let mut max = f64::INFINITY;
        for (rate, limit) in rates.iter().zip(self.maxes.iter()) {
            if rate.abs() > 0.0 {
                max = max.min(limit / rate.abs());
            }
        }
        max
    }
}

/// Velocity-dependent additive term for voltage constraints: the part of
/// the motor voltage already spent holding the current motor velocities
/// (back-EMF and static friction).
#[derive(Debug, Clone, PartialEq)]
struct VoltageBias {
    motor_vel_from_bot_vel: DMatrix<f64>,
    volts_from_motor_vel: DMatrix<f64>,
    volts_for_motor_friction: DVector<f64>,
}

impl VoltageBias {
    fn at(&self, direction: &Vector3<f64>, velocity: f64) -> DVector<f64> {
        let motor_vel = &self.motor_vel_from_bot_vel * (direction * velocity);
        let mut bias = &self.volts_from_motor_vel * &motor_vel;

        for (entry, (vel, friction)) in bias
            .iter_mut()
            .zip(motor_vel.iter().zip(self.volts_for_motor_friction.iter()))
        {
            if *vel != 0.0 {
                *entry += friction * vel.signum();
            }
        }

        bias
    }
}

/// A state-dependent bound on path acceleration of the canonical form
/// `|M · botAccel + bias(v)|ᵢ ≤ maxᵢ`, where the bot-frame acceleration
/// expands into a `v²` offset plus a multiple of `ds²/dt²`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccelerationConstraint {
    transform: DMatrix<f64>,
    maxes: DVector<f64>,
    bias: Option<VoltageBias>,
}

impl AccelerationConstraint {
    /// Builds an acceleration constraint from a raw bot-acceleration
    /// transform with no velocity-dependent bias.
    #[must_use]
    pub fn from_transform(transform: DMatrix<f64>, maxes: DVector<f64>) -> Self {
        Self {
            transform,
            maxes,
            bias: None,
        }
    }

    /// The interval of admissible `ds²/dt²` at a path point, given the
    /// current path velocity. May be empty.
    #[must_use]
    pub fn accel_range(&self, point: &PathPoint, velocity: f64) -> Interval {
        let direction = direction_vector(point);

        let multipliers = &self.transform * direction;
        let mut offsets = (&self.transform * curvature_vector(point)) * (velocity * velocity);
        if let Some(bias) = &self.bias {
            offsets += bias.at(&direction, velocity);
        }

        let mut range = Interval::REAL;
        for ((&multiplier, &offset), &limit) in multipliers
            .iter()
            .zip(offsets.iter())
            .zip(self.maxes.iter())
        {
            // Row: |multiplier·x + offset| ≤ limit.
            let row = if multiplier == 0.0 {
                if offset.abs() <= limit {
                    continue;
                }
                Interval::EMPTY
            } else {
                let a = (-limit - offset) / multiplier;
                let b = (limit - offset) / multiplier;
                Interval::new(a.min(b), a.max(b))
            };

            range = range.intersection(row);
            if range.is_empty() {
                return Interval::EMPTY;
            }
        }

        range
    }
}

/// A single constraint on path traversal.
///
/// Every shipped constraint reduces to one of two canonical cases, so the
/// set aggregator can evaluate them without dynamic dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Bounds `|ds/dt|` pointwise.
    Velocity(VelocityConstraint),

    /// Bounds `ds²/dt²` as an interval depending on the current velocity.
    Acceleration(AccelerationConstraint),
}

impl Constraint {
    /// Caps every motor's angular velocity.
    ///
    /// # Errors
    ///
    /// Fails on non-positive limits or a per-axis list whose length does
    /// not match the model's motor count.
    pub fn motor_speed(
        limits: impl Into<Limits>,
        model: &DriveModel,
    ) -> Result<Self, ConstraintError> {
        Ok(Self::Velocity(VelocityConstraint {
            maxes: limits.into().into_vector(model.num_motors())?,
            transform: model.motor_vel_from_bot_vel().clone(),
        }))
    }

    /// Caps every wheel's tangential (surface) speed.
    ///
    /// # Errors
    ///
    /// See [`Constraint::motor_speed`].
    pub fn wheel_speed(
        limits: impl Into<Limits>,
        model: &DriveModel,
    ) -> Result<Self, ConstraintError> {
        Ok(Self::Velocity(VelocityConstraint {
            maxes: limits.into().into_vector(model.num_motors())?,
            transform: model.wheel_vel_from_bot_vel().clone(),
        }))
    }

    /// Caps every motor's angular acceleration.
    ///
    /// # Errors
    ///
    /// See [`Constraint::motor_speed`].
    pub fn motor_acceleration(
        limits: impl Into<Limits>,
        model: &DriveModel,
    ) -> Result<Self, ConstraintError> {
        Ok(Self::Acceleration(AccelerationConstraint {
            maxes: limits.into().into_vector(model.num_motors())?,
            transform: model.motor_accel_from_bot_accel().clone(),
            bias: None,
        }))
    }

    /// Caps every wheel's tangential acceleration.
    ///
    /// # Errors
    ///
    /// See [`Constraint::motor_speed`].
    pub fn wheel_acceleration(
        limits: impl Into<Limits>,
        model: &DriveModel,
    ) -> Result<Self, ConstraintError> {
        Ok(Self::Acceleration(AccelerationConstraint {
            maxes: limits.into().into_vector(model.num_motors())?,
            transform: model.wheel_vel_from_bot_vel().clone(),
            bias: None,
        }))
    }

    /// Caps every motor's applied voltage.
    ///
    /// The admissible acceleration shrinks as velocity rises, because
    /// back-EMF (and friction) eat into the voltage budget.
    ///
    /// # Errors
    ///
    /// See [`Constraint::motor_speed`].
    pub fn motor_voltage(
        limits: impl Into<Limits>,
        model: &DriveModel,
    ) -> Result<Self, ConstraintError> {
        Ok(Self::Acceleration(AccelerationConstraint {
            maxes: limits.into().into_vector(model.num_motors())?,
            transform: model.volts_from_bot_accel().clone(),
            bias: Some(VoltageBias {
                motor_vel_from_bot_vel: model.motor_vel_from_bot_vel().clone(),
                volts_from_motor_vel: model.volts_from_motor_vel().clone(),
                volts_for_motor_friction: model.volts_for_motor_friction().clone(),
            }),
        }))
    }
}

/// A deduplicated bundle of constraints.
///
/// Evaluation at a path point takes the componentwise minimum over
/// velocity constraints and the intersection over acceleration
/// constraints.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    velocity: Vec<VelocityConstraint>,
    acceleration: Vec<AccelerationConstraint>,
}

impl ConstraintSet {
    /// Creates a set from any collection of constraints.
    #[must_use]
    pub fn new(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        let mut set = Self::default();
        for constraint in constraints {
            set.add(constraint);
        }
        set
    }

    /// Adds a constraint, dropping it if an identical one is already
    /// present.
    pub fn add(&mut self, constraint: Constraint) {
        match constraint {
            Constraint::Velocity(velocity) => {
                if !self.velocity.contains(&velocity) {
                    self.velocity.push(velocity);
                }
            }
            Constraint::Acceleration(acceleration) => {
                if !self.acceleration.contains(&acceleration) {
                    self.acceleration.push(acceleration);
                }
            }
        }
    }

    /// Largest `|ds/dt|` every velocity constraint admits at a point.
    ///
    /// Infinite when the set holds no velocity constraints.
    #[must_use]
    pub fn max_velocity(&self, point: &PathPoint) -> f64 {
        self.velocity
            .iter()
            .map(|constraint| constraint.max_velocity(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Intersection of every acceleration constraint's admissible interval
    /// at a point.
    ///
    /// [`Interval::REAL`] when the set holds no acceleration constraints.
    #[must_use]
    pub fn accel_range(&self, point: &PathPoint, velocity: f64) -> Interval {
        self.acceleration
            .iter()
            .fold(Interval::REAL, |range, constraint| {
                range.intersection(constraint.accel_range(point, velocity))
            })
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self::new(iter)
    }
}
