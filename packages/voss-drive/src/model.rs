use nalgebra::{DMatrix, DVector};
use thiserror::Error;
use voss_math::{Angle, IntoAngle, Vec2};

use crate::MotorModel;

/// Errors raised while assembling a [`DriveModel`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriveModelError {
    /// Fewer than two wheels were supplied.
    #[error("a drive model needs at least 2 wheels (got {0})")]
    TooFewWheels(usize),

    /// A wheel has a non-positive radius, gearing, or motor constant.
    #[error("wheel {index}: {reason}")]
    InvalidWheel {
        /// Index of the offending wheel.
        index: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The velocity transform admits no finite pseudo-inverse.
    #[error("velocity transform is not pseudo-invertible: {0}")]
    SingularTransform(String),
}

/// One driven wheel: where it sits, which way it transmits force, and the
/// motor spinning it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheel {
    /// Mounting point in the bot frame (bot center at the origin, +x
    /// forward).
    pub position: Vec2,

    /// Direction the wheel transmits force, in the bot frame. For mecanum
    /// wheels this is the roller axis complement, not the rolling
    /// direction.
    pub direction: Angle,

    /// Wheel radius.
    pub radius: f64,

    /// Motor revolutions per wheel revolution.
    pub gear_ratio: f64,

    /// Motor driving this wheel.
    pub motor: MotorModel,
}

impl Wheel {
    /// Tangential-velocity row: maps `(vx, vy, ω)` to the wheel's surface
    /// speed along its drive direction.
    fn tangential_row(&self) -> [f64; 3] {
        let (sin, cos) = self.direction.sin_cos();
        let direction = Vec2::new(cos, sin);

        [cos, sin, self.position.perp_dot(direction)]
    }

    fn validate(&self, index: usize) -> Result<(), DriveModelError> {
        let (ks, kv, ka) = self.motor.constants();

        let reason = if !(self.radius > 0.0) {
            Some("radius must be positive")
        } else if !(self.gear_ratio > 0.0) {
            Some("gear ratio must be positive")
        } else if !(kv > 0.0) || !(ka > 0.0) {
            Some("motor kv and ka must be positive")
        } else if !(ks >= 0.0) {
            Some("motor ks must be non-negative")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DriveModelError::InvalidWheel { index, reason }),
            None => Ok(()),
        }
    }
}

/// Kinematic and electrical matrices for a set of driven wheels.
///
/// All matrices are assembled once at construction; accessors hand out
/// references so constraint evaluation stays allocation-free.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveModel {
    wheels: Vec<Wheel>,

    motor_vel_from_bot_vel: DMatrix<f64>,
    bot_vel_from_motor_vel: DMatrix<f64>,
    wheel_vel_from_bot_vel: DMatrix<f64>,

    volts_from_motor_vel: DMatrix<f64>,
    volts_from_motor_accel: DMatrix<f64>,
    volts_from_bot_vel: DMatrix<f64>,
    volts_from_bot_accel: DMatrix<f64>,
    bot_accel_from_volts: DMatrix<f64>,
    bot_accel_from_bot_vel: DMatrix<f64>,

    volts_for_motor_friction: DVector<f64>,
    motor_accel_for_motor_friction: DVector<f64>,
}

impl DriveModel {
    /// Singular values below this fraction of the largest are treated as
    /// zero when pseudo-inverting.
    const PINV_EPSILON: f64 = 1e-10;

    /// Assembles a model from an explicit wheel layout.
    ///
    /// # Errors
    ///
    /// Rejects layouts with fewer than two wheels, non-positive wheel or
    /// motor parameters, or a velocity transform that cannot be
    /// pseudo-inverted.
    pub fn new(wheels: Vec<Wheel>) -> Result<Self, DriveModelError> {
        if wheels.len() < 2 {
            return Err(DriveModelError::TooFewWheels(wheels.len()));
        }
        for (index, wheel) in wheels.iter().enumerate() {
            wheel.validate(index)?;
        }

        let n = wheels.len();

        let wheel_vel_from_bot_vel = DMatrix::from_row_slice(
            n,
            3,
            &wheels
                .iter()
                .flat_map(|wheel| wheel.tangential_row())
                .collect::<Vec<_>>(),
        );

        // Motor shafts see the tangential speed through gearing and radius.
        let mut motor_vel_from_bot_vel = wheel_vel_from_bot_vel.clone();
        for (i, wheel) in wheels.iter().enumerate() {
            motor_vel_from_bot_vel
                .row_mut(i)
                .scale_mut(wheel.gear_ratio / wheel.radius);
        }

        let bot_vel_from_motor_vel = pseudo_inverse(&motor_vel_from_bot_vel)?;

        let volts_from_motor_vel = DMatrix::from_diagonal(&DVector::from_iterator(
            n,
            wheels.iter().map(|wheel| wheel.motor.kv()),
        ));
        let volts_from_motor_accel = DMatrix::from_diagonal(&DVector::from_iterator(
            n,
            wheels.iter().map(|wheel| wheel.motor.ka()),
        ));
        let volts_for_motor_friction =
            DVector::from_iterator(n, wheels.iter().map(|wheel| wheel.motor.ks()));
        let motor_accel_for_motor_friction = DVector::from_iterator(
            n,
            wheels
                .iter()
                .map(|wheel| wheel.motor.ks() / wheel.motor.ka()),
        );

        let volts_from_bot_vel = &volts_from_motor_vel * &motor_vel_from_bot_vel;
        // Accelerations map through the same kinematics as velocities.
        let volts_from_bot_accel = &volts_from_motor_accel * &motor_vel_from_bot_vel;
        let bot_accel_from_volts = pseudo_inverse(&volts_from_bot_accel)?;
        // Back-EMF damping: how bot velocity decays with zero applied volts.
        let bot_accel_from_bot_vel = -(&bot_accel_from_volts * &volts_from_bot_vel);

        Ok(Self {
            wheels,
            motor_vel_from_bot_vel,
            bot_vel_from_motor_vel,
            wheel_vel_from_bot_vel,
            volts_from_motor_vel,
            volts_from_motor_accel,
            volts_from_bot_vel,
            volts_from_bot_accel,
            bot_accel_from_volts,
            bot_accel_from_bot_vel,
            volts_for_motor_friction,
            motor_accel_for_motor_friction,
        })
    }

    /// Two forward-facing wheel sets spaced `track_width` apart.
    ///
    /// # Errors
    ///
    /// See [`DriveModel::new`].
    pub fn differential(
        motor: MotorModel,
        wheel_radius: f64,
        gear_ratio: f64,
        track_width: f64,
    ) -> Result<Self, DriveModelError> {
        let half = track_width / 2.0;

        Self::new(
            [half, -half]
                .into_iter()
                .map(|y| Wheel {
                    position: Vec2::new(0.0, y),
                    direction: Angle::ZERO,
                    radius: wheel_radius,
                    gear_ratio,
                    motor,
                })
                .collect(),
        )
    }

    /// Four mecanum wheels in the usual X roller pattern.
    ///
    /// The front-left drive direction is -44.99° rather than -45°: with all
    /// four rollers at exactly 45° the velocity transform is rank-deficient
    /// and its pseudo-inverse is not meaningful. The deficiency is a real
    /// property of the ideal geometry, not of this implementation.
    ///
    /// # Errors
    ///
    /// See [`DriveModel::new`].
    pub fn mecanum(
        motor: MotorModel,
        wheel_radius: f64,
        gear_ratio: f64,
        track_width: f64,
        wheel_base: f64,
    ) -> Result<Self, DriveModelError> {
        let x = wheel_base / 2.0;
        let y = track_width / 2.0;

        let placements = [
            (Vec2::new(x, y), -44.99.deg()),
            (Vec2::new(x, -y), 45.0.deg()),
            (Vec2::new(-x, y), 45.0.deg()),
            (Vec2::new(-x, -y), -45.0.deg()),
        ];

        Self::new(
            placements
                .into_iter()
                .map(|(position, direction)| Wheel {
                    position,
                    direction,
                    radius: wheel_radius,
                    gear_ratio,
                    motor,
                })
                .collect(),
        )
    }

    /// Number of motors (and wheels) in the model.
    #[must_use]
    pub fn num_motors(&self) -> usize {
        self.wheels.len()
    }

    /// The wheels this model was built from.
    #[must_use]
    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    /// Maps bot velocity `(vx, vy, ω)` to per-motor angular velocity
    /// (n×3).
    #[must_use]
    pub fn motor_vel_from_bot_vel(&self) -> &DMatrix<f64> {
        &self.motor_vel_from_bot_vel
    }

    /// Maps bot acceleration to per-motor angular acceleration (n×3).
    ///
    /// Identical to [`Self::motor_vel_from_bot_vel`]: the kinematics are
    /// linear and time-invariant in the bot frame.
    #[must_use]
    pub fn motor_accel_from_bot_accel(&self) -> &DMatrix<f64> {
        &self.motor_vel_from_bot_vel
    }

    /// Least-squares inverse of [`Self::motor_vel_from_bot_vel`] (3×n).
    #[must_use]
    pub fn bot_vel_from_motor_vel(&self) -> &DMatrix<f64> {
        &self.bot_vel_from_motor_vel
    }

    /// Maps bot velocity to per-wheel tangential (surface) speed (n×3).
    #[must_use]
    pub fn wheel_vel_from_bot_vel(&self) -> &DMatrix<f64> {
        &self.wheel_vel_from_bot_vel
    }

    /// Per-motor back-EMF voltage per angular velocity (n×n diagonal).
    #[must_use]
    pub fn volts_from_motor_vel(&self) -> &DMatrix<f64> {
        &self.volts_from_motor_vel
    }

    /// Per-motor voltage per angular acceleration (n×n diagonal).
    #[must_use]
    pub fn volts_from_motor_accel(&self) -> &DMatrix<f64> {
        &self.volts_from_motor_accel
    }

    /// Voltage needed to hold a bot velocity at steady state (n×3).
    #[must_use]
    pub fn volts_from_bot_vel(&self) -> &DMatrix<f64> {
        &self.volts_from_bot_vel
    }

    /// Voltage attributable to a bot acceleration (n×3).
    #[must_use]
    pub fn volts_from_bot_accel(&self) -> &DMatrix<f64> {
        &self.volts_from_bot_accel
    }

    /// Least-squares inverse of [`Self::volts_from_bot_accel`] (3×n).
    #[must_use]
    pub fn bot_accel_from_volts(&self) -> &DMatrix<f64> {
        &self.bot_accel_from_volts
    }

    /// Deceleration of the bot per unit of bot velocity with motors
    /// shorted, `-bot_accel_from_volts · volts_from_bot_vel` (3×3).
    #[must_use]
    pub fn bot_accel_from_bot_vel(&self) -> &DMatrix<f64> {
        &self.bot_accel_from_bot_vel
    }

    /// Per-motor static friction voltage, applied against the direction of
    /// rotation.
    #[must_use]
    pub fn volts_for_motor_friction(&self) -> &DVector<f64> {
        &self.volts_for_motor_friction
    }

    /// Per-motor deceleration magnitude due to static friction (`ks / ka`).
    #[must_use]
    pub fn motor_accel_for_motor_friction(&self) -> &DVector<f64> {
        &self.motor_accel_for_motor_friction
    }
}

fn pseudo_inverse(matrix: &DMatrix<f64>) -> Result<DMatrix<f64>, DriveModelError> {
    let inverse = matrix
        .clone()
        .pseudo_inverse(DriveModel::PINV_EPSILON)
        .map_err(|message| DriveModelError::SingularTransform(message.to_string()))?;

    if inverse.iter().all(|value| value.is_finite()) {
        Ok(inverse)
    } else {
        Err(DriveModelError::SingularTransform(
            "pseudo-inverse has non-finite entries".to_string(),
        ))
    }
}
