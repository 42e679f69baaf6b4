use core::ops::{Add, Mul, Neg, Sub};

use crate::{Angle, Vec2};

/// A position and heading in the plane.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Translation component.
    pub position: Vec2,

    /// Orientation component.
    pub heading: Angle,
}

impl Pose {
    /// Creates a new `Pose` from a position and heading.
    #[must_use]
    pub const fn new(position: Vec2, heading: Angle) -> Self {
        Self { position, heading }
    }

    /// Rotates only the translation component by `angle`, leaving the
    /// heading unchanged.
    #[must_use]
    pub fn vec_rotated(&self, angle: Angle) -> Self {
        Self {
            position: Vec2::from_angle(angle.as_radians()).rotate(self.position),
            heading: self.heading,
        }
    }
}

/// A planar rate: the derivative of a [`Pose`] with respect to some scalar
/// parameter (time, arc length, ...).
///
/// Unlike [`Pose`], both components are plain rates, so a `Twist` scales and
/// sums like a vector in ℝ³.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Twist {
    /// Rate of change of position.
    pub linear: Vec2,

    /// Rate of change of heading, in radians per parameter unit.
    pub angular: f64,
}

impl Twist {
    /// A twist with no motion.
    pub const ZERO: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
    };

    /// Creates a new `Twist` from linear and angular rates.
    #[must_use]
    pub const fn new(linear: Vec2, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Rotates the linear component by `angle`. The angular rate is
    /// frame-independent and passes through unchanged.
    #[must_use]
    pub fn rotated(&self, angle: Angle) -> Self {
        Self {
            linear: Vec2::from_angle(angle.as_radians()).rotate(self.linear),
            angular: self.angular,
        }
    }
}

impl Add for Twist {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            linear: self.linear + rhs.linear,
            angular: self.angular + rhs.angular,
        }
    }
}

impl Sub for Twist {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            linear: self.linear - rhs.linear,
            angular: self.angular - rhs.angular,
        }
    }
}

impl Mul<f64> for Twist {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self {
            linear: self.linear * scalar,
            angular: self.angular * scalar,
        }
    }
}

impl Neg for Twist {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            linear: -self.linear,
            angular: -self.angular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntoAngle;
    use approx::assert_abs_diff_eq;

    #[test]
    fn vec_rotated_keeps_heading() {
        let pose = Pose::new(Vec2::new(1.0, 0.0), 30.0.deg());
        let rotated = pose.vec_rotated(90.0.deg());

        assert_abs_diff_eq!(rotated.position.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rotated.position.y, 1.0, epsilon = 1e-12);
        assert_eq!(rotated.heading, 30.0.deg());
    }

    #[test]
    fn twist_frame_rotation() {
        let twist = Twist::new(Vec2::new(1.0, 1.0), 0.5);
        let back = twist.rotated(45.0.deg()).rotated((-45.0).deg());

        assert_abs_diff_eq!(back.linear.x, twist.linear.x, epsilon = 1e-12);
        assert_abs_diff_eq!(back.linear.y, twist.linear.y, epsilon = 1e-12);
        assert_abs_diff_eq!(back.angular, twist.angular);
    }

    #[test]
    fn twist_arithmetic() {
        let a = Twist::new(Vec2::new(1.0, 2.0), 3.0);
        let b = a * 2.0 - a;
        assert_eq!(b, a);
        assert_eq!(-a + a, Twist::ZERO);
    }
}
