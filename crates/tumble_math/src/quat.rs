//! Unit quaternion for rigid body orientation

use serde::{Serialize, Deserialize};

use crate::Vec3;

/// Unit quaternion (x, y, z, w) with w as the scalar part
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a quaternion from raw components
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a rotation of `angle` radians around `axis` (must be unit length)
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half = angle * 0.5;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    /// Hamilton product: the rotation `other` followed by `self`
    pub fn mul(self, other: Self) -> Self {
        Self {
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        }
    }

    /// Normalize back to unit length (needed after integration steps)
    pub fn normalized(self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len > 0.0 {
            let inv = 1.0 / len;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate(self, v: Vec3) -> Vec3 {
        // v' = v + 2 * q_vec x (q_vec x v + w * v)
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = qv.cross(v) * 2.0;
        v + t * self.w + qv.cross(t)
    }

    /// Integrate an angular velocity (rad/s) over `dt` seconds
    ///
    /// Uses the standard first-order update q' = q + dt/2 * omega * q,
    /// renormalized afterwards.
    pub fn integrate(self, angular_velocity: Vec3, dt: f32) -> Self {
        let omega = Quat::new(
            angular_velocity.x,
            angular_velocity.y,
            angular_velocity.z,
            0.0,
        );
        let dq = omega.mul(self);
        let half_dt = 0.5 * dt;
        Self::new(
            self.x + dq.x * half_dt,
            self.y + dq.y * half_dt,
            self.z + dq.z * half_dt,
            self.w + dq.w * half_dt,
        )
        .normalized()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_identity_rotation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(Quat::IDENTITY.rotate(v), v));
    }

    #[test]
    fn test_quarter_turn_around_y() {
        let q = Quat::from_axis_angle(Vec3::Y, FRAC_PI_2);
        // +X rotates to -Z under a right-handed quarter turn around Y
        let rotated = q.rotate(Vec3::X);
        assert!(vec_approx_eq(rotated, Vec3::new(0.0, 0.0, -1.0)),
            "got {:?}", rotated);
    }

    #[test]
    fn test_half_turn_composition() {
        let quarter = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
        let half = Quat::from_axis_angle(Vec3::Z, PI);
        let composed = quarter.mul(quarter);
        let v = Vec3::new(1.0, 0.5, 0.0);
        assert!(vec_approx_eq(composed.rotate(v), half.rotate(v)));
    }

    #[test]
    fn test_integrate_preserves_unit_length() {
        let mut q = Quat::IDENTITY;
        for _ in 0..100 {
            q = q.integrate(Vec3::new(1.0, 2.0, 0.5), 0.016);
        }
        let len_sq = q.x * q.x + q.y * q.y + q.z * q.z + q.w * q.w;
        assert!((len_sq - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_integrate_zero_velocity_is_identity_step() {
        let q = Quat::from_axis_angle(Vec3::X, 0.3);
        let stepped = q.integrate(Vec3::ZERO, 0.016);
        assert!((stepped.w - q.w).abs() < EPSILON);
        assert!((stepped.x - q.x).abs() < EPSILON);
    }
}
