//! Quaternions for axis-angle rotation
use nalgebra::{Matrix4, Vector3};
use std::ops::{Div, Mul};

/// Below this norm a quaternion or axis is treated as zero.
const NORM_EPSILON: f32 = 1e-8;

/// A quaternion `w + xi + yj + zk`.
///
/// Unit quaternions represent rotations: `w = cos(theta/2)` and
/// `(x, y, z) = sin(theta/2) * axis`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(1.0, 0.0, 0.0, 0.0);

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `theta` radians about `axis`.
    ///
    /// The axis need not be unit length; an axis shorter than `1e-8` gives
    /// the identity.
    pub fn from_axis_angle(axis: &Vector3<f32>, theta: f32) -> Self {
        let len = axis.norm();
        if len < NORM_EPSILON {
            return Self::IDENTITY;
        }

        let n = axis / len;
        let (s, c) = (theta * 0.5).sin_cos();
        Self::new(c, s * n.x, s * n.y, s * n.z)
    }

    pub fn norm(&self) -> f32 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let n = self.norm();
        if n < NORM_EPSILON {
            return Self::IDENTITY;
        }
        *self / n
    }

    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Hamilton product `self * rhs`. Not commutative.
    pub fn multiply(&self, rhs: &Quat) -> Self {
        let (a, b) = (self, rhs);
        Self::new(
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        )
    }

    /// Rotate `v` by computing `q v q*`.
    pub fn rotate_vector(&self, v: &Vector3<f32>) -> Vector3<f32> {
        let p = Quat::new(0.0, v.x, v.y, v.z);
        let r = self.multiply(&p).multiply(&self.conjugate());
        Vector3::new(r.x, r.y, r.z)
    }

    /// Homogeneous rotation matrix.
    ///
    /// Uses the canonical expansion directly, so the quaternion is not
    /// renormalized first.
    pub fn to_mat4(&self) -> Matrix4<f32> {
        let Quat { w, x, y, z } = *self;
        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0 - 2.0 * (y * y + z * z), 2.0 * (x * y - w * z),       2.0 * (x * z + w * y),       0.0,
            2.0 * (x * y + w * z),       1.0 - 2.0 * (x * x + z * z), 2.0 * (y * z - w * x),       0.0,
            2.0 * (x * z - w * y),       2.0 * (y * z + w * x),       1.0 - 2.0 * (x * x + y * y), 0.0,
            0.0,                         0.0,                         0.0,                         1.0,
        );
        m
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quat {
    type Output = Quat;

    fn mul(self, rhs: Quat) -> Quat {
        self.multiply(&rhs)
    }
}

impl Div<f32> for Quat {
    type Output = Quat;

    fn div(self, rhs: f32) -> Quat {
        Quat::new(self.w / rhs, self.x / rhs, self.y / rhs, self.z / rhs)
    }
}
