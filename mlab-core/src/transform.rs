//! Model transforms and the axis-align rotation builder
use nalgebra::{Matrix4, Unit, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Axes shorter than this produce the identity rotation.
pub const AXIS_EPSILON: f32 = 1e-6;

/// Object placement parameters, edited between frames by the front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    /// Rotation about the object's Y axis (radians)
    pub yaw: f32,
    /// Rotation about the object's X axis (radians)
    pub pitch: f32,
    /// Tilt of the ground plane about X (radians)
    pub pitch_plane: f32,
    /// Angle of the arbitrary-axis rotation (radians)
    pub axis_angle: f32,
    pub y_trans: f32,
    /// Push-back along -Z, in world units
    pub distance: f32,
}

impl TransformParams {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of [`Transform::axis_rotation`].
///
/// Besides the rotation itself this keeps the two intermediate images of the
/// unit axis so the alignment steps can be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRotation {
    pub matrix: Matrix4<f32>,
    /// Unit axis after the X rotation: lies in the X-Z plane
    pub aligned_xz: Vector3<f32>,
    /// Unit axis after the X and Y rotations: lies on +Z
    pub aligned_z: Vector3<f32>,
}

impl AxisRotation {
    fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
            aligned_xz: Vector3::zeros(),
            aligned_z: Vector3::zeros(),
        }
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation of `angle` radians about the X axis
    pub fn rotation_x(angle: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::x_axis(), angle)
    }

    /// Rotation of `angle` radians about the Y axis
    pub fn rotation_y(angle: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::y_axis(), angle)
    }

    /// Rotation of `angle` radians about the Z axis
    pub fn rotation_z(angle: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::z_axis(), angle)
    }

    /// Rotation of `angle` radians about an arbitrary (not necessarily unit) axis.
    ///
    /// Returns the identity for a near-zero axis.
    pub fn rotate(angle: f32, axis: &Vector3<f32>) -> Matrix4<f32> {
        if axis.norm() <= AXIS_EPSILON {
            return Matrix4::identity();
        }
        Matrix4::from_axis_angle(&Unit::new_normalize(*axis), angle)
    }

    /// Create a translation matrix
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a uniform scale matrix
    pub fn scale(s: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(s)
    }

    /// Rotation of `theta` about `axis` built by aligning the axis with +Z.
    ///
    /// `A = Ry * Rx` carries the unit axis onto +Z, so the result is
    /// `A^T * Rz(theta) * A`.
    pub fn axis_rotation(axis: &Vector3<f32>, theta: f32) -> AxisRotation {
        let axis_len = axis.norm();
        if axis_len <= AXIS_EPSILON {
            trace!("zero-length rotation axis, using identity");
            return AxisRotation::identity();
        }

        let m_w = axis / axis_len;
        let d = (m_w.y * m_w.y + m_w.z * m_w.z).sqrt();

        // Rotate about X until the axis has no Y component.
        let mut rx = Matrix4::identity();
        let mut w_x = m_w;
        if d > AXIS_EPSILON {
            let c = m_w.z / d;
            let s = m_w.y / d;
            rx[(1, 1)] = c;
            rx[(1, 2)] = -s;
            rx[(2, 1)] = s;
            rx[(2, 2)] = c;
            w_x = (rx * m_w.to_homogeneous()).xyz();
        }

        let theta_y = (-w_x.x).atan2(w_x.z);
        let ry = Self::rotation_y(theta_y);
        let w_z = (ry * w_x.to_homogeneous()).xyz();

        let a = ry * rx;
        let matrix = a.transpose() * Self::rotation_z(theta) * a;

        AxisRotation {
            matrix,
            aligned_xz: w_x,
            aligned_z: w_z,
        }
    }

    /// Model matrix of the cube.
    ///
    /// Yaw then pitch in object space, pushed back by the translation, then
    /// spun about `axis` in world space.
    pub fn cube_model(params: &TransformParams, axis: &Vector3<f32>) -> Matrix4<f32> {
        let base = Self::translation(0.0, params.y_trans, -params.distance)
            * Self::rotation_x(params.pitch)
            * Self::rotation_y(params.yaw);
        Self::axis_rotation(axis, params.axis_angle).matrix * base
    }

    /// Model matrix of the ground plane and the origin marker
    pub fn plane_model(params: &TransformParams) -> Matrix4<f32> {
        Self::translation(0.0, params.y_trans, -params.distance)
            * Self::rotation_x(params.pitch_plane)
    }

    /// Model matrix for basis vectors, shrunk by `scene_scale` to fit the display box
    pub fn vector_model(params: &TransformParams, scene_scale: f32) -> Matrix4<f32> {
        Self::plane_model(params) * Self::scale(scene_scale)
    }

    /// Apply a transform to a direction (w = 0)
    pub fn transform_direction(m: &Matrix4<f32>, v: &Vector3<f32>) -> Vector3<f32> {
        (m * Vector4::new(v.x, v.y, v.z, 0.0)).xyz()
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

/// True when the upper 3x3 block is orthonormal with determinant +1.
pub fn is_proper_rotation(m: &Matrix4<f32>, epsilon: f32) -> bool {
    let r = m.fixed_view::<3, 3>(0, 0).into_owned();
    let should_be_identity = r.transpose() * r;
    (should_be_identity - nalgebra::Matrix3::identity()).norm() < epsilon
        && (r.determinant() - 1.0).abs() < epsilon
}
