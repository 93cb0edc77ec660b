//! Orbit camera and view matrices
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Which look-at construction builds the view matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookAtMode {
    /// nalgebra's `look_at_rh`
    #[default]
    Library,
    /// The hand-built [`look_at`]
    Custom,
}

impl LookAtMode {
    pub fn toggled(self) -> Self {
        match self {
            LookAtMode::Library => LookAtMode::Custom,
            LookAtMode::Custom => LookAtMode::Library,
        }
    }
}

/// Camera orbiting a target point on a sphere of `radius`.
///
/// Yaw 0 and pitch 0 put the camera on +Z looking toward -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Radians about +Y
    pub yaw: f32,
    /// Radians above the X-Z plane
    pub pitch: f32,
    pub radius: f32,
}

impl OrbitCamera {
    pub fn new(radius: f32) -> Self {
        Self {
            target: Point3::origin(),
            up: Vector3::y(),
            yaw: 0.0,
            pitch: 0.0,
            radius,
        }
    }

    /// Eye position from the spherical coordinates
    pub fn position(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + self.radius * Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self, mode: LookAtMode) -> Matrix4<f32> {
        let eye = self.position();
        match mode {
            LookAtMode::Library => Matrix4::look_at_rh(&eye, &self.target, &self.up),
            LookAtMode::Custom => look_at(&eye, &self.target, &self.up),
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(8.0)
    }
}

/// Right-handed look-at built from its basis vectors.
///
/// The rows of the rotation are `right`, `true_up` and `-forward`; it is
/// applied after translating the eye to the origin. `up` must not be
/// parallel to the view direction.
pub fn look_at(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
    let n = (target - eye).normalize();
    let right = n.cross(up).normalize();
    let true_up = right.cross(&n).normalize();

    #[rustfmt::skip]
    let rotation = Matrix4::new(
        right.x,   right.y,   right.z,   0.0,
        true_up.x, true_up.y, true_up.z, 0.0,
        -n.x,      -n.y,      -n.z,      0.0,
        0.0,       0.0,       0.0,       1.0,
    );
    let translation = Matrix4::new_translation(&-eye.coords);

    rotation * translation
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_default_position() {
        let camera = OrbitCamera::default();
        assert_abs_diff_eq!(camera.position(), Point3::new(0.0, 0.0, 8.0), epsilon = 1e-6);
    }

    #[test]
    fn test_spherical_position() {
        let mut camera = OrbitCamera::new(2.0);
        camera.target = Point3::new(1.0, 1.0, 1.0);
        camera.yaw = FRAC_PI_2;
        assert_abs_diff_eq!(camera.position(), Point3::new(3.0, 1.0, 1.0), epsilon = 1e-6);

        camera.yaw = 0.0;
        camera.pitch = FRAC_PI_2;
        assert_abs_diff_eq!(camera.position(), Point3::new(1.0, 3.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_target_lands_on_negative_z() {
        let camera = OrbitCamera::new(5.0);
        let view = camera.view_matrix(LookAtMode::Custom);
        let target = view.transform_point(&camera.target);
        assert_abs_diff_eq!(target, Point3::new(0.0, 0.0, -5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_custom_matches_library() {
        let configs = [(0.0, 0.0), (0.7, 0.3), (-2.1, -0.9), (3.0, 1.2)];
        for (yaw, pitch) in configs {
            let camera = OrbitCamera {
                target: Point3::new(0.5, -1.0, 2.0),
                up: Vector3::y(),
                yaw,
                pitch,
                radius: 6.0,
            };
            assert_abs_diff_eq!(
                camera.view_matrix(LookAtMode::Custom),
                camera.view_matrix(LookAtMode::Library),
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn test_toggle_mode() {
        assert_eq!(LookAtMode::Library.toggled(), LookAtMode::Custom);
        assert_eq!(LookAtMode::Custom.toggled(), LookAtMode::Library);
    }
}
