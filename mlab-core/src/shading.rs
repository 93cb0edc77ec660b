//! Face normals, Phong illumination and planar shadows
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::Face;
use crate::transform::Transform;

/// Coefficients and light intensities for the scalar Phong model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhongTerms {
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    pub shininess: f32,
    /// Ambient light intensity
    pub la: f32,
    /// Diffuse light intensity
    pub ld: f32,
    /// Specular light intensity
    pub ls: f32,
}

impl Default for PhongTerms {
    fn default() -> Self {
        Self {
            ka: 0.2,
            kd: 0.7,
            ks: 0.4,
            shininess: 16.0,
            la: 1.0,
            ld: 1.0,
            ls: 1.0,
        }
    }
}

/// Surface description for the colored Phong model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Linear RGB in [0, 1]
    pub color: [f32; 3],
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [0.31, 0.55, 0.86],
            ka: 0.2,
            kd: 0.7,
            ks: 0.4,
            shininess: 16.0,
        }
    }
}

/// Mirror `incident` about the unit normal `n`.
pub fn reflect(incident: &Vector3<f32>, n: &Vector3<f32>) -> Vector3<f32> {
    incident - n * (2.0 * n.dot(incident))
}

/// World-space unit normal of a quad face.
///
/// Built from the edges `v1 - v0` and `v3 - v0`, then flipped if needed so
/// it points away from the model origin. Only valid for convex meshes
/// centered near the origin.
pub fn face_normal(vertices: &[Point3<f32>], face: &Face, model: &Matrix4<f32>) -> Vector3<f32> {
    let v0 = vertices[face[0]];
    let v1 = vertices[face[1]];
    let v2 = vertices[face[2]];
    let v3 = vertices[face[3]];

    let mut normal = (v1 - v0).cross(&(v3 - v0)).normalize();
    let center = (v0.coords + v1.coords + v2.coords + v3.coords) * 0.25;
    if normal.dot(&center) < 0.0 {
        normal = -normal;
    }

    Transform::transform_direction(model, &normal).normalize()
}

/// Scalar Phong intensity.
///
/// `n`, `l` (toward the light) and `v` (toward the viewer) must be unit vectors.
pub fn phong(n: &Vector3<f32>, l: &Vector3<f32>, v: &Vector3<f32>, terms: &PhongTerms) -> f32 {
    let ambient = terms.ka * terms.la;
    let diffuse = terms.kd * l.dot(n).max(0.0) * terms.ld;
    let r = reflect(&-l, n);
    let specular = terms.ks * v.dot(&r).max(0.0).powf(terms.shininess) * terms.ls;

    ambient + diffuse + specular
}

/// Per-channel Phong color.
///
/// The material color tints the ambient and diffuse terms; highlights take
/// the light color.
pub fn phong_color(
    n: &Vector3<f32>,
    l: &Vector3<f32>,
    v: &Vector3<f32>,
    material: &Material,
    light_color: &Vector3<f32>,
) -> Vector3<f32> {
    let base = Vector3::from(material.color).component_mul(light_color);
    let ambient = base * material.ka;
    let diffuse = base * (material.kd * l.dot(n).max(0.0));
    let r = reflect(&-l, n);
    let specular = light_color * (material.ks * v.dot(&r).max(0.0).powf(material.shininess));

    ambient + diffuse + specular
}

/// Projective matrix casting points onto the `y = 0` plane away from
/// `light`.
///
/// The light must not lie on the plane itself.
pub fn shadow_from(light: &Point3<f32>) -> Matrix4<f32> {
    let to_light = Matrix4::new_translation(&-light.coords);
    let mut m = Matrix4::identity();
    m[(3, 3)] = 0.0;
    m[(3, 1)] = 1.0 / -light.y;
    let back = Matrix4::new_translation(&light.coords);

    back * m * to_light
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CubeMesh;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = CubeMesh::new(0.5);
        let expected = [
            -Vector3::z(),
            Vector3::z(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::x(),
            -Vector3::x(),
        ];
        for (face, want) in cube.faces.iter().zip(expected) {
            let n = face_normal(&cube.vertices, face, &Matrix4::identity());
            assert_abs_diff_eq!(n, want, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_normal_follows_model_rotation() {
        let cube = CubeMesh::new(0.5);
        let model = Transform::translation(3.0, 0.0, 0.0)
            * Transform::rotation_y(std::f32::consts::FRAC_PI_2);
        // The +Z face turns to +X; the translation is ignored.
        let n = face_normal(&cube.vertices, &cube.faces[1], &model);
        assert_abs_diff_eq!(n, Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn test_reflect() {
        let r = reflect(&Vector3::new(1.0, -1.0, 0.0), &Vector3::y());
        assert_abs_diff_eq!(r, Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_phong_head_on() {
        let n = Vector3::z();
        let terms = PhongTerms::default();
        let intensity = phong(&n, &n, &n, &terms);
        assert!((intensity - (terms.ka + terms.kd + terms.ks)).abs() < 1e-6);
    }

    #[test]
    fn test_phong_light_behind_is_ambient_only() {
        let n = Vector3::z();
        let terms = PhongTerms::default();
        let intensity = phong(&n, &-n, &n, &terms);
        assert!((intensity - terms.ka * terms.la).abs() < 1e-6);
    }

    #[test]
    fn test_phong_color_channels() {
        let n = Vector3::z();
        let material = Material {
            color: [1.0, 0.0, 0.0],
            ka: 0.0,
            kd: 1.0,
            ks: 0.0,
            shininess: 1.0,
        };
        let c = phong_color(&n, &n, &n, &material, &Vector3::new(1.0, 1.0, 1.0));
        assert_abs_diff_eq!(c, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_shadow_lands_on_ground() {
        let light = Point3::new(0.0, 5.0, 0.0);
        let shadow = shadow_from(&light);
        let p = shadow.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_abs_diff_eq!(p, Point3::new(1.25, 0.0, 1.25), epsilon = 1e-5);

        // Points already on the ground stay put.
        let q = shadow.transform_point(&Point3::new(-2.0, 0.0, 3.0));
        assert_abs_diff_eq!(q, Point3::new(-2.0, 0.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_shadow_from_offset_light() {
        let light = Point3::new(2.0, 4.0, -1.0);
        let shadow = shadow_from(&light);
        let p = Point3::new(0.5, 2.0, 0.5);
        let projected = shadow.transform_point(&p);
        assert!(projected.y.abs() < 1e-5);
        // The light, the point and its shadow are collinear.
        let along = (p - light).cross(&(projected - light));
        assert!(along.norm() < 1e-4);
    }
}
