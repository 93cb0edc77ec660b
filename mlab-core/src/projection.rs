//! Projection matrices and the world -> clip -> NDC -> screen pipeline
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::camera::LookAtMode;

/// Clip-space w magnitudes below this are never divided by.
pub const W_EPSILON: f32 = 1e-6;

/// Near plane used by the lab's projections
pub const NEAR: f32 = 0.01;
/// Far plane used by the lab's projections
pub const FAR: f32 = 100.0;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        }
    }
}

/// Viewing parameters, edited between frames by the front end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewParams {
    /// Vertical field of view in degrees
    pub fov_deg: f32,
    /// Zoom applied on top of the perspective field of view
    pub focal_length: f32,
    pub look_at: LookAtMode,
    pub projection: ProjectionMode,
    /// Half height of the orthographic view volume
    pub ortho_size: f32,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            fov_deg: 40.0,
            focal_length: 1.0,
            look_at: LookAtMode::Library,
            projection: ProjectionMode::Perspective,
            ortho_size: 5.0,
        }
    }
}

impl ViewParams {
    /// Projection matrix for these parameters at the given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        match self.projection {
            ProjectionMode::Perspective => {
                let mut p = perspective(self.fov_deg.to_radians(), aspect, NEAR, FAR);
                p[(0, 0)] *= self.focal_length;
                p[(1, 1)] *= self.focal_length;
                p
            }
            ProjectionMode::Orthographic => orthographic(self.ortho_size, aspect, NEAR, FAR),
        }
    }
}

/// Output surface size.
///
/// `pixel_aspect` is the width of one pixel divided by its height; it is
/// 1 for square pixels and about 0.5 for terminal character cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_aspect: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
            pixel_aspect: 1.0,
        }
    }

    pub fn with_pixel_aspect(mut self, pixel_aspect: f32) -> Self {
        self.pixel_aspect = pixel_aspect;
        self
    }

    /// Physical width over height
    pub fn aspect(&self) -> f32 {
        self.width * self.pixel_aspect / self.height
    }
}

/// Right-handed OpenGL-style perspective projection.
///
/// `fov_y` is in radians. Maps the view frustum to the [-1, 1] cube with
/// the camera looking down -Z.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);

    #[rustfmt::skip]
    let m = Matrix4::new(
        f / aspect, 0.0, 0.0,               0.0,
        0.0,        f,   0.0,               0.0,
        0.0,        0.0, (far + near) * nf, 2.0 * far * near * nf,
        0.0,        0.0, -1.0,              0.0,
    );
    m
}

/// Parallel projection of a box `size` high (each side of the axis) and
/// `size * aspect` wide, with depth mapped linearly to [-1, 1].
pub fn orthographic(size: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let right = size * aspect;
    let top = size;

    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0 / right, 0.0,       0.0,                 0.0,
        0.0,         1.0 / top, 0.0,                 0.0,
        0.0,         0.0,       -2.0 / (far - near), -(far + near) / (far - near),
        0.0,         0.0,       0.0,                 1.0,
    );
    m
}

/// NDC to screen space with the origin at the top left (Y flipped).
pub fn ndc_to_screen(ndc: &Point2<f32>, viewport: &Viewport) -> Point2<f32> {
    Point2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - (ndc.y + 1.0) * 0.5) * viewport.height,
    )
}

/// `P * MV * (world, 1)`
pub fn to_clip(world: &Point3<f32>, p: &Matrix4<f32>, mv: &Matrix4<f32>) -> Vector4<f32> {
    p * mv * world.to_homogeneous()
}

fn divide_to_screen(clip: &Vector4<f32>, viewport: &Viewport) -> Point2<f32> {
    let ndc = Point2::new(clip.x / clip.w, clip.y / clip.w);
    ndc_to_screen(&ndc, viewport)
}

/// Project a world point to the screen.
///
/// Only guards the perspective divide: returns `None` when `|w| < 1e-6`.
/// Points outside the view volume still produce (off-screen) coordinates.
pub fn to_screen(
    world: &Point3<f32>,
    p: &Matrix4<f32>,
    mv: &Matrix4<f32>,
    viewport: &Viewport,
) -> Option<Point2<f32>> {
    let clip = to_clip(world, p, mv);
    if clip.w.abs() < W_EPSILON {
        return None;
    }
    Some(divide_to_screen(&clip, viewport))
}

/// Project a world point to the screen with the GPU clip test.
///
/// Returns `None` unless the point is strictly in front of the camera
/// (`w > 1e-6`) and inside the clip box `-w <= x, y, z <= w`.
pub fn to_screen_clipped(
    world: &Point3<f32>,
    p: &Matrix4<f32>,
    mv: &Matrix4<f32>,
    viewport: &Viewport,
) -> Option<Point2<f32>> {
    let clip = to_clip(world, p, mv);
    if !inside_clip_box(&clip) {
        return None;
    }
    Some(divide_to_screen(&clip, viewport))
}

/// `w > 1e-6` and every coordinate within `[-w, w]`
pub fn inside_clip_box(clip: &Vector4<f32>) -> bool {
    clip.w > W_EPSILON
        && clip.x.abs() <= clip.w
        && clip.y.abs() <= clip.w
        && clip.z.abs() <= clip.w
}

/// How a point is rejected before the perspective divide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPolicy {
    /// Reject only when w is too close to zero ([`to_screen`])
    DivideGuard,
    /// Reject anything outside the clip box ([`to_screen_clipped`])
    ClipBox,
}

impl ClipPolicy {
    pub fn project(
        self,
        world: &Point3<f32>,
        p: &Matrix4<f32>,
        mv: &Matrix4<f32>,
        viewport: &Viewport,
    ) -> Option<Point2<f32>> {
        match self {
            ClipPolicy::DivideGuard => to_screen(world, p, mv, viewport),
            ClipPolicy::ClipBox => to_screen_clipped(world, p, mv, viewport),
        }
    }
}

/// Every stage of the pipeline for one world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineTrace {
    pub world: Point3<f32>,
    pub view: Vector4<f32>,
    pub clip: Vector4<f32>,
    /// Zero when the divide was skipped
    pub ndc: Vector3<f32>,
    pub screen: Option<Point2<f32>>,
    /// `|w| >= 1e-6`, the divide was performed
    pub valid_w: bool,
    /// The point survives the clip-box test
    pub inside_clip: bool,
}

impl PipelineTrace {
    pub fn new(
        world: &Point3<f32>,
        p: &Matrix4<f32>,
        mv: &Matrix4<f32>,
        viewport: &Viewport,
    ) -> Self {
        let view = mv * world.to_homogeneous();
        let clip = p * view;
        let valid_w = clip.w.abs() >= W_EPSILON;
        let ndc = if valid_w {
            clip.xyz() / clip.w
        } else {
            Vector3::zeros()
        };
        let screen = valid_w.then(|| ndc_to_screen(&Point2::new(ndc.x, ndc.y), viewport));

        Self {
            world: *world,
            view,
            clip,
            ndc,
            screen,
            valid_w,
            inside_clip: inside_clip_box(&clip),
        }
    }
}
