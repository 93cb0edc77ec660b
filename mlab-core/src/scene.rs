//! The lab state and the draw lists assembled from it each frame.
//!
//! Everything here is recomputed from scratch per frame: model and view
//! matrices first, then every visible point goes through the projection
//! pipeline, faces are shaded and painter-sorted, and the result is a list
//! of screen-space [`Primitive`]s in draw order.
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use tracing::trace;

use crate::arcball::{Arcball, ArcballEvent};
use crate::basis::{self, Basis};
use crate::camera::OrbitCamera;
use crate::controls::ControlSettings;
use crate::geometry::{self, CubeMesh, QUAD_TRIANGLES};
use crate::primitive::{Color, Primitive, PrimitiveKind};
use crate::projection::{ClipPolicy, PipelineTrace, ViewParams, Viewport};
use crate::quaternion::Quat;
use crate::shading::{self, PhongTerms};
use crate::transform::{Transform, TransformParams};

/// Side length of the ground quad
pub const GROUND_SIZE: f32 = 10.0;

/// Lattice subdivisions of the ground quad
pub const DEFAULT_GRID_DIVISIONS: usize = 10;

/// Subdivisions of the lattice spanned by the v-basis tips
pub const BASIS_LATTICE_DIVISIONS: usize = 4;

/// Rejection used for every projected vertex of a frame
const FRAME_CLIP: ClipPolicy = ClipPolicy::ClipBox;

/// Basis vectors, coefficients and light of the current experiment.
///
/// `w = a1 v1 + a2 v2 + a3 v3` and `b` holds the coordinates of `w` in the
/// u-basis; both are derived and must be refreshed with
/// [`SceneGeometry::recompute`] after editing the inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneGeometry {
    pub v_basis: Basis,
    pub u_basis: Basis,
    /// Coefficients of `w` in the v-basis
    pub a: Vector3<f32>,
    pub w: Vector3<f32>,
    /// Coefficients of `w` in the u-basis
    pub b: Vector3<f32>,
    /// Light position, in ground coordinates
    pub light: Point3<f32>,
    /// Ground corners in lattice order (see [`geometry::bilinear_grid`])
    pub ground: [Point3<f32>; 4],
}

impl SceneGeometry {
    pub fn new(v_basis: Basis, u_basis: Basis, a: Vector3<f32>, light: Point3<f32>) -> Self {
        let mut scene = Self {
            v_basis,
            u_basis,
            a,
            w: Vector3::zeros(),
            b: Vector3::zeros(),
            light,
            ground: ground_corners(GROUND_SIZE),
        };
        scene.recompute();
        scene
    }

    /// Refresh `w` and `b` from the bases and `a`.
    pub fn recompute(&mut self) {
        self.w = self.v_basis.point_at(&self.a);
        self.b = self.u_basis.coords_of(&self.w);
    }

    /// `v1, v2, v3, u1, u2, u3, w`
    pub fn displayed_vectors(&self) -> [Vector3<f32>; 7] {
        let [v1, v2, v3] = self.v_basis.vectors();
        let [u1, u2, u3] = self.u_basis.vectors();
        [v1, v2, v3, u1, u2, u3, self.w]
    }

    pub fn scene_scale(&self) -> f32 {
        basis::scene_scale(self.displayed_vectors().iter())
    }
}

impl Default for SceneGeometry {
    fn default() -> Self {
        let v = Basis::standard();
        let u = Basis::new(v.e1, v.e1 + v.e2, v.e1 + v.e2 + v.e3);
        Self::new(v, u, Vector3::new(1.0, 2.0, 3.0), Point3::new(2.0, 4.0, 1.5))
    }
}

/// Square of side `size` on the `y = 0` plane
pub fn ground_corners(size: f32) -> [Point3<f32>; 4] {
    let half = size * 0.5;
    [
        Point3::new(half, 0.0, -half),
        Point3::new(-half, 0.0, -half),
        Point3::new(half, 0.0, half),
        Point3::new(-half, 0.0, half),
    ]
}

/// Unshaded color of cube face `face`
pub fn face_base_color(face: usize) -> Color {
    let step = (20 * face).min(175) as u8;
    Color::rgb(80 + step, 140u8.saturating_add(step), 220)
}

/// Shading result for one cube face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceShade {
    pub face: usize,
    /// Average view-space depth
    pub avg_z: f32,
    /// Scalar Phong intensity
    pub intensity: f32,
    pub color: Color,
}

/// Colors of `v1..v3`, `u1..u3` and `w`
pub const VECTOR_COLORS: [Color; 7] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::rgb(255, 150, 150),
    Color::rgb(150, 255, 150),
    Color::rgb(150, 150, 255),
    Color::WHITE,
];

/// Everything computed for one frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub viewport: Viewport,
    /// Cube model matrix, arcball rotation included
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    /// Model-view of the displayed basis vectors
    pub vector_model_view: Matrix4<f32>,
    pub scene_scale: f32,
    /// Cube faces, back to front
    pub faces: Vec<FaceShade>,
    /// Draw lists in painter's order
    pub primitives: Vec<Primitive>,
}

impl Frame {
    /// Pipeline stages of `world` under the vector model-view
    pub fn trace(&self, world: &Point3<f32>) -> PipelineTrace {
        PipelineTrace::new(world, &self.projection, &self.vector_model_view, &self.viewport)
    }

    pub fn cube_model_view(&self) -> Matrix4<f32> {
        self.view * self.model
    }
}

/// One model-view/projection pair bound to a viewport
struct Stage<'a> {
    projection: &'a Matrix4<f32>,
    model_view: Matrix4<f32>,
    viewport: &'a Viewport,
}

impl<'a> Stage<'a> {
    fn new(
        projection: &'a Matrix4<f32>,
        model_view: Matrix4<f32>,
        viewport: &'a Viewport,
    ) -> Self {
        Self {
            projection,
            model_view,
            viewport,
        }
    }

    fn project(&self, world: &Point3<f32>) -> Option<Point2<f32>> {
        FRAME_CLIP.project(world, self.projection, &self.model_view, self.viewport)
    }

    fn segment(&self, lines: &mut Primitive, from: &Point3<f32>, to: &Point3<f32>, color: Color) {
        if let (Some(a), Some(b)) = (self.project(from), self.project(to)) {
            lines.push_element(&[a, b], color);
        }
    }

    fn triangle(&self, triangles: &mut Primitive, corners: [Point3<f32>; 3], color: Color) {
        let mut projected = [Point2::origin(); 3];
        for (slot, corner) in projected.iter_mut().zip(&corners) {
            match self.project(corner) {
                Some(p) => *slot = p,
                None => return,
            }
        }
        triangles.push_element(&projected, color);
    }

    fn point(&self, points: &mut Primitive, world: &Point3<f32>, color: Color) {
        if let Some(p) = self.project(world) {
            points.push(p, color);
        }
    }
}

/// Complete lab state, owned by the front end
#[derive(Debug, Clone)]
pub struct Lab {
    pub transform: TransformParams,
    pub view: ViewParams,
    pub camera: OrbitCamera,
    pub controls: ControlSettings,
    pub scene: SceneGeometry,
    pub cube: CubeMesh,
    pub arcball: Arcball,
    pub phong: PhongTerms,
    pub grid_divisions: usize,
}

impl Default for Lab {
    fn default() -> Self {
        Self {
            transform: TransformParams::default(),
            view: ViewParams::default(),
            camera: OrbitCamera::default(),
            controls: ControlSettings::default(),
            scene: SceneGeometry::default(),
            cube: CubeMesh::default(),
            arcball: Arcball::new(),
            phong: PhongTerms::default(),
            grid_divisions: DEFAULT_GRID_DIVISIONS,
        }
    }
}

impl Lab {
    /// Advance the cross-frame state by one frame of `dt` seconds.
    pub fn tick(&mut self, event: Option<ArcballEvent>, dt: f32) {
        self.arcball.update(event, dt);
    }

    /// Cube model: the parameter-driven transform, then the arcball rotation
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.arcball.rotation() * Transform::cube_model(&self.transform, &self.scene.w)
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.view_matrix(self.view.look_at)
    }

    /// Ground frame: the plane model lowered to the bottom of the cube
    pub fn ground_matrix(&self) -> Matrix4<f32> {
        Transform::plane_model(&self.transform)
            * Transform::translation(0.0, -self.cube.half_size(), 0.0)
    }

    /// Build every matrix and draw list for `viewport`.
    pub fn frame(&self, viewport: &Viewport) -> Frame {
        let view = self.view_matrix();
        let projection = self.view.projection_matrix(viewport.aspect());
        let model = self.model_matrix();
        let ground = self.ground_matrix();
        let scene_scale = self.scene.scene_scale();
        let vector_model_view = view * Transform::vector_model(&self.transform, scene_scale);

        let ground_stage = Stage::new(&projection, view * ground, viewport);
        let cube_stage = Stage::new(&projection, view * model, viewport);
        let plane_model_view = view * Transform::plane_model(&self.transform);
        let plane_stage = Stage::new(&projection, plane_model_view, viewport);
        let vector_stage = Stage::new(&projection, vector_model_view, viewport);

        let faces = self.shade_faces(&model, &cube_stage.model_view);

        let mut primitives = vec![self.ground_lines(&ground_stage)];
        if let Some(flatten) = self.shadow_matrix() {
            let shadow_stage = Stage::new(&projection, view * flatten * model, viewport);
            primitives.push(self.shadow_triangles(&shadow_stage));
        }
        primitives.push(self.face_triangles(&faces, &cube_stage));
        primitives.push(self.vector_lines(&vector_stage));
        primitives.push(self.basis_lattice(&vector_stage));
        primitives.push(self.axis_lines(&plane_stage));
        primitives.push(self.markers(&vector_stage, &plane_stage, &ground_stage));

        trace!(
            primitives = primitives.len(),
            vertices = primitives.iter().map(|p| p.vertices.len()).sum::<usize>(),
            "frame assembled"
        );

        Frame {
            viewport: *viewport,
            model,
            view,
            projection,
            vector_model_view,
            scene_scale,
            faces,
            primitives,
        }
    }

    /// Phong-shaded cube faces in painter's order
    pub fn shade_faces(&self, model: &Matrix4<f32>, model_view: &Matrix4<f32>) -> Vec<FaceShade> {
        let light = self.ground_matrix().transform_point(&self.scene.light);
        let eye = self.camera.position();

        geometry::painter_order(&self.cube, model_view)
            .into_iter()
            .map(|depth| {
                let quad = &self.cube.faces[depth.face];
                let n = shading::face_normal(&self.cube.vertices, quad, model);
                let center = model.transform_point(&self.cube.face_center(depth.face));
                let l = (light - center).try_normalize(1e-6).unwrap_or_else(Vector3::zeros);
                let v = (eye - center).try_normalize(1e-6).unwrap_or_else(Vector3::zeros);
                let intensity = shading::phong(&n, &l, &v, &self.phong);

                FaceShade {
                    face: depth.face,
                    avg_z: depth.avg_z,
                    intensity,
                    color: face_base_color(depth.face).scaled(intensity),
                }
            })
            .collect()
    }

    fn ground_lines(&self, stage: &Stage) -> Primitive {
        let lattice = geometry::bilinear_grid(&self.scene.ground, self.grid_divisions);
        let mut lines = Primitive::new(PrimitiveKind::Lines);
        for (a, b) in geometry::grid_segments(self.grid_divisions) {
            stage.segment(&mut lines, &lattice[a], &lattice[b], Color::GREY);
        }
        lines
    }

    /// World-space matrix flattening points onto the ground away from the
    /// light.
    ///
    /// `None` when the light is not above the ground.
    pub fn shadow_matrix(&self) -> Option<Matrix4<f32>> {
        if self.scene.light.y <= 0.0 {
            return None;
        }
        let ground = self.ground_matrix();
        let to_ground = ground.try_inverse().unwrap_or_else(Matrix4::identity);
        Some(ground * shading::shadow_from(&self.scene.light) * to_ground)
    }

    fn shadow_triangles(&self, stage: &Stage) -> Primitive {
        let mut triangles = Primitive::new(PrimitiveKind::Triangles);
        for face in 0..self.cube.faces.len() {
            let quad = self.cube.face_vertices(face);
            for tri in QUAD_TRIANGLES.chunks_exact(3) {
                let corners = [quad[tri[0]], quad[tri[1]], quad[tri[2]]];
                stage.triangle(&mut triangles, corners, Color::SHADOW);
            }
        }
        triangles
    }

    fn face_triangles(&self, faces: &[FaceShade], stage: &Stage) -> Primitive {
        let mut triangles = Primitive::new(PrimitiveKind::Triangles);
        for shade in faces {
            let quad = self.cube.face_vertices(shade.face);
            for tri in QUAD_TRIANGLES.chunks_exact(3) {
                let corners = [quad[tri[0]], quad[tri[1]], quad[tri[2]]];
                stage.triangle(&mut triangles, corners, shade.color);
            }
        }
        triangles
    }

    fn vector_lines(&self, stage: &Stage) -> Primitive {
        let origin = Point3::origin();
        let mut lines = Primitive::new(PrimitiveKind::Lines);
        for (v, color) in self.scene.displayed_vectors().iter().zip(VECTOR_COLORS) {
            stage.segment(&mut lines, &origin, &Point3::from(*v), color);
        }
        lines
    }

    /// Points `u v1 + v v2 + w v3` with `u + v + w = 1`, tinted by their
    /// barycentric weights.
    fn basis_lattice(&self, stage: &Stage) -> Primitive {
        let [v1, v2, v3] = self.scene.v_basis.vectors().map(Point3::from);
        let n = BASIS_LATTICE_DIVISIONS;
        let mut points = Primitive::new(PrimitiveKind::Points);
        for ((i, j), p) in geometry::barycentric_grid(&v1, &v2, &v3, n) {
            let weights = Vector3::new(i as f32, j as f32, (n - i - j) as f32) / n as f32;
            stage.point(&mut points, &p, Color::from_unit(&weights));
        }
        points
    }

    /// The rotation axis and the steps aligning it with +Z, plus a test
    /// vector and its image under the axis rotation.
    fn axis_lines(&self, stage: &Stage) -> Primitive {
        let rotation = Transform::axis_rotation(&self.scene.w, self.transform.axis_angle);
        let unit_axis = self.scene.w.try_normalize(1e-6).unwrap_or_else(Vector3::zeros);
        let test = Vector3::new(1.0, 0.0, 0.0);
        let rotated =
            Quat::from_axis_angle(&self.scene.w, self.transform.axis_angle).rotate_vector(&test);

        let origin = Point3::origin();
        let mut lines = Primitive::new(PrimitiveKind::Lines);
        for (v, color) in [
            (unit_axis, Color::YELLOW),
            (rotation.aligned_xz, Color::rgb(120, 220, 120)),
            (rotation.aligned_z, Color::rgb(220, 120, 120)),
            (test, Color::CYAN),
            (rotated, Color::MAGENTA),
        ] {
            stage.segment(&mut lines, &origin, &Point3::from(v), color);
        }
        lines
    }

    fn markers(&self, vectors: &Stage, plane: &Stage, ground: &Stage) -> Primitive {
        let mut points = Primitive::new(PrimitiveKind::Points);
        for (v, color) in self.scene.displayed_vectors().iter().zip(VECTOR_COLORS) {
            vectors.point(&mut points, &Point3::from(*v), color);
        }
        plane.point(&mut points, &Point3::origin(), Color::WHITE);
        ground.point(&mut points, &self.scene.light, Color::YELLOW);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn viewport() -> Viewport {
        Viewport::new(120, 40).with_pixel_aspect(0.5)
    }

    #[test]
    fn test_book_example() {
        let scene = SceneGeometry::default();
        assert_abs_diff_eq!(scene.w, Vector3::new(1.0, 2.0, 3.0), epsilon = 1e-6);
        assert_abs_diff_eq!(scene.b, Vector3::new(-1.0, -1.0, 3.0), epsilon = 1e-5);
        // w = (1, 2, 3) holds the largest component.
        assert!((scene.scene_scale() - 0.5 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_recompute_after_edit() {
        let mut scene = SceneGeometry::default();
        scene.a = Vector3::new(0.0, 0.0, 1.0);
        scene.recompute();
        assert_abs_diff_eq!(scene.w, Vector3::z(), epsilon = 1e-6);
        assert_abs_diff_eq!(scene.b, Vector3::new(0.0, -1.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_u_basis_gives_zero_coefficients() {
        let mut scene = SceneGeometry::default();
        scene.u_basis.e3 = scene.u_basis.e1 + scene.u_basis.e2;
        scene.recompute();
        assert_eq!(scene.b, Vector3::zeros());
    }

    #[test]
    fn test_face_colors() {
        assert_eq!(face_base_color(0), Color::rgb(80, 140, 220));
        assert_eq!(face_base_color(5), Color::rgb(180, 240, 220));
    }

    #[test]
    fn test_default_frame() {
        let lab = Lab::default();
        let frame = lab.frame(&viewport());

        assert_eq!(frame.faces.len(), 6);
        assert!(frame.faces.windows(2).all(|w| w[0].avg_z <= w[1].avg_z));
        // ground, shadow, faces, vectors, basis lattice, axis helpers, markers
        assert_eq!(frame.primitives.len(), 7);

        let kinds: Vec<PrimitiveKind> = frame.primitives.iter().map(|p| p.kind).collect();
        assert_eq!(kinds[2], PrimitiveKind::Triangles);
        // The cube sits at the camera target, fully in view.
        assert_eq!(frame.primitives[2].len(), 12);
        assert_eq!(frame.primitives[3].len(), 7);

        for primitive in &frame.primitives {
            for vertex in &primitive.vertices {
                let p = vertex.position;
                assert!(p.x >= 0.0 && p.x <= 120.0);
                assert!(p.y >= 0.0 && p.y <= 40.0);
            }
        }
    }

    #[test]
    fn test_basis_lattice_weights() {
        let lab = Lab::default();
        let frame = lab.frame(&Viewport::new(800, 600));
        let lattice = &frame.primitives[4];
        assert_eq!(lattice.kind, PrimitiveKind::Points);
        let n = BASIS_LATTICE_DIVISIONS;
        assert_eq!(lattice.len(), (n + 1) * (n + 2) / 2);

        // The pure corners take the primary colors.
        let colors: Vec<Color> = lattice.vertices.iter().map(|v| v.color).collect();
        for corner in [Color::rgb(255, 0, 0), Color::rgb(0, 255, 0), Color::rgb(0, 0, 255)] {
            assert!(colors.contains(&corner));
        }
    }

    #[test]
    fn test_axis_helper_rotates_test_vector() {
        let mut lab = Lab::default();
        lab.transform.axis_angle = 1.1;
        let frame = lab.frame(&Viewport::new(800, 600));
        let rotation = Transform::axis_rotation(&lab.scene.w, 1.1);
        let rotated = rotation.matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        let plane_model_view = frame.view * Transform::plane_model(&lab.transform);
        let expected = crate::projection::to_screen_clipped(
            &rotated,
            &frame.projection,
            &plane_model_view,
            &frame.viewport,
        )
        .unwrap();

        let axes = &frame.primitives[5];
        assert_eq!(axes.kind, PrimitiveKind::Lines);
        assert!(axes.vertices.iter().any(|v| {
            v.color == Color::MAGENTA && (v.position - expected).norm() < 1e-2
        }));
    }

    #[test]
    fn test_light_below_ground_drops_shadow() {
        let mut lab = Lab::default();
        lab.scene.light = Point3::new(1.0, -2.0, 0.0);
        let frame = lab.frame(&viewport());
        assert_eq!(frame.primitives.len(), 6);
    }

    #[test]
    fn test_cube_behind_camera_is_culled() {
        let mut lab = Lab::default();
        lab.transform.distance = -20.0;
        let frame = lab.frame(&viewport());
        let drawn_triangles: usize = frame
            .primitives
            .iter()
            .filter(|p| p.kind == PrimitiveKind::Triangles)
            .map(Primitive::len)
            .sum();
        assert_eq!(drawn_triangles, 0);
    }

    #[test]
    fn test_arcball_spins_model() {
        let mut lab = Lab::default();
        let before = lab.model_matrix();
        lab.tick(Some(ArcballEvent::Press(Vector3::z())), 1.0 / 30.0);
        lab.tick(Some(ArcballEvent::Drag(Vector3::new(0.6, 0.0, 0.8))), 1.0 / 30.0);
        assert!((lab.model_matrix() - before).norm() > 1e-3);
    }

    #[test]
    fn test_lit_face_is_brighter() {
        let lab = Lab::default();
        let frame = lab.frame(&viewport());
        let intensity = |face| {
            frame
                .faces
                .iter()
                .find(|f| f.face == face)
                .map(|f| f.intensity)
                .unwrap_or_default()
        };
        // Light at (2, 4, 1.5): the top face outshines the bottom one.
        assert!(intensity(2) > intensity(3));
        assert!(intensity(3) >= lab.phong.ka * lab.phong.la - 1e-6);
    }

    #[test]
    fn test_trace_of_target() {
        let lab = Lab::default();
        let frame = lab.frame(&Viewport::new(800, 600));
        let trace = frame.trace(&Point3::origin());
        assert!(trace.valid_w && trace.inside_clip);
        assert_abs_diff_eq!(trace.screen.unwrap(), Point2::new(400.0, 300.0), epsilon = 1e-2);
    }
}
