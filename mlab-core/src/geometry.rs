//! Reference geometry: the cube, ground lattices and painter's ordering
use nalgebra::{Matrix4, Point3};

/// Quad as four vertex indices, wound around the face
pub type Face = [usize; 4];

/// Edge as a pair of vertex indices
pub type Edge = (usize, usize);

/// Largest lattice subdivision count; larger requests are clamped
pub const MAX_GRID_DIVISIONS: usize = 1000;

/// Triangle fan splitting a quad `[0, 1, 2, 3]` into two triangles
pub const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Axis-aligned cube centered on the origin
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMesh {
    pub vertices: [Point3<f32>; 8],
    pub faces: [Face; 6],
    pub edges: [Edge; 12],
}

impl CubeMesh {
    /// Cube spanning `[-half_size, half_size]` on every axis
    pub fn new(half_size: f32) -> Self {
        let h = half_size;
        let (z_near, z_far) = (-h, h);

        Self {
            vertices: [
                Point3::new(-h, h, z_near),
                Point3::new(h, h, z_near),
                Point3::new(h, -h, z_near),
                Point3::new(-h, -h, z_near),
                Point3::new(-h, h, z_far),
                Point3::new(h, h, z_far),
                Point3::new(h, -h, z_far),
                Point3::new(-h, -h, z_far),
            ],
            faces: [
                [0, 1, 2, 3], // near
                [4, 5, 6, 7], // far
                [0, 1, 5, 4], // top
                [3, 2, 6, 7], // bottom
                [1, 2, 6, 5], // right
                [0, 3, 7, 4], // left
            ],
            edges: [
                (0, 1),
                (1, 2),
                (2, 3),
                (3, 0),
                (4, 5),
                (5, 6),
                (6, 7),
                (7, 4),
                (0, 4),
                (1, 5),
                (2, 6),
                (3, 7),
            ],
        }
    }

    pub fn half_size(&self) -> f32 {
        self.vertices[1].x
    }

    pub fn face_vertices(&self, face: usize) -> [Point3<f32>; 4] {
        self.faces[face].map(|i| self.vertices[i])
    }

    /// Mean of a face's four vertices, in model space
    pub fn face_center(&self, face: usize) -> Point3<f32> {
        let [a, b, c, d] = self.face_vertices(face);
        Point3::from((a.coords + b.coords + c.coords + d.coords) * 0.25)
    }
}

impl Default for CubeMesh {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// A face with its average view-space depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceDepth {
    pub face: usize,
    pub avg_z: f32,
}

/// Sort back to front: ascending view Z, so the most negative (farthest
/// under a -Z forward camera) comes first. Equal depths keep their order.
pub fn sort_back_to_front(faces: &mut [FaceDepth]) {
    faces.sort_by(|a, b| a.avg_z.total_cmp(&b.avg_z));
}

/// Painter's order of the cube faces under `model_view`
pub fn painter_order(mesh: &CubeMesh, model_view: &Matrix4<f32>) -> Vec<FaceDepth> {
    let mut order: Vec<FaceDepth> = mesh
        .faces
        .iter()
        .enumerate()
        .map(|(face, quad)| {
            let z_sum: f32 = quad
                .iter()
                .map(|&i| model_view.transform_point(&mesh.vertices[i]).z)
                .sum();
            FaceDepth {
                face,
                avg_z: z_sum / quad.len() as f32,
            }
        })
        .collect();

    sort_back_to_front(&mut order);
    order
}

/// `(n + 1)^2` lattice over the quad `corners = [a, b, c, d]`, where `a`
/// sits at `(u, v) = (0, 0)`, `b` at `(1, 0)`, `c` at `(0, 1)` and `d` at `(1, 1)`.
///
/// Point `(i, j)` is stored at `i * (n + 1) + j`. `n` is clamped to
/// `1..=MAX_GRID_DIVISIONS`.
pub fn bilinear_grid(corners: &[Point3<f32>; 4], n: usize) -> Vec<Point3<f32>> {
    let n = n.clamp(1, MAX_GRID_DIVISIONS);
    let [a, b, c, d] = corners.map(|p| p.coords);
    let mut points = Vec::with_capacity((n + 1) * (n + 1));

    for i in 0..=n {
        for j in 0..=n {
            let u = i as f32 / n as f32;
            let v = j as f32 / n as f32;
            let p = a * ((1.0 - u) * (1.0 - v))
                + b * (u * (1.0 - v))
                + c * ((1.0 - u) * v)
                + d * (u * v);
            points.push(Point3::from(p));
        }
    }

    points
}

/// Index pairs joining every lattice point of [`bilinear_grid`] to its
/// `(i + 1, j)` and `(i, j + 1)` neighbours.
pub fn grid_segments(n: usize) -> Vec<Edge> {
    let n = n.clamp(1, MAX_GRID_DIVISIONS);
    let index = |i: usize, j: usize| i * (n + 1) + j;
    let mut segments = Vec::with_capacity(2 * n * (n + 1));

    for i in 0..=n {
        for j in 0..=n {
            if i < n {
                segments.push((index(i, j), index(i + 1, j)));
            }
            if j < n {
                segments.push((index(i, j), index(i, j + 1)));
            }
        }
    }

    segments
}

/// Triangular lattice `u*a + v*b + w*c` with `u + v + w = 1`, stepping by
/// `1 / n`. Each point is tagged with its `(i, j)` lattice index.
pub fn barycentric_grid(
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
    n: usize,
) -> Vec<((usize, usize), Point3<f32>)> {
    let n = n.clamp(1, MAX_GRID_DIVISIONS);
    let mut points = Vec::with_capacity((n + 1) * (n + 2) / 2);

    for i in 0..=n {
        for j in 0..=(n - i) {
            let k = n - i - j;
            let u = i as f32 / n as f32;
            let v = j as f32 / n as f32;
            let w = k as f32 / n as f32;
            points.push(((i, j), Point3::from(a.coords * u + b.coords * v + c.coords * w)));
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{LookAtMode, OrbitCamera};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cube_topology() {
        let cube = CubeMesh::new(0.5);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.faces.len(), 6);
        assert_eq!(cube.edges.len(), 12);
        assert_eq!(cube.half_size(), 0.5);
        for v in &cube.vertices {
            assert_eq!(v.coords.abs().max(), 0.5);
        }
        // Every edge joins vertices differing in exactly one coordinate.
        for &(a, b) in &cube.edges {
            let d = cube.vertices[a] - cube.vertices[b];
            assert_eq!(d.iter().filter(|c| **c != 0.0).count(), 1);
        }
    }

    #[test]
    fn test_face_center() {
        let cube = CubeMesh::new(1.0);
        assert_abs_diff_eq!(cube.face_center(0), Point3::new(0.0, 0.0, -1.0));
        assert_abs_diff_eq!(cube.face_center(2), Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_sort_is_ascending_and_stable() {
        let mut faces: Vec<FaceDepth> = [-1.0, -3.0, 2.0, -3.0, 0.5, -2.0]
            .iter()
            .enumerate()
            .map(|(face, &avg_z)| FaceDepth { face, avg_z })
            .collect();
        sort_back_to_front(&mut faces);

        let order: Vec<usize> = faces.iter().map(|f| f.face).collect();
        assert_eq!(order, vec![1, 3, 5, 0, 4, 2]);
        assert!(faces.windows(2).all(|w| w[0].avg_z <= w[1].avg_z));
    }

    #[test]
    fn test_painter_order_far_face_first() {
        let cube = CubeMesh::new(0.5);
        let view = OrbitCamera::new(5.0).view_matrix(LookAtMode::Library);
        let order = painter_order(&cube, &view);

        assert_eq!(order.len(), 6);
        // Camera on +Z: the z = -0.5 face is farthest, z = +0.5 nearest.
        assert_eq!(order.first().map(|f| f.face), Some(0));
        assert_eq!(order.last().map(|f| f.face), Some(1));
        assert!(order.windows(2).all(|w| w[0].avg_z <= w[1].avg_z));
    }

    #[test]
    fn test_bilinear_grid_corners() {
        let corners = [
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(-1.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(-1.0, 0.0, 1.0),
        ];
        let n = 4;
        let grid = bilinear_grid(&corners, n);
        assert_eq!(grid.len(), 25);
        assert_eq!(grid[0], corners[0]);
        assert_eq!(grid[n * (n + 1)], corners[1]);
        assert_eq!(grid[n], corners[2]);
        assert_eq!(grid[24], corners[3]);
        assert_abs_diff_eq!(grid[12], Point3::origin());
    }

    #[test]
    fn test_grid_segments() {
        let segments = grid_segments(2);
        assert_eq!(segments.len(), 12);
        assert!(segments.contains(&(0, 3)));
        assert!(segments.contains(&(0, 1)));
        assert!(!segments.contains(&(2, 3)));
    }

    #[test]
    fn test_barycentric_grid() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 1.0, 0.0);
        let c = Point3::new(0.0, 0.0, 1.0);
        let points = barycentric_grid(&a, &b, &c, 3);
        assert_eq!(points.len(), 10);
        for (_, p) in &points {
            // Every point stays on the plane x + y + z = 1.
            assert!((p.x + p.y + p.z - 1.0).abs() < 1e-6);
        }
        assert!(points.contains(&((3, 0), a)));
        assert!(points.contains(&((0, 0), c)));
    }

    #[test]
    fn test_zero_subdivisions_are_raised() {
        let o = Point3::origin();
        assert_eq!(barycentric_grid(&o, &o, &o, 0).len(), 3);
        assert_eq!(grid_segments(0).len(), 4);
    }

    #[test]
    fn test_huge_subdivisions_are_clamped() {
        let m = MAX_GRID_DIVISIONS;
        assert_eq!(grid_segments(usize::MAX).len(), 2 * m * (m + 1));
        let corners = [Point3::origin(); 4];
        assert_eq!(bilinear_grid(&corners, usize::MAX).len(), (m + 1) * (m + 1));
    }
}
