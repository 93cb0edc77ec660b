//! Change of basis and coordinate decomposition.
//!
//! Coordinates are solved with Cramer's rule written in terms of scalar
//! triple products, so no matrix inverse is ever formed.
use nalgebra::Vector3;
use tracing::debug;

/// Below this absolute triple product the basis is treated as coplanar.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Half extent of the box every displayed vector is scaled to fit.
const DISPLAY_HALF_BOX: f32 = 0.5;

/// Largest absolute component of `v`.
pub fn max_abs_component(v: &Vector3<f32>) -> f32 {
    v.x.abs().max(v.y.abs()).max(v.z.abs())
}

/// Solve `w = c1*e1 + c2*e2 + c3*e3` for `c`.
///
/// Returns the zero vector when `|e1 . (e2 x e3)| < 1e-6`.
pub fn coords_in_basis(
    e1: &Vector3<f32>,
    e2: &Vector3<f32>,
    e3: &Vector3<f32>,
    w: &Vector3<f32>,
) -> Vector3<f32> {
    let e2xe3 = e2.cross(e3);
    let e3xe1 = e3.cross(e1);
    let e1xe2 = e1.cross(e2);

    let det = e1.dot(&e2xe3);
    if det.abs() < DEGENERATE_EPSILON {
        debug!(det, "degenerate basis, returning zero coordinates");
        return Vector3::zeros();
    }

    Vector3::new(
        w.dot(&e2xe3) / det,
        w.dot(&e3xe1) / det,
        w.dot(&e1xe2) / det,
    )
}

/// Rebuild the vector whose coordinates in `(e1, e2, e3)` are `c`.
pub fn from_coords(
    e1: &Vector3<f32>,
    e2: &Vector3<f32>,
    e3: &Vector3<f32>,
    c: &Vector3<f32>,
) -> Vector3<f32> {
    e1 * c.x + e2 * c.y + e3 * c.z
}

/// Uniform scale that fits every vector inside the display box.
///
/// Returns `1.0` when all vectors are zero.
pub fn scene_scale<'a>(vectors: impl IntoIterator<Item = &'a Vector3<f32>>) -> f32 {
    let max = vectors
        .into_iter()
        .map(max_abs_component)
        .fold(0.0_f32, f32::max);

    if max > 0.0 {
        DISPLAY_HALF_BOX / max
    } else {
        1.0
    }
}

/// An ordered triple of basis vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub e1: Vector3<f32>,
    pub e2: Vector3<f32>,
    pub e3: Vector3<f32>,
}

impl Basis {
    pub fn new(e1: Vector3<f32>, e2: Vector3<f32>, e3: Vector3<f32>) -> Self {
        Self { e1, e2, e3 }
    }

    /// The standard basis of R3
    pub fn standard() -> Self {
        Self::new(Vector3::x(), Vector3::y(), Vector3::z())
    }

    /// Signed volume of the parallelepiped spanned by the basis.
    pub fn triple_product(&self) -> f32 {
        self.e1.dot(&self.e2.cross(&self.e3))
    }

    pub fn is_degenerate(&self) -> bool {
        self.triple_product().abs() < DEGENERATE_EPSILON
    }

    /// Coordinates of `w` in this basis.
    pub fn coords_of(&self, w: &Vector3<f32>) -> Vector3<f32> {
        coords_in_basis(&self.e1, &self.e2, &self.e3, w)
    }

    /// The vector with coordinates `c` in this basis.
    pub fn point_at(&self, c: &Vector3<f32>) -> Vector3<f32> {
        from_coords(&self.e1, &self.e2, &self.e3, c)
    }

    pub fn vectors(&self) -> [Vector3<f32>; 3] {
        [self.e1, self.e2, self.e3]
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_book_example() {
        let v = Basis::standard();
        let a = Vector3::new(1.0, 2.0, 3.0);
        let w = v.point_at(&a);
        assert_abs_diff_eq!(w, Vector3::new(1.0, 2.0, 3.0), epsilon = 1e-6);

        let u = Basis::new(v.e1, v.e1 + v.e2, v.e1 + v.e2 + v.e3);
        let b = u.coords_of(&w);
        assert_abs_diff_eq!(b, Vector3::new(-1.0, -1.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_basis_returns_zero() {
        let e1 = Vector3::new(1.0, 0.0, 0.0);
        let e2 = Vector3::new(0.0, 1.0, 0.0);
        let e3 = Vector3::new(1.0, 1.0, 0.0); // coplanar with e1, e2
        let w = Vector3::new(3.0, -2.0, 7.0);

        assert_eq!(coords_in_basis(&e1, &e2, &e3, &w), Vector3::zeros());
        assert!(Basis::new(e1, e2, e3).is_degenerate());
    }

    #[test]
    fn test_max_abs_component() {
        assert_eq!(max_abs_component(&Vector3::new(-4.0, 2.0, 3.5)), 4.0);
        assert_eq!(max_abs_component(&Vector3::zeros()), 0.0);
    }

    #[test]
    fn test_scene_scale() {
        let vectors = [Vector3::new(1.0, 1.0, 1.0), Vector3::new(0.0, -2.0, 0.0)];
        assert!((scene_scale(&vectors) - 0.25).abs() < 1e-6);

        let zeros = [Vector3::zeros()];
        assert_eq!(scene_scale(&zeros), 1.0);
    }

    fn component() -> impl Strategy<Value = f32> {
        -2.0_f32..2.0
    }

    fn vector() -> impl Strategy<Value = Vector3<f32>> {
        (component(), component(), component()).prop_map(|(x, y, z)| Vector3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn prop_round_trip(e1 in vector(), e2 in vector(), e3 in vector(), c in vector()) {
            let basis = Basis::new(e1, e2, e3);
            // Well-conditioned bases only: no short vectors, no near-coplanar triples.
            prop_assume!(e1.norm() >= 1.0 && e2.norm() >= 1.0 && e3.norm() >= 1.0);
            let scale = e1.norm() * e2.norm() * e3.norm();
            prop_assume!(basis.triple_product().abs() > 0.3 * scale);

            let w = basis.point_at(&c);
            let back = basis.coords_of(&w);
            let error = (back - c).norm() / (1.0 + c.norm());
            prop_assert!(error < 2e-5, "{back:?} != {c:?} (relative error {error})");
        }
    }
}
