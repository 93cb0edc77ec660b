//! Arcball (virtual trackball) rotation with release momentum.
//!
//! Mouse positions are lifted onto the unit hemisphere facing the viewer.
//! Each drag step rotates along the great-circle arc between the previous
//! and the current point, and the new rotation is applied on the left of
//! the accumulated one so it acts in world space. Releasing the button
//! keeps the object spinning about the last drag axis at the release
//! speed, decaying geometrically every idle frame.
use nalgebra::{Matrix4, Vector3};
use tracing::{debug, trace};

use crate::transform::Transform;

/// Cross products shorter than this mean the drag points are parallel.
pub const PARALLEL_EPSILON: f32 = 1e-4;

/// Per-frame multiplier applied to the coasting angular speed.
pub const MOMENTUM_DECAY: f32 = 0.9975;

/// Map a pixel position to a point on the arcball.
///
/// `(x, y)` are in screen space with the origin at the top left. Points
/// outside the ball are pulled onto its rim (`z = 0`).
pub fn map_mouse_to_arcball(x: f32, y: f32, width: f32, height: f32) -> Vector3<f32> {
    let nx = 2.0 * x / width - 1.0;
    let ny = -(2.0 * y / height - 1.0);

    let len2 = nx * nx + ny * ny;
    if len2 > 1.0 {
        let len = len2.sqrt();
        Vector3::new(nx / len, ny / len, 0.0)
    } else {
        Vector3::new(nx, ny, (1.0 - len2).sqrt())
    }
}

/// Pointer input fed to [`Arcball::update`], already mapped onto the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArcballEvent {
    Press(Vector3<f32>),
    Drag(Vector3<f32>),
    Release,
}

/// Accumulated arcball rotation and its momentum
#[derive(Debug, Clone, PartialEq)]
pub struct Arcball {
    rotation: Matrix4<f32>,
    last_point: Vector3<f32>,
    last_axis: Vector3<f32>,
    last_angle: f32,
    angular_speed: f32,
    dragging: bool,
}

impl Arcball {
    pub fn new() -> Self {
        Self {
            rotation: Matrix4::identity(),
            last_point: Vector3::z(),
            last_axis: Vector3::zeros(),
            last_angle: 0.0,
            angular_speed: 0.0,
            dragging: false,
        }
    }

    /// The accumulated rotation
    pub fn rotation(&self) -> &Matrix4<f32> {
        &self.rotation
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Coasting speed in radians per second
    pub fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    pub fn last_axis(&self) -> &Vector3<f32> {
        &self.last_axis
    }

    pub fn last_angle(&self) -> f32 {
        self.last_angle
    }

    /// Start a drag at `point`; stops any coasting.
    pub fn begin_drag(&mut self, point: Vector3<f32>) {
        self.dragging = true;
        self.last_point = point;
        self.last_angle = 0.0;
        self.angular_speed = 0.0;
    }

    /// Rotate along the arc from the previous drag point to `point`.
    ///
    /// Returns `false` and leaves the state untouched when the two points
    /// are (nearly) parallel.
    pub fn drag(&mut self, point: Vector3<f32>) -> bool {
        if !self.dragging {
            return false;
        }

        let cross = self.last_point.cross(&point);
        let cross_len = cross.norm();
        if cross_len <= PARALLEL_EPSILON {
            return false;
        }

        let axis = cross / cross_len;
        let angle = self.last_point.dot(&point).clamp(-1.0, 1.0).acos();

        self.rotation = Transform::rotate(angle, &axis) * self.rotation;
        self.last_axis = axis;
        self.last_angle = angle;
        self.last_point = point;
        trace!(angle, ?axis, "arcball drag");
        true
    }

    /// End the drag; the last step's angle over `dt` becomes the coasting speed.
    ///
    /// A release without a drag in progress is ignored.
    pub fn release(&mut self, dt: f32) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.angular_speed = if dt > 0.0 { self.last_angle / dt } else { 0.0 };
        debug!(speed = self.angular_speed, "arcball released");
    }

    /// Advance the momentum by one idle frame.
    ///
    /// The speed decays by [`MOMENTUM_DECAY`] per frame and never snaps to
    /// zero on its own.
    pub fn coast(&mut self, dt: f32) {
        if self.dragging || self.angular_speed == 0.0 || self.last_axis == Vector3::zeros() {
            return;
        }

        self.rotation = Transform::rotate(self.angular_speed * dt, &self.last_axis) * self.rotation;
        self.angular_speed *= MOMENTUM_DECAY;
    }

    /// One frame: integrate `event` (if any), then coast when not dragging.
    pub fn update(&mut self, event: Option<ArcballEvent>, dt: f32) {
        match event {
            Some(ArcballEvent::Press(point)) => self.begin_drag(point),
            Some(ArcballEvent::Drag(point)) => {
                self.drag(point);
            }
            Some(ArcballEvent::Release) => self.release(dt),
            None => {}
        }
        self.coast(dt);
    }

    /// Drop the accumulated rotation and any momentum.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Arcball {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::is_proper_rotation;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_center_maps_to_pole() {
        let p = map_mouse_to_arcball(400.0, 300.0, 800.0, 600.0);
        assert_abs_diff_eq!(p, Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_y_axis_points_up() {
        // Top of the screen is +Y on the ball.
        let p = map_mouse_to_arcball(400.0, 0.0, 800.0, 600.0);
        assert_abs_diff_eq!(p, Vector3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_outside_is_clamped_to_rim() {
        let p = map_mouse_to_arcball(800.0, 0.0, 800.0, 600.0);
        assert!((p.norm() - 1.0).abs() < 1e-6);
        assert_eq!(p.z, 0.0);
        assert!((p.x - p.y).abs() < 1e-6);
    }

    #[test]
    fn test_inside_is_on_sphere() {
        let p = map_mouse_to_arcball(500.0, 200.0, 800.0, 600.0);
        assert!((p.norm() - 1.0).abs() < 1e-6);
        assert!(p.z > 0.0);
    }

    #[test]
    fn test_drag_composes_rotation() {
        let mut ball = Arcball::new();
        ball.begin_drag(Vector3::z());
        assert!(ball.drag(Vector3::x()));

        // Dragging from +Z to +X is a quarter turn about +Y.
        assert_abs_diff_eq!(*ball.last_axis(), Vector3::y(), epsilon = 1e-6);
        assert!((ball.last_angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        let moved = ball.rotation().transform_vector(&Vector3::z());
        assert_abs_diff_eq!(moved, Vector3::x(), epsilon = 1e-6);
        assert!(is_proper_rotation(ball.rotation(), 1e-5));
    }

    #[test]
    fn test_parallel_drag_is_skipped() {
        let mut ball = Arcball::new();
        ball.begin_drag(Vector3::z());
        let nearly_same = Vector3::new(1e-5, 0.0, 1.0).normalize();
        assert!(!ball.drag(nearly_same));
        assert_eq!(*ball.rotation(), Matrix4::identity());
    }

    #[test]
    fn test_drag_requires_press() {
        let mut ball = Arcball::new();
        assert!(!ball.drag(Vector3::x()));
        assert_eq!(*ball.rotation(), Matrix4::identity());
    }

    #[test]
    fn test_release_sets_speed_and_decays() {
        let mut ball = Arcball::new();
        ball.begin_drag(Vector3::z());
        ball.drag(Vector3::new(0.1, 0.0, 1.0).normalize());
        let angle = ball.last_angle();
        ball.release(0.02);
        assert!((ball.angular_speed() - angle / 0.02).abs() < 1e-4);

        let before = *ball.rotation();
        let speed = ball.angular_speed();
        ball.coast(0.02);
        assert_ne!(*ball.rotation(), before);
        assert!((ball.angular_speed() - speed * MOMENTUM_DECAY).abs() < 1e-6);
    }

    #[test]
    fn test_no_momentum_while_dragging() {
        let mut ball = Arcball::new();
        ball.update(Some(ArcballEvent::Press(Vector3::z())), 0.016);
        ball.update(Some(ArcballEvent::Drag(Vector3::new(0.2, 0.0, 1.0).normalize())), 0.016);
        let after_drag = *ball.rotation();
        ball.update(None, 0.016);
        assert_eq!(*ball.rotation(), after_drag);

        ball.update(Some(ArcballEvent::Release), 0.016);
        assert!(!ball.is_dragging());
        assert_ne!(*ball.rotation(), after_drag);
    }

    #[test]
    fn test_momentum_stays_a_rotation() {
        let mut ball = Arcball::new();
        ball.begin_drag(Vector3::z());
        ball.drag(Vector3::new(0.3, 0.2, 1.0).normalize());
        ball.release(0.01);
        for _ in 0..500 {
            ball.coast(0.016);
        }
        assert!(is_proper_rotation(ball.rotation(), 1e-3));
        assert!(ball.angular_speed() > 0.0);
    }

    #[test]
    fn test_second_release_keeps_decayed_speed() {
        let mut ball = Arcball::new();
        ball.update(Some(ArcballEvent::Press(Vector3::z())), 0.02);
        ball.update(Some(ArcballEvent::Drag(Vector3::new(0.3, 0.0, 1.0).normalize())), 0.02);
        ball.update(Some(ArcballEvent::Release), 0.02);
        let initial = ball.angular_speed();
        for _ in 0..1000 {
            ball.update(None, 0.02);
        }
        let decayed = ball.angular_speed();
        assert!(decayed < initial);

        ball.update(Some(ArcballEvent::Release), 0.02);
        assert!(!ball.is_dragging());
        assert!((ball.angular_speed() - decayed * MOMENTUM_DECAY).abs() < 1e-6);
    }

    #[test]
    fn test_release_without_press_stays_still() {
        let mut ball = Arcball::new();
        ball.update(Some(ArcballEvent::Release), 0.02);
        assert_eq!(ball.angular_speed(), 0.0);
        assert_eq!(*ball.rotation(), Matrix4::identity());
    }

    #[test]
    fn test_zero_dt_release_does_not_spin() {
        let mut ball = Arcball::new();
        ball.begin_drag(Vector3::z());
        ball.drag(Vector3::x());
        ball.release(0.0);
        assert_eq!(ball.angular_speed(), 0.0);
    }
}
