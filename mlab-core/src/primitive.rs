//! Backend-independent draw primitives emitted once per frame
use nalgebra::{Point2, Vector3};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GREY: Color = Color::rgb(110, 110, 110);
    pub const SHADOW: Color = Color::rgb(40, 40, 48);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert linear [0, 1] channels, clamping out-of-range values.
    pub fn from_unit(rgb: &Vector3<f32>) -> Self {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(channel(rgb.x), channel(rgb.y), channel(rgb.z))
    }

    /// Each channel multiplied by `factor`, saturating at 255.
    pub fn scaled(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor.max(0.0)).round().min(255.0) as u8;
        Self::rgb(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Relative luminance in [0, 1]
    pub fn luminance(&self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }
}

/// How a primitive's vertex list is grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// One point per vertex
    Points,
    /// Consecutive vertex pairs
    Lines,
    /// Consecutive vertex triples
    Triangles,
}

impl PrimitiveKind {
    /// Vertices consumed by one element
    pub fn arity(self) -> usize {
        match self {
            PrimitiveKind::Points => 1,
            PrimitiveKind::Lines => 2,
            PrimitiveKind::Triangles => 3,
        }
    }
}

/// Screen-space vertex with its color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredVertex {
    pub position: Point2<f32>,
    pub color: Color,
}

/// A batch of points, lines or triangles in screen space
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub vertices: Vec<ColoredVertex>,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
        }
    }

    pub fn push(&mut self, position: Point2<f32>, color: Color) {
        self.vertices.push(ColoredVertex { position, color });
    }

    /// Append a whole element; its length must match the kind's arity.
    pub fn push_element(&mut self, positions: &[Point2<f32>], color: Color) {
        debug_assert_eq!(positions.len(), self.kind.arity());
        for &position in positions {
            self.push(position, color);
        }
    }

    /// Complete elements in this batch
    pub fn len(&self) -> usize {
        self.vertices.len() / self.kind.arity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vertex groups of one element each
    pub fn elements(&self) -> std::slice::ChunksExact<'_, ColoredVertex> {
        self.vertices.chunks_exact(self.kind.arity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elements_group_by_arity() {
        let mut lines = Primitive::new(PrimitiveKind::Lines);
        lines.push_element(&[Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)], Color::RED);
        lines.push_element(&[Point2::new(2.0, 0.0), Point2::new(3.0, 1.0)], Color::GREEN);
        assert_eq!(lines.len(), 2);
        let colors: Vec<Color> = lines.elements().map(|e| e[0].color).collect();
        assert_eq!(colors, vec![Color::RED, Color::GREEN]);
    }

    #[test]
    fn test_color_conversions() {
        assert_eq!(Color::from_unit(&Vector3::new(1.5, 0.5, -1.0)), Color::rgb(255, 128, 0));
        assert_eq!(Color::rgb(100, 200, 250).scaled(2.0), Color::rgb(200, 255, 255));
        assert!((Color::WHITE.luminance() - 1.0).abs() < 1e-6);
        assert_eq!(Color::rgb(0, 0, 0).luminance(), 0.0);
    }

    #[test]
    fn test_empty_primitive() {
        let points = Primitive::new(PrimitiveKind::Points);
        assert!(points.is_empty());
        assert_eq!(points.elements().count(), 0);
    }
}
