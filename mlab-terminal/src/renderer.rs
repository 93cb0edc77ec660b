/// Character-cell canvas for the lab's draw lists
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use mlab_core::primitive::{Color, ColoredVertex, Primitive, PrimitiveKind};
use nalgebra::Point2;
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

const POINT_GLYPH: char = 'o';

/// Rasterizes primitives into a grid of colored characters.
///
/// Later primitives overwrite earlier ones; there is no depth buffer, so
/// callers submit them back to front.
pub struct Canvas {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::WHITE; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::WHITE);
    }

    /// Character and color at a cell, if it lies on the canvas
    pub fn cell(&self, x: usize, y: usize) -> Option<(char, Color)> {
        (x < self.width && y < self.height).then(|| {
            let idx = y * self.width + x;
            (self.char_buffer[idx], self.color_buffer[idx])
        })
    }

    pub fn draw_primitive(&mut self, primitive: &Primitive) {
        for element in primitive.elements() {
            match primitive.kind {
                PrimitiveKind::Points => self.plot_point(&element[0]),
                PrimitiveKind::Lines => self.draw_line(&element[0], &element[1]),
                PrimitiveKind::Triangles => self.fill_triangle(&element[0], &element[1], &element[2]),
            }
        }
    }

    fn plot(&mut self, x: i32, y: i32, character: char, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    fn plot_point(&mut self, vertex: &ColoredVertex) {
        let p = vertex.position;
        self.plot(p.x.floor() as i32, p.y.floor() as i32, POINT_GLYPH, vertex.color);
    }

    /// Bresenham line between the cells holding the two vertices
    fn draw_line(&mut self, from: &ColoredVertex, to: &ColoredVertex) {
        let (mut x0, mut y0) = (from.position.x.floor() as i32, from.position.y.floor() as i32);
        let (x1, y1) = (to.position.x.floor() as i32, to.position.y.floor() as i32);
        let glyph = line_glyph(to.position - from.position);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, glyph, from.color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn fill_triangle(&mut self, v0: &ColoredVertex, v1: &ColoredVertex, v2: &ColoredVertex) {
        let (p0, p1, p2) = (v0.position, v1.position, v2.position);

        // Bounding box
        let min_x = p0.x.min(p1.x).min(p2.x).floor() as i32;
        let max_x = p0.x.max(p1.x).max(p2.x).ceil() as i32;
        let min_y = p0.y.min(p1.y).min(p2.y).floor() as i32;
        let max_y = p0.y.max(p1.y).max(p2.y).ceil() as i32;

        // Clip to canvas bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        let color = v0.color;
        let character = shade_glyph(color);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                if let Some((w0, w1, w2)) = barycentric(&p0, &p1, &p2, &p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.plot(x, y, character, color);
                    }
                }
            }
        }
    }

    /// Queue the canvas with its top row at terminal row `top`.
    pub fn draw<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, top + y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(TermColor::Rgb {
                        r: color.r,
                        g: color.g,
                        b: color.b,
                    }))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Ramp character matching a fill color's brightness
fn shade_glyph(color: Color) -> char {
    let index = (color.luminance() * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Character following a line's direction in screen space (y down)
fn line_glyph(direction: nalgebra::Vector2<f32>) -> char {
    let (dx, dy) = (direction.x.abs(), direction.y.abs());
    if dy < dx * 0.4 {
        '-'
    } else if dx < dy * 0.4 {
        '|'
    } else if (direction.x > 0.0) == (direction.y > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: &Point2<f32>,
    v1: &Point2<f32>,
    v2: &Point2<f32>,
    p: &Point2<f32>,
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
