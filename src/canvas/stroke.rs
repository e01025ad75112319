//! Stroke rendering.
//!
//! Each pen-down frame contributes one segment from the previous fingertip
//! position to the current one.  Segments are rasterised by stamping filled
//! discs of the pen's radius at sub-pixel spacing along the segment, which
//! gives round caps and round joins, so consecutive short segments read as a
//! single continuous curve.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use super::surface::DrawingSurface;
use crate::config::CanvasConfig;
use crate::tracking::Landmark;

// ---------------------------------------------------------------------------
// Point / Segment
// ---------------------------------------------------------------------------

/// A position on the drawing surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One rendered piece of a stroke.  `from == to` for the first point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Map a normalized landmark onto the surface.
///
/// The camera image is shown mirrored, so x is flipped:
/// `x = (1 - nx) * width`, `y = ny * height`.
pub fn map_to_surface(landmark: &Landmark, width: u32, height: u32) -> Point {
    Point::new(
        (1.0 - landmark.x) * width as f32,
        landmark.y * height as f32,
    )
}

// ---------------------------------------------------------------------------
// Pen
// ---------------------------------------------------------------------------

/// Stroke width and colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub width: f32,
    pub color: Rgba<u8>,
}

impl Pen {
    pub fn from_config(config: &CanvasConfig) -> Self {
        let [r, g, b] = config.stroke_color;
        Self {
            width: config.line_width,
            color: Rgba([r, g, b, 255]),
        }
    }

    fn radius(&self) -> i32 {
        (self.width / 2.0).round().max(0.0) as i32
    }
}

// ---------------------------------------------------------------------------
// StrokeRenderer
// ---------------------------------------------------------------------------

/// Accumulates pen-down points into continuous strokes.
#[derive(Debug, Clone)]
pub struct StrokeRenderer {
    pen: Pen,
    last_point: Option<Point>,
}

impl StrokeRenderer {
    pub fn new(pen: Pen) -> Self {
        Self {
            pen,
            last_point: None,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(Pen::from_config(config))
    }

    /// Draw from the last buffered point to `point` (or a dot when the
    /// stroke is just starting) and buffer `point`.
    pub fn draw_to(&mut self, surface: &mut DrawingSurface, point: Point) -> Segment {
        let from = self.last_point.unwrap_or(point);
        self.stamp(surface.image_mut(), from, point);
        self.last_point = Some(point);
        Segment { from, to: point }
    }

    /// End the current stroke.  Returns `true` if a stroke was in progress.
    pub fn lift(&mut self) -> bool {
        self.last_point.take().is_some()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.last_point
    }

    fn stamp(&self, image: &mut RgbaImage, from: Point, to: Point) {
        let radius = self.pen.radius();

        // Walk only the part of the segment that can touch the image.
        let r = radius as f32;
        let lo = Point::new(-r, -r);
        let hi = Point::new(image.width() as f32 - 1.0 + r, image.height() as f32 - 1.0 + r);
        let Some((from, to)) = clip_segment(from, to, lo, hi) else {
            return;
        };

        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.hypot(dy).ceil().max(1.0) as u32;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let cx = (from.x + dx * t).round() as i32;
            let cy = (from.y + dy * t).round() as i32;
            draw_filled_circle_mut(image, (cx, cy), radius, self.pen.color);
        }
    }
}

/// Liang–Barsky clip of `from → to` against the rectangle `lo..=hi`.
///
/// `None` when the segment misses the rectangle or has a non-finite end.
fn clip_segment(from: Point, to: Point, lo: Point, hi: Point) -> Option<(Point, Point)> {
    if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
        return None;
    }

    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    for (p, q) in [
        (-dx, from.x - lo.x),
        (dx, hi.x - from.x),
        (-dy, from.y - lo.y),
        (dy, hi.y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    let start = if t0 > 0.0 {
        Point::new(from.x + dx * t0, from.y + dy * t0)
    } else {
        from
    };
    let end = if t1 < 1.0 {
        Point::new(from.x + dx * t1, from.y + dy * t1)
    } else {
        to
    };
    Some((start, end))
}
