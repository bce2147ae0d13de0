//! Pure polygon helpers used by hit-testing and the renderer.
//!
//! All functions accept any vertex sequence, including self-intersecting and zero-area ones,
//! and return a defined value without panicking.

use crate::foundation::core::Point;

/// Axis-aligned bounds of a point set.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Even-odd ray casting test.
///
/// Edges whose endpoints lie on the same side of the horizontal line through `point` are
/// skipped, which also rules out the zero-height edges that would otherwise divide by zero.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (vertices[i], vertices[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Bounds of `points`. An empty slice yields a zero box at the origin.
pub fn bounding_box(points: &[Point]) -> BoundingBox {
    let Some(first) = points.first() else {
        return BoundingBox {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
        };
    };

    points.iter().skip(1).fold(
        BoundingBox {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        },
        |bb, p| BoundingBox {
            min_x: bb.min_x.min(p.x),
            max_x: bb.max_x.max(p.x),
            min_y: bb.min_y.min(p.y),
            max_y: bb.max_y.max(p.y),
        },
    )
}

/// Euclidean distance.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (a - b).hypot()
}

/// Arithmetic mean of the vertices.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ORIGIN;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/polygon.rs"]
mod tests;
