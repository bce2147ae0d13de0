//! Quad geometry used by the renderer: outline path, affine content mapping and feather falloff.
//!
//! The content mapping is an affine approximation. It sends the source's top-left to point 0,
//! its horizontal extent along TL→TR and its vertical extent along TL→BL, so it is exact only
//! when the quad is a parallelogram. Point 2 (BR) only affects the clip.

use crate::{
    foundation::core::{Affine, BezPath, Point},
    surface::model::MAX_FEATHER,
};

/// Closed path through the four points in stored order.
pub fn quad_path(points: &[Point; 4]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for &p in &points[1..] {
        path.line_to(p);
    }
    path.close_path();
    path
}

/// Affine map from source pixel space (`src_w` x `src_h`) onto the quad.
pub fn content_affine(points: &[Point; 4], src_w: f64, src_h: f64) -> Affine {
    let w = if src_w > 0.0 { src_w } else { 1.0 };
    let h = if src_h > 0.0 { src_h } else { 1.0 };
    let tl = points[0];
    let x_axis = points[1] - tl;
    let y_axis = points[3] - tl;
    Affine::new([
        x_axis.x / w,
        x_axis.y / w,
        y_axis.x / h,
        y_axis.y / h,
        tl.x,
        tl.y,
    ])
}

/// Radial alpha falloff over a quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatherMask {
    /// Midpoint of the TL–BR diagonal.
    pub center: Point,
    /// Alpha is 1 within this radius.
    pub inner: f64,
    /// Alpha reaches 0 at this radius (half the TL–BR diagonal).
    pub outer: f64,
}

impl FeatherMask {
    /// Mask for `feather` in `[0, 50]`. `None` when there is nothing to soften.
    pub fn for_quad(points: &[Point; 4], feather: f64) -> Option<Self> {
        if !feather.is_finite() || feather <= 0.0 {
            return None;
        }
        let tl = points[0];
        let br = points[2];
        let outer = tl.distance(br) / 2.0;
        if !outer.is_finite() || outer <= 0.0 {
            return None;
        }
        let t = (feather / MAX_FEATHER).clamp(0.0, 1.0);
        Some(Self {
            center: tl.midpoint(br),
            inner: (1.0 - t) * outer,
            outer,
        })
    }

    /// Alpha multiplier in `[0, 1]` at `p`.
    pub fn alpha_at(&self, p: Point) -> f64 {
        let d = self.center.distance(p);
        if d <= self.inner {
            1.0
        } else if d >= self.outer {
            0.0
        } else {
            (self.outer - d) / (self.outer - self.inner)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/quad.rs"]
mod tests;
