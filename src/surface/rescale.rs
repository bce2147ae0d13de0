use crate::surface::model::Surface;

/// Scale every surface point by `new / old` per axis.
///
/// Returns `false` (and leaves `surfaces` untouched) when the dimensions are unchanged, when
/// either old dimension is zero (uninitialized viewport), or when any input is non-positive or
/// non-finite.
pub fn rescale_surfaces(
    surfaces: &mut [Surface],
    old_w: f64,
    old_h: f64,
    new_w: f64,
    new_h: f64,
) -> bool {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !(valid(old_w) && valid(old_h) && valid(new_w) && valid(new_h)) {
        return false;
    }
    if old_w == new_w && old_h == new_h {
        return false;
    }

    let sx = new_w / old_w;
    let sy = new_h / old_h;
    for surface in surfaces.iter_mut() {
        for p in &mut surface.points {
            p.x *= sx;
            p.y *= sy;
        }
    }
    tracing::debug!(
        old_w,
        old_h,
        new_w,
        new_h,
        count = surfaces.len(),
        "rescaled surfaces"
    );
    true
}

#[cfg(test)]
#[path = "../../tests/unit/surface/rescale.rs"]
mod tests;
