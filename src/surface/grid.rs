use crate::{
    foundation::core::{Rect, Viewport},
    foundation::error::{QuadmapError, QuadmapResult},
};

/// Uniform cell layout over the viewport, used to tile sources into a grid of surfaces.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    /// Gap between neighbouring cells in viewport units.
    pub gutter: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 3,
            gutter: 6.0,
        }
    }
}

impl GridLayout {
    pub fn new(rows: u32, cols: u32, gutter: f64) -> QuadmapResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(QuadmapError::validation("grid rows and cols must be > 0"));
        }
        if !gutter.is_finite() || gutter < 0.0 {
            return Err(QuadmapError::validation(
                "grid gutter must be finite and >= 0",
            ));
        }
        Ok(Self { rows, cols, gutter })
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Row-major cell rectangle, or `None` when `index` is outside the grid.
    pub fn cell_rect(&self, index: usize, viewport: Viewport) -> Option<Rect> {
        if index >= self.cell_count() {
            return None;
        }
        let cols = f64::from(self.cols);
        let rows = f64::from(self.rows);
        let cell_w = ((f64::from(viewport.width) - (cols - 1.0) * self.gutter) / cols).max(0.0);
        let cell_h = ((f64::from(viewport.height) - (rows - 1.0) * self.gutter) / rows).max(0.0);

        let r = (index / self.cols as usize) as f64;
        let c = (index % self.cols as usize) as f64;
        let x = c * (cell_w + self.gutter);
        let y = r * (cell_h + self.gutter);
        Some(Rect::new(x, y, x + cell_w, y + cell_h))
    }
}
