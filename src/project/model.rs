use crate::{
    foundation::core::{Point, Vec2, Viewport},
    foundation::error::{QuadmapError, QuadmapResult},
    history::manager::History,
    media::registry::SourceRegistry,
    surface::grid::GridLayout,
    surface::model::{Corner, SourceId, Surface, SurfaceId, SurfaceProps},
    surface::rescale::rescale_surfaces,
};

/// The editable document: ordered surfaces (insertion order is paint order), the media sources
/// they reference and the undo history over the surface sequence.
///
/// Surfaces reference sources softly. Removing a source never touches surfaces; they render in
/// the missing-source state instead.
#[derive(Debug)]
pub struct Project {
    surfaces: Vec<Surface>,
    sources: SourceRegistry,
    history: History,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(crate::history::manager::DEFAULT_HISTORY_LIMIT)
    }
}

impl Project {
    /// Empty project with a baseline history snapshot.
    pub fn new(history_limit: usize) -> Self {
        Self::from_parts(Vec::new(), SourceRegistry::new(), history_limit)
    }

    /// Assemble a project and record `surfaces` as the history baseline.
    pub fn from_parts(surfaces: Vec<Surface>, sources: SourceRegistry, history_limit: usize) -> Self {
        let mut history = History::new(history_limit);
        history.reset(&surfaces);
        Self {
            surfaces,
            sources,
            history,
        }
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceRegistry {
        &mut self.sources
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn surface(&self, id: &SurfaceId) -> Option<&Surface> {
        self.surfaces.iter().find(|s| &s.id == id)
    }

    pub fn index_of(&self, id: &SurfaceId) -> Option<usize> {
        self.surfaces.iter().position(|s| &s.id == id)
    }

    /// Record the current surfaces as a history step.
    pub fn commit(&mut self) {
        self.history.commit(&self.surfaces);
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.surfaces)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.surfaces)
    }

    /// Add an axis-aligned surface bound to an existing source.
    pub fn add_surface(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        source: &SourceId,
    ) -> QuadmapResult<SurfaceId> {
        self.check_source_selectable(source)?;
        let surface = Surface::create(x, y, w, h, Some(source.clone()));
        let id = surface.id.clone();
        self.surfaces.push(surface);
        self.commit();
        tracing::debug!(surface = %id, source = %source, "added surface");
        Ok(id)
    }

    /// Add a `size` x `size` surface centered in `viewport`.
    pub fn add_surface_centered(
        &mut self,
        viewport: Viewport,
        size: f64,
        source: &SourceId,
    ) -> QuadmapResult<SurfaceId> {
        let c = viewport.center();
        self.add_surface(c.x - size / 2.0, c.y - size / 2.0, size, size, source)
    }

    /// Create one surface per grid cell, bound to `source` (or unbound when `None`).
    /// All-or-nothing: any cell outside the grid aborts without adding anything. One history
    /// step is recorded.
    pub fn assign_to_cells(
        &mut self,
        grid: &GridLayout,
        viewport: Viewport,
        source: Option<&SourceId>,
        cells: &[usize],
    ) -> QuadmapResult<Vec<SurfaceId>> {
        if let Some(src) = source {
            self.check_source_selectable(src)?;
        }
        let rects = cells
            .iter()
            .map(|&cell| {
                grid.cell_rect(cell, viewport).ok_or_else(|| {
                    QuadmapError::selection(format!(
                        "grid cell {cell} is outside the {}x{} grid",
                        grid.rows, grid.cols
                    ))
                })
            })
            .collect::<QuadmapResult<Vec<_>>>()?;

        let mut ids = Vec::with_capacity(rects.len());
        for r in rects {
            let surface = Surface::create(r.x0, r.y0, r.width(), r.height(), source.cloned());
            ids.push(surface.id.clone());
            self.surfaces.push(surface);
        }
        if !ids.is_empty() {
            self.commit();
        }
        Ok(ids)
    }

    /// Delete a surface and record the step. Returns `false` if the id is unknown.
    pub fn remove_surface(&mut self, id: &SurfaceId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.surfaces.remove(idx);
        self.commit();
        tracing::debug!(surface = %id, "removed surface");
        true
    }

    /// Apply a clamped property patch and record the step.
    pub fn set_surface_props(&mut self, id: &SurfaceId, props: SurfaceProps) -> QuadmapResult<()> {
        self.surface_mut(id)?.apply_props(props);
        self.commit();
        Ok(())
    }

    /// Point a surface at another source (or none) and record the step.
    pub fn rebind_source(
        &mut self,
        id: &SurfaceId,
        source: Option<SourceId>,
    ) -> QuadmapResult<()> {
        if let Some(src) = &source {
            self.check_source_selectable(src)?;
        }
        self.surface_mut(id)?.source_id = source;
        self.commit();
        Ok(())
    }

    /// Drop a source. Surfaces that referenced it keep the id and render as missing.
    pub fn remove_source(&mut self, id: &SourceId) -> bool {
        self.sources.remove(id).is_some()
    }

    /// Remove every surface and source, recording the empty state.
    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.sources.clear();
        self.commit();
    }

    /// Move one corner without recording history (used while dragging).
    pub(crate) fn move_corner(&mut self, id: &SurfaceId, corner: Corner, p: Point) -> bool {
        match self.surfaces.iter_mut().find(|s| &s.id == id) {
            Some(s) => {
                s.set_point(corner, p);
                true
            }
            None => false,
        }
    }

    /// Translate a surface and record the step.
    pub fn nudge_surface(&mut self, id: &SurfaceId, delta: Vec2) -> bool {
        match self.surfaces.iter_mut().find(|s| &s.id == id) {
            Some(s) => {
                s.translate(delta);
                self.commit();
                true
            }
            None => false,
        }
    }

    /// Rescale live surfaces and every history snapshot so undo stays in viewport proportion.
    pub fn rescale(&mut self, old_w: f64, old_h: f64, new_w: f64, new_h: f64) -> bool {
        if !rescale_surfaces(&mut self.surfaces, old_w, old_h, new_w, new_h) {
            return false;
        }
        self.history.rescale(old_w, old_h, new_w, new_h);
        true
    }

    /// Swap in a fully validated surface set and source registry, resetting history.
    pub(crate) fn replace_contents(&mut self, surfaces: Vec<Surface>, sources: SourceRegistry) {
        self.surfaces = surfaces;
        self.sources = sources;
        self.history.reset(&self.surfaces);
    }

    fn surface_mut(&mut self, id: &SurfaceId) -> QuadmapResult<&mut Surface> {
        self.surfaces
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| QuadmapError::selection(format!("unknown surface '{id}'")))
    }

    fn check_source_selectable(&self, source: &SourceId) -> QuadmapResult<()> {
        if self.sources.is_empty() {
            return Err(QuadmapError::selection(
                "no media sources available; import one first",
            ));
        }
        if !self.sources.contains(source) {
            return Err(QuadmapError::selection(format!(
                "unknown source '{source}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
