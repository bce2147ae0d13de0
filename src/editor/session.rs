use crate::{
    foundation::config::EditorConfig,
    foundation::core::Viewport,
    project::model::Project,
    surface::model::{Corner, SurfaceId},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Presentation mode.
pub enum Mode {
    /// Grid, outlines, handles and labels are drawn; input edits the project.
    #[default]
    Edit,
    /// Only surface content is drawn; input is ignored except for leaving live mode.
    Live,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Pointer gesture state.
pub enum DragState {
    #[default]
    Idle,
    /// A corner is following the pointer. History is committed on release.
    DraggingCorner { surface: SurfaceId, corner: Corner },
}

/// Editor state shared by input handling and frame compilation.
#[derive(Clone, Debug)]
pub struct EditorSession {
    pub config: EditorConfig,
    mode: Mode,
    selection: Option<SurfaceId>,
    drag: DragState,
    viewport: Viewport,
    edit_viewport: Option<Viewport>,
}

impl EditorSession {
    pub fn new(config: EditorConfig, viewport: Viewport) -> Self {
        Self {
            config,
            mode: Mode::Edit,
            selection: None,
            drag: DragState::Idle,
            viewport,
            edit_viewport: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_live(&self) -> bool {
        self.mode == Mode::Live
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection(&self) -> Option<&SurfaceId> {
        self.selection.as_ref()
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn select(&mut self, id: Option<SurfaceId>) {
        self.selection = id;
    }

    pub(crate) fn set_drag(&mut self, drag: DragState) {
        self.drag = drag;
    }

    /// Drop a selection that no longer refers to a surface (after undo, delete or load).
    pub fn prune_selection(&mut self, project: &Project) {
        if let Some(id) = &self.selection
            && project.surface(id).is_none()
        {
            self.selection = None;
        }
        if let DragState::DraggingCorner { surface, .. } = &self.drag
            && project.surface(surface).is_none()
        {
            self.drag = DragState::Idle;
        }
    }

    /// Change the viewport, rescaling every surface proportionally.
    pub fn resize_viewport(&mut self, project: &mut Project, viewport: Viewport) {
        let old = self.viewport;
        project.rescale(
            f64::from(old.width),
            f64::from(old.height),
            f64::from(viewport.width),
            f64::from(viewport.height),
        );
        self.viewport = viewport;
    }

    /// Switch to live mode at `live_viewport`. The current viewport is remembered for
    /// [`EditorSession::exit_live`]. Any drag in progress is cancelled.
    pub fn enter_live(&mut self, project: &mut Project, live_viewport: Viewport) {
        if self.is_live() {
            self.resize_viewport(project, live_viewport);
            return;
        }
        self.cancel_drag(project);
        self.edit_viewport = Some(self.viewport);
        self.mode = Mode::Live;
        self.resize_viewport(project, live_viewport);
        tracing::info!(
            width = live_viewport.width,
            height = live_viewport.height,
            "entered live mode"
        );
    }

    /// Return to edit mode. Uses `viewport` when given, otherwise the viewport recorded when
    /// live mode was entered.
    pub fn exit_live(&mut self, project: &mut Project, viewport: Option<Viewport>) {
        if !self.is_live() {
            return;
        }
        self.mode = Mode::Edit;
        let target = viewport.or(self.edit_viewport.take()).unwrap_or(self.viewport);
        self.resize_viewport(project, target);
        tracing::info!(
            width = target.width,
            height = target.height,
            "exited live mode"
        );
    }

    /// Flip the mode, reporting the viewport in effect afterwards.
    pub fn toggle_live(&mut self, project: &mut Project, viewport: Viewport) -> Viewport {
        if self.is_live() {
            self.exit_live(project, Some(viewport));
        } else {
            self.enter_live(project, viewport);
        }
        self.viewport
    }

    /// Abandon an in-flight drag, committing whatever the corner already moved to.
    fn cancel_drag(&mut self, project: &mut Project) {
        if matches!(self.drag, DragState::DraggingCorner { .. }) {
            self.drag = DragState::Idle;
            project.commit();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
