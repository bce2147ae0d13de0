//! Pointer and keyboard handling for the editor.
//!
//! Corner hits are scanned in insertion order and the first match wins. Body hits are scanned
//! from the topmost (last inserted) surface down.

use crate::{
    editor::session::{DragState, EditorSession},
    foundation::core::{Point, Vec2},
    foundation::math::snap_to_pitch,
    project::model::Project,
    surface::model::{Corner, SurfaceId},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Delete,
    Backspace,
    Escape,
    Char(char),
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Input in viewport coordinates. Mouse and touch are unified by the caller.
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    DoubleActivate(Point),
    Key { key: Key, modifiers: Modifiers },
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// What an event did.
pub enum EditorResponse {
    Ignored,
    DragStarted { surface: SurfaceId, corner: Corner },
    CornerMoved,
    DragCommitted,
    Selected(SurfaceId),
    Deselected,
    Deleted(SurfaceId),
    Nudged,
    Undone,
    Redone,
    ExitedLive,
}

/// First surface (insertion order) with a corner within `radius` of `p`.
pub fn find_corner_hit(
    project: &Project,
    p: Point,
    radius: f64,
) -> Option<(SurfaceId, Corner)> {
    project
        .surfaces()
        .iter()
        .find_map(|s| s.hit_test_corner(p, radius).map(|c| (s.id.clone(), c)))
}

/// Topmost surface whose body contains `p`.
pub fn find_body_hit(project: &Project, p: Point) -> Option<SurfaceId> {
    project
        .surfaces()
        .iter()
        .rev()
        .find(|s| s.hit_test_body(p))
        .map(|s| s.id.clone())
}

/// Apply one input event.
///
/// Every committed edit records exactly one history step: a drag on release, a nudge or a
/// deletion immediately.
#[tracing::instrument(skip(session, project), level = "trace")]
pub fn handle_event(
    session: &mut EditorSession,
    project: &mut Project,
    event: InputEvent,
) -> EditorResponse {
    if session.is_live() {
        return match event {
            InputEvent::Key {
                key: Key::Escape, ..
            } => {
                session.exit_live(project, None);
                EditorResponse::ExitedLive
            }
            _ => EditorResponse::Ignored,
        };
    }

    match event {
        InputEvent::PointerDown(p) => pointer_down(session, project, p),
        InputEvent::PointerMove(p) => pointer_move(session, project, p),
        InputEvent::PointerUp(_) => pointer_up(session, project),
        InputEvent::DoubleActivate(p) => double_activate(session, project, p),
        InputEvent::Key { key, modifiers } => key_down(session, project, key, modifiers),
    }
}

fn pointer_down(session: &mut EditorSession, project: &Project, p: Point) -> EditorResponse {
    if let Some((surface, corner)) = find_corner_hit(project, p, session.config.hit_radius) {
        session.select(Some(surface.clone()));
        session.set_drag(DragState::DraggingCorner {
            surface: surface.clone(),
            corner,
        });
        return EditorResponse::DragStarted { surface, corner };
    }
    match find_body_hit(project, p) {
        Some(id) => {
            session.select(Some(id.clone()));
            EditorResponse::Selected(id)
        }
        None => {
            session.select(None);
            EditorResponse::Deselected
        }
    }
}

fn pointer_move(session: &mut EditorSession, project: &mut Project, p: Point) -> EditorResponse {
    let DragState::DraggingCorner { surface, corner } = session.drag().clone() else {
        return EditorResponse::Ignored;
    };
    let target = if session.config.snap_to_grid {
        let pitch = session.config.grid_size;
        Point::new(snap_to_pitch(p.x, pitch), snap_to_pitch(p.y, pitch))
    } else {
        p
    };
    if project.move_corner(&surface, corner, target) {
        EditorResponse::CornerMoved
    } else {
        session.set_drag(DragState::Idle);
        EditorResponse::Ignored
    }
}

fn pointer_up(session: &mut EditorSession, project: &mut Project) -> EditorResponse {
    if *session.drag() == DragState::Idle {
        return EditorResponse::Ignored;
    }
    session.set_drag(DragState::Idle);
    project.commit();
    EditorResponse::DragCommitted
}

fn double_activate(session: &mut EditorSession, project: &mut Project, p: Point) -> EditorResponse {
    let Some(id) = find_body_hit(project, p) else {
        return EditorResponse::Ignored;
    };
    project.remove_surface(&id);
    session.prune_selection(project);
    EditorResponse::Deleted(id)
}

fn key_down(
    session: &mut EditorSession,
    project: &mut Project,
    key: Key,
    modifiers: Modifiers,
) -> EditorResponse {
    if modifiers.ctrl {
        let undo = matches!(key, Key::Char('z' | 'Z')) && !modifiers.shift;
        let redo = matches!(key, Key::Char('y' | 'Y'))
            || (matches!(key, Key::Char('z' | 'Z')) && modifiers.shift);
        if undo || redo {
            session.set_drag(DragState::Idle);
            let changed = if undo { project.undo() } else { project.redo() };
            session.prune_selection(project);
            return match (changed, undo) {
                (false, _) => EditorResponse::Ignored,
                (true, true) => EditorResponse::Undone,
                (true, false) => EditorResponse::Redone,
            };
        }
    }

    let Some(selected) = session.selection().cloned() else {
        return EditorResponse::Ignored;
    };
    let step = if modifiers.shift {
        session.config.nudge_step_large
    } else {
        session.config.nudge_step
    };
    let delta = match key {
        Key::ArrowLeft => Vec2::new(-step, 0.0),
        Key::ArrowRight => Vec2::new(step, 0.0),
        Key::ArrowUp => Vec2::new(0.0, -step),
        Key::ArrowDown => Vec2::new(0.0, step),
        Key::Delete | Key::Backspace => {
            session.set_drag(DragState::Idle);
            session.select(None);
            return if project.remove_surface(&selected) {
                EditorResponse::Deleted(selected)
            } else {
                EditorResponse::Ignored
            };
        }
        Key::Escape | Key::Char(_) => return EditorResponse::Ignored,
    };
    if project.nudge_surface(&selected, delta) {
        EditorResponse::Nudged
    } else {
        session.select(None);
        EditorResponse::Ignored
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/input.rs"]
mod tests;
