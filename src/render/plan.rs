//! Frame compilation: project + editor session in, backend-agnostic draw list out.
//!
//! Compilation never fails. Surfaces without drawable media become placeholders and editing
//! overlays are only emitted in edit mode.

use crate::{
    editor::session::EditorSession,
    foundation::core::{Affine, BezPath, Point, Rgba8Premul, Viewport},
    geometry::polygon,
    media::handle::MediaFrame,
    media::registry::Resolved,
    project::model::Project,
    render::quad::{FeatherMask, content_affine, quad_path},
    surface::model::{BlendMode, SourceId, Surface, SurfaceId},
};

/// Outline color of unselected surfaces (`#3b82f6`).
pub const OUTLINE_RGBA: [u8; 4] = [0x3b, 0x82, 0xf6, 0xff];
/// Outline color of the selected surface (`#f59e0b`).
pub const SELECTED_RGBA: [u8; 4] = [0xf5, 0x9e, 0x0b, 0xff];
/// Straight-alpha grid line color.
pub const GRID_RGBA: [u8; 4] = [0xff, 0xff, 0xff, 0x1a];

const LABEL_MAX_CHARS: usize = 15;

#[derive(Clone, Debug)]
pub struct FramePlan {
    pub viewport: Viewport,
    /// Grid pitch when the grid overlay should be drawn under the surfaces.
    pub grid: Option<f64>,
    /// Surfaces in paint order.
    pub surfaces: Vec<SurfaceOp>,
}

#[derive(Clone, Debug)]
pub enum SurfaceFill {
    /// Draw `frame` through `transform` (source pixel space to viewport), clipped to the quad.
    Media {
        source: SourceId,
        frame: MediaFrame,
        transform: Affine,
    },
    /// Solid fill of the quad.
    Placeholder { color: Rgba8Premul },
}

#[derive(Clone, Debug)]
pub struct SurfaceOp {
    pub surface: SurfaceId,
    pub quad: [Point; 4],
    pub path: BezPath,
    pub fill: SurfaceFill,
    pub opacity: f32,
    pub blend: BlendMode,
    pub brightness: f64,
    pub contrast: f64,
    pub saturate: f64,
    pub feather: Option<FeatherMask>,
    /// Edit-mode decorations drawn right after this surface.
    pub overlay: Option<SurfaceOverlay>,
}

#[derive(Clone, Debug)]
pub struct SurfaceOverlay {
    pub outline_rgba: [u8; 4],
    pub outline_width: f64,
    pub handle_radius: f64,
    /// Centered placeholder label.
    pub label: Option<(Point, String)>,
}

/// Build the draw list for one frame.
#[tracing::instrument(skip(project, session), fields(surfaces = project.surfaces().len()))]
pub fn compile_frame(project: &Project, session: &EditorSession) -> FramePlan {
    let live = session.is_live();
    let grid = (!live && session.config.show_grid && session.config.grid_size > 0.0)
        .then_some(session.config.grid_size);

    let surfaces = project
        .surfaces()
        .iter()
        .map(|s| compile_surface(project, session, s, live))
        .collect();

    FramePlan {
        viewport: session.viewport(),
        grid,
        surfaces,
    }
}

fn compile_surface(
    project: &Project,
    session: &EditorSession,
    surface: &Surface,
    live: bool,
) -> SurfaceOp {
    let resolved = project.sources().resolve(surface.source_id.as_ref());
    let (fill, label) = match resolved {
        Resolved::Ready { frame, .. } => {
            let transform =
                content_affine(&surface.points, f64::from(frame.width), f64::from(frame.height));
            let source = surface.source_id.clone().unwrap_or_else(|| SourceId(String::new()));
            (
                SurfaceFill::Media {
                    source,
                    frame,
                    transform,
                },
                None,
            )
        }
        other => {
            let text = match other {
                Resolved::NoSource => "no source".to_owned(),
                Resolved::Missing => "missing source".to_owned(),
                Resolved::NotReady { name } => name.chars().take(LABEL_MAX_CHARS).collect(),
                Resolved::Ready { .. } => String::new(),
            };
            (
                SurfaceFill::Placeholder {
                    color: surface.color.to_rgba(),
                },
                Some(text),
            )
        }
    };

    let overlay = (!live).then(|| {
        let selected = session.selection() == Some(&surface.id);
        SurfaceOverlay {
            outline_rgba: if selected { SELECTED_RGBA } else { OUTLINE_RGBA },
            outline_width: if selected { 2.0 } else { 1.0 },
            handle_radius: session.config.handle_radius,
            label: label.map(|t| (polygon::centroid(&surface.points), t)),
        }
    });

    SurfaceOp {
        surface: surface.id.clone(),
        quad: surface.points,
        path: quad_path(&surface.points),
        fill,
        opacity: surface.opacity.clamp(0.0, 1.0) as f32,
        blend: surface.blend_mode,
        brightness: surface.brightness,
        contrast: surface.contrast,
        saturate: surface.saturate,
        feather: if live {
            None
        } else {
            FeatherMask::for_quad(&surface.points, surface.feather)
        },
        overlay,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
