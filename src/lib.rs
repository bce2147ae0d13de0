//! quadmap is the core of a projection-mapping editor.
//!
//! Media sources (video streams, still images) are mapped onto free-form quadrilateral
//! surfaces that the user drags into place on a projector output:
//!
//! - Build a [`Project`] of [`Surface`]s bound to sources in a [`SourceRegistry`]
//! - Feed pointer and key input through [`handle_event`] with an [`EditorSession`]
//! - Compile frames with [`compile_frame`] and rasterize them with a [`RenderBackend`]
//! - Save and load projects as JSON
#![forbid(unsafe_code)]

pub mod foundation {
    pub mod config;
    pub mod core;
    pub mod error;
    pub(crate) mod math;
}

pub mod geometry {
    pub mod polygon;
}

pub mod surface {
    pub mod grid;
    pub mod model;
    pub mod rescale;
}

pub mod media {
    pub mod decode;
    pub mod handle;
    pub mod registry;
    pub mod video;
}

pub mod history {
    pub mod manager;
}

pub mod editor {
    pub mod input;
    pub mod session;
}

pub mod project {
    pub mod model;
    pub mod persist;
}

pub mod render {
    pub mod backend;
    pub mod composite;
    pub mod cpu;
    pub mod frame_loop;
    pub(crate) mod label;
    pub mod plan;
    pub mod quad;
}

pub use crate::foundation::config::EditorConfig;
pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8Premul, Vec2, Viewport};
pub use crate::foundation::error::{QuadmapError, QuadmapResult};

pub use crate::editor::input::{EditorResponse, InputEvent, Key, Modifiers, handle_event};
pub use crate::editor::session::{DragState, EditorSession, Mode};
pub use crate::geometry::polygon::{BoundingBox, bounding_box, distance, point_in_polygon};
pub use crate::history::manager::History;
pub use crate::media::handle::{MediaFrame, MediaHandle, StillImage, Unavailable};
pub use crate::media::registry::{MediaKind, MediaSource, Resolved, SourceRegistry};
pub use crate::project::model::Project;
pub use crate::project::persist::{PROJECT_FORMAT_VERSION, ProjectFile};
pub use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::frame_loop::{
    FixedRateClock, FrameClock, FrameLoop, FrameSink, InMemorySink, ManualClock,
    PngSequenceSink, SinkConfig,
};
pub use crate::render::plan::{FramePlan, compile_frame};
pub use crate::surface::grid::GridLayout;
pub use crate::surface::model::{
    BlendMode, Corner, HueColor, SourceId, Surface, SurfaceId, SurfaceProps,
};
pub use crate::surface::rescale::rescale_surfaces;
