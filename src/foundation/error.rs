/// Convenience result type used across quadmap.
pub type QuadmapResult<T> = Result<T, QuadmapError>;

/// Top-level error taxonomy used by editor and renderer APIs.
///
/// Geometry never produces errors: malformed quads render and hit-test deterministically.
/// Missing or unready media is recovered locally by placeholder rendering.
#[derive(thiserror::Error, Debug)]
pub enum QuadmapError {
    /// Invalid user-provided data (config values, property ranges, grid parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested action referenced something that cannot be selected (no sources, unknown
    /// source id, out-of-range grid cell). The action was aborted with no state change.
    #[error("selection error: {0}")]
    Selection(String),

    /// A persisted project could not be loaded. The in-memory project is left unchanged.
    #[error("load error: {0}")]
    Load(String),

    /// A media source could not be opened or decoded.
    #[error("media error: {0}")]
    Media(String),

    /// Errors raised by the raster backend (surface sizes, pixel buffer mismatches).
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuadmapError {
    /// Build a [`QuadmapError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`QuadmapError::Selection`] value.
    pub fn selection(msg: impl Into<String>) -> Self {
        Self::Selection(msg.into())
    }

    /// Build a [`QuadmapError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`QuadmapError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`QuadmapError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`QuadmapError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
