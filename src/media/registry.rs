use std::path::Path;

use crate::{
    foundation::error::{QuadmapError, QuadmapResult},
    media::decode::decode_image_file,
    media::handle::{MediaFrame, MediaHandle, StillImage},
    media::video::VideoStream,
    surface::model::SourceId,
};

const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "webm", "mkv", "avi", "m4v"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// What kind of content a source carries.
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Guess the kind from a file extension. Unknown extensions are treated as images.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext {
            Some(e) if VIDEO_EXTENSIONS.contains(&e.as_str()) => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

/// An imported media source. The handle is absent for sources restored from a project file
/// until the media is re-bound.
pub struct MediaSource {
    pub id: SourceId,
    pub display_name: String,
    pub kind: MediaKind,
    handle: Option<Box<dyn MediaHandle>>,
}

impl std::fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSource")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("kind", &self.kind)
            .field("bound", &self.handle.is_some())
            .finish()
    }
}

impl MediaSource {
    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// Latest frame if the handle is bound and ready.
    pub fn ready_frame(&self) -> Option<MediaFrame> {
        let handle = self.handle.as_ref()?;
        if !handle.is_ready() {
            return None;
        }
        handle.current_frame().filter(MediaFrame::is_well_formed)
    }
}

#[derive(Clone, Debug)]
/// Outcome of looking up a surface's source for one frame.
pub enum Resolved<'a> {
    /// The surface has no source bound.
    NoSource,
    /// The referenced source id is not in the registry.
    Missing,
    /// The source exists but has nothing drawable this frame.
    NotReady { name: &'a str },
    /// A drawable frame is available.
    Ready { name: &'a str, frame: MediaFrame },
}

/// Ordered set of media sources keyed by [`SourceId`].
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: Vec<MediaSource>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaSource> {
        self.sources.iter()
    }

    pub fn get(&self, id: &SourceId) -> Option<&MediaSource> {
        self.sources.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.get(id).is_some()
    }

    /// Register a new source under a fresh id.
    pub fn add(
        &mut self,
        display_name: impl Into<String>,
        kind: MediaKind,
        handle: Box<dyn MediaHandle>,
    ) -> SourceId {
        let id = SourceId::generate();
        self.insert(id.clone(), display_name, kind, Some(handle));
        id
    }

    /// Register (or replace) a source under a known id.
    pub fn insert(
        &mut self,
        id: SourceId,
        display_name: impl Into<String>,
        kind: MediaKind,
        handle: Option<Box<dyn MediaHandle>>,
    ) {
        let source = MediaSource {
            id,
            display_name: display_name.into(),
            kind,
            handle,
        };
        match self.sources.iter_mut().find(|s| s.id == source.id) {
            Some(slot) => *slot = source,
            None => self.sources.push(source),
        }
    }

    /// Drop a source and its handle. Surfaces referencing it fall back to the missing state.
    pub fn remove(&mut self, id: &SourceId) -> Option<MediaSource> {
        let idx = self.sources.iter().position(|s| &s.id == id)?;
        Some(self.sources.remove(idx))
    }

    /// Attach a handle to an existing source.
    pub fn bind(&mut self, id: &SourceId, handle: Box<dyn MediaHandle>) -> QuadmapResult<()> {
        let source = self
            .sources
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| QuadmapError::selection(format!("unknown source '{id}'")))?;
        source.handle = Some(handle);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// Import a media file: images are decoded eagerly, videos start streaming.
    pub fn import_file(&mut self, path: &Path) -> QuadmapResult<SourceId> {
        let kind = MediaKind::from_path(path);
        let handle = open_handle(path, kind)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::debug!(name = %name, ?kind, "imported media source");
        Ok(self.add(name, kind, handle))
    }

    /// Bind every unbound source whose display name matches a file in `dir`.
    ///
    /// Only the final path component of a display name is used, so names from a project file
    /// cannot reach outside `dir`. Returns the number of sources bound. Files that fail to open
    /// are logged and skipped.
    pub fn rebind_from_dir(&mut self, dir: &Path) -> usize {
        let mut bound = 0;
        for source in self.sources.iter_mut().filter(|s| s.handle.is_none()) {
            let Some(file_name) = Path::new(&source.display_name).file_name() else {
                tracing::debug!(name = %source.display_name, "source name has no file component");
                continue;
            };
            let path = dir.join(file_name);
            if !path.is_file() {
                continue;
            }
            match open_handle(&path, source.kind) {
                Ok(handle) => {
                    source.handle = Some(handle);
                    bound += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to rebind source");
                }
            }
        }
        bound
    }

    /// Resolve a surface's source reference for drawing.
    pub fn resolve(&self, id: Option<&SourceId>) -> Resolved<'_> {
        let Some(id) = id else {
            return Resolved::NoSource;
        };
        let Some(source) = self.get(id) else {
            return Resolved::Missing;
        };
        match source.ready_frame() {
            Some(frame) => Resolved::Ready {
                name: &source.display_name,
                frame,
            },
            None => Resolved::NotReady {
                name: &source.display_name,
            },
        }
    }
}

fn open_handle(path: &Path, kind: MediaKind) -> QuadmapResult<Box<dyn MediaHandle>> {
    match kind {
        MediaKind::Image => Ok(Box::new(StillImage::new(decode_image_file(path)?))),
        MediaKind::Video => Ok(Box::new(VideoStream::open(path)?)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/registry.rs"]
mod tests;
