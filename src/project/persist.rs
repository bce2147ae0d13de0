//! JSON project files.
//!
//! Loading is all-or-nothing: the file is parsed and every surface validated into fresh values
//! before anything in the live [`Project`] is replaced.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::core::Point,
    foundation::error::{QuadmapError, QuadmapResult},
    media::registry::{MediaKind, SourceRegistry},
    project::model::Project,
    surface::model::{BlendMode, HueColor, SourceId, Surface, SurfaceId},
};

/// Current on-disk format version. Newer files are rejected.
pub const PROJECT_FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    PROJECT_FORMAT_VERSION
}

fn one() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub surfaces: Vec<SurfaceRecord>,
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SurfaceRecord {
    pub id: SurfaceId,
    #[serde(default)]
    pub source_id: Option<SourceId>,
    pub points: [PointRecord; 4],
    /// Regenerated from the id when absent.
    #[serde(default)]
    pub color: Option<HueColor>,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default = "one")]
    pub brightness: f64,
    #[serde(default = "one")]
    pub contrast: f64,
    #[serde(default = "one")]
    pub saturate: f64,
    #[serde(default)]
    pub feather: f64,
    #[serde(default)]
    pub blend_mode: BlendMode,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceRecord {
    pub id: SourceId,
    pub name: String,
    #[serde(default)]
    pub is_video: bool,
}

impl SurfaceRecord {
    fn from_surface(s: &Surface) -> Self {
        Self {
            id: s.id.clone(),
            source_id: s.source_id.clone(),
            points: s.points.map(|p| PointRecord { x: p.x, y: p.y }),
            color: Some(s.color),
            opacity: s.opacity,
            brightness: s.brightness,
            contrast: s.contrast,
            saturate: s.saturate,
            feather: s.feather,
            blend_mode: s.blend_mode,
        }
    }

    fn into_surface(self) -> QuadmapResult<Surface> {
        let color = self
            .color
            .unwrap_or_else(|| HueColor::from_seed(self.id.as_str()));
        let surface = Surface {
            id: self.id,
            source_id: self.source_id,
            points: self.points.map(|p| Point::new(p.x, p.y)),
            color,
            opacity: self.opacity,
            brightness: self.brightness,
            contrast: self.contrast,
            saturate: self.saturate,
            feather: self.feather,
            blend_mode: self.blend_mode,
        };
        surface.validate()?;
        Ok(surface)
    }
}

impl ProjectFile {
    pub fn from_project(project: &Project) -> Self {
        Self {
            version: PROJECT_FORMAT_VERSION,
            surfaces: project
                .surfaces()
                .iter()
                .map(SurfaceRecord::from_surface)
                .collect(),
            sources: project
                .sources()
                .iter()
                .map(|s| SourceRecord {
                    id: s.id.clone(),
                    name: s.display_name.clone(),
                    is_video: s.kind == MediaKind::Video,
                })
                .collect(),
        }
    }

    pub fn from_json_str(text: &str) -> QuadmapResult<Self> {
        serde_json::from_str(text).map_err(|e| QuadmapError::load(format!("project json: {e}")))
    }

    pub fn to_json_string(&self) -> QuadmapResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| QuadmapError::serde(e.to_string()))
    }

    /// Build validated surfaces and an unbound source registry.
    pub fn into_parts(self) -> QuadmapResult<(Vec<Surface>, SourceRegistry)> {
        if self.version > PROJECT_FORMAT_VERSION {
            return Err(QuadmapError::load(format!(
                "project format version {} is newer than supported {PROJECT_FORMAT_VERSION}",
                self.version
            )));
        }

        let mut source_ids = HashSet::new();
        let mut sources = SourceRegistry::new();
        for rec in self.sources {
            if !source_ids.insert(rec.id.clone()) {
                return Err(QuadmapError::load(format!("duplicate source id '{}'", rec.id)));
            }
            let kind = if rec.is_video {
                MediaKind::Video
            } else {
                MediaKind::Image
            };
            sources.insert(rec.id, rec.name, kind, None);
        }

        let mut surface_ids = HashSet::new();
        let mut surfaces = Vec::with_capacity(self.surfaces.len());
        for rec in self.surfaces {
            if !surface_ids.insert(rec.id.clone()) {
                return Err(QuadmapError::load(format!("duplicate surface id '{}'", rec.id)));
            }
            let surface = rec
                .into_surface()
                .map_err(|e| QuadmapError::load(e.to_string()))?;
            surfaces.push(surface);
        }
        Ok((surfaces, sources))
    }
}

impl Project {
    pub fn to_json_string(&self) -> QuadmapResult<String> {
        ProjectFile::from_project(self).to_json_string()
    }

    /// Replace this project's contents with the parsed file and start a fresh history.
    ///
    /// On error the project is left untouched.
    #[tracing::instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn load_json_str(&mut self, text: &str) -> QuadmapResult<()> {
        let (surfaces, sources) = ProjectFile::from_json_str(text)
            .and_then(ProjectFile::into_parts)
            .inspect_err(|e| tracing::warn!(error = %e, "project load rejected"))?;
        tracing::debug!(
            surfaces = surfaces.len(),
            sources = sources.len(),
            "loaded project"
        );
        self.replace_contents(surfaces, sources);
        Ok(())
    }

    /// Parse a new project. Sources come back unbound.
    pub fn from_json_str(text: &str, history_limit: usize) -> QuadmapResult<Self> {
        let (surfaces, sources) = ProjectFile::from_json_str(text)?.into_parts()?;
        Ok(Self::from_parts(surfaces, sources, history_limit))
    }

    pub fn save_to_path(&self, path: &Path) -> QuadmapResult<()> {
        let text = self.to_json_string()?;
        std::fs::write(path, text)
            .with_context(|| format!("write project '{}'", path.display()))?;
        Ok(())
    }

    pub fn load_from_path(&mut self, path: &Path) -> QuadmapResult<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        self.load_json_str(&text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/persist.rs"]
mod tests;
