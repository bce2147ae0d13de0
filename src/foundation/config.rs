use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{QuadmapError, QuadmapResult};

const GRID_SIZE_VAR: &str = "QUADMAP_GRID_SIZE";
const HISTORY_LIMIT_VAR: &str = "QUADMAP_HISTORY_LIMIT";

/// Editor tunables. Every field has a default so partial JSON files are accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Corner grab radius in viewport units.
    pub hit_radius: f64,
    /// Grid pitch used for snapping and for the edit-mode grid overlay.
    pub grid_size: f64,
    /// Snap dragged corners to the grid.
    pub snap_to_grid: bool,
    /// Draw the grid overlay in edit mode.
    pub show_grid: bool,
    /// Maximum number of retained history snapshots.
    pub history_limit: usize,
    /// Arrow-key nudge distance.
    pub nudge_step: f64,
    /// Arrow-key nudge distance with the modifier held.
    pub nudge_step_large: f64,
    /// Side length of surfaces created with "add surface".
    pub default_surface_size: f64,
    /// Radius of corner handle markers.
    pub handle_radius: f64,
    /// Font used for source labels and handle numbers. Labels are skipped when unset.
    pub label_font: Option<PathBuf>,
    /// Straight-alpha RGBA8 color the frame is cleared to.
    pub clear_rgba: [u8; 4],
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_radius: 15.0,
            grid_size: 20.0,
            snap_to_grid: false,
            show_grid: true,
            history_limit: 50,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            default_surface_size: 200.0,
            handle_radius: 6.0,
            label_font: None,
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file, apply environment overrides and validate.
    pub fn from_path(path: &Path) -> QuadmapResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text).map_err(|e| {
            QuadmapError::serde(format!("config '{}': {e}", path.display()))
        })?;
        let cfg = cfg.with_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `QUADMAP_GRID_SIZE` / `QUADMAP_HISTORY_LIMIT` when they parse to sane values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`EditorConfig::with_env_overrides`] with a caller-supplied variable lookup.
    /// Unparsable or out-of-range values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(GRID_SIZE_VAR)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
        {
            self.grid_size = v;
        }
        if let Some(v) = lookup(HISTORY_LIMIT_VAR)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.history_limit = v;
        }
        self
    }

    pub fn validate(&self) -> QuadmapResult<()> {
        let positive = [
            ("hit_radius", self.hit_radius),
            ("grid_size", self.grid_size),
            ("nudge_step", self.nudge_step),
            ("nudge_step_large", self.nudge_step_large),
            ("default_surface_size", self.default_surface_size),
            ("handle_radius", self.handle_radius),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(QuadmapError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if self.history_limit == 0 {
            return Err(QuadmapError::validation("history_limit must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
