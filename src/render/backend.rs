use std::sync::Arc;

use crate::{
    foundation::config::EditorConfig,
    foundation::error::{QuadmapError, QuadmapResult},
    render::plan::FramePlan,
};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are premultiplied alpha. The `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy, as expected by image encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Encode as PNG.
    pub fn save_png(&self, path: &std::path::Path) -> QuadmapResult<()> {
        image::save_buffer_with_format(
            path,
            &self.to_straight_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| QuadmapError::render(format!("write png '{}': {e}", path.display())))
    }
}

/// A renderer that executes a compiled [`FramePlan`].
pub trait RenderBackend {
    /// Rasterize the plan. Individual surface failures degrade to skipped surfaces; only
    /// frame-level problems (bad dimensions) are errors.
    fn render_plan(&mut self, plan: &FramePlan) -> QuadmapResult<FrameRGBA>;
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Straight-alpha RGBA8 color the frame is cleared to. Transparent when unset.
    pub clear_rgba: Option<[u8; 4]>,
    /// Font bytes for labels and handle numbers. Text is skipped when unset.
    pub label_font: Option<Arc<Vec<u8>>>,
}

impl RenderSettings {
    /// Settings derived from the editor config, reading the label font if one is configured.
    pub fn from_config(config: &EditorConfig) -> QuadmapResult<Self> {
        let label_font = match &config.label_font {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    QuadmapError::validation(format!(
                        "read label font '{}': {e}",
                        path.display()
                    ))
                })?;
                Some(Arc::new(bytes))
            }
            None => None,
        };
        Ok(Self {
            clear_rgba: Some(config.clear_rgba),
            label_font,
        })
    }
}
