use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::{
    foundation::core::{Affine, BezPath, Point, Rect, Rgba8Premul},
    foundation::error::{QuadmapError, QuadmapResult},
    media::handle::MediaFrame,
    render::backend::{FrameRGBA, RenderBackend, RenderSettings},
    render::composite::{
        blend_in_place, color_adjust_in_place, feather_in_place, mask_in_place,
        over_in_place,
    },
    render::label::LabelRenderer,
    render::plan::{FramePlan, GRID_RGBA, SurfaceFill, SurfaceOp, SurfaceOverlay},
    surface::model::{Corner, SourceId},
};

const HANDLE_RGBA: [u8; 4] = [0x3b, 0x82, 0xf6, 0xff];
const WHITE: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
const LABEL_SIZE_PX: f32 = 14.0;
const HANDLE_NUMBER_SIZE_PX: f32 = 9.0;
const DASH: [f64; 2] = [5.0, 5.0];

/// CPU raster backend powered by `vello_cpu`.
///
/// Each surface is rasterized into its own transparent layer so that filters, feathering and
/// blend modes can be applied to exactly that surface before it reaches the frame.
pub struct CpuBackend {
    settings: RenderSettings,
    image_cache: HashMap<SourceId, CachedImage>,
    labels: Option<LabelRenderer>,
}

struct CachedImage {
    pixels: Arc<Vec<u8>>,
    generation: u64,
    paint: vello_cpu::Image,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> QuadmapResult<Self> {
        let labels = match &settings.label_font {
            Some(bytes) => Some(LabelRenderer::new(bytes)?),
            None => {
                tracing::debug!(
                    "no label font configured: handle numbers and placeholder labels are skipped"
                );
                None
            }
        };
        Ok(Self {
            settings,
            image_cache: HashMap::new(),
            labels,
        })
    }

    fn image_paint_for(
        &mut self,
        source: &SourceId,
        frame: &MediaFrame,
    ) -> QuadmapResult<vello_cpu::Image> {
        if let Some(cached) = self.image_cache.get(source)
            && cached.generation == frame.generation
            && Arc::ptr_eq(&cached.pixels, &frame.rgba8_premul)
        {
            return Ok(cached.paint.clone());
        }

        let pixmap = image_premul_bytes_to_pixmap(&frame.rgba8_premul, frame.width, frame.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(
            source.clone(),
            CachedImage {
                pixels: frame.rgba8_premul.clone(),
                generation: frame.generation,
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }

    /// Rasterize the surface content into a transparent layer, clipped to its quad.
    fn surface_layer(&mut self, op: &SurfaceOp, w: u16, h: u16) -> QuadmapResult<Vec<u8>> {
        let cpu_path = bezpath_to_cpu(&op.path);
        match &op.fill {
            SurfaceFill::Placeholder { color } => Ok(rasterize(w, h, |ctx| {
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&cpu_path);
            })),
            SurfaceFill::Media {
                source,
                frame,
                transform,
            } => {
                let det = transform.determinant();
                if !det.is_finite() || det.abs() < 1e-9 {
                    return Ok(vec![0; usize::from(w) * usize::from(h) * 4]);
                }
                let paint = self.image_paint_for(source, frame)?;
                let mut content = rasterize(w, h, |ctx| {
                    ctx.set_transform(affine_to_cpu(*transform));
                    ctx.set_paint(paint);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(frame.width),
                        f64::from(frame.height),
                    ));
                });
                let coverage = rasterize(w, h, |ctx| {
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
                    ctx.fill_path(&cpu_path);
                });
                mask_in_place(&mut content, &coverage)?;
                Ok(content)
            }
        }
    }

    fn overlay_layer(&mut self, op: &SurfaceOp, overlay: &SurfaceOverlay, w: u16, h: u16) -> Vec<u8> {
        let labels = &mut self.labels;
        rasterize(w, h, |ctx| {
            let dashes = kurbo::Stroke::new(overlay.outline_width).with_dashes(0.0, DASH);
            let outline = kurbo::stroke(
                op.path.iter(),
                &dashes,
                &kurbo::StrokeOpts::default(),
                0.1,
            );
            ctx.set_paint(rgba_to_cpu(overlay.outline_rgba));
            ctx.fill_path(&bezpath_to_cpu(&outline));

            for corner in Corner::ALL {
                let center = op.quad[corner.index()];
                let disc = kurbo::Circle::new(center, overlay.handle_radius).to_path(0.1);
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(rgba_to_cpu(HANDLE_RGBA));
                ctx.fill_path(&bezpath_to_cpu(&disc));
                let ring = kurbo::stroke(
                    disc.iter(),
                    &kurbo::Stroke::new(1.0),
                    &kurbo::StrokeOpts::default(),
                    0.1,
                );
                ctx.set_paint(rgba_to_cpu(WHITE));
                ctx.fill_path(&bezpath_to_cpu(&ring));

                if let Some(labels) = labels.as_mut() {
                    let number = (corner.index() + 1).to_string();
                    labels.draw_centered(ctx, &number, center, HANDLE_NUMBER_SIZE_PX, WHITE);
                }
            }

            if let (Some(labels), Some((anchor, text))) = (labels.as_mut(), &overlay.label) {
                labels.draw_centered(ctx, text, *anchor, LABEL_SIZE_PX, WHITE);
            }
        })
    }

    fn draw_surface(
        &mut self,
        frame: &mut [u8],
        op: &SurfaceOp,
        w: u16,
        h: u16,
    ) -> QuadmapResult<()> {
        let mut layer = self.surface_layer(op, w, h)?;
        color_adjust_in_place(&mut layer, op.brightness, op.contrast, op.saturate);
        if let Some(mask) = &op.feather {
            feather_in_place(&mut layer, u32::from(w), u32::from(h), mask)?;
        }
        blend_in_place(frame, &layer, op.blend, op.opacity)
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip(self, plan), fields(surfaces = plan.surfaces.len()))]
    fn render_plan(&mut self, plan: &FramePlan) -> QuadmapResult<FrameRGBA> {
        let w: u16 = plan
            .viewport
            .width
            .try_into()
            .map_err(|_| QuadmapError::render("viewport width exceeds u16"))?;
        let h: u16 = plan
            .viewport
            .height
            .try_into()
            .map_err(|_| QuadmapError::render("viewport height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(QuadmapError::render("viewport must be non-empty"));
        }

        let clear = self
            .settings
            .clear_rgba
            .map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a).to_array())
            .unwrap_or([0, 0, 0, 0]);
        let mut frame = Vec::with_capacity(usize::from(w) * usize::from(h) * 4);
        for _ in 0..usize::from(w) * usize::from(h) {
            frame.extend_from_slice(&clear);
        }

        if let Some(pitch) = plan.grid.filter(|p| p.is_finite() && *p >= 1.0) {
            let grid = grid_layer(pitch, w, h);
            over_in_place(&mut frame, &grid, 1.0)?;
        }

        for op in &plan.surfaces {
            if let Err(e) = self.draw_surface(&mut frame, op, w, h) {
                tracing::warn!(surface = %op.surface, error = %e, "skipping surface");
            }
            if let Some(overlay) = &op.overlay {
                let layer = self.overlay_layer(op, overlay, w, h);
                over_in_place(&mut frame, &layer, 1.0)?;
            }
        }

        let live: std::collections::HashSet<&SourceId> = plan
            .surfaces
            .iter()
            .filter_map(|op| match &op.fill {
                SurfaceFill::Media { source, .. } => Some(source),
                SurfaceFill::Placeholder { .. } => None,
            })
            .collect();
        self.image_cache.retain(|id, _| live.contains(id));

        Ok(FrameRGBA {
            width: plan.viewport.width,
            height: plan.viewport.height,
            data: frame,
            premultiplied: true,
        })
    }
}

/// One-pixel lines every `pitch` units, starting at the origin.
fn grid_layer(pitch: f64, w: u16, h: u16) -> Vec<u8> {
    rasterize(w, h, |ctx| {
        ctx.set_paint(rgba_to_cpu(GRID_RGBA));
        let (fw, fh) = (f64::from(w), f64::from(h));
        let mut x = 0.0;
        while x < fw {
            ctx.fill_rect(&rect_to_cpu(Rect::new(x, 0.0, x + 1.0, fh)));
            x += pitch;
        }
        let mut y = 0.0;
        while y < fh {
            ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, y, fw, y + 1.0)));
            y += pitch;
        }
    })
}

/// Run `draw` on a fresh context and return the premultiplied pixels.
fn rasterize(w: u16, h: u16, draw: impl FnOnce(&mut vello_cpu::RenderContext)) -> Vec<u8> {
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    draw(&mut ctx);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap.data_as_u8_slice().to_vec()
}

fn color_to_cpu(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    // peniko colors are straight alpha
    let a = u16::from(c.a);
    let unpremul = |v: u8| -> u8 {
        if a == 0 {
            0
        } else {
            ((u16::from(v) * 255 + a / 2) / a).min(255) as u8
        }
    };
    vello_cpu::peniko::Color::from_rgba8(unpremul(c.r), unpremul(c.g), unpremul(c.b), c.a)
}

fn rgba_to_cpu([r, g, b, a]: [u8; 4]) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> QuadmapResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| QuadmapError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| QuadmapError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(QuadmapError::render("media frame byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
