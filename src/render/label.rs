//! Text for placeholder labels and handle numbers, shaped with `parley` and drawn as
//! `vello_cpu` glyph runs.

use crate::{
    foundation::core::{Affine, Point, Vec2},
    foundation::error::{QuadmapError, QuadmapResult},
    render::cpu::affine_to_cpu,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Shapes short strings in a single registered font.
pub(crate) struct LabelRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl LabelRenderer {
    pub(crate) fn new(font_bytes: &[u8]) -> QuadmapResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            QuadmapError::validation("no font families registered from label font")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| QuadmapError::validation("label font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
                0,
            ),
        })
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Draw `text` with its layout box centered on `center`.
    pub(crate) fn draw_centered(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        center: Point,
        size_px: f32,
        rgba: [u8; 4],
    ) {
        if text.is_empty() || !size_px.is_finite() || size_px <= 0.0 {
            return;
        }
        let [r, g, b, a] = rgba;
        let layout = self.layout(text, size_px, TextBrushRgba8 { r, g, b, a });
        let offset = Vec2::new(
            center.x - f64::from(layout.width()) / 2.0,
            center.y - f64::from(layout.height()) / 2.0,
        );
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(Affine::translate(offset)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}
