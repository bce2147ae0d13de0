//! CPU pixel operations on premultiplied RGBA8 buffers.

use crate::{
    foundation::core::Point,
    foundation::error::{QuadmapError, QuadmapResult},
    foundation::math::mul_div255_u8,
    render::quad::FeatherMask,
    surface::model::BlendMode,
};

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite `src` onto `dst` with a separable blend mode.
///
/// Uses `Cr = (1 - ab)·Cs + (1 - as)·Cb + as·ab·B(cb, cs)` on premultiplied values, which
/// degenerates to [`over`] for [`BlendMode::Normal`]. [`BlendMode::Add`] is a saturating sum.
pub fn blend(dst: PremulRgba8, src: PremulRgba8, mode: BlendMode, opacity: f32) -> PremulRgba8 {
    match mode {
        BlendMode::Normal => return over(dst, src, opacity),
        BlendMode::Add => {
            let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
            let mut out = [0u8; 4];
            for i in 0..4 {
                out[i] = dst[i].saturating_add(mul_div255_u8(u16::from(src[i]), op));
            }
            return out;
        }
        _ => {}
    }

    let op = opacity.clamp(0.0, 1.0);
    let sa = f32::from(src[3]) / 255.0 * op;
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc_p = f32::from(src[i]) / 255.0 * op;
        let dc_p = f32::from(dst[i]) / 255.0;
        let cs = (sc_p / sa).clamp(0.0, 1.0);
        let cb = if da > 0.0 { (dc_p / da).clamp(0.0, 1.0) } else { 0.0 };
        let mixed = blend_channel(mode, cb, cs);
        let c = (1.0 - da) * sc_p + (1.0 - sa) * dc_p + sa * da * mixed;
        out[i] = to_u8(c);
    }
    out[3] = to_u8(sa + da - sa * da);
    out
}

fn blend_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    let multiply = |a: f32, b: f32| a * b;
    let screen = |a: f32, b: f32| a + b - a * b;
    let hard_light = |cb: f32, cs: f32| {
        if cs <= 0.5 {
            multiply(cb, 2.0 * cs)
        } else {
            screen(cb, 2.0 * cs - 1.0)
        }
    };
    match mode {
        BlendMode::Normal | BlendMode::Add => cs,
        BlendMode::Multiply => multiply(cb, cs),
        BlendMode::Screen => screen(cb, cs),
        BlendMode::Overlay => hard_light(cs, cb),
        BlendMode::Darken => cb.min(cs),
        BlendMode::Lighten => cb.max(cs),
        BlendMode::ColorDodge => {
            if cb <= 0.0 {
                0.0
            } else if cs >= 1.0 {
                1.0
            } else {
                (cb / (1.0 - cs)).min(1.0)
            }
        }
        BlendMode::ColorBurn => {
            if cb >= 1.0 {
                1.0
            } else if cs <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - cb) / cs).min(1.0)
            }
        }
        BlendMode::HardLight => hard_light(cb, cs),
        BlendMode::SoftLight => {
            if cs <= 0.5 {
                cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
            } else {
                let d = if cb <= 0.25 {
                    ((16.0 * cb - 12.0) * cb + 4.0) * cb
                } else {
                    cb.sqrt()
                };
                cb + (2.0 * cs - 1.0) * (d - cb)
            }
        }
        BlendMode::Difference => (cb - cs).abs(),
        BlendMode::Exclusion => cb + cs - 2.0 * cb * cs,
    }
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn check_same_len(dst: &[u8], src: &[u8], what: &str) -> QuadmapResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(QuadmapError::render(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> QuadmapResult<()> {
    check_same_len(dst, src, "over_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

pub fn blend_in_place(
    dst: &mut [u8],
    src: &[u8],
    mode: BlendMode,
    opacity: f32,
) -> QuadmapResult<()> {
    check_same_len(dst, src, "blend_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = blend([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], mode, opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Multiply every pixel by the alpha of the matching `coverage` pixel.
pub fn mask_in_place(dst: &mut [u8], coverage: &[u8]) -> QuadmapResult<()> {
    check_same_len(dst, coverage, "mask_in_place")?;
    for (d, m) in dst.chunks_exact_mut(4).zip(coverage.chunks_exact(4)) {
        let a = u16::from(m[3]);
        if a == 255 {
            continue;
        }
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
    Ok(())
}

/// Brightness, contrast, then saturation on unpremultiplied color, alpha unchanged.
///
/// Brightness scales each channel; contrast pushes it away from mid-gray: `(c - 0.5)·k + 0.5`.
/// Saturation mixes each channel with the Rec. 709 luma using the CSS `saturate()` matrix.
pub fn color_adjust_in_place(data: &mut [u8], brightness: f64, contrast: f64, saturate: f64) {
    if brightness == 1.0 && contrast == 1.0 && saturate == 1.0 {
        return;
    }
    let s = saturate.max(0.0) as f32;
    let b = brightness.max(0.0) as f32;
    let k = contrast.max(0.0) as f32;

    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        let c = i as f32 / 255.0 * b;
        let c = (c - 0.5) * k + 0.5;
        *v = to_u8(c);
    }

    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            continue;
        }
        let mut rgb = [0u8; 3];
        for (out, &c) in rgb.iter_mut().zip(&px[..3]) {
            let straight = if a == 255 {
                c
            } else {
                ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8
            };
            *out = lut[usize::from(straight)];
        }
        if s != 1.0 {
            rgb = saturate_rgb(rgb, s);
        }
        for (c, v) in px[..3].iter_mut().zip(rgb) {
            *c = mul_div255_u8(u16::from(v), u16::from(a));
        }
    }
}

fn saturate_rgb([r, g, b]: [u8; 3], s: f32) -> [u8; 3] {
    let [r, g, b] = [r, g, b].map(|c| f32::from(c) / 255.0);
    let mix = |c: f32, luma: f32| to_u8(luma + (c - luma) * s);
    let luma = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    [mix(r, luma), mix(g, luma), mix(b, luma)]
}

/// Multiply a `width` x `height` buffer by a radial feather mask sampled at pixel centers.
pub fn feather_in_place(
    data: &mut [u8],
    width: u32,
    height: u32,
    mask: &FeatherMask,
) -> QuadmapResult<()> {
    if data.len() != width as usize * height as usize * 4 {
        return Err(QuadmapError::render(
            "feather_in_place buffer does not match dimensions",
        ));
    }
    for (i, px) in data.chunks_exact_mut(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let x = (i % width as usize) as f64 + 0.5;
        let y = (i / width as usize) as f64 + 0.5;
        let alpha = mask.alpha_at(Point::new(x, y));
        if alpha >= 1.0 {
            continue;
        }
        let m = (alpha * 255.0).round().clamp(0.0, 255.0) as u16;
        for c in px.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), m);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
