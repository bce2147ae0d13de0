use crate::foundation::error::{QuadmapError, QuadmapResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Pixel dimensions of the rendering viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> QuadmapResult<Self> {
        if width == 0 || height == 0 {
            return Err(QuadmapError::validation("viewport dimensions must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(QuadmapError::validation(
                "viewport dimensions must fit in u16",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Opaque color from HSL components (`hue` in degrees, `sat`/`light` in `[0, 1]`).
    pub fn from_hsl(hue: f64, sat: f64, light: f64) -> Self {
        let h = hue.rem_euclid(360.0);
        let s = sat.clamp(0.0, 1.0);
        let l = light.clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h / 60.0;
        let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());
        let (r1, g1, b1) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::from_straight_rgba(to_u8(r1), to_u8(g1), to_u8(b1), 255)
    }

    /// Scale every channel by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let op = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
        let scale = |c: u8| crate::foundation::math::mul_div255_u8(u16::from(c), op);
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: scale(self.a),
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}
