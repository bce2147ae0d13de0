use crate::{
    foundation::core::{Point, Rgba8Premul, Vec2},
    foundation::error::{QuadmapError, QuadmapResult},
    foundation::math::Fnv1a64,
    geometry::polygon::{self, BoundingBox},
};

/// Default corner grab radius in viewport units.
pub const DEFAULT_HIT_RADIUS: f64 = 15.0;

/// Upper bound of [`Surface::feather`].
pub const MAX_FEATHER: f64 = 50.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
/// Stable surface identifier, unique for the lifetime of a project.
pub struct SurfaceId(pub String);

impl SurfaceId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
/// Media source identifier (key into [`crate::SourceRegistry`]).
pub struct SourceId(pub String);

impl SourceId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Quad corner, in stored point order.
pub enum Corner {
    /// Index 0.
    TopLeft,
    /// Index 1.
    TopRight,
    /// Index 2.
    BottomRight,
    /// Index 3.
    BottomLeft,
}

impl Corner {
    /// All corners in stored (and hit-test priority) order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 3,
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Compositing mode used when a surface is drawn over the frame.
///
/// Serialized with the 2D-canvas composite operation names.
pub enum BlendMode {
    /// Source over destination.
    #[default]
    #[serde(rename = "source-over")]
    Normal,
    #[serde(rename = "multiply")]
    Multiply,
    #[serde(rename = "screen")]
    Screen,
    #[serde(rename = "overlay")]
    Overlay,
    #[serde(rename = "darken")]
    Darken,
    #[serde(rename = "lighten")]
    Lighten,
    #[serde(rename = "color-dodge")]
    ColorDodge,
    #[serde(rename = "color-burn")]
    ColorBurn,
    #[serde(rename = "hard-light")]
    HardLight,
    #[serde(rename = "soft-light")]
    SoftLight,
    #[serde(rename = "difference")]
    Difference,
    #[serde(rename = "exclusion")]
    Exclusion,
    /// Additive ("lighter").
    #[serde(rename = "lighter")]
    Add,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Generated placeholder hue. Persisted as a CSS `hsl(..)` string.
pub struct HueColor {
    /// Hue in degrees, `[0, 360)`.
    pub hue: f64,
}

impl HueColor {
    const SATURATION: f64 = 0.7;
    const LIGHTNESS: f64 = 0.5;

    /// Pseudo-random hue derived from a seed string.
    pub fn from_seed(seed: &str) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(seed.as_bytes());
        Self {
            hue: (h.finish() % 3600) as f64 / 10.0,
        }
    }

    pub fn to_rgba(self) -> Rgba8Premul {
        Rgba8Premul::from_hsl(self.hue, Self::SATURATION, Self::LIGHTNESS)
    }

    pub fn to_css(self) -> String {
        format!("hsl({}, 70%, 50%)", self.hue)
    }

    /// Parse `hsl(<hue>[deg], ...)`.
    pub fn parse_css(s: &str) -> QuadmapResult<Self> {
        let inner = s
            .trim()
            .strip_prefix("hsl(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| QuadmapError::validation(format!("expected hsl(..) color, got '{s}'")))?;
        let hue_str = inner.split(',').next().unwrap_or_default().trim();
        let hue_str = hue_str.strip_suffix("deg").unwrap_or(hue_str);
        let hue = hue_str
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite())
            .ok_or_else(|| QuadmapError::validation(format!("invalid hue in '{s}'")))?;
        Ok(Self {
            hue: hue.rem_euclid(360.0),
        })
    }
}

impl serde::Serialize for HueColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> serde::Deserialize<'de> for HueColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_css(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A quadrilateral region of the output bound to a media source.
pub struct Surface {
    /// Stable identifier.
    pub id: SurfaceId,
    /// Bound media source. A missing or dangling reference renders as a placeholder.
    pub source_id: Option<SourceId>,
    /// Corners in TL, TR, BR, BL order. No convexity or ordering is enforced.
    pub points: [Point; 4],
    /// Placeholder fill hue.
    pub color: HueColor,
    /// Overall opacity in `[0, 1]`.
    pub opacity: f64,
    /// Brightness multiplier, 1 is neutral.
    pub brightness: f64,
    /// Contrast multiplier, 1 is neutral.
    pub contrast: f64,
    /// Saturation multiplier, 1 is neutral and 0 is grayscale.
    pub saturate: f64,
    /// Edge softening in `[0, 50]`.
    pub feather: f64,
    /// Compositing mode.
    pub blend_mode: BlendMode,
}

/// Partial update of a surface's visual parameters. Values are clamped on apply.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceProps {
    pub opacity: Option<f64>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturate: Option<f64>,
    pub feather: Option<f64>,
    pub blend_mode: Option<BlendMode>,
}

impl Surface {
    /// New axis-aligned surface with neutral visual parameters.
    pub fn create(x: f64, y: f64, w: f64, h: f64, source_id: Option<SourceId>) -> Self {
        let id = SurfaceId::generate();
        let color = HueColor::from_seed(id.as_str());
        Self {
            id,
            source_id,
            points: [
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ],
            color,
            opacity: 1.0,
            brightness: 1.0,
            contrast: 1.0,
            saturate: 1.0,
            feather: 0.0,
            blend_mode: BlendMode::Normal,
        }
    }

    pub fn point(&self, corner: Corner) -> Point {
        self.points[corner.index()]
    }

    pub fn set_point(&mut self, corner: Corner, p: Point) {
        self.points[corner.index()] = p;
    }

    /// First corner (TL, TR, BR, BL order) strictly closer than `radius` to `p`.
    pub fn hit_test_corner(&self, p: Point, radius: f64) -> Option<Corner> {
        Corner::ALL
            .into_iter()
            .find(|&c| polygon::distance(self.point(c), p) < radius)
    }

    /// Even-odd containment test against the quad.
    pub fn hit_test_body(&self, p: Point) -> bool {
        polygon::point_in_polygon(p, &self.points)
    }

    pub fn bounds(&self) -> BoundingBox {
        polygon::bounding_box(&self.points)
    }

    pub fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Apply a property patch, clamping each value into its documented range.
    pub fn apply_props(&mut self, props: SurfaceProps) {
        if let Some(v) = props.opacity {
            self.opacity = clamp_finite(v, 0.0, 1.0, self.opacity);
        }
        if let Some(v) = props.brightness {
            self.brightness = clamp_finite(v, 0.0, f64::MAX, self.brightness);
        }
        if let Some(v) = props.contrast {
            self.contrast = clamp_finite(v, 0.0, f64::MAX, self.contrast);
        }
        if let Some(v) = props.saturate {
            self.saturate = clamp_finite(v, 0.0, f64::MAX, self.saturate);
        }
        if let Some(v) = props.feather {
            self.feather = clamp_finite(v, 0.0, MAX_FEATHER, self.feather);
        }
        if let Some(m) = props.blend_mode {
            self.blend_mode = m;
        }
    }

    /// Check persisted values are within range.
    pub fn validate(&self) -> QuadmapResult<()> {
        if self.id.0.is_empty() {
            return Err(QuadmapError::validation("surface id must not be empty"));
        }
        if self.points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(QuadmapError::validation(format!(
                "surface {} has non-finite points",
                self.id
            )));
        }
        let in_range = |v: f64, lo: f64, hi: f64| v.is_finite() && v >= lo && v <= hi;
        if !in_range(self.opacity, 0.0, 1.0) {
            return Err(QuadmapError::validation(format!(
                "surface {} opacity must be in [0, 1]",
                self.id
            )));
        }
        if [self.brightness, self.contrast, self.saturate]
            .into_iter()
            .any(|v| !in_range(v, 0.0, f64::MAX))
        {
            return Err(QuadmapError::validation(format!(
                "surface {} brightness/contrast/saturate must be finite and >= 0",
                self.id
            )));
        }
        if !in_range(self.feather, 0.0, MAX_FEATHER) {
            return Err(QuadmapError::validation(format!(
                "surface {} feather must be in [0, {MAX_FEATHER}]",
                self.id
            )));
        }
        Ok(())
    }
}

fn clamp_finite(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/model.rs"]
mod tests;
