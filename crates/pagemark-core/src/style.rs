//! Highlight styles and style resolution.

use crate::highlight::PageHighlight;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a CSS color string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("Unsupported color syntax: {0}")]
    UnsupportedSyntax(String),
    #[error("Invalid color component `{component}` in {input}")]
    InvalidComponent { input: String, component: String },
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from 8-bit channels and a CSS-style alpha in `0.0..=1.0`.
    pub fn with_alpha(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self::new(r, g, b, alpha_to_u8(alpha))
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

fn alpha_to_u8(alpha: f64) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Parse a CSS color: `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` or `transparent`.
impl FromStr for Rgba {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Rgba::TRANSPARENT);
        }

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(s, hex);
        }

        let lower = s.to_ascii_lowercase();
        let (body, has_alpha) = if let Some(body) = lower.strip_prefix("rgba(") {
            (body, true)
        } else if let Some(body) = lower.strip_prefix("rgb(") {
            (body, false)
        } else {
            return Err(StyleError::UnsupportedSyntax(s.to_string()));
        };
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| StyleError::UnsupportedSyntax(s.to_string()))?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(StyleError::UnsupportedSyntax(s.to_string()));
        }

        let invalid = |component: &str| StyleError::InvalidComponent {
            input: s.to_string(),
            component: component.to_string(),
        };
        let channel = |component: &str| component.parse::<u8>().map_err(|_| invalid(component));

        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if has_alpha {
            let alpha = parts[3].parse::<f64>().map_err(|_| invalid(parts[3]))?;
            if !(0.0..=1.0).contains(&alpha) {
                return Err(invalid(parts[3]));
            }
            alpha_to_u8(alpha)
        } else {
            255
        };
        Ok(Rgba::new(r, g, b, a))
    }
}

fn parse_hex(input: &str, hex: &str) -> Result<Rgba, StyleError> {
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(StyleError::UnsupportedSyntax(input.to_string()));
    }
    let byte = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| StyleError::InvalidComponent {
            input: input.to_string(),
            component: hex[i..i + 2].to_string(),
        })
    };
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, a))
}

/// Fill, stroke and corner parameters for painting one highlight rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightStyle {
    pub fill_color: Rgba,
    #[serde(default)]
    pub stroke_color: Option<Rgba>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub corner_radius: Option<f64>,
}

impl HighlightStyle {
    /// A fill-only style.
    pub const fn fill(fill_color: Rgba) -> Self {
        Self {
            fill_color,
            stroke_color: None,
            stroke_width: None,
            corner_radius: None,
        }
    }

    /// Effective stroke width; absent or negative means no stroke.
    pub fn stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(0.0).max(0.0)
    }

    /// Effective corner radius; absent or negative means square corners.
    pub fn corner_radius(&self) -> f64 {
        self.corner_radius.unwrap_or(0.0).max(0.0)
    }

    /// Stroke color, transparent when unset.
    pub fn stroke_color(&self) -> Rgba {
        self.stroke_color.unwrap_or(Rgba::TRANSPARENT)
    }

    pub fn draws_stroke(&self) -> bool {
        self.stroke_width() > 0.0
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        DEFAULT_HIGHLIGHT_STYLE
    }
}

/// Fallback style for committed highlights.
pub const DEFAULT_HIGHLIGHT_STYLE: HighlightStyle = HighlightStyle {
    fill_color: Rgba::new(255, 92, 0, 51),
    stroke_color: Some(Rgba::new(190, 81, 3, 102)),
    stroke_width: Some(2.0),
    corner_radius: Some(2.0),
};

/// Style for pending (ghost) highlights.
pub const GHOST_HIGHLIGHT_STYLE: HighlightStyle = HighlightStyle::fill(FREEFORM_FILL_COLOR);

/// Stroke used while a freeform selection is being drawn.
pub const FREEFORM_PREVIEW_STYLE: HighlightStyle = HighlightStyle {
    fill_color: Rgba::TRANSPARENT,
    stroke_color: Some(Rgba::new(153, 193, 218, 64)),
    stroke_width: Some(2.0),
    corner_radius: None,
};

/// Fill applied to a completed freeform selection.
pub const FREEFORM_FILL_COLOR: Rgba = Rgba::new(251, 247, 25, 64);

/// A partial style attached to a single highlight.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleOverride {
    #[serde(default)]
    pub fill_color: Option<Rgba>,
    #[serde(default)]
    pub stroke_color: Option<Rgba>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub corner_radius: Option<f64>,
}

impl StyleOverride {
    /// Fill each unset field from `base`.
    pub fn apply_to(&self, base: &HighlightStyle) -> HighlightStyle {
        HighlightStyle {
            fill_color: self.fill_color.unwrap_or(base.fill_color),
            stroke_color: self.stroke_color.or(base.stroke_color),
            stroke_width: self.stroke_width.or(base.stroke_width),
            corner_radius: self.corner_radius.or(base.corner_radius),
        }
    }
}

/// Resolves the effective style of each highlight record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleResolver {
    /// Component-level default.
    pub default_style: HighlightStyle,
    /// Base style for ghost records (falls back to `default_style`).
    pub ghost_style: Option<HighlightStyle>,
}

impl StyleResolver {
    pub fn new(default_style: HighlightStyle) -> Self {
        Self {
            default_style,
            ghost_style: None,
        }
    }

    /// Give ghost records their own base style.
    pub fn with_ghost_style(mut self, style: HighlightStyle) -> Self {
        self.ghost_style = Some(style);
        self
    }

    /// Resolve against the component default.
    pub fn resolve(&self, style_override: Option<&StyleOverride>) -> HighlightStyle {
        match style_override {
            Some(o) => o.apply_to(&self.default_style),
            None => self.default_style,
        }
    }

    /// Resolve the style for one record on a page.
    pub fn resolve_for(&self, record: &PageHighlight) -> HighlightStyle {
        let base = if record.is_ghost() {
            self.ghost_style.as_ref().unwrap_or(&self.default_style)
        } else {
            &self.default_style
        };
        match record.style() {
            Some(o) => o.apply_to(base),
            None => *base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Ltwh;
    use crate::highlight::{GhostHighlight, Highlight, HighlightPosition};

    #[test]
    fn test_parse_rgba() {
        let color: Rgba = "rgba(251, 247, 25, 0.25)".parse().unwrap();
        assert_eq!(color, FREEFORM_FILL_COLOR);
    }

    #[test]
    fn test_parse_rgb_and_hex() {
        assert_eq!("rgb(1, 2, 3)".parse::<Rgba>(), Ok(Rgba::new(1, 2, 3, 255)));
        assert_eq!("#ff5c00".parse::<Rgba>(), Ok(Rgba::new(255, 92, 0, 255)));
        assert_eq!("#ff5c0033".parse::<Rgba>(), Ok(Rgba::new(255, 92, 0, 0x33)));
        assert_eq!("transparent".parse::<Rgba>(), Ok(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "hsl(1, 2%, 3%)".parse::<Rgba>(),
            Err(StyleError::UnsupportedSyntax(_))
        ));
        assert!(matches!(
            "rgb(300, 0, 0)".parse::<Rgba>(),
            Err(StyleError::InvalidComponent { .. })
        ));
        assert!(matches!(
            "rgba(0, 0, 0, 2)".parse::<Rgba>(),
            Err(StyleError::InvalidComponent { .. })
        ));
        assert!("#12345".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_peniko_roundtrip() {
        let color = Rgba::new(10, 20, 30, 40);
        assert_eq!(Rgba::from(Color::from(color)), color);
    }

    #[test]
    fn test_style_defaults() {
        let style = HighlightStyle::fill(Rgba::new(1, 1, 1, 1));
        assert!(!style.draws_stroke());
        assert!(style.corner_radius().abs() < f64::EPSILON);
        assert_eq!(style.stroke_color(), Rgba::TRANSPARENT);

        let negative = HighlightStyle {
            stroke_width: Some(-3.0),
            corner_radius: Some(-1.0),
            ..style
        };
        assert!(!negative.draws_stroke());
        assert!(negative.corner_radius().abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_without_override() {
        let resolver = StyleResolver::default();
        assert_eq!(resolver.resolve(None), DEFAULT_HIGHLIGHT_STYLE);
    }

    #[test]
    fn test_resolve_partial_override() {
        let resolver = StyleResolver::default();
        let o = StyleOverride {
            fill_color: Some(Rgba::new(0, 0, 255, 80)),
            corner_radius: Some(0.0),
            ..Default::default()
        };
        let style = resolver.resolve(Some(&o));
        assert_eq!(style.fill_color, Rgba::new(0, 0, 255, 80));
        assert_eq!(style.corner_radius, Some(0.0));
        assert_eq!(style.stroke_color, DEFAULT_HIGHLIGHT_STYLE.stroke_color);
        assert_eq!(style.stroke_width, DEFAULT_HIGHLIGHT_STYLE.stroke_width);
    }

    #[test]
    fn test_ghost_records_use_ghost_style_when_configured() {
        let area = HighlightPosition::Area {
            bounding_rect: Ltwh::new(0.0, 0.0, 10.0, 10.0),
        };
        let ghost = PageHighlight::Ghost(GhostHighlight::new(area.clone()));
        let committed = PageHighlight::Committed(Highlight::new("h1", area));

        let plain = StyleResolver::default();
        assert_eq!(plain.resolve_for(&ghost), DEFAULT_HIGHLIGHT_STYLE);

        let resolver = StyleResolver::default().with_ghost_style(GHOST_HIGHLIGHT_STYLE);
        assert_eq!(resolver.resolve_for(&ghost), GHOST_HIGHLIGHT_STYLE);
        assert_eq!(resolver.resolve_for(&committed), DEFAULT_HIGHLIGHT_STYLE);
    }
}
