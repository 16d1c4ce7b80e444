//! Page-space to viewport-space transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A rectangle stored as left/top/width/height.
///
/// The coordinate space (document page or viewport pixels) is not encoded in
/// the type; callers convert explicitly with [`scaled_to_viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ltwh {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Ltwh {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Get the rectangle as a kurbo Rect.
    ///
    /// Negative extents are kept as-is (`x1 < x0`), not normalized.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }

    /// Build from a kurbo Rect.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

/// Ratio between backing-store pixels and display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DevicePixelRatio(f64);

impl DevicePixelRatio {
    /// Returns `None` unless `ratio` is finite and positive.
    pub fn new(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self(ratio))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for DevicePixelRatio {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f64> for DevicePixelRatio {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("invalid device pixel ratio: {value}"))
    }
}

impl From<DevicePixelRatio> for f64 {
    fn from(ratio: DevicePixelRatio) -> Self {
        ratio.0
    }
}

/// Geometry of one rendered page at its current zoom level.
///
/// Owned by the document viewer; treat every instance as a snapshot that may
/// be replaced between two renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Rendered page width in display units.
    pub width: f64,
    /// Rendered page height in display units.
    pub height: f64,
    /// Page units to display units.
    pub scale: f64,
    /// Translation applied after scaling.
    #[serde(default = "zero_offset")]
    pub offset: Vec2,
}

fn zero_offset() -> Vec2 {
    Vec2::ZERO
}

impl Viewport {
    /// Create a viewport with no offset.
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
            offset: Vec2::ZERO,
        }
    }

    /// Viewport for a page of `page_size` (page units) rendered at `scale`.
    pub fn for_page(page_size: Size, scale: f64) -> Self {
        Self::new(page_size.width * scale, page_size.height * scale, scale)
    }

    /// Set the translation offset.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Rendered size in display units.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Get the affine transform from page space to viewport space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Convert a viewport point back into page space.
    pub fn to_page_point(&self, viewport_point: Point) -> Point {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset) * viewport_point
    }

    /// Convert a page-space rectangle into viewport pixels.
    pub fn to_viewport_rect(&self, rect: Ltwh) -> Ltwh {
        Ltwh {
            left: rect.left * self.scale + self.offset.x,
            top: rect.top * self.scale + self.offset.y,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }
}

/// Map a page-space rectangle into the viewport's pixel space.
///
/// Never cache the result across viewport changes.
pub fn scaled_to_viewport(rect: Ltwh, viewport: &Viewport) -> Ltwh {
    viewport.to_viewport_rect(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ltwh_eq(a: Ltwh, b: Ltwh) {
        assert!((a.left - b.left).abs() < 1e-10, "{a:?} != {b:?}");
        assert!((a.top - b.top).abs() < 1e-10, "{a:?} != {b:?}");
        assert!((a.width - b.width).abs() < 1e-10, "{a:?} != {b:?}");
        assert!((a.height - b.height).abs() < 1e-10, "{a:?} != {b:?}");
    }

    #[test]
    fn test_identity_viewport() {
        let viewport = Viewport::new(600.0, 800.0, 1.0);
        let rect = Ltwh::new(12.5, 40.0, 100.0, 18.0);
        assert_ltwh_eq(scaled_to_viewport(rect, &viewport), rect);
    }

    #[test]
    fn test_scales_linearly() {
        let rect = Ltwh::new(10.0, 20.0, 30.0, 40.0);
        let once = scaled_to_viewport(rect, &Viewport::new(600.0, 800.0, 1.5));
        let twice = scaled_to_viewport(rect, &Viewport::new(1200.0, 1600.0, 3.0));
        assert_ltwh_eq(
            twice,
            Ltwh::new(
                once.left * 2.0,
                once.top * 2.0,
                once.width * 2.0,
                once.height * 2.0,
            ),
        );
    }

    #[test]
    fn test_offset_applied_after_scale() {
        let viewport = Viewport::new(600.0, 800.0, 2.0).with_offset(Vec2::new(5.0, -3.0));
        let out = viewport.to_viewport_rect(Ltwh::new(10.0, 10.0, 4.0, 4.0));
        assert_ltwh_eq(out, Ltwh::new(25.0, 17.0, 8.0, 8.0));
    }

    #[test]
    fn test_negative_extent_passes_through() {
        let viewport = Viewport::new(600.0, 800.0, 2.0);
        let out = viewport.to_viewport_rect(Ltwh::new(10.0, 10.0, -4.0, -6.0));
        assert_ltwh_eq(out, Ltwh::new(20.0, 20.0, -8.0, -12.0));
    }

    #[test]
    fn test_transform_matches_rect_mapping() {
        let viewport = Viewport::new(600.0, 800.0, 1.25).with_offset(Vec2::new(7.0, 9.0));
        let mapped = viewport.transform() * Point::new(40.0, 60.0);
        let rect = viewport.to_viewport_rect(Ltwh::new(40.0, 60.0, 0.0, 0.0));
        assert!((mapped.x - rect.left).abs() < 1e-10);
        assert!((mapped.y - rect.top).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_page_point() {
        let viewport = Viewport::new(600.0, 800.0, 1.5).with_offset(Vec2::new(30.0, -20.0));
        let original = Point::new(123.0, 456.0);
        let back = viewport.to_page_point(viewport.transform() * original);
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_for_page() {
        let viewport = Viewport::for_page(Size::new(612.0, 792.0), 1.5);
        assert!((viewport.width - 918.0).abs() < f64::EPSILON);
        assert!((viewport.height - 1188.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ltwh_rect_conversion() {
        let rect = Ltwh::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Ltwh::from_rect(rect.to_rect()), rect);
    }

    #[test]
    fn test_device_pixel_ratio_validation() {
        assert!(DevicePixelRatio::new(0.0).is_none());
        assert!(DevicePixelRatio::new(-1.0).is_none());
        assert!(DevicePixelRatio::new(f64::NAN).is_none());
        assert_eq!(
            DevicePixelRatio::new(2.0).map(DevicePixelRatio::get),
            Some(2.0)
        );
        assert_eq!(DevicePixelRatio::default().get(), 1.0);
    }
}
