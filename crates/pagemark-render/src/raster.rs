//! CPU raster surface backed by a tiny-skia pixmap.

use crate::renderer::{RenderResult, RendererError};
use crate::surface::Surface;
use kurbo::{BezPath, PathEl, Point, Rect, RoundedRect, Shape as KurboShape, Size};
use pagemark_core::style::Rgba;
use peniko::Color;
use tiny_skia::{BlendMode, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

/// Flattening tolerance for rounded corners, in display units.
const PATH_TOLERANCE: f64 = 0.1;

/// A [`Surface`] whose backing store is an RGBA pixmap.
///
/// A zero-sized backing store is allowed; painting onto it is a no-op.
pub struct PixmapSurface {
    logical: Size,
    pixmap: Option<Pixmap>,
    scale: f64,
    path: BezPath,
}

impl Default for PixmapSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("logical", &self.logical)
            .field("backing", &self.backing_size())
            .field("scale", &self.scale)
            .finish()
    }
}

impl PixmapSurface {
    /// Create an unsized surface; call [`Surface::resize`] before drawing.
    pub fn new() -> Self {
        Self {
            logical: Size::ZERO,
            pixmap: None,
            scale: 1.0,
            path: BezPath::new(),
        }
    }

    /// The backing store, if it has a non-zero size.
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Straight-alpha color of one backing-store pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let color = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some(Rgba::new(
            color.red(),
            color.green(),
            color.blue(),
            color.alpha(),
        ))
    }

    /// Backing store as straight-alpha RGBA8 rows.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let Some(pixmap) = &self.pixmap else {
            return Vec::new();
        };
        let mut data = Vec::with_capacity(pixmap.data().len());
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            data.extend_from_slice(&[
                color.red(),
                color.green(),
                color.blue(),
                color.alpha(),
            ]);
        }
        data
    }

    /// Draw `other` on top of this surface, pixel for pixel.
    pub fn composite(&mut self, other: &PixmapSurface) {
        if let (Some(target), Some(source)) = (self.pixmap.as_mut(), other.pixmap.as_ref()) {
            target.draw_pixmap(
                0,
                0,
                source.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    fn transform(&self) -> Transform {
        Transform::from_scale(self.scale as f32, self.scale as f32)
    }

    fn paint(color: Color) -> Paint<'static> {
        let rgba = color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
        paint.anti_alias = true;
        paint
    }

    fn current_path(&self) -> Option<tiny_skia::Path> {
        to_skia_path(&self.path)
    }
}

/// Convert a kurbo path; `None` when it has nothing to paint.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

impl Surface for PixmapSurface {
    fn logical_size(&self) -> Size {
        self.logical
    }

    fn backing_size(&self) -> (u32, u32) {
        self.pixmap
            .as_ref()
            .map(|p| (p.width(), p.height()))
            .unwrap_or((0, 0))
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn resize(
        &mut self,
        logical: Size,
        backing_width: u32,
        backing_height: u32,
    ) -> RenderResult<()> {
        // Allocate first so a failure leaves the surface untouched.
        let pixmap = if backing_width == 0 || backing_height == 0 {
            None
        } else {
            Some(
                Pixmap::new(backing_width, backing_height).ok_or(RendererError::InvalidBackingSize {
                    width: backing_width,
                    height: backing_height,
                })?,
            )
        };
        self.pixmap = pixmap;
        self.logical = logical;
        self.scale = 1.0;
        self.path = BezPath::new();
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn clear_rect(&mut self, rect: Rect) -> RenderResult<()> {
        let scale = self.scale;
        let Some(pixmap) = self.pixmap.as_mut() else {
            return Ok(());
        };

        // Device-pixel bounds, rounded outward so partially covered pixels are cleared too.
        let device = Rect::new(
            rect.min_x() * scale,
            rect.min_y() * scale,
            rect.max_x() * scale,
            rect.max_y() * scale,
        )
        .expand();
        let full = Rect::new(0.0, 0.0, pixmap.width() as f64, pixmap.height() as f64);
        if device.x0 <= full.x0
            && device.y0 <= full.y0
            && device.x1 >= full.x1
            && device.y1 >= full.y1
        {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
            return Ok(());
        }

        let clipped = device.intersect(full);
        if let Some(area) = tiny_skia::Rect::from_ltrb(
            clipped.x0 as f32,
            clipped.y0 as f32,
            clipped.x1 as f32,
            clipped.y1 as f32,
        ) {
            let mut paint = Paint::default();
            paint.blend_mode = BlendMode::Clear;
            paint.anti_alias = false;
            pixmap.fill_rect(area, &paint, Transform::identity(), None);
        }
        Ok(())
    }

    fn begin_path(&mut self) {
        self.path = BezPath::new();
    }

    fn move_to(&mut self, point: Point) {
        self.path.move_to(point);
    }

    fn line_to(&mut self, point: Point) {
        if self.path.elements().is_empty() {
            self.path.move_to(point);
        } else {
            self.path.line_to(point);
        }
    }

    fn rect(&mut self, rect: Rect) {
        self.path.extend(rect.path_elements(PATH_TOLERANCE));
    }

    fn round_rect(&mut self, rect: Rect, radius: f64) {
        let rounded = RoundedRect::from_rect(rect, radius);
        self.path.extend(rounded.path_elements(PATH_TOLERANCE));
    }

    fn fill(&mut self, color: Color) -> RenderResult<()> {
        let transform = self.transform();
        let path = self.current_path();
        if let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), path) {
            pixmap.fill_path(
                &path,
                &Self::paint(color),
                FillRule::Winding,
                transform,
                None,
            );
        }
        Ok(())
    }

    fn stroke(&mut self, color: Color, width: f64) -> RenderResult<()> {
        let transform = self.transform();
        let path = self.current_path();
        if let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), path) {
            let stroke = Stroke {
                width: width as f32,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &Self::paint(color), &stroke, transform, None);
        }
        Ok(())
    }
}
