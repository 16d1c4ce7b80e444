//! A surface that records draw calls instead of rasterizing them.

use crate::renderer::{RenderResult, RendererError};
use crate::surface::Surface;
use kurbo::{Point, Rect, Size};
use pagemark_core::style::Rgba;
use peniko::Color;

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize {
        logical: Size,
        backing_width: u32,
        backing_height: u32,
    },
    SetScale(f64),
    ClearRect(Rect),
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Rect(Rect),
    RoundRect { rect: Rect, radius: f64 },
    Fill(Rgba),
    Stroke { color: Rgba, width: f64 },
}

/// Headless [`Surface`] that keeps an ordered log of calls.
///
/// A resize drops the log, mirroring a backing store losing its pixels.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    logical: Size,
    backing: (u32, u32),
    scale: f64,
    ops: Vec<DrawOp>,
    unavailable: bool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            logical: Size::ZERO,
            backing: (0, 0),
            scale: 1.0,
            ops: Vec::new(),
            unavailable: false,
        }
    }

    /// Calls recorded since the last resize (or [`Self::take_ops`]).
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn fill_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill(_)))
            .count()
    }

    pub fn stroke_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Stroke { .. }))
            .count()
    }

    pub fn clear_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::ClearRect(_)))
            .count()
    }

    /// Make painting calls fail, as when a drawing context cannot be created.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    fn check_available(&self) -> RenderResult<()> {
        if self.unavailable {
            Err(RendererError::SurfaceUnavailable(
                "recording surface marked unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Surface for RecordingSurface {
    fn logical_size(&self) -> Size {
        self.logical
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
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
        self.logical = logical;
        self.backing = (backing_width, backing_height);
        self.scale = 1.0;
        self.ops.clear();
        self.ops.push(DrawOp::Resize {
            logical,
            backing_width,
            backing_height,
        });
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.ops.push(DrawOp::SetScale(scale));
    }

    fn clear_rect(&mut self, rect: Rect) -> RenderResult<()> {
        self.check_available()?;
        self.ops.push(DrawOp::ClearRect(rect));
        Ok(())
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, point: Point) {
        self.ops.push(DrawOp::MoveTo(point));
    }

    fn line_to(&mut self, point: Point) {
        self.ops.push(DrawOp::LineTo(point));
    }

    fn rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Rect(rect));
    }

    fn round_rect(&mut self, rect: Rect, radius: f64) {
        self.ops.push(DrawOp::RoundRect { rect, radius });
    }

    fn fill(&mut self, color: Color) -> RenderResult<()> {
        self.check_available()?;
        self.ops.push(DrawOp::Fill(color.into()));
        Ok(())
    }

    fn stroke(&mut self, color: Color, width: f64) -> RenderResult<()> {
        self.check_available()?;
        self.ops.push(DrawOp::Stroke {
            color: color.into(),
            width,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_drops_history() {
        let mut surface = RecordingSurface::new();
        surface.begin_path();
        surface.set_scale(2.0);
        surface.resize(Size::new(10.0, 10.0), 20, 20).unwrap();
        assert_eq!(surface.ops().len(), 1);
        assert!((surface.scale() - 1.0).abs() < f64::EPSILON);
        assert_eq!(surface.backing_size(), (20, 20));
    }

    #[test]
    fn test_unavailable_fails_painting_only() {
        let mut surface = RecordingSurface::new();
        surface.set_unavailable(true);
        surface.begin_path();
        surface.rect(Rect::ZERO);
        let black = Color::from_rgba8(0, 0, 0, 255);
        assert!(surface.fill(black).is_err());
        assert!(surface.stroke(black, 1.0).is_err());
        assert!(surface.clear_rect(Rect::ZERO).is_err());
        assert_eq!(surface.fill_count(), 0);
        assert_eq!(surface.take_ops().len(), 2);
        assert!(surface.ops().is_empty());
    }
}
