//! Highlight renderer.

use crate::surface::Surface;
use kurbo::Rect;
use pagemark_core::geometry::{Viewport, scaled_to_viewport};
use pagemark_core::highlight::PageHighlight;
use pagemark_core::style::{HighlightStyle, StyleResolver};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("Invalid backing store size {width}x{height}")]
    InvalidBackingSize { width: u32, height: u32 },
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Counters from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Records visited.
    pub records: usize,
    /// Rectangles painted (one per area, one per text fragment).
    pub rects: usize,
}

/// Paint one rectangle (display units) with `style`.
///
/// Starts a fresh path so earlier rectangles are not filled again.
pub fn paint_highlight_rect<S: Surface + ?Sized>(
    surface: &mut S,
    rect: Rect,
    style: &HighlightStyle,
) -> RenderResult<()> {
    surface.begin_path();
    let radius = style.corner_radius();
    if radius > 0.0 {
        surface.round_rect(rect, radius);
    } else {
        surface.rect(rect);
    }
    surface.fill(style.fill_color.into())?;

    if style.draws_stroke() {
        surface.stroke(style.stroke_color().into(), style.stroke_width())?;
    }
    Ok(())
}

/// Repaints a page's highlights onto a synchronized surface.
///
/// Every pass is a full clear followed by a repaint in sequence order.
#[derive(Debug, Clone, Default)]
pub struct HighlightRenderer {
    styles: StyleResolver,
}

impl HighlightRenderer {
    pub fn new(styles: StyleResolver) -> Self {
        Self { styles }
    }

    pub fn styles(&self) -> &StyleResolver {
        &self.styles
    }

    pub fn set_styles(&mut self, styles: StyleResolver) {
        self.styles = styles;
    }

    /// Clear the whole surface and paint every record of `highlights`.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        highlights: &[PageHighlight],
        viewport: &Viewport,
    ) -> RenderResult<RenderStats> {
        // The logical size is rounded up from the viewport; cover both.
        let logical = surface.logical_size();
        surface.clear_rect(Rect::new(
            0.0,
            0.0,
            logical.width.max(viewport.width),
            logical.height.max(viewport.height),
        ))?;

        let mut stats = RenderStats::default();
        for record in highlights {
            let style = self.styles.resolve_for(record);
            for rect in record.position().rects() {
                let position = scaled_to_viewport(*rect, viewport);
                paint_highlight_rect(surface, position.to_rect(), &style)?;
                stats.rects += 1;
            }
            stats.records += 1;
        }
        log::trace!(
            "rendered {} highlight rects from {} records",
            stats.rects,
            stats.records
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawOp, RecordingSurface};
    use kurbo::{Size, Vec2};
    use pagemark_core::geometry::Ltwh;
    use pagemark_core::highlight::{GhostHighlight, Highlight, HighlightPosition};
    use pagemark_core::style::{DEFAULT_HIGHLIGHT_STYLE, Rgba, StyleOverride};

    fn area(id: &str, rect: Ltwh) -> PageHighlight {
        Highlight::new(id, HighlightPosition::Area { bounding_rect: rect }).into()
    }

    fn text(rects: Vec<Ltwh>) -> PageHighlight {
        GhostHighlight::new(HighlightPosition::Text { rects }).into()
    }

    #[test]
    fn test_paint_rounded_with_stroke() {
        let mut surface = RecordingSurface::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        paint_highlight_rect(&mut surface, rect, &DEFAULT_HIGHLIGHT_STYLE).unwrap();
        assert_eq!(
            surface.ops(),
            &[
                DrawOp::BeginPath,
                DrawOp::RoundRect { rect, radius: 2.0 },
                DrawOp::Fill(DEFAULT_HIGHLIGHT_STYLE.fill_color),
                DrawOp::Stroke {
                    color: Rgba::new(190, 81, 3, 102),
                    width: 2.0
                },
            ]
        );
    }

    #[test]
    fn test_paint_plain_fill_only() {
        let mut surface = RecordingSurface::new();
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        let style = HighlightStyle::fill(Rgba::new(1, 2, 3, 4));
        paint_highlight_rect(&mut surface, rect, &style).unwrap();
        assert_eq!(
            surface.ops(),
            &[DrawOp::BeginPath, DrawOp::Rect(rect), DrawOp::Fill(Rgba::new(1, 2, 3, 4))]
        );
    }

    #[test]
    fn test_stroke_without_color_is_transparent() {
        let mut surface = RecordingSurface::new();
        let style = HighlightStyle {
            stroke_width: Some(1.0),
            ..HighlightStyle::fill(Rgba::new(9, 9, 9, 9))
        };
        paint_highlight_rect(&mut surface, Rect::ZERO, &style).unwrap();
        assert_eq!(
            surface.ops().last(),
            Some(&DrawOp::Stroke {
                color: Rgba::TRANSPARENT,
                width: 1.0
            })
        );
    }

    #[test]
    fn test_clear_precedes_paint_and_counts_match() {
        let mut surface = RecordingSurface::new();
        surface.resize(Size::new(200.0, 300.0), 200, 300).unwrap();
        surface.take_ops();
        let viewport = Viewport::new(200.0, 300.0, 1.0);
        let highlights = vec![
            area("a", Ltwh::new(0.0, 0.0, 10.0, 10.0)),
            text(vec![
                Ltwh::new(0.0, 20.0, 50.0, 10.0),
                Ltwh::new(0.0, 32.0, 40.0, 10.0),
                Ltwh::new(0.0, 44.0, 30.0, 10.0),
            ]),
            area("b", Ltwh::new(5.0, 5.0, 10.0, 10.0)),
        ];

        let stats = HighlightRenderer::default()
            .render(&mut surface, &highlights, &viewport)
            .unwrap();

        assert_eq!(stats, RenderStats { records: 3, rects: 5 });
        assert_eq!(
            surface.ops().first(),
            Some(&DrawOp::ClearRect(Rect::new(0.0, 0.0, 200.0, 300.0)))
        );
        assert_eq!(surface.fill_count(), 5);
        assert_eq!(surface.clear_count(), 1);
    }

    #[test]
    fn test_clear_covers_rounded_up_surface() {
        let mut surface = RecordingSurface::new();
        surface.resize(Size::new(101.0, 50.0), 202, 100).unwrap();
        surface.take_ops();
        HighlightRenderer::default()
            .render(&mut surface, &[], &Viewport::new(100.2, 49.5, 1.0))
            .unwrap();
        let surface_area = Rect::new(0.0, 0.0, 101.0, 50.0);
        assert_eq!(surface.ops(), &[DrawOp::ClearRect(surface_area)]);
    }

    #[test]
    fn test_empty_sequence_only_clears() {
        let mut surface = RecordingSurface::new();
        let stats = HighlightRenderer::default()
            .render(&mut surface, &[], &Viewport::new(10.0, 10.0, 1.0))
            .unwrap();
        assert_eq!(stats, RenderStats::default());
        assert_eq!(surface.ops().len(), 1);
    }

    #[test]
    fn test_rects_are_transformed() {
        let mut surface = RecordingSurface::new();
        let viewport = Viewport::new(400.0, 400.0, 2.0).with_offset(Vec2::new(1.0, 1.0));
        let style = StyleOverride {
            corner_radius: Some(0.0),
            ..Default::default()
        };
        let highlight: PageHighlight = Highlight::new(
            "a",
            HighlightPosition::Area {
                bounding_rect: Ltwh::new(10.0, 20.0, 5.0, 5.0),
            },
        )
        .with_style(style)
        .into();

        HighlightRenderer::default()
            .render(&mut surface, &[highlight], &viewport)
            .unwrap();
        let device = Rect::new(21.0, 41.0, 31.0, 51.0);
        assert!(surface.ops().contains(&DrawOp::Rect(device)));
    }

    #[test]
    fn test_surface_failure_aborts_pass() {
        let mut surface = RecordingSurface::new();
        surface.set_unavailable(true);
        let result = HighlightRenderer::default().render(
            &mut surface,
            &[area("a", Ltwh::new(0.0, 0.0, 1.0, 1.0))],
            &Viewport::new(10.0, 10.0, 1.0),
        );
        assert!(matches!(result, Err(RendererError::SurfaceUnavailable(_))));
    }
}
