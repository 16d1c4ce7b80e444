//! Per-page layers binding surfaces to viewport state.
//!
//! [`HighlightLayer`] repaints committed and ghost highlights when something
//! it depends on changes. [`InteractionLayer`] drives freeform capture and
//! paints its preview on a separate surface.

use crate::renderer::{HighlightRenderer, RenderResult, RenderStats};
use crate::surface::Surface;
use crate::sync::SurfaceSync;
use kurbo::{BezPath, PathEl, Point, Rect};
use pagemark_core::freeform::{
    CaptureConfig, CaptureEffect, EligibilityPredicate, FreeformCapture, FreeformPolygon,
};
use pagemark_core::geometry::{DevicePixelRatio, Viewport};
use pagemark_core::highlight::HighlightsByPage;
use pagemark_core::input::PointerEvent;
use pagemark_core::style::{
    FREEFORM_FILL_COLOR, FREEFORM_PREVIEW_STYLE, HighlightStyle, Rgba, StyleResolver,
};

/// Receives completed freeform selections.
pub trait AnnotationSink {
    fn freeform_selection(&mut self, page_number: u32, polygon: FreeformPolygon);
}

impl<F> AnnotationSink for F
where
    F: FnMut(u32, FreeformPolygon),
{
    fn freeform_selection(&mut self, page_number: u32, polygon: FreeformPolygon) {
        self(page_number, polygon)
    }
}

/// Paints one page's highlights.
///
/// Changes to the page number, viewport or pixel ratio mark the layer dirty;
/// highlight store changes must be signalled with [`HighlightLayer::invalidate`].
#[derive(Debug)]
pub struct HighlightLayer<S> {
    surface: Option<S>,
    sync: SurfaceSync,
    renderer: HighlightRenderer,
    page_number: u32,
    viewport: Option<Viewport>,
    device_pixel_ratio: DevicePixelRatio,
    dirty: bool,
}

impl<S: Surface> HighlightLayer<S> {
    /// Create a layer for a 1-indexed page.
    pub fn new(page_number: u32, device_pixel_ratio: DevicePixelRatio) -> Self {
        Self {
            surface: None,
            sync: SurfaceSync::new(),
            renderer: HighlightRenderer::default(),
            page_number,
            viewport: None,
            device_pixel_ratio,
            dirty: true,
        }
    }

    /// Set the style resolver.
    pub fn with_styles(mut self, styles: StyleResolver) -> Self {
        self.renderer.set_styles(styles);
        self
    }

    pub fn attach_surface(&mut self, surface: S) {
        self.surface = Some(surface);
        self.sync.invalidate();
        self.dirty = true;
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.sync.invalidate();
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn set_page_number(&mut self, page_number: u32) {
        if self.page_number != page_number {
            self.page_number = page_number;
            self.dirty = true;
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport != Some(viewport) {
            self.viewport = Some(viewport);
            self.dirty = true;
        }
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: DevicePixelRatio) {
        if self.device_pixel_ratio != ratio {
            self.device_pixel_ratio = ratio;
            self.dirty = true;
        }
    }

    pub fn set_styles(&mut self, styles: StyleResolver) {
        self.renderer.set_styles(styles);
        self.dirty = true;
    }

    /// Signal that the highlight sequence changed.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sync the surface and repaint if anything changed.
    ///
    /// Returns `None` when nothing was painted: no surface, no viewport yet,
    /// already up to date, or the draw call failed.
    pub fn render(&mut self, highlights: &HighlightsByPage) -> Option<RenderStats> {
        let (Some(surface), Some(viewport)) = (self.surface.as_mut(), self.viewport.as_ref()) else {
            return None;
        };

        match self.sync.sync(surface, viewport, self.device_pixel_ratio) {
            Ok(true) => self.dirty = true,
            Ok(false) => {}
            Err(e) => {
                log::warn!("page {}: surface sync failed: {}", self.page_number, e);
                return None;
            }
        }

        if !self.dirty {
            return None;
        }

        match self
            .renderer
            .render(surface, highlights.page(self.page_number), viewport)
        {
            Ok(stats) => {
                self.dirty = false;
                Some(stats)
            }
            Err(e) => {
                log::warn!("page {}: highlight render aborted: {}", self.page_number, e);
                None
            }
        }
    }
}

/// Preview and confirmation styling for freeform capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionStyle {
    /// Stroke used for the live preview; its fill is ignored.
    pub preview: HighlightStyle,
    /// Fill of a completed selection.
    pub fill_color: Rgba,
}

impl Default for InteractionStyle {
    fn default() -> Self {
        Self {
            preview: FREEFORM_PREVIEW_STYLE,
            fill_color: FREEFORM_FILL_COLOR,
        }
    }
}

/// Captures freeform selections on one page.
pub struct InteractionLayer<S, P, K> {
    surface: Option<S>,
    sync: SurfaceSync,
    capture: FreeformCapture<P>,
    sink: K,
    style: InteractionStyle,
    page_number: u32,
    viewport: Option<Viewport>,
    device_pixel_ratio: DevicePixelRatio,
}

impl<S, P, K> InteractionLayer<S, P, K>
where
    S: Surface,
    P: EligibilityPredicate,
    K: AnnotationSink,
{
    pub fn new(
        page_number: u32,
        device_pixel_ratio: DevicePixelRatio,
        predicate: P,
        sink: K,
    ) -> Self {
        Self {
            surface: None,
            sync: SurfaceSync::new(),
            capture: FreeformCapture::new(predicate),
            sink,
            style: InteractionStyle::default(),
            page_number,
            viewport: None,
            device_pixel_ratio,
        }
    }

    pub fn with_capture_config(mut self, config: CaptureConfig) -> Self {
        self.capture.set_config(config);
        self
    }

    pub fn with_style(mut self, style: InteractionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn attach_surface(&mut self, surface: S) {
        self.surface = Some(surface);
        self.sync.invalidate();
        self.sync_surface();
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.sync.invalidate();
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn capture(&self) -> &FreeformCapture<P> {
        &self.capture
    }

    pub fn set_page_number(&mut self, page_number: u32) {
        self.page_number = page_number;
    }

    /// Update viewport geometry; a size change resizes (and clears) the surface.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.sync_surface();
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: DevicePixelRatio) {
        self.device_pixel_ratio = ratio;
        self.sync_surface();
    }

    /// Returns `false` when the surface cannot be painted on: missing, no
    /// viewport yet, or the resize failed.
    fn sync_surface(&mut self) -> bool {
        let (Some(surface), Some(viewport)) = (self.surface.as_mut(), self.viewport.as_ref()) else {
            return false;
        };
        match self.sync.sync(surface, viewport, self.device_pixel_ratio) {
            Ok(_) => true,
            Err(e) => {
                log::warn!(
                    "page {}: interaction surface sync failed: {}",
                    self.page_number,
                    e
                );
                false
            }
        }
    }

    /// Route one pointer event through the capture state machine, paint the
    /// outcome, and forward a completed polygon to the sink.
    pub fn handle_pointer_event(
        &mut self,
        event: &PointerEvent,
        surface_origin: Point,
    ) -> Option<CaptureEffect> {
        let effect = self.capture.handle_event(event, surface_origin)?;

        if self.sync_surface() {
            if let Some(surface) = self.surface.as_mut() {
                if let Err(e) = paint_effect(surface, &effect, &self.style) {
                    log::warn!(
                        "page {}: freeform preview draw aborted: {}",
                        self.page_number,
                        e
                    );
                }
            }
        }

        if let CaptureEffect::Completed { polygon, .. } = &effect {
            self.sink
                .freeform_selection(self.page_number, polygon.clone());
        }
        Some(effect)
    }

    /// Wipe preview and confirmation strokes.
    pub fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            let size = surface.logical_size();
            if let Err(e) = surface.clear_rect(Rect::from_origin_size(Point::ZERO, size)) {
                log::warn!(
                    "page {}: clearing interaction surface failed: {}",
                    self.page_number,
                    e
                );
            }
        }
    }
}

fn paint_effect<S: Surface + ?Sized>(
    surface: &mut S,
    effect: &CaptureEffect,
    style: &InteractionStyle,
) -> RenderResult<()> {
    match effect {
        // Each preview segment strokes its own path.
        CaptureEffect::Started { .. } => {}
        CaptureEffect::Extended { from, to } => {
            stroke_segment(surface, *from, *to, &style.preview)?
        }
        CaptureEffect::Completed {
            closing_segment,
            polygon,
        } => {
            if let Some((from, to)) = closing_segment {
                stroke_segment(surface, *from, *to, &style.preview)?;
            }
            surface.begin_path();
            trace_path(surface, &polygon.to_path());
            surface.fill(style.fill_color.into())?;
        }
        CaptureEffect::Discarded { .. } => {}
    }
    Ok(())
}

/// Replay `path` onto the surface's current path. Curves are flattened to
/// their end points; fills close subpaths implicitly.
fn trace_path<S: Surface + ?Sized>(surface: &mut S, path: &BezPath) {
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => surface.move_to(p),
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                surface.line_to(p)
            }
            PathEl::ClosePath => {}
        }
    }
}

fn stroke_segment<S: Surface + ?Sized>(
    surface: &mut S,
    from: Point,
    to: Point,
    style: &HighlightStyle,
) -> RenderResult<()> {
    if !style.draws_stroke() {
        return Ok(());
    }
    surface.begin_path();
    surface.move_to(from);
    surface.line_to(to);
    surface.stroke(style.stroke_color().into(), style.stroke_width())
}
