//! Keeps a surface's size and scale in step with the viewport.

use crate::renderer::RenderResult;
use crate::surface::Surface;
use kurbo::Size;
use pagemark_core::geometry::{DevicePixelRatio, Viewport};

/// Sizes a surface must have for one viewport and pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Display-unit size, rounded up to whole units.
    pub logical: Size,
    pub backing_width: u32,
    pub backing_height: u32,
    /// Context scale; always the device pixel ratio.
    pub scale: f64,
}

impl SurfaceMetrics {
    pub fn compute(viewport: &Viewport, ratio: DevicePixelRatio) -> Self {
        let logical = Size::new(
            viewport.width.max(0.0).ceil(),
            viewport.height.max(0.0).ceil(),
        );
        let scale = ratio.get();
        Self {
            logical,
            backing_width: (logical.width * scale).floor() as u32,
            backing_height: (logical.height * scale).floor() as u32,
            scale,
        }
    }
}

/// Tracks the metrics last applied to a surface and re-applies them when the
/// viewport dimensions or pixel ratio change.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSync {
    applied: Option<SurfaceMetrics>,
}

impl SurfaceSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics currently applied, if any.
    pub fn applied(&self) -> Option<&SurfaceMetrics> {
        self.applied.as_ref()
    }

    /// Forget the applied metrics so the next [`Self::sync`] resizes.
    pub fn invalidate(&mut self) {
        self.applied = None;
    }

    pub fn needs_sync(&self, viewport: &Viewport, ratio: DevicePixelRatio) -> bool {
        self.applied != Some(SurfaceMetrics::compute(viewport, ratio))
    }

    /// Resize and rescale `surface` if needed. Returns `true` when the surface
    /// was resized, which clears its content.
    pub fn sync<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        viewport: &Viewport,
        ratio: DevicePixelRatio,
    ) -> RenderResult<bool> {
        let metrics = SurfaceMetrics::compute(viewport, ratio);
        if self.applied == Some(metrics) {
            return Ok(false);
        }

        // Until the resize succeeds the surface matches no known metrics.
        self.applied = None;
        surface.resize(
            metrics.logical,
            metrics.backing_width,
            metrics.backing_height,
        )?;
        surface.set_scale(metrics.scale);
        log::debug!(
            "surface synced: logical {}x{}, backing {}x{}, scale {}",
            metrics.logical.width,
            metrics.logical.height,
            metrics.backing_width,
            metrics.backing_height,
            metrics.scale
        );
        self.applied = Some(metrics);
        Ok(true)
    }
}
