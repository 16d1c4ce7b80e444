//! Immediate-mode drawing surface contract.

use crate::renderer::RenderResult;
use kurbo::{Point, Rect, Size};
use peniko::Color;

/// A 2D drawing surface with a logical size (display units) that is
/// independent of its backing-store size (device pixels).
///
/// Path construction methods build the current path; `fill` and `stroke`
/// paint it with the current scale applied. Implementations must clear all
/// pixel content and reset the scale to 1 on [`Surface::resize`].
pub trait Surface {
    /// Logical (display unit) size.
    fn logical_size(&self) -> Size;

    /// Backing-store size in device pixels.
    fn backing_size(&self) -> (u32, u32);

    /// Current uniform context scale.
    fn scale(&self) -> f64;

    /// Set logical and backing sizes. Clears pixel content and the transform.
    fn resize(
        &mut self,
        logical: Size,
        backing_width: u32,
        backing_height: u32,
    ) -> RenderResult<()>;

    /// Apply a uniform scale so later calls can use display units.
    fn set_scale(&mut self, scale: f64);

    /// Make `rect` (display units) fully transparent.
    fn clear_rect(&mut self, rect: Rect) -> RenderResult<()>;

    /// Discard the current path.
    fn begin_path(&mut self);

    fn move_to(&mut self, point: Point);

    fn line_to(&mut self, point: Point);

    /// Add a closed rectangle subpath.
    fn rect(&mut self, rect: Rect);

    /// Add a closed rounded-rectangle subpath.
    fn round_rect(&mut self, rect: Rect, radius: f64);

    /// Fill the current path.
    fn fill(&mut self, color: Color) -> RenderResult<()>;

    /// Stroke the current path.
    fn stroke(&mut self, color: Color, width: f64) -> RenderResult<()>;
}
