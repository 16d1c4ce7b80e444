//! Pagemark Render Library
//!
//! Surface abstraction and painting for page highlight overlays.
//! The default raster backend uses tiny-skia pixmaps.

pub mod layer;
pub mod recording;
mod renderer;
pub mod surface;
pub mod sync;

#[cfg(feature = "raster")]
mod raster;

pub use layer::{AnnotationSink, HighlightLayer, InteractionLayer, InteractionStyle};
pub use recording::{DrawOp, RecordingSurface};
pub use renderer::{
    HighlightRenderer, RenderResult, RenderStats, RendererError, paint_highlight_rect,
};
pub use surface::Surface;
pub use sync::{SurfaceMetrics, SurfaceSync};

#[cfg(feature = "raster")]
pub use raster::PixmapSurface;
