//! Pagemark demo: render one page's highlight overlay from a JSON scene,
//! optionally replay a freeform gesture on top, and write the result as PNG.

use kurbo::{Point, Size, Vec2};
use pagemark_core::freeform::{FreeformPolygon, alt_key_held, always};
use pagemark_core::geometry::{DevicePixelRatio, Viewport};
use pagemark_core::highlight::HighlightsByPage;
use pagemark_core::input::{Modifiers, PointerEvent};
use pagemark_core::style::{GHOST_HIGHLIGHT_STYLE, HighlightStyle, Rgba, StyleError, StyleResolver};
use pagemark_render::{AnnotationSink, HighlightLayer, InteractionLayer, PixmapSurface, Surface};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid scene: {0}")]
    Scene(#[from] serde_json::Error),
    #[error("Invalid color: {0}")]
    Style(#[from] StyleError),
    #[error("Render failed on page {0}")]
    Render(u32),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("Nothing to encode: backing store is {0}x{1}")]
    EmptyImage(u32, u32),
}

pub type DemoResult<T> = Result<T, DemoError>;

/// Scene description read from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoScene {
    /// 1-indexed page to render.
    pub page_number: u32,
    /// Unscaled page size.
    pub page_size: Size,
    pub zoom: f64,
    pub offset: Vec2,
    pub device_pixel_ratio: DevicePixelRatio,
    pub highlights_by_page: HighlightsByPage,
    /// CSS color replacing the default fill.
    pub default_fill: Option<String>,
    /// CSS fill for ghost highlights.
    pub ghost_fill: Option<String>,
    /// Freeform gesture in surface coordinates.
    pub gesture: Vec<Point>,
    /// Require the Alt key for capture; the gesture is replayed with Alt held
    /// except on the final pointer-up when `release_alt_early` is set.
    pub require_alt: bool,
    pub release_alt_early: bool,
    pub output: Option<PathBuf>,
}

impl Default for DemoScene {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: Size::new(612.0, 792.0),
            zoom: 1.0,
            offset: Vec2::ZERO,
            device_pixel_ratio: DevicePixelRatio::default(),
            highlights_by_page: HighlightsByPage::new(),
            default_fill: None,
            ghost_fill: None,
            gesture: Vec::new(),
            require_alt: false,
            release_alt_early: false,
            output: None,
        }
    }
}

impl DemoScene {
    pub fn from_json(json: &str) -> DemoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::for_page(self.page_size, self.zoom).with_offset(self.offset)
    }

    /// Style resolver with the scene's color overrides applied.
    pub fn styles(&self) -> DemoResult<StyleResolver> {
        let mut styles = StyleResolver::default();
        if let Some(fill) = &self.default_fill {
            styles.default_style.fill_color = fill.parse::<Rgba>()?;
        }
        if let Some(fill) = &self.ghost_fill {
            styles = styles.with_ghost_style(HighlightStyle {
                fill_color: fill.parse::<Rgba>()?,
                ..GHOST_HIGHLIGHT_STYLE
            });
        }
        Ok(styles)
    }
}

/// Completed selections, in emission order.
#[derive(Debug, Default)]
pub struct SelectionLog(pub Vec<(u32, FreeformPolygon)>);

impl AnnotationSink for SelectionLog {
    fn freeform_selection(&mut self, page_number: u32, polygon: FreeformPolygon) {
        log::info!(
            "Freeform selection on page {}: {} points",
            page_number,
            polygon.points.len()
        );
        self.0.push((page_number, polygon));
    }
}

/// Composited overlay for one page.
#[derive(Debug)]
pub struct RenderedScene {
    pub surface: PixmapSurface,
    pub highlight_rects: usize,
    pub selections: Vec<(u32, FreeformPolygon)>,
}

/// Paint highlights, replay the gesture, and composite both layers.
pub fn render_scene(scene: &DemoScene) -> DemoResult<RenderedScene> {
    let viewport = scene.viewport();
    let ratio = scene.device_pixel_ratio;

    let mut highlights = HighlightLayer::new(scene.page_number, ratio).with_styles(scene.styles()?);
    highlights.set_viewport(viewport);
    highlights.attach_surface(PixmapSurface::new());
    let stats = highlights
        .render(&scene.highlights_by_page)
        .ok_or(DemoError::Render(scene.page_number))?;

    let predicate: fn(&PointerEvent) -> bool = if scene.require_alt {
        alt_key_held
    } else {
        always
    };
    let mut interaction = InteractionLayer::new(
        scene.page_number,
        ratio,
        predicate,
        SelectionLog::default(),
    );
    interaction.set_viewport(viewport);
    interaction.attach_surface(PixmapSurface::new());
    for event in gesture_events(scene) {
        interaction.handle_pointer_event(&event, Point::ZERO);
    }

    let mut surface = highlights
        .detach_surface()
        .ok_or(DemoError::Render(scene.page_number))?;
    if let Some(preview) = interaction.detach_surface() {
        surface.composite(&preview);
    }

    Ok(RenderedScene {
        surface,
        highlight_rects: stats.rects,
        selections: std::mem::take(&mut interaction.sink_mut().0),
    })
}

/// Pointer events replaying the scene's gesture.
pub fn gesture_events(scene: &DemoScene) -> Vec<PointerEvent> {
    let (Some(first), Some(last)) = (scene.gesture.first(), scene.gesture.last()) else {
        return Vec::new();
    };
    let held = if scene.require_alt {
        Modifiers::ALT
    } else {
        Modifiers::NONE
    };
    let released = if scene.release_alt_early {
        Modifiers::NONE
    } else {
        held
    };

    let mut events = vec![PointerEvent::down(first.x, first.y).with_modifiers(held)];
    events.extend(
        scene.gesture[1..]
            .iter()
            .map(|p| PointerEvent::moved(p.x, p.y).with_modifiers(held)),
    );
    events.push(PointerEvent::up(last.x, last.y).with_modifiers(released));
    events
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> DemoResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(DemoError::EmptyImage(width, height));
    }
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}

/// Read a scene, render it, and write the PNG. Returns the path written.
pub fn run(scene_path: &Path, output: Option<&Path>) -> DemoResult<PathBuf> {
    let scene = DemoScene::from_json(&std::fs::read_to_string(scene_path)?)?;
    let rendered = render_scene(&scene)?;
    log::info!(
        "Rendered page {}: {} highlight rects, {} selections",
        scene.page_number,
        rendered.highlight_rects,
        rendered.selections.len()
    );

    let (width, height) = rendered.surface.backing_size();
    let png_data = encode_png(&rendered.surface.to_rgba8(), width, height)?;

    let path = output
        .map(Path::to_path_buf)
        .or_else(|| scene.output.clone())
        .unwrap_or_else(|| scene_path.with_extension("png"));
    std::fs::write(&path, &png_data)?;
    Ok(path)
}
