//! Pagemark Core Library
//!
//! Platform-agnostic data model, coordinate transforms, style resolution and
//! freeform selection capture for highlight overlays on paginated documents.

pub mod freeform;
pub mod geometry;
pub mod highlight;
pub mod input;
pub mod style;

pub use freeform::{
    CLOSURE_THRESHOLD, CaptureConfig, CaptureEffect, CaptureState, DiscardReason,
    EligibilityPredicate, FreeformCapture, FreeformPath, FreeformPolygon,
};
pub use geometry::{DevicePixelRatio, Ltwh, Viewport, scaled_to_viewport};
pub use highlight::{
    GhostHighlight, Highlight, HighlightId, HighlightPosition, HighlightsByPage, PageHighlight,
};
pub use input::{Modifiers, MouseButton, PointerEvent};
pub use style::{
    DEFAULT_HIGHLIGHT_STYLE, FREEFORM_FILL_COLOR, FREEFORM_PREVIEW_STYLE, GHOST_HIGHLIGHT_STYLE,
    HighlightStyle, Rgba, StyleError, StyleOverride, StyleResolver,
};
