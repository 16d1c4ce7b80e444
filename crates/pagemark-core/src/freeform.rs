//! Freeform selection capture.
//!
//! Turns a pointer gesture into a closed polygon in surface-pixel space.
//! The state machine only decides; painting the returned [`CaptureEffect`]
//! is left to the caller so that a failed draw never disturbs a session.

use crate::input::{MouseButton, PointerEvent};
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

/// Endpoint distance (display units, per axis) at or below which a path is
/// already considered closed.
pub const CLOSURE_THRESHOLD: f64 = 2.0;

/// Decides, per event, whether freeform capture is currently permitted.
pub trait EligibilityPredicate {
    fn is_eligible(&self, event: &PointerEvent) -> bool;
}

impl<F> EligibilityPredicate for F
where
    F: Fn(&PointerEvent) -> bool,
{
    fn is_eligible(&self, event: &PointerEvent) -> bool {
        self(event)
    }
}

/// Accept every event.
pub fn always(_event: &PointerEvent) -> bool {
    true
}

/// Accept events while the Alt key is held.
pub fn alt_key_held(event: &PointerEvent) -> bool {
    event.modifiers().alt
}

/// Accept moves, and presses/releases of the left button only.
pub fn primary_button(event: &PointerEvent) -> bool {
    match event.button() {
        Some(button) => button == MouseButton::Left,
        None => true,
    }
}

/// Points recorded during one capture session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreeformPath {
    points: Vec<Point>,
}

impl FreeformPath {
    /// Start a path at `point`.
    pub fn starting_at(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Whether the last point is farther than `threshold` from the first on
    /// either axis.
    pub fn needs_closing(&self, threshold: f64) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => {
                (last.x - first.x).abs() > threshold || (last.y - first.y).abs() > threshold
            }
            _ => false,
        }
    }

    /// Close the path if needed and hand out the polygon.
    ///
    /// Returns the closing segment `(last, first)` when one was appended.
    pub fn close(mut self, threshold: f64) -> (FreeformPolygon, Option<(Point, Point)>) {
        let mut closing = None;
        if self.needs_closing(threshold) {
            if let (Some(first), Some(last)) = (self.first(), self.last()) {
                self.points.push(first);
                closing = Some((last, first));
            }
        }
        (
            FreeformPolygon {
                points: self.points,
            },
            closing,
        )
    }
}

/// A completed freeform selection in surface-pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeformPolygon {
    pub points: Vec<Point>,
}

impl FreeformPolygon {
    /// Fewer than three distinct vertices encloses no area.
    pub fn is_degenerate(&self) -> bool {
        let mut distinct: Vec<Point> = Vec::with_capacity(3);
        for point in &self.points {
            if !distinct.contains(point) {
                distinct.push(*point);
                if distinct.len() == 3 {
                    return false;
                }
            }
        }
        true
    }

    /// Open polyline through every point, in order.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };

        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
        }
        path
    }
}

/// Why a session ended without a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Pointer-up arrived while the predicate rejected the event.
    Rejected,
    /// The host cancelled the pointer stream.
    Cancelled,
    /// The pointer left the surface (only with `cancel_on_leave`).
    Left,
}

/// What the caller should paint (and forward) after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEffect {
    /// A session began; the preview stroke starts at `origin`.
    Started { origin: Point },
    /// Extend the preview by one segment.
    Extended { from: Point, to: Point },
    /// The gesture finished. Stroke `closing_segment` if present, fill the
    /// polygon and hand it to the annotation store.
    Completed {
        closing_segment: Option<(Point, Point)>,
        polygon: FreeformPolygon,
    },
    /// The session ended without a selection.
    Discarded { reason: DiscardReason, points: usize },
}

/// Capture state. The path is owned by the `Drawing` variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CaptureState {
    #[default]
    Idle,
    Drawing(FreeformPath),
}

/// Tuning for the capture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// See [`CLOSURE_THRESHOLD`].
    pub closure_threshold: f64,
    /// End an unfinished session when the pointer leaves the surface.
    pub cancel_on_leave: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            closure_threshold: CLOSURE_THRESHOLD,
            cancel_on_leave: false,
        }
    }
}

impl CaptureConfig {
    pub fn with_cancel_on_leave(mut self, cancel_on_leave: bool) -> Self {
        self.cancel_on_leave = cancel_on_leave;
        self
    }

    pub fn with_closure_threshold(mut self, threshold: f64) -> Self {
        self.closure_threshold = threshold;
        self
    }
}

/// Pointer-driven freeform capture for one surface.
#[derive(Debug, Clone)]
pub struct FreeformCapture<P> {
    predicate: P,
    state: CaptureState,
    config: CaptureConfig,
}

impl<P: EligibilityPredicate> FreeformCapture<P> {
    pub fn new(predicate: P) -> Self {
        Self::with_config(predicate, CaptureConfig::default())
    }

    pub fn with_config(predicate: P, config: CaptureConfig) -> Self {
        Self {
            predicate,
            state: CaptureState::Idle,
            config,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Replace the configuration; an active session continues under it.
    pub fn set_config(&mut self, config: CaptureConfig) {
        self.config = config;
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Check if a session is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, CaptureState::Drawing(_))
    }

    /// Points of the active session, if any.
    pub fn active_path(&self) -> Option<&FreeformPath> {
        match &self.state {
            CaptureState::Drawing(path) => Some(path),
            CaptureState::Idle => None,
        }
    }

    /// Feed one pointer event. `surface_origin` is the surface's top-left
    /// corner in the event's client coordinates.
    pub fn handle_event(
        &mut self,
        event: &PointerEvent,
        surface_origin: Point,
    ) -> Option<CaptureEffect> {
        match event {
            PointerEvent::Down { .. } => self.pointer_down(event, surface_origin),
            PointerEvent::Move { .. } => self.pointer_move(event, surface_origin),
            PointerEvent::Up { .. } => self.pointer_up(event),
            PointerEvent::Leave { .. } => {
                if self.config.cancel_on_leave {
                    self.discard(DiscardReason::Left)
                } else {
                    None
                }
            }
            PointerEvent::Cancel => self.discard(DiscardReason::Cancelled),
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent, origin: Point) -> Option<CaptureEffect> {
        if !self.predicate.is_eligible(event) {
            log::trace!("freeform: pointer-down not eligible");
            return None;
        }
        let point = event.surface_position(origin)?;

        if let CaptureState::Drawing(previous) = &self.state {
            log::debug!(
                "freeform: replacing unfinished session with {} points",
                previous.len()
            );
        }
        self.state = CaptureState::Drawing(FreeformPath::starting_at(point));
        log::debug!(
            "freeform: session started at ({:.1}, {:.1})",
            point.x,
            point.y
        );
        Some(CaptureEffect::Started { origin: point })
    }

    fn pointer_move(&mut self, event: &PointerEvent, origin: Point) -> Option<CaptureEffect> {
        let CaptureState::Drawing(path) = &mut self.state else {
            return None;
        };
        if !self.predicate.is_eligible(event) {
            log::trace!("freeform: pointer-move not eligible, session kept");
            return None;
        }
        let point = event.surface_position(origin)?;
        let from = path.last().unwrap_or(point);
        path.push(point);
        Some(CaptureEffect::Extended { from, to: point })
    }

    fn pointer_up(&mut self, event: &PointerEvent) -> Option<CaptureEffect> {
        let CaptureState::Drawing(path) = std::mem::take(&mut self.state) else {
            return None;
        };

        if !self.predicate.is_eligible(event) {
            log::debug!(
                "freeform: pointer-up not eligible, discarding {} points",
                path.len()
            );
            return Some(CaptureEffect::Discarded {
                reason: DiscardReason::Rejected,
                points: path.len(),
            });
        }

        let (polygon, closing_segment) = path.close(self.config.closure_threshold);
        log::debug!(
            "freeform: session completed with {} points (closed: {})",
            polygon.points.len(),
            closing_segment.is_some()
        );
        Some(CaptureEffect::Completed {
            closing_segment,
            polygon,
        })
    }

    /// End the active session without a selection.
    pub fn cancel(&mut self) -> Option<CaptureEffect> {
        self.discard(DiscardReason::Cancelled)
    }

    fn discard(&mut self, reason: DiscardReason) -> Option<CaptureEffect> {
        let CaptureState::Drawing(path) = std::mem::take(&mut self.state) else {
            return None;
        };
        log::debug!(
            "freeform: session discarded ({:?}), {} points",
            reason,
            path.len()
        );
        Some(CaptureEffect::Discarded {
            reason,
            points: path.len(),
        })
    }
}
