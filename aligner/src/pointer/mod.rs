//! Per-panel pointer, selection and control-point state.
//!
//! The tracker only records state. Callers decide what a drag means for the
//! current mode and enforce preconditions (e.g. the control-point cap is
//! reported through [`ControlPointError::MaxControlPoints`]).

mod control_points;


pub use control_points::{ControlPointError, ControlPoints, MAX_CONTROL_POINTS};

use glam::DVec2;

use crate::crop::SelectionBox;
use crate::geometry::{Dims, Size};

/// Raw pointer input in client (window) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client: DVec2,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            client: DVec2::new(x, y),
        }
    }
}

/// On-screen placement of a panel canvas, in client coordinates.
///
/// The displayed size may differ from the canvas backing size when the host
/// scales the element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    /// Bounds matching the canvas backing size at the client origin.
    pub fn unscaled(canvas: Size) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: canvas.w as f64,
            height: canvas.h as f64,
        }
    }

    /// Client event position in canvas pixel coordinates.
    pub fn to_canvas(&self, event: &PointerEvent, canvas: Size) -> DVec2 {
        let displayed = Dims::new(0.0, 0.0, self.width, self.height);
        let backing = Dims::sized(canvas);
        crate::geometry::scale_point(
            event.client - DVec2::new(self.left, self.top),
            &displayed,
            &backing,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerTracker {
    current: DVec2,
    selected: Option<DVec2>,
    select_box: SelectionBox,
    points: ControlPoints,
    index: Option<usize>,
    magnify: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the cursor from a raw event. Returns the new canvas position.
    pub fn set(&mut self, event: &PointerEvent, bounds: &CanvasBounds, canvas: Size) -> DVec2 {
        self.current = bounds.to_canvas(event, canvas);
        self.current
    }

    #[inline]
    pub fn current(&self) -> DVec2 {
        self.current
    }

    /// Record the drag anchor at the current cursor position.
    pub fn select(&mut self, event: &PointerEvent, bounds: &CanvasBounds, canvas: Size) {
        let p = self.set(event, bounds, canvas);
        self.selected = Some(p);
    }

    pub fn set_select(&mut self, p: DVec2) {
        self.selected = Some(p);
    }

    #[inline]
    pub fn selected(&self) -> Option<DVec2> {
        self.selected
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.index = None;
    }

    #[inline]
    pub fn select_box(&self) -> SelectionBox {
        self.select_box
    }

    pub fn set_select_box(&mut self, select_box: SelectionBox) {
        self.select_box = select_box;
    }

    pub fn reset_select_box(&mut self) {
        self.select_box = SelectionBox::default();
    }

    #[inline]
    pub fn points(&self) -> &ControlPoints {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut ControlPoints {
        &mut self.points
    }

    pub fn set_points(&mut self, points: ControlPoints) {
        self.points = points;
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
        self.index = None;
    }

    /// Control point currently being dragged.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        debug_assert!(index < MAX_CONTROL_POINTS);
        self.index = Some(index);
    }

    #[inline]
    pub fn is_magnifying(&self) -> bool {
        self.magnify
    }

    pub fn magnify_on(&mut self) {
        self.magnify = true;
    }

    pub fn magnify_off(&mut self) {
        self.magnify = false;
    }

    /// Drop all interactive state (drag, crop box, points, magnifier).
    pub fn reset(&mut self) {
        *self = Self {
            current: self.current,
            ..Self::default()
        };
    }
}
