//! One image panel: buffers, view rectangles, interaction mode and status.
//!
//! Status transitions:
//!
//! ```text
//! Empty ─load─> Loading ─> Loaded ─download─> Downloading ─> Loaded
//!                  │          └────align────> Loading ─────> Loaded
//!                  └─decode failure─> Error ─load─> Loading
//! ```
//!
//! Any status goes to `Empty` on `remove`. Every status change is recorded
//! and can be collected with [`Panel::take_transitions`].

mod dims;
mod magnifier;


pub use dims::PanelDims;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::ViewConfig;
use crate::crop::{crop, SelectionBox};
use crate::error::{ToolkitError, ToolkitResult};
use crate::geometry::{image_to_render, in_range, render_to_image, scale_point, Dims, Size};
use crate::pointer::{CanvasBounds, ControlPoints, PointerEvent, PointerTracker};
use crate::raster::{EncodeFormat, RasterBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PanelStatus {
    #[default]
    Empty,
    Loading,
    Loaded,
    Downloading,
    Error,
}

/// What a pointer drag does on this panel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Drag moves the render window.
    #[default]
    Pan,
    /// Drag draws a crop selection box.
    Crop,
    /// Click places a control point, drag moves one.
    Align,
    /// Press shows the magnifier lens.
    Compare,
}

/// What a pointer event changed, for the host to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Idle,
    View,
    Selection,
    ControlPoint(usize),
    Magnifier,
}

#[derive(Debug, Clone)]
pub struct Panel {
    status: PanelStatus,
    transitions: Vec<PanelStatus>,
    mode: Mode,
    view: ViewConfig,
    bounds: CanvasBounds,
    source: Option<RasterBuffer>,
    working: Option<RasterBuffer>,
    magnified: Option<RasterBuffer>,
    dims: PanelDims,
    pointer: PointerTracker,
}

impl Panel {
    pub fn new(view: ViewConfig) -> Self {
        Self {
            status: PanelStatus::Empty,
            transitions: Vec::new(),
            mode: Mode::default(),
            view,
            bounds: CanvasBounds::unscaled(view.canvas),
            source: None,
            working: None,
            magnified: None,
            dims: PanelDims::new(view.canvas),
            pointer: PointerTracker::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn status(&self) -> PanelStatus {
        self.status
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn dims(&self) -> &PanelDims {
        &self.dims
    }

    #[inline]
    pub fn source(&self) -> Option<&RasterBuffer> {
        self.source.as_ref()
    }

    /// The buffer currently displayed.
    #[inline]
    pub fn working(&self) -> Option<&RasterBuffer> {
        self.working.as_ref()
    }

    /// Magnifier lens contents while the lens is shown.
    #[inline]
    pub fn magnified(&self) -> Option<&RasterBuffer> {
        self.magnified.as_ref()
    }

    #[inline]
    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    /// Control points in image space.
    #[inline]
    pub fn points(&self) -> &ControlPoints {
        self.pointer.points()
    }

    pub fn set_bounds(&mut self, bounds: CanvasBounds) {
        self.bounds = bounds;
    }

    /// Status changes since the last call, oldest first.
    pub fn take_transitions(&mut self) -> Vec<PanelStatus> {
        std::mem::take(&mut self.transitions)
    }

    /// Switch interaction mode, discarding any drag in progress.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.pointer.deselect();
        self.pointer.reset_select_box();
        self.hide_magnifier();
    }

    pub fn to_image(&self, canvas: DVec2) -> DVec2 {
        render_to_image(canvas, &self.dims.render, &self.dims.image)
    }

    pub fn to_canvas(&self, image: DVec2) -> DVec2 {
        image_to_render(image, &self.dims.render, &self.dims.image)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Install a decoded buffer as both source and working buffer.
    ///
    /// Valid from any status; this is also how a panel leaves `Error`.
    pub fn load(&mut self, buffer: RasterBuffer) {
        self.set_status(PanelStatus::Loading);
        self.install(buffer);
        self.set_status(PanelStatus::Loaded);
    }

    /// Decode PNG/JPEG/TIFF bytes and load them. A decode failure leaves the
    /// panel empty in `Error`.
    pub fn load_encoded(&mut self, bytes: &[u8]) -> ToolkitResult<()> {
        self.set_status(PanelStatus::Loading);
        match RasterBuffer::decode(bytes) {
            Ok(buffer) => {
                self.install(buffer);
                self.set_status(PanelStatus::Loaded);
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to decode panel image");
                self.clear();
                self.set_status(PanelStatus::Error);
                Err(err.into())
            }
        }
    }

    /// Restore the working buffer from the source and drop control points.
    pub fn reset(&mut self) -> ToolkitResult<()> {
        self.ensure_loaded()?;
        let source = self.source.clone();
        if let Some(source) = source {
            self.set_working(source);
        }
        self.pointer.reset();
        self.hide_magnifier();
        tracing::debug!("Panel reset to source");
        Ok(())
    }

    pub fn remove(&mut self) {
        self.clear();
        self.set_status(PanelStatus::Empty);
        tracing::debug!("Panel removed");
    }

    /// Enter `Loading` ahead of a long operation on a loaded panel.
    pub fn begin_loading(&mut self) -> ToolkitResult<()> {
        self.ensure_loaded()?;
        self.set_status(PanelStatus::Loading);
        Ok(())
    }

    /// Return to `Loaded` after [`Panel::begin_loading`] without changing
    /// the buffer.
    pub fn finish_loading(&mut self) {
        if self.status == PanelStatus::Loading && self.working.is_some() {
            self.set_status(PanelStatus::Loaded);
        }
    }

    /// Replace the working buffer (e.g. with an alignment result) and its
    /// control points, then refit the view.
    pub fn replace_working(
        &mut self,
        buffer: RasterBuffer,
        points: ControlPoints,
    ) -> ToolkitResult<()> {
        if !matches!(self.status, PanelStatus::Loaded | PanelStatus::Loading)
            || self.working.is_none()
        {
            return Err(self.not_ready());
        }
        self.set_working(buffer);
        self.pointer.deselect();
        self.pointer.reset_select_box();
        self.pointer.set_points(points);
        self.set_status(PanelStatus::Loaded);
        Ok(())
    }

    // ========================================================================
    // View (render dims only)
    // ========================================================================

    pub fn fit(&mut self) -> ToolkitResult<()> {
        self.ensure_loaded()?;
        self.dims.render = self.dims.fitted();
        Ok(())
    }

    /// Show the image at natural resolution.
    pub fn expand(&mut self) -> ToolkitResult<()> {
        self.ensure_loaded()?;
        self.dims.render = self.dims.expanded();
        Ok(())
    }

    /// Zoom about the canvas centre, up to `max_zoom`.
    pub fn zoom_in(&mut self) -> ToolkitResult<()> {
        self.ensure_loaded()?;
        let zoom = self.dims.zoom();
        let target = (zoom * self.view.zoom_step).min(self.view.max_zoom.max(zoom));
        self.dims.render = self.dims.zoomed(target / zoom);
        Ok(())
    }

    /// Zoom out about the canvas centre, never below the fitted view.
    ///
    /// A view already smaller than the fitted one (an expanded small image)
    /// is left as is.
    pub fn zoom_out(&mut self) -> ToolkitResult<()> {
        self.ensure_loaded()?;
        let fitted = self.dims.fitted();
        let min_zoom = fitted.w / self.dims.image.w;
        let zoom = self.dims.zoom();
        if zoom < min_zoom {
            return Ok(());
        }
        let target = zoom / self.view.zoom_step;
        self.dims.render = if target <= min_zoom {
            fitted
        } else {
            self.dims.zoomed(target / zoom)
        };
        Ok(())
    }

    /// Move the render window by `delta` canvas pixels.
    pub fn pan(&mut self, delta: DVec2) -> ToolkitResult<()> {
        self.ensure_loaded()?;
        self.dims.render = self.dims.panned(delta);
        Ok(())
    }

    // ========================================================================
    // Buffer operations
    // ========================================================================

    /// Crop the working buffer to `selection` (image space).
    ///
    /// An empty clipped selection leaves the panel untouched and returns
    /// [`ToolkitError::EmptySelection`].
    pub fn crop(&mut self, selection: &SelectionBox) -> ToolkitResult<Size> {
        let working = self.ensure_loaded()?;
        let cropped = crop(working, selection).ok_or(ToolkitError::EmptySelection)?;
        let size = cropped.size();
        self.set_working(cropped);
        self.pointer.clear_points();
        self.pointer.reset_select_box();
        tracing::info!(width = size.w, height = size.h, "Cropped panel image");
        Ok(size)
    }

    /// Crop to the selection box drawn in `Crop` mode.
    pub fn crop_to_selection(&mut self) -> ToolkitResult<Size> {
        let selection = self.pointer.select_box();
        self.crop(&selection)
    }

    /// Resample the working buffer; control points follow the image.
    pub fn resize(&mut self, size: Size) -> ToolkitResult<()> {
        let working = self.ensure_loaded()?;
        let resized = working.resize(size.w, size.h)?;
        let old = self.dims.image;
        let new = Dims::sized(size);
        let points = self.points().map(|p| Some(scale_point(p, &old, &new)));
        self.set_working(resized);
        self.pointer.set_points(points);
        tracing::debug!(width = size.w, height = size.h, "Resized panel image");
        Ok(())
    }

    /// Encode the working buffer, passing through `Downloading`.
    pub fn download(&mut self, format: EncodeFormat) -> ToolkitResult<Vec<u8>> {
        self.ensure_loaded()?;
        self.set_status(PanelStatus::Downloading);
        let encoded = self.working.as_ref().map(|working| working.encode(format));
        self.set_status(PanelStatus::Loaded);
        let bytes = encoded.ok_or(ToolkitError::PanelNotReady {
            status: PanelStatus::Downloading,
        })??;
        tracing::info!(%format, bytes = bytes.len(), "Encoded panel image");
        Ok(bytes)
    }

    // ========================================================================
    // Magnifier and hit-testing
    // ========================================================================

    /// Render the magnifier lens centred on a canvas position.
    pub fn magnify_at(&mut self, canvas: DVec2) -> ToolkitResult<()> {
        let working = self.ensure_loaded()?;
        let center = self.to_image(canvas);
        let lens = magnifier::magnify(working, center, &self.view.magnifier, self.view.border)?;
        let side = self.view.magnifier.size as f64;
        self.dims.magnified = Dims::new(
            canvas.x - side / 2.0,
            canvas.y - side / 2.0,
            side,
            side,
        );
        self.magnified = Some(lens);
        self.pointer.magnify_on();
        Ok(())
    }

    pub fn hide_magnifier(&mut self) {
        self.pointer.magnify_off();
        self.magnified = None;
        self.dims.magnified = Dims::default();
    }

    /// Closest control point within `hit_radius` of a canvas position.
    pub fn hit_control_point(&self, canvas: DVec2) -> Option<usize> {
        self.points()
            .iter()
            .map(|(i, p)| (i, self.to_canvas(p)))
            .filter(|&(_, q)| in_range(q, canvas, self.view.hit_radius))
            .min_by(|a, b| {
                a.1.distance_squared(canvas)
                    .total_cmp(&b.1.distance_squared(canvas))
            })
            .map(|(i, _)| i)
    }

    // ========================================================================
    // Pointer handling
    // ========================================================================

    pub fn pointer_down(&mut self, event: &PointerEvent) -> ToolkitResult<PointerOutcome> {
        self.ensure_loaded()?;
        let p = self.pointer.set(event, &self.bounds, self.view.canvas);

        match self.mode {
            Mode::Pan => {
                self.pointer.set_select(p);
                Ok(PointerOutcome::Idle)
            }
            Mode::Crop => {
                self.pointer.set_select(p);
                let anchor = self.to_image(p);
                self.pointer
                    .set_select_box(SelectionBox::new(anchor.x, anchor.y, 0.0, 0.0));
                Ok(PointerOutcome::Selection)
            }
            Mode::Align => {
                if let Some(index) = self.hit_control_point(p) {
                    self.pointer.set_select(p);
                    self.pointer.set_index(index);
                    return Ok(PointerOutcome::ControlPoint(index));
                }
                if !self.dims.render.contains(p) {
                    return Ok(PointerOutcome::Idle);
                }
                let image_point = self.to_image(p);
                let index = self.pointer.points_mut().push(image_point)?;
                tracing::debug!(index, x = image_point.x, y = image_point.y, "Control point added");
                Ok(PointerOutcome::ControlPoint(index))
            }
            Mode::Compare => {
                self.magnify_at(p)?;
                Ok(PointerOutcome::Magnifier)
            }
        }
    }

    /// Drag handling. Without an active press this only tracks the cursor.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> ToolkitResult<PointerOutcome> {
        if self.status != PanelStatus::Loaded {
            return Ok(PointerOutcome::Idle);
        }
        let previous = self.pointer.current();
        let p = self.pointer.set(event, &self.bounds, self.view.canvas);
        let Some(anchor) = self.pointer.selected() else {
            if self.mode == Mode::Compare && self.pointer.is_magnifying() {
                self.magnify_at(p)?;
                return Ok(PointerOutcome::Magnifier);
            }
            return Ok(PointerOutcome::Idle);
        };

        match self.mode {
            Mode::Pan => {
                self.dims.render = self.dims.panned(p - previous);
                Ok(PointerOutcome::View)
            }
            Mode::Crop => {
                let a = self.to_image(anchor);
                let c = self.to_image(p);
                self.pointer
                    .set_select_box(SelectionBox::new(a.x, a.y, c.x - a.x, c.y - a.y));
                Ok(PointerOutcome::Selection)
            }
            Mode::Align => match self.pointer.index() {
                Some(index) => {
                    let image_point = self.to_image(p);
                    self.pointer.points_mut().set(index, image_point)?;
                    Ok(PointerOutcome::ControlPoint(index))
                }
                None => Ok(PointerOutcome::Idle),
            },
            Mode::Compare => Ok(PointerOutcome::Idle),
        }
    }

    /// End a press. A crop selection box survives until cropped or reset.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> ToolkitResult<PointerOutcome> {
        if self.status != PanelStatus::Loaded {
            return Ok(PointerOutcome::Idle);
        }
        self.pointer.set(event, &self.bounds, self.view.canvas);
        self.pointer.deselect();
        match self.mode {
            Mode::Compare => {
                self.hide_magnifier();
                Ok(PointerOutcome::Magnifier)
            }
            Mode::Pan | Mode::Crop | Mode::Align => Ok(PointerOutcome::Idle),
        }
    }

    /// Replace one control point (image space).
    pub fn set_control_point(&mut self, index: usize, p: DVec2) -> ToolkitResult<()> {
        self.ensure_loaded()?;
        self.pointer.points_mut().set(index, p)?;
        Ok(())
    }

    /// Append a control point (image space) in the first free slot.
    pub fn add_control_point(&mut self, p: DVec2) -> ToolkitResult<usize> {
        self.ensure_loaded()?;
        Ok(self.pointer.points_mut().push(p)?)
    }

    pub fn clear_control_points(&mut self) {
        self.pointer.clear_points();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn set_status(&mut self, status: PanelStatus) {
        if self.status != status {
            tracing::trace!(from = %self.status, to = %status, "Panel status change");
            self.status = status;
            self.transitions.push(status);
        }
    }

    fn not_ready(&self) -> ToolkitError {
        ToolkitError::PanelNotReady {
            status: self.status,
        }
    }

    fn ensure_loaded(&self) -> ToolkitResult<&RasterBuffer> {
        match (&self.working, self.status) {
            (Some(working), PanelStatus::Loaded) => Ok(working),
            _ => Err(self.not_ready()),
        }
    }

    fn install(&mut self, buffer: RasterBuffer) {
        let size = buffer.size();
        self.dims.source = Dims::sized(size);
        self.source = Some(buffer.clone());
        self.set_working(buffer);
        self.pointer.reset();
        self.hide_magnifier();
        tracing::info!(width = size.w, height = size.h, "Panel image loaded");
    }

    /// Swap in a new working buffer and recompute image and render dims.
    fn set_working(&mut self, buffer: RasterBuffer) {
        self.dims.image = Dims::sized(buffer.size());
        self.working = Some(buffer);
        self.dims.render = self.dims.fitted();
    }

    fn clear(&mut self) {
        self.source = None;
        self.working = None;
        self.magnified = None;
        self.dims = PanelDims::new(self.view.canvas);
        self.pointer.reset();
    }
}
