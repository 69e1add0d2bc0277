//! Two-panel alignment toolkit.
//!
//! [`Toolkit`] owns both panels and is the boundary the host talks to: it
//! forwards requests to a panel, runs cross-panel operations (align, match
//! dimensions, overlay) and turns every outcome into [`ToolkitEvent`]s.
//! Failures are local: they are returned to the caller and reported as a
//! message, and never touch the other panel.

mod events;

#[cfg(test)]
mod tests;

pub use events::{Message, MessageKind, PanelId, ToolkitEvent};

use glam::DVec2;

use crate::alignment::{
    correlation, is_collinear, solve_homography, Homography, HomographyError, PerspectiveWarper,
    WarperKind,
};
use crate::config::ToolkitConfig;
use crate::crop::SelectionBox;
use crate::error::{ToolkitError, ToolkitResult};
use crate::geometry::{image_to_render, scale_point, Size};
use crate::panel::{Mode, Panel, PanelStatus, PointerOutcome};
use crate::pointer::{CanvasBounds, ControlPoints, PointerEvent, MAX_CONTROL_POINTS};
use crate::raster::{EncodeFormat, RasterBuffer};

pub struct Toolkit {
    panels: [Panel; 2],
    config: ToolkitConfig,
    warper: Box<dyn PerspectiveWarper>,
    events: Vec<ToolkitEvent>,
}

impl Toolkit {
    /// # Panics
    /// Panics if `config` fails validation.
    pub fn new(config: ToolkitConfig) -> Self {
        let warper = config.warper.build(config.warp);
        Self::with_warper(config, warper)
    }

    /// Use a custom warp strategy instead of the configured one.
    pub fn with_warper(config: ToolkitConfig, warper: Box<dyn PerspectiveWarper>) -> Self {
        config.validate();
        let view = config.view();
        Self {
            panels: [Panel::new(view), Panel::new(view)],
            config,
            warper,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    #[inline]
    pub fn warper_kind(&self) -> WarperKind {
        self.warper.kind()
    }

    #[inline]
    pub fn panel(&self, id: PanelId) -> &Panel {
        &self.panels[id.index()]
    }

    /// Events since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<ToolkitEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    pub fn load_panel(&mut self, id: PanelId, buffer: RasterBuffer) {
        self.panel_mut(id).load(buffer);
        self.flush(id);
        self.buffer_updated(id);
    }

    pub fn load_panel_encoded(&mut self, id: PanelId, bytes: &[u8]) -> ToolkitResult<()> {
        self.run(id, true, |panel| panel.load_encoded(bytes))
    }

    pub fn request_remove(&mut self, id: PanelId) {
        self.panel_mut(id).remove();
        self.flush(id);
        self.buffer_updated(id);
    }

    pub fn request_download(
        &mut self,
        id: PanelId,
        format: EncodeFormat,
    ) -> ToolkitResult<Vec<u8>> {
        let bytes = self.run(id, false, |panel| panel.download(format))?;
        self.message(id, MessageKind::Success, format!("Image encoded as {format}"));
        Ok(bytes)
    }

    // ========================================================================
    // Control points
    // ========================================================================

    /// Place control point `index` at an image-space position.
    pub fn set_control_point(&mut self, id: PanelId, index: usize, p: DVec2) -> ToolkitResult<()> {
        self.run(id, false, |panel| panel.set_control_point(index, p))
    }

    /// Place a control point in the first free slot; returns its index.
    pub fn add_control_point(&mut self, id: PanelId, p: DVec2) -> ToolkitResult<usize> {
        self.run(id, false, |panel| panel.add_control_point(p))
    }

    pub fn clear_control_points(&mut self, id: PanelId) {
        self.panel_mut(id).clear_control_points();
    }

    /// Pearson coefficient of a panel's control points.
    pub fn correlation(&self, id: PanelId) -> f64 {
        correlation(self.panel(id).points().slots())
    }

    /// The other panel's control points, in this panel's canvas space.
    ///
    /// Points are carried across proportionally between the two image
    /// frames. Empty unless both panels are loaded.
    pub fn overlay_points(&self, id: PanelId) -> Vec<(usize, DVec2)> {
        let this = self.panel(id);
        let other = self.panel(id.other());
        if this.status() != PanelStatus::Loaded || other.status() != PanelStatus::Loaded {
            return Vec::new();
        }
        let dims = this.dims();
        let other_image = other.dims().image;
        other
            .points()
            .iter()
            .map(|(i, p)| {
                let local = scale_point(p, &other_image, &dims.image);
                (i, image_to_render(local, &dims.render, &dims.image))
            })
            .collect()
    }

    // ========================================================================
    // Buffer operations
    // ========================================================================

    pub fn request_crop(&mut self, id: PanelId, selection: &SelectionBox) -> ToolkitResult<Size> {
        let size = self.run(id, true, |panel| panel.crop(selection))?;
        self.message(
            id,
            MessageKind::Success,
            format!("Image cropped to {}x{}", size.w, size.h),
        );
        Ok(size)
    }

    pub fn request_reset(&mut self, id: PanelId) -> ToolkitResult<()> {
        self.run(id, true, Panel::reset)
    }

    /// Resample this panel's working buffer to the other panel's image size.
    pub fn match_dimensions(&mut self, id: PanelId) -> ToolkitResult<Size> {
        let other = self.panel(id.other());
        let target = match (other.status(), other.working()) {
            (PanelStatus::Loaded, Some(working)) => Ok(working.size()),
            (status, _) => Err(ToolkitError::PanelNotReady { status }),
        };
        let target = match target {
            Ok(size) => size,
            Err(err) => {
                self.report(id, &err);
                return Err(err);
            }
        };
        self.run(id, true, |panel| panel.resize(target))?;
        self.message(
            id,
            MessageKind::Info,
            format!("Resized to {}x{}", target.w, target.h),
        );
        Ok(target)
    }

    /// Warp this panel onto the other panel's frame using both panels'
    /// control points.
    ///
    /// The other panel is the reference: the result has its image size and
    /// afterwards this panel's control points coincide with its points.
    /// Nearly collinear control points are reported as warnings but do not
    /// block the attempt. On failure the panel stays `Loaded` with its
    /// previous buffer.
    pub fn request_align(&mut self, id: PanelId) -> ToolkitResult<Homography> {
        let result = self.align(id);
        self.flush(id);
        match &result {
            Ok(_) => {
                self.buffer_updated(id);
                self.message(id, MessageKind::Success, "Image aligned");
            }
            Err(err) => self.report(id, err),
        }
        result
    }

    fn align(&mut self, id: PanelId) -> ToolkitResult<Homography> {
        let reference_id = id.other();
        let reference = self.panel(reference_id);
        let target = self.panel(id);
        let dst = match (reference.status(), reference.working()) {
            (PanelStatus::Loaded, Some(working)) => working.size(),
            (status, _) => return Err(ToolkitError::PanelNotReady { status }),
        };
        if target.status() != PanelStatus::Loaded {
            return Err(ToolkitError::PanelNotReady {
                status: target.status(),
            });
        }

        let reference_points = *reference.points();
        let (Some(from), Some(to)) = (reference_points.complete(), target.points().complete())
        else {
            return Err(HomographyError::MissingControlPoints {
                found: reference_points.len().min(target.points().len()),
                required: MAX_CONTROL_POINTS,
            }
            .into());
        };

        for panel_id in [reference_id, id] {
            let r = self.correlation(panel_id);
            if is_collinear(r, self.config.collinearity_threshold) {
                tracing::warn!(panel = %panel_id, r, "Control points nearly collinear");
                self.message(
                    panel_id,
                    MessageKind::Warning,
                    format!(
                        "Control points are nearly collinear (r = {r:.2}); alignment may be inaccurate"
                    ),
                );
            }
        }

        self.panel_mut(id).begin_loading()?;
        match self.solve_and_warp(id, &from, &to, dst) {
            Ok((homography, warped)) => {
                self.panel_mut(id).replace_working(warped, reference_points)?;
                tracing::info!(
                    panel = %id,
                    width = dst.w,
                    height = dst.h,
                    warper = %self.warper.kind(),
                    "Aligned panel"
                );
                Ok(homography)
            }
            Err(err) => {
                self.panel_mut(id).finish_loading();
                tracing::warn!(panel = %id, error = %err, "Alignment failed");
                Err(err)
            }
        }
    }

    /// `from` are reference (destination) points, `to` the target (source)
    /// points, so the solved homography is the warp's inverse map.
    fn solve_and_warp(
        &self,
        id: PanelId,
        from: &[DVec2],
        to: &[DVec2],
        dst: Size,
    ) -> ToolkitResult<(Homography, RasterBuffer)> {
        let homography = solve_homography(from, to, &self.config.solver)?;
        let src = self
            .panel(id)
            .working()
            .ok_or(ToolkitError::PanelNotReady {
                status: self.panel(id).status(),
            })?;
        let warped = self.warper.warp(&homography, src, dst)?;
        Ok((homography, warped))
    }

    // ========================================================================
    // View
    // ========================================================================

    pub fn request_fit(&mut self, id: PanelId) -> ToolkitResult<()> {
        self.run(id, true, Panel::fit)
    }

    pub fn request_expand(&mut self, id: PanelId) -> ToolkitResult<()> {
        self.run(id, true, Panel::expand)
    }

    pub fn request_zoom_in(&mut self, id: PanelId) -> ToolkitResult<()> {
        self.run(id, true, Panel::zoom_in)
    }

    pub fn request_zoom_out(&mut self, id: PanelId) -> ToolkitResult<()> {
        self.run(id, true, Panel::zoom_out)
    }

    pub fn request_pan(&mut self, id: PanelId, delta: DVec2) -> ToolkitResult<()> {
        self.run(id, true, |panel| panel.pan(delta))
    }

    // ========================================================================
    // Pointer forwarding
    // ========================================================================

    pub fn set_mode(&mut self, id: PanelId, mode: Mode) {
        self.panel_mut(id).set_mode(mode);
    }

    pub fn set_bounds(&mut self, id: PanelId, bounds: CanvasBounds) {
        self.panel_mut(id).set_bounds(bounds);
    }

    pub fn pointer_down(
        &mut self,
        id: PanelId,
        event: &PointerEvent,
    ) -> ToolkitResult<PointerOutcome> {
        let outcome = self.run(id, false, |panel| panel.pointer_down(event))?;
        self.after_pointer(id, outcome);
        Ok(outcome)
    }

    pub fn pointer_move(
        &mut self,
        id: PanelId,
        event: &PointerEvent,
    ) -> ToolkitResult<PointerOutcome> {
        let outcome = self.run(id, false, |panel| panel.pointer_move(event))?;
        self.after_pointer(id, outcome);
        Ok(outcome)
    }

    pub fn pointer_up(&mut self, id: PanelId, event: &PointerEvent) -> ToolkitResult<PointerOutcome> {
        let outcome = self.run(id, false, |panel| panel.pointer_up(event))?;
        self.after_pointer(id, outcome);
        Ok(outcome)
    }

    /// Replace a panel's control points wholesale (e.g. from a saved job).
    pub fn set_control_points(&mut self, id: PanelId, points: &[DVec2]) -> ToolkitResult<()> {
        let points = ControlPoints::from_points(points)?;
        self.run(id, false, |panel| {
            panel.clear_control_points();
            for (i, p) in points.iter() {
                panel.set_control_point(i, p)?;
            }
            Ok(())
        })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn panel_mut(&mut self, id: PanelId) -> &mut Panel {
        &mut self.panels[id.index()]
    }

    /// Run a panel operation, record its status changes and report failures.
    fn run<T>(
        &mut self,
        id: PanelId,
        updates_buffer: bool,
        op: impl FnOnce(&mut Panel) -> ToolkitResult<T>,
    ) -> ToolkitResult<T> {
        let result = op(self.panel_mut(id));
        self.flush(id);
        match &result {
            Ok(_) if updates_buffer => self.buffer_updated(id),
            Ok(_) => {}
            Err(err) => self.report(id, err),
        }
        result
    }

    fn after_pointer(&mut self, id: PanelId, outcome: PointerOutcome) {
        if matches!(outcome, PointerOutcome::View | PointerOutcome::Magnifier) {
            self.buffer_updated(id);
        }
    }

    fn flush(&mut self, id: PanelId) {
        for status in self.panel_mut(id).take_transitions() {
            self.events.push(ToolkitEvent::StatusChanged { panel: id, status });
        }
    }

    fn buffer_updated(&mut self, id: PanelId) {
        self.events.push(ToolkitEvent::BufferUpdated { panel: id });
    }

    fn message(&mut self, id: PanelId, kind: MessageKind, msg: impl Into<String>) {
        self.events.push(ToolkitEvent::Message {
            panel: id,
            message: Message::new(kind, msg),
        });
    }

    fn report(&mut self, id: PanelId, err: &ToolkitError) {
        let kind = match err {
            ToolkitError::EmptySelection | ToolkitError::PanelNotReady { .. } => {
                MessageKind::Warning
            }
            _ => MessageKind::Error,
        };
        tracing::debug!(panel = %id, error = %err, "Toolkit operation failed");
        self.message(id, kind, err.to_string());
    }
}
