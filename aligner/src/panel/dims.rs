use common::{FloatExt, DIV_EPSILON};
use glam::DVec2;

use crate::geometry::{scale_to_fit, Dims, Size};

/// Dimension rectangles that describe how a panel is displayed.
///
/// - `base`: the fixed canvas.
/// - `source`: the originally loaded buffer.
/// - `image`: the current working buffer (changes on crop/align/resize).
/// - `render`: where the working buffer is drawn on the canvas.
/// - `magnified`: the magnifier lens on the canvas (empty when hidden).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelDims {
    pub base: Dims,
    pub source: Dims,
    pub image: Dims,
    pub render: Dims,
    pub magnified: Dims,
}

impl PanelDims {
    pub fn new(canvas: Size) -> Self {
        Self {
            base: Dims::sized(canvas),
            ..Default::default()
        }
    }

    /// Render-to-image scale (1.0 = one canvas pixel per image pixel).
    pub fn zoom(&self) -> f64 {
        self.render.w / self.image.w.nonzero_or(DIV_EPSILON)
    }

    /// Letterboxed render rectangle centred on the canvas.
    pub fn fitted(&self) -> Dims {
        let size = scale_to_fit(
            self.image.w.round() as usize,
            self.image.h.round() as usize,
            self.base.w.round() as usize,
            self.base.h.round() as usize,
        );
        self.centered(size.w as f64, size.h as f64)
    }

    /// Render rectangle at natural resolution, centred on the canvas.
    pub fn expanded(&self) -> Dims {
        self.centered(self.image.w, self.image.h)
    }

    /// Render rectangle scaled by `factor` about the canvas centre.
    pub fn zoomed(&self, factor: f64) -> Dims {
        let c = self.base.center();
        let origin = c - (c - self.render.origin()) * factor;
        Dims::new(
            origin.x,
            origin.y,
            self.render.w * factor,
            self.render.h * factor,
        )
    }

    pub fn panned(&self, delta: DVec2) -> Dims {
        Dims {
            x: self.render.x + delta.x,
            y: self.render.y + delta.y,
            ..self.render
        }
    }

    fn centered(&self, w: f64, h: f64) -> Dims {
        Dims::new(
            self.base.x + (self.base.w - w) / 2.0,
            self.base.y + (self.base.h - h) / 2.0,
            w,
            h,
        )
    }
}
