//! Coordinate-space conversions between canvas, render, image and magnified spaces.
//!
//! All functions here are pure. Degenerate (zero-sized) rectangles never
//! produce NaN or infinity: denominators are replaced by a small epsilon.

use common::{FloatExt, DIV_EPSILON};
use glam::DVec2;
use serde::{Deserialize, Serialize};


/// Integer pixel dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub w: usize,
    pub h: usize,
}

impl Size {
    #[inline]
    pub const fn new(w: usize, h: usize) -> Self {
        Self { w, h }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    #[inline]
    pub const fn area(&self) -> usize {
        self.w * self.h
    }
}

/// Axis-aligned rectangle `{x, y, w, h}` in some coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dims {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Dims {
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size anchored at the origin.
    #[inline]
    pub fn sized(size: Size) -> Self {
        Self::new(0.0, 0.0, size.w as f64, size.h as f64)
    }

    #[inline]
    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Rounded integer size.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(
            self.w.round().max(0.0) as usize,
            self.h.round().max(0.0) as usize,
        )
    }

    /// Half-open containment test: `[x, x + w) × [y, y + h)`.
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

impl From<Size> for Dims {
    fn from(size: Size) -> Self {
        Self::sized(size)
    }
}

/// Independent per-axis scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactor {
    #[inline]
    pub fn as_vec(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Per-axis ratio `to / from`.
pub fn scale(from: &Dims, to: &Dims) -> ScaleFactor {
    ScaleFactor {
        x: to.w / from.w.nonzero_or(DIV_EPSILON),
        y: to.h / from.h.nonzero_or(DIV_EPSILON),
    }
}

/// Multiply a point by the `from → to` scale factor.
///
/// Swap the arguments for the reverse conversion.
pub fn scale_point(p: DVec2, from: &Dims, to: &Dims) -> DVec2 {
    p * scale(from, to).as_vec()
}

/// Scale every component of a rectangle by the `from → to` factor.
pub fn scale_dims(d: &Dims, from: &Dims, to: &Dims) -> Dims {
    let f = scale(from, to);
    Dims::new(d.x * f.x, d.y * f.y, d.w * f.x, d.h * f.y)
}

/// Euclidean distance test.
#[inline]
pub fn in_range(p: DVec2, q: DVec2, radius: f64) -> bool {
    p.distance_squared(q) <= radius * radius
}

/// Chebyshev (square box) distance test.
#[inline]
pub fn in_range_chebyshev(p: DVec2, q: DVec2, radius: f64) -> bool {
    (p.x - q.x).abs() <= radius && (p.y - q.y).abs() <= radius
}

/// Largest aspect-preserving size that fits within `max_w × max_h`.
///
/// Each side is at least one pixel for non-empty input.
pub fn scale_to_fit(src_w: usize, src_h: usize, max_w: usize, max_h: usize) -> Size {
    if src_w == 0 || src_h == 0 || max_w == 0 || max_h == 0 {
        return Size::default();
    }
    let factor = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    Size::new(
        ((src_w as f64 * factor).round() as usize).clamp(1, max_w),
        ((src_h as f64 * factor).round() as usize).clamp(1, max_h),
    )
}

/// Convert a canvas point into image space given where the image is rendered.
pub fn render_to_image(p: DVec2, render: &Dims, image: &Dims) -> DVec2 {
    scale_point(p - render.origin(), render, image) + image.origin()
}

/// Convert an image-space point into canvas space given where the image is rendered.
pub fn image_to_render(p: DVec2, render: &Dims, image: &Dims) -> DVec2 {
    scale_point(p - image.origin(), image, render) + render.origin()
}
