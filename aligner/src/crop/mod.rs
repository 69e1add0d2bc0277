//! Rectangular region-of-interest extraction.

use serde::{Deserialize, Serialize};

use crate::raster::RasterBuffer;


/// Crop rectangle in image space.
///
/// While dragging, `w`/`h` hold signed deltas from the anchor and may be
/// negative. Use [`SelectionBox::normalized`] before interpreting it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Integer crop region guaranteed to lie inside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl SelectionBox {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Top-left corner with non-negative width and height.
    pub fn normalized(&self) -> SelectionBox {
        SelectionBox {
            x: self.x.min(self.x + self.w),
            y: self.y.min(self.y + self.h),
            w: self.w.abs(),
            h: self.h.abs(),
        }
    }

    /// Normalize, round to whole pixels and clip to `[0, width] × [0, height]`.
    ///
    /// Returns `None` when nothing of the box remains inside the image.
    pub fn clip(&self, width: usize, height: usize) -> Option<CropRegion> {
        let b = self.normalized();
        if !(b.x.is_finite() && b.y.is_finite() && b.w.is_finite() && b.h.is_finite()) {
            return None;
        }
        let (x0, x1) = clip_span(b.x, b.w, width);
        let (y0, y1) = clip_span(b.y, b.h, height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(CropRegion {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        })
    }
}

fn clip_span(start: f64, len: f64, limit: usize) -> (usize, usize) {
    let limit = limit as f64;
    let lo = start.round().clamp(0.0, limit);
    let hi = (start + len).round().clamp(0.0, limit);
    (lo as usize, hi as usize)
}

/// Extract the clipped selection as a new buffer, or `None` for an empty selection.
pub fn crop(buffer: &RasterBuffer, selection: &SelectionBox) -> Option<RasterBuffer> {
    let region = selection.clip(buffer.width(), buffer.height())?;
    if region.x == 0 && region.y == 0 && region.w == buffer.width() && region.h == buffer.height()
    {
        return Some(buffer.clone());
    }
    // region is clipped to the buffer, so this cannot fail
    buffer.region(region.x, region.y, region.w, region.h).ok()
}
