//! Synthetic rasters shared by unit tests.

use crate::raster::{pack_rgba, RasterBuffer};

/// Opaque raster where every pixel is distinct for small sizes and never
/// equals the transparent border.
pub(crate) fn gradient_raster(width: usize, height: usize) -> RasterBuffer {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                pack_rgba([
                    (x % 256) as u8,
                    (y % 256) as u8,
                    ((x * 7 + y * 13) % 256) as u8,
                    255,
                ])
            })
        })
        .collect();
    RasterBuffer::new(width, height, pixels).unwrap()
}

/// Opaque raster whose channels change by at most 2 between neighbours.
pub(crate) fn smooth_raster(width: usize, height: usize) -> RasterBuffer {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                pack_rgba([
                    ((x * 2) % 256) as u8,
                    ((y * 2) % 256) as u8,
                    ((x + y) % 256) as u8,
                    255,
                ])
            })
        })
        .collect();
    RasterBuffer::new(width, height, pixels).unwrap()
}

/// Solid raster with a single differently-coloured marker pixel.
pub(crate) fn marker_raster(width: usize, height: usize, x: usize, y: usize) -> RasterBuffer {
    let mut raster = RasterBuffer::new_filled(width, height, [10, 10, 10, 255]).unwrap();
    raster.set(x, y, pack_rgba([250, 0, 0, 255]));
    raster
}
