use glam::DVec2;

use crate::config::MagnifierConfig;
use crate::raster::{pack_rgba, RasterBuffer, RasterResult};

/// Nearest-neighbour enlargement of the image around `center` (image space).
///
/// The lens is `size × size` output pixels covering `size / factor` image
/// pixels per side; samples outside the image take `border`.
pub(super) fn magnify(
    src: &RasterBuffer,
    center: DVec2,
    config: &MagnifierConfig,
    border: [u8; 4],
) -> RasterResult<RasterBuffer> {
    let size = config.size;
    let factor = config.factor.max(1) as f64;
    let half = size as f64 / 2.0;
    let fill = pack_rgba(border);

    let mut pixels = Vec::with_capacity(size * size);
    for oy in 0..size {
        let sy = (center.y + (oy as f64 + 0.5 - half) / factor).floor();
        for ox in 0..size {
            let sx = (center.x + (ox as f64 + 0.5 - half) / factor).floor();
            let pixel = if sx >= 0.0 && sy >= 0.0 {
                src.get(sx as usize, sy as usize)
            } else {
                None
            };
            pixels.push(pixel.unwrap_or(fill));
        }
    }
    RasterBuffer::new(size, size, pixels)
}
