use glam::DVec2;
use rayon::prelude::*;

use super::{PerspectiveWarper, WarpConfig, WarpError, WarperKind};
use crate::alignment::homography::Homography;
use crate::geometry::Size;
use crate::raster::{pack_rgba, RasterBuffer};

/// Number of destination rows per parallel chunk.
const ROWS_PER_CHUNK: usize = 16;

/// Manual inverse-mapping warper over packed 32-bit pixels.
///
/// For each destination pixel `(x, y)`:
/// ```text
/// k = h6*x + h7*y + 1
/// u = (h0*x + h1*y + h2) / k
/// v = (h3*x + h4*y + h5) / k
/// dst[x + w*y] = src[round(u) + src_w*round(v)]
/// ```
#[derive(Debug, Clone)]
pub struct FallbackWarper {
    config: WarpConfig,
}

impl FallbackWarper {
    pub fn new(config: WarpConfig) -> Self {
        Self { config }
    }
}

impl PerspectiveWarper for FallbackWarper {
    fn warp(
        &self,
        inverse_map: &Homography,
        src: &RasterBuffer,
        dst: Size,
    ) -> Result<RasterBuffer, WarpError> {
        if dst.is_empty() {
            return Err(WarpError::EmptyDestination(dst));
        }

        let border = pack_rgba(self.config.border);
        let src_w = src.width();
        let src_h = src.height();
        let src_pixels = src.pixels();
        let mut out = vec![border; dst.area()];

        out.par_chunks_mut(dst.w * ROWS_PER_CHUNK)
            .enumerate()
            .for_each(|(chunk_idx, chunk)| {
                let start_y = chunk_idx * ROWS_PER_CHUNK;
                for (row_in_chunk, row) in chunk.chunks_exact_mut(dst.w).enumerate() {
                    let y = (start_y + row_in_chunk) as f64;
                    for (x, pixel) in row.iter_mut().enumerate() {
                        let Some(uv) = inverse_map.apply(DVec2::new(x as f64, y)) else {
                            continue;
                        };
                        let u = uv.x.round();
                        let v = uv.y.round();
                        if u >= 0.0 && v >= 0.0 && u < src_w as f64 && v < src_h as f64 {
                            *pixel = src_pixels[u as usize + src_w * v as usize];
                        }
                    }
                }
            });

        Ok(RasterBuffer::new(dst.w, dst.h, out)?)
    }

    fn kind(&self) -> WarperKind {
        WarperKind::Fallback
    }
}
