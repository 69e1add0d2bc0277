use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use super::{PerspectiveWarper, WarpConfig, WarpError, WarperKind};
use crate::alignment::homography::Homography;
use crate::geometry::Size;
use crate::raster::RasterBuffer;

/// Warper backed by `imageproc`'s projective transform.
///
/// `imageproc` expects the forward (source → destination) projection and
/// inverts it internally, so the inverse map is handed over pre-inverted.
#[derive(Debug, Clone)]
pub struct ImageprocWarper {
    config: WarpConfig,
}

impl ImageprocWarper {
    pub fn new(config: WarpConfig) -> Self {
        Self { config }
    }
}

impl PerspectiveWarper for ImageprocWarper {
    fn warp(
        &self,
        inverse_map: &Homography,
        src: &RasterBuffer,
        dst: Size,
    ) -> Result<RasterBuffer, WarpError> {
        if dst.is_empty() {
            return Err(WarpError::EmptyDestination(dst));
        }

        let projection = Projection::from_matrix(inverse_map.matrix().to_f32_array())
            .ok_or(WarpError::NonInvertible)?
            .invert();

        let input = src.to_rgba_image();
        let mut output = RgbaImage::new(dst.w as u32, dst.h as u32);
        warp_into(
            &input,
            &projection,
            Interpolation::Nearest,
            Rgba(self.config.border),
            &mut output,
        );

        Ok(RasterBuffer::from_rgba_image(&output))
    }

    fn kind(&self) -> WarperKind {
        WarperKind::Imageproc
    }
}
