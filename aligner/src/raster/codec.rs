use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};

use super::{RasterBuffer, RasterError, RasterResult};

/// Output formats supported for downloads.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    #[default]
    #[strum(serialize = "png")]
    Png,
    #[strum(serialize = "jpeg")]
    Jpeg,
    #[strum(serialize = "tiff")]
    Tiff,
}

impl EncodeFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            EncodeFormat::Png => "png",
            EncodeFormat::Jpeg => "jpg",
            EncodeFormat::Tiff => "tif",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            EncodeFormat::Png => ImageFormat::Png,
            EncodeFormat::Jpeg => ImageFormat::Jpeg,
            EncodeFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

impl RasterBuffer {
    /// Decode PNG, JPEG or TIFF bytes into an RGBA raster.
    pub fn decode(bytes: &[u8]) -> RasterResult<RasterBuffer> {
        let decoded = image::load_from_memory(bytes).map_err(RasterError::Decode)?;
        let rgba = decoded.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(RasterError::ZeroDimensions {
                width: rgba.width() as usize,
                height: rgba.height() as usize,
            });
        }
        Ok(RasterBuffer::from_rgba_image(&rgba))
    }

    /// Encode the raster. JPEG drops the alpha channel.
    pub fn encode(&self, format: EncodeFormat) -> RasterResult<Vec<u8>> {
        let rgba = DynamicImage::ImageRgba8(self.to_rgba_image());
        let image = match format {
            EncodeFormat::Jpeg => DynamicImage::ImageRgb8(rgba.to_rgb8()),
            EncodeFormat::Png | EncodeFormat::Tiff => rgba,
        };

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format.image_format())
            .map_err(|source| RasterError::Encode { format, source })?;
        Ok(bytes)
    }
}
