//! Raster buffers of 32-bit packed RGBA pixels.
//!
//! Pixels are row-major with a top-left origin. Each pixel is packed
//! little-endian style as `r | g << 8 | b << 16 | a << 24`, which matches a
//! `u32` view over interleaved RGBA bytes on little-endian hosts.

mod codec;


pub use codec::EncodeFormat;

use image::RgbaImage;

use crate::geometry::Size;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Raster dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: usize, height: usize },
    #[error("Raster dimensions {width}x{height} exceed addressable memory")]
    TooLarge { width: usize, height: usize },
    #[error("Pixel data length {actual} does not match {width}x{height} (expected {expected})")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Region {x},{y} {w}x{h} lies outside {width}x{height} raster")]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        width: usize,
        height: usize,
    },
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Failed to encode image as {format}: {source}")]
    Encode {
        format: EncodeFormat,
        #[source]
        source: image::ImageError,
    },
}

pub type RasterResult<T> = Result<T, RasterError>;

#[inline]
pub const fn pack_rgba(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

#[inline]
pub const fn unpack_rgba(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

fn pixel_count(width: usize, height: usize) -> RasterResult<usize> {
    width
        .checked_mul(height)
        .ok_or(RasterError::TooLarge { width, height })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl RasterBuffer {
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroDimensions { width, height });
        }
        let expected = pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn new_filled(width: usize, height: usize, rgba: [u8; 4]) -> RasterResult<Self> {
        let count = pixel_count(width, height)?;
        Self::new(width, height, vec![pack_rgba(rgba); count])
    }

    /// Build from interleaved RGBA bytes (4 bytes per pixel).
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> RasterResult<Self> {
        let expected = pixel_count(width, height)?
            .checked_mul(4)
            .ok_or(RasterError::TooLarge { width, height })?;
        if bytes.len() != expected {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| pack_rgba([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| unpack_rgba(p)).collect()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, pixel: u32) {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[y * self.width + x] = pixel;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u32] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Copy out a sub-rectangle, row by row.
    pub fn region(&self, x: usize, y: usize, w: usize, h: usize) -> RasterResult<RasterBuffer> {
        if w == 0 || h == 0 || x + w > self.width || y + h > self.height {
            return Err(RasterError::RegionOutOfBounds {
                x,
                y,
                w,
                h,
                width: self.width,
                height: self.height,
            });
        }
        let mut pixels = Vec::with_capacity(w * h);
        for row in y..y + h {
            pixels.extend_from_slice(&self.row(row)[x..x + w]);
        }
        Ok(RasterBuffer {
            pixels,
            width: w,
            height: h,
        })
    }

    /// Nearest-neighbour resample to a new size.
    pub fn resize(&self, width: usize, height: usize) -> RasterResult<RasterBuffer> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroDimensions { width, height });
        }
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let resized = image::imageops::resize(
            &self.to_rgba_image(),
            width as u32,
            height as u32,
            image::imageops::FilterType::Nearest,
        );
        Ok(Self::from_rgba_image(&resized))
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgba(unpack_rgba(self.pixels[y as usize * self.width + x as usize]))
        })
    }

    /// Convert from an `image` buffer. Empty images are not representable;
    /// callers go through [`RasterBuffer::decode`] for untrusted input.
    pub fn from_rgba_image(image: &RgbaImage) -> RasterBuffer {
        let pixels = image.pixels().map(|p| pack_rgba(p.0)).collect();
        RasterBuffer {
            pixels,
            width: image.width() as usize,
            height: image.height() as usize,
        }
    }
}
