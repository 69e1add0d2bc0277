//! Perspective warping strategies.
//!
//! Every strategy takes a homography that maps *destination* pixel
//! coordinates to *source* pixel coordinates (an inverse map) and samples
//! the source with nearest-neighbour interpolation. Destination pixels whose
//! source falls outside the image, or maps to infinity, receive
//! [`WarpConfig::border`].

mod fallback;
mod projection;

pub use fallback::FallbackWarper;
pub use projection::ImageprocWarper;

use serde::{Deserialize, Serialize};

use crate::alignment::homography::Homography;
use crate::geometry::Size;
use crate::raster::{RasterBuffer, RasterError};

#[derive(Debug, thiserror::Error)]
pub enum WarpError {
    #[error("Destination size must be non-zero, got {}x{}", .0.w, .0.h)]
    EmptyDestination(Size),
    #[error("Homography is not invertible")]
    NonInvertible,
    #[error(transparent)]
    Raster(#[from] RasterError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    /// RGBA written where the source has no data.
    pub border: [u8; 4],
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            border: [0, 0, 0, 0],
        }
    }
}

/// Available warp implementations, chosen at configuration time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum WarperKind {
    /// `imageproc` projective warp.
    #[default]
    Imageproc,
    /// Dependency-free manual inverse mapping.
    Fallback,
}

impl WarperKind {
    pub fn build(&self, config: WarpConfig) -> Box<dyn PerspectiveWarper> {
        match self {
            WarperKind::Imageproc => Box::new(ImageprocWarper::new(config)),
            WarperKind::Fallback => Box::new(FallbackWarper::new(config)),
        }
    }
}

pub trait PerspectiveWarper: Send + Sync {
    /// Resample `src` into a `dst`-sized buffer using `inverse_map`
    /// (destination → source coordinates).
    fn warp(
        &self,
        inverse_map: &Homography,
        src: &RasterBuffer,
        dst: Size,
    ) -> Result<RasterBuffer, WarpError>;

    fn kind(&self) -> WarperKind;
}

#[cfg(test)]
mod tests;
