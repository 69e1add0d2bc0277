//! Toolkit-level error type.

use crate::alignment::{HomographyError, WarpError};
use crate::panel::PanelStatus;
use crate::pointer::ControlPointError;
use crate::raster::RasterError;

/// Failure of a single panel or toolkit operation.
///
/// Every variant is local to the operation that produced it: the panel is
/// left in its previous valid state, except for decode failures, which put
/// the panel into [`PanelStatus::Error`].
#[derive(Debug, thiserror::Error)]
pub enum ToolkitError {
    #[error("Panel is not ready (status: {status})")]
    PanelNotReady { status: PanelStatus },
    #[error("Crop selection is empty")]
    EmptySelection,
    #[error(transparent)]
    ControlPoint(#[from] ControlPointError),
    #[error(transparent)]
    Homography(#[from] HomographyError),
    #[error("Alignment failed: {0}")]
    Warp(#[from] WarpError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}

impl ToolkitError {
    /// Whether the user can fix this by adjusting control points or the selection.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ToolkitError::Raster(RasterError::Decode(_)))
    }
}

pub type ToolkitResult<T> = Result<T, ToolkitError>;
