//! Aligner - control-point image alignment toolkit.
//!
//! This library provides the engine behind a two-panel image comparison view:
//! - Coordinate conversion between canvas, render and image space
//! - Four-point homography estimation with collinearity diagnostics
//! - Perspective warping (imageproc-backed or manual fallback)
//! - Cropping, zoom/pan/fit view state, magnifier and control-point editing
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use aligner::prelude::*;
//!
//! let mut toolkit = Toolkit::new(ToolkitConfig::default());
//! toolkit.load_panel_encoded(PanelId::Left, &std::fs::read("historic.jpg")?)?;
//! toolkit.load_panel_encoded(PanelId::Right, &std::fs::read("modern.jpg")?)?;
//! toolkit.set_control_points(PanelId::Left, &historic_points)?;
//! toolkit.set_control_points(PanelId::Right, &modern_points)?;
//!
//! // Warp the right image onto the left one
//! toolkit.request_align(PanelId::Right)?;
//! let png = toolkit.request_download(PanelId::Right, EncodeFormat::Png)?;
//! ```

pub mod alignment;
pub mod config;
pub mod crop;
mod error;
pub mod geometry;
pub(crate) mod math;
pub mod panel;
pub mod pointer;
pub mod raster;
pub mod toolkit;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude;

// ============================================================================
// Core types
// ============================================================================

pub use error::{ToolkitError, ToolkitResult};
pub use geometry::{Dims, ScaleFactor, Size};
pub use raster::{EncodeFormat, RasterBuffer, RasterError};

// ============================================================================
// Configuration
// ============================================================================

pub use config::{ConfigError, MagnifierConfig, ToolkitConfig, ViewConfig};

// ============================================================================
// Alignment
// ============================================================================

pub use alignment::{
    // Diagnostics
    correlation,
    is_collinear,
    // Solver
    solve_homography,
    Homography,
    HomographyError,
    SolverConfig,
    // Warping
    FallbackWarper,
    ImageprocWarper,
    PerspectiveWarper,
    WarpConfig,
    WarpError,
    WarperKind,
};

// ============================================================================
// Panels and toolkit
// ============================================================================

pub use crop::{crop, CropRegion, SelectionBox};
pub use panel::{Mode, Panel, PanelDims, PanelStatus, PointerOutcome};
pub use pointer::{
    CanvasBounds, ControlPointError, ControlPoints, PointerEvent, PointerTracker,
    MAX_CONTROL_POINTS,
};
pub use toolkit::{Message, MessageKind, PanelId, Toolkit, ToolkitEvent};
