//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aligner::prelude::*;
//! ```

// Core types
pub use crate::{Dims, EncodeFormat, RasterBuffer, Size, ToolkitError, ToolkitResult};

// Configuration
pub use crate::{ToolkitConfig, WarperKind};

// Alignment - main API
pub use crate::{correlation, solve_homography, Homography, HomographyError, PerspectiveWarper};

// Panels and toolkit
pub use crate::{
    ControlPoints, Message, MessageKind, Mode, PanelId, PanelStatus, PointerEvent, SelectionBox,
    Toolkit, ToolkitEvent,
};
